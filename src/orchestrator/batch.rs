//! 批量翻译 - 编排层
//!
//! ## 职责
//!
//! 按原文顺序逐章翻译，一章完全结束后才开始下一章。
//!
//! ## 设计特点
//!
//! - **顺序执行**：同一时间只有一条流式请求
//! - **可取消**：每章开始前检查批量标志，取消后不再开始新章节，但正在翻译的章节会继续完成
//! - **凭据失效即停止**：单章流程发现 Key 无效时会清除批量标志
//! - **标志必清**：循环以任何方式结束都会清除批量标志

use std::collections::HashSet;
use tracing::{info, warn};

use crate::models::Chapter;
use crate::orchestrator::confirm::ConfirmGate;
use crate::orchestrator::translator::TranslationOrchestrator;
use crate::services::TranslationBackend;
use crate::workflow::ChapterOutcome;

/// 批量翻译的结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchOutcome {
    /// 所有章节都处理过了
    #[default]
    Finished,
    /// 中途被取消或因 Key 失效停止
    Stopped,
    /// 没有可翻译的章节
    Empty,
    /// 用户没有确认
    Declined,
    /// 已有批量翻译在进行
    AlreadyRunning,
}

/// 批量翻译统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcome: BatchOutcome,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub superseded: usize,
    /// 按顺序实际处理过的章节
    pub processed: Vec<String>,
    /// 需要展示给用户的提示
    pub notice: Option<String>,
}

impl BatchReport {
    fn with_notice(outcome: BatchOutcome, notice: impl Into<String>) -> Self {
        Self {
            outcome,
            notice: Some(notice.into()),
            ..Default::default()
        }
    }

    fn record(&mut self, title: &str, outcome: ChapterOutcome) {
        self.processed.push(title.to_string());
        match outcome {
            ChapterOutcome::Completed => self.completed += 1,
            ChapterOutcome::Skipped => self.skipped += 1,
            ChapterOutcome::Superseded => self.superseded += 1,
            ChapterOutcome::Failed | ChapterOutcome::CredentialRejected => self.failed += 1,
        }
    }
}

impl<B: TranslationBackend> TranslationOrchestrator<B> {
    /// 批量翻译给定章节
    pub async fn translate_all(&self, chapters: &[Chapter], confirm: &dyn ConfirmGate) -> BatchReport {
        let started = self.session.update(|s| {
            if s.batch_active() {
                return false;
            }
            s.set_batch_active(true);
            true
        });
        if !started {
            warn!("⚠️ 已有批量翻译在进行中");
            return BatchReport::with_notice(
                BatchOutcome::AlreadyRunning,
                "Đang có tiến trình dịch hàng loạt.",
            );
        }

        let report = self.run_batch(chapters, confirm).await;

        self.session.update(|s| s.set_batch_active(false));
        log_batch_complete(&report);
        report
    }

    async fn run_batch(&self, chapters: &[Chapter], confirm: &dyn ConfirmGate) -> BatchReport {
        if chapters.is_empty() {
            warn!("⚠️ 没有可翻译的章节");
            return BatchReport::with_notice(BatchOutcome::Empty, "Không có chương nào hợp lệ để dịch.");
        }

        let message = format!("Bạn có chắc muốn dịch {} chương không?", chapters.len());
        if !confirm.confirm(&message) {
            info!("用户取消了批量翻译");
            return BatchReport {
                outcome: BatchOutcome::Declined,
                ..Default::default()
            };
        }

        let ordered = self.session.read(|s| s.in_document_order(chapters));
        log_batch_start(ordered.len());

        let mut report = BatchReport::default();
        for (index, chapter) in ordered.iter().enumerate() {
            if !self.session.read(|s| s.batch_active()) {
                info!("⏹ 批量翻译已停止，剩余 {} 章未开始", ordered.len() - index);
                report.outcome = BatchOutcome::Stopped;
                break;
            }

            info!("📖 [{}/{}] {}", index + 1, ordered.len(), chapter.title);
            let outcome = self.flow.run(chapter, None).await;
            report.record(&chapter.title, outcome);
        }

        report
    }

    /// 翻译选中的章节中未翻译或出错的部分
    pub async fn translate_selected(&self, titles: &HashSet<String>, confirm: &dyn ConfirmGate) -> BatchReport {
        let chapters = self.session.read(|s| s.pending_among(titles));
        if chapters.is_empty() {
            return BatchReport::with_notice(
                BatchOutcome::Empty,
                "Các chương đã chọn đều đã được dịch hoặc đang trong quá trình dịch.",
            );
        }
        self.translate_all(&chapters, confirm).await
    }

    /// 翻译所有未翻译或出错的章节
    pub async fn translate_remaining(&self, confirm: &dyn ConfirmGate) -> BatchReport {
        let chapters = self.session.read(|s| s.pending_chapters());
        self.translate_all(&chapters, confirm).await
    }

    /// 停止批量翻译：正在翻译的章节会继续完成，之后不再开始新章节
    pub fn cancel_batch(&self) {
        self.session.update(|s| s.set_batch_active(false));
        info!("⏹ 已请求停止批量翻译");
    }

    pub fn batch_active(&self) -> bool {
        self.session.read(|s| s.batch_active())
    }
}

// ========== 日志辅助函数 ==========

fn log_batch_start(total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始批量翻译，共 {} 章", total);
    info!("💡 逐章翻译，一章完成后再开始下一章");
    info!("{}", "=".repeat(60));
}

fn log_batch_complete(report: &BatchReport) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 批量翻译结束 ({:?}): 完成 {}, 失败 {}, 跳过 {}, 取消 {}",
        report.outcome, report.completed, report.failed, report.skipped, report.superseded
    );
    info!("{}", "─".repeat(60));
}
