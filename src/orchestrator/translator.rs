//! 翻译编排器 - 编排层
//!
//! ## 职责
//!
//! 持有会话状态和外部 AI 能力，是界面（命令行）唯一调用的入口。
//!
//! ## 核心功能
//!
//! 1. **分章**：把文档交给 AI 拆分，装入章节和初始状态
//! 2. **单章翻译 / 重译 / 取消**：委托 [`ChapterFlow`]
//! 3. **凭据管理**：保存、切换 Key，切换时停下所有进行中的翻译
//! 4. **术语表与通知**：合并新术语，通知中心的已读 / 清空 / 点击
//!
//! 批量翻译见 `batch` 模块。

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, CredentialError, SetupError};
use crate::infrastructure::CredentialStore;
use crate::models::{
    Chapter, ChapterStatus, ChapterStatusInfo, GlossaryTerm, MergeReport, Notification,
    NotificationType,
};
use crate::orchestrator::confirm::ConfirmGate;
use crate::orchestrator::retranslate::RetranslateReason;
use crate::services::TranslationBackend;
use crate::workflow::{ChapterFlow, ChapterOutcome, SessionHandle, SessionState};

/// 换 Key 时写在被中断章节上的提示
pub const SWITCHED_CREDENTIAL_MESSAGE: &str =
    "Đã dừng do đổi API Key. Nhấn để thử lại với key mới.";

/// 请求翻译某一章的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslateRequest {
    /// 章节已完成，需要用户先选择重译原因
    NeedsRetranslateReason,
    Finished(ChapterOutcome),
}

/// 点击通知后界面应当做的事
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationAction {
    /// 打开新术语审阅
    ReviewTerms(Notification),
    /// 跳转到相关章节
    OpenChapter(String),
    None,
}

/// 翻译编排器
pub struct TranslationOrchestrator<B: TranslationBackend> {
    pub(super) session: SessionHandle,
    pub(super) credentials: Arc<CredentialStore>,
    pub(super) flow: ChapterFlow<B>,
    backend: Arc<B>,
}

impl<B: TranslationBackend> TranslationOrchestrator<B> {
    pub fn new(backend: Arc<B>, credentials: CredentialStore, config: &Config) -> Self {
        let mut state = SessionState::new(config.story_context.clone(), config.world_context.clone());
        state.set_credential_ready(credentials.is_present());

        let session = SessionHandle::new(state);
        let credentials = Arc::new(credentials);
        let flow = ChapterFlow::new(backend.clone(), session.clone(), credentials.clone());

        Self {
            session,
            credentials,
            flow,
            backend,
        }
    }

    /// 共享的会话句柄（供界面读取状态，或在其他任务中取消）
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    // ========== 凭据 ==========

    pub fn credential_ready(&self) -> bool {
        self.session.read(|s| s.credential_ready())
    }

    pub fn save_credential(&self, input: &str) -> Result<(), CredentialError> {
        self.credentials.save(input)?;
        self.session.update(|s| s.set_credential_ready(true));
        info!("🔑 API Key 已保存");
        Ok(())
    }

    /// 换 Key：停止批量翻译，所有进行中的章节标记为出错，删除已保存的 Key
    pub fn switch_credential(&self, confirm: &dyn ConfirmGate) -> AppResult<bool> {
        if !confirm.confirm(
            "Bạn có chắc chắn muốn đổi API Key không? Các tiến trình dịch đang diễn ra sẽ bị dừng lại.",
        ) {
            return Ok(false);
        }

        let halted = self.session.update(|s| {
            s.set_batch_active(false);
            s.halt_translating(SWITCHED_CREDENTIAL_MESSAGE)
        });
        if halted > 0 {
            warn!("⏹ 换 Key 中断了 {} 个正在翻译的章节", halted);
        }

        self.credentials.clear()?;
        self.session.update(|s| s.set_credential_ready(false));
        Ok(true)
    }

    // ========== 分章 ==========

    /// 把整份文档交给 AI 分章，成功后开始新的章节会话
    pub async fn load_document(&self, document: &str) -> AppResult<Vec<Chapter>> {
        let chapters = match self.backend.split_chapters(document).await {
            Ok(chapters) if chapters.is_empty() => {
                return Err(AppError::Setup(SetupError::NoChapters));
            }
            Ok(chapters) => chapters,
            Err(e @ AppError::Setup(_)) => return Err(e),
            Err(e) => return Err(AppError::split_failed(e)),
        };

        self.session.update(|s| {
            s.set_batch_active(false);
            s.install_chapters(chapters.clone());
        });
        info!("📚 已载入 {} 个章节", chapters.len());
        Ok(chapters)
    }

    // ========== 单章 ==========

    /// 翻译一章（已完成且有缓存时不做任何事）
    pub async fn translate_chapter(&self, chapter: &Chapter) -> ChapterOutcome {
        self.flow.run(chapter, None).await
    }

    /// 用户点击"翻译"：已完成的章节需要先选择重译原因，其余立即开始或重试
    pub async fn request_translation(&self, chapter: &Chapter) -> TranslateRequest {
        if self.session.read(|s| s.status_kind(&chapter.title)) == ChapterStatus::Done {
            return TranslateRequest::NeedsRetranslateReason;
        }
        TranslateRequest::Finished(self.translate_chapter(chapter).await)
    }

    /// 重译：清空旧译文，无论之前是否完成都重新请求
    pub async fn retranslate(&self, chapter: &Chapter, reason: RetranslateReason) -> ChapterOutcome {
        let title = chapter.title.as_str();
        let known = self.session.update(|s| {
            if !s.knows(title) {
                return false;
            }
            s.clear_translation(title);
            s.set_status(title, ChapterStatusInfo::translating(0));
            true
        });
        if !known {
            warn!("[{}] 章节不属于当前文档，无法重译", title);
            return ChapterOutcome::Skipped;
        }

        let instruction = reason.instruction();
        info!("[{}] 🔁 重译，原因: {:?}", title, reason);
        self.flow.run(chapter, instruction.as_deref()).await
    }

    /// 取消单章翻译（协作式：正在处理的片段会处理完，下一个片段不再处理）
    pub fn cancel(&self, title: &str) {
        self.session.update(|s| s.cancel(title));
        info!("[{}] ⏹ 已请求取消", title);
    }

    pub fn delete_chapter(&self, title: &str, confirm: &dyn ConfirmGate) -> bool {
        let message = format!(
            "Bạn có chắc chắn muốn xóa chương \"{}\" không? Hành động này sẽ xóa cả bản dịch (nếu có) và không thể hoàn tác.",
            title
        );
        if !confirm.confirm(&message) {
            return false;
        }
        self.session.update(|s| s.delete_chapter(title))
    }

    // ========== 显示 ==========

    /// 选中章节，返回应当显示的译文
    pub fn select_chapter(&self, title: &str) -> Option<String> {
        self.session.update(|s| {
            if s.select(title) {
                Some(s.live_translation().to_string())
            } else {
                None
            }
        })
    }

    pub fn back_to_chapters(&self) {
        self.session.update(|s| s.deselect());
    }

    pub fn update_translation(&self, text: impl Into<String>) {
        self.session.update(|s| s.edit_live_translation(text));
    }

    // ========== 设置与术语表 ==========

    pub fn update_settings(&self, story_context: impl Into<String>, world_context: impl Into<String>) {
        self.session.update(|s| s.update_settings(story_context, world_context));
    }

    pub fn set_glossary(&self, glossary: Vec<GlossaryTerm>) {
        self.session.update(|s| s.set_glossary(glossary));
    }

    pub fn glossary(&self) -> Vec<GlossaryTerm> {
        self.session.read(|s| s.glossary().to_vec())
    }

    /// 把审阅后的新术语并入术语表
    pub fn save_new_terms(&self, terms: Vec<GlossaryTerm>) -> MergeReport {
        let report = self.session.update(|s| s.merge_new_terms(terms));
        if let Some(message) = report.message() {
            info!("{}", message);
        }
        report
    }

    // ========== 通知 ==========

    pub fn notifications(&self) -> Vec<Notification> {
        self.session.read(|s| s.notifications().to_vec())
    }

    pub fn unread_count(&self) -> usize {
        self.session.read(|s| s.unread_count())
    }

    pub fn mark_notification_read(&self, id: &str) -> bool {
        self.session.update(|s| s.mark_read(id))
    }

    pub fn clear_notifications(&self) {
        self.session.update(|s| s.clear_notifications());
    }

    /// 点击通知：先标记已读，新术语通知打开审阅，其余通知跳转到相关章节
    pub fn click_notification(&self, id: &str) -> NotificationAction {
        let notification = self.session.update(|s| {
            s.mark_read(id);
            s.notification(id).cloned()
        });
        let Some(notification) = notification else {
            return NotificationAction::None;
        };

        if notification.kind == NotificationType::NewTerms {
            return NotificationAction::ReviewTerms(notification);
        }

        match notification.related_chapter_title {
            Some(title) if self.select_chapter(&title).is_some() => NotificationAction::OpenChapter(title),
            _ => NotificationAction::None,
        }
    }

    // ========== 重置 ==========

    pub fn reset(&self) {
        self.session.update(|s| s.reset());
        info!("🔄 会话已重置");
    }
}
