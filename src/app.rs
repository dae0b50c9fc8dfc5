//! 命令行应用
//!
//! 一次运行 = 一次会话：检查 Key → 分章 → 批量翻译剩余章节 → 写出译文 → 合并新术语。

use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::infrastructure::CredentialStore;
use crate::models::{self, GlossaryTerm, NotificationType};
use crate::orchestrator::{AlwaysConfirm, BatchOutcome, ConfirmGate, TranslationOrchestrator};
use crate::services::LlmService;
use crate::utils::logging;

/// 终端里的 y/N 确认
pub struct TerminalConfirm;

impl ConfirmGate for TerminalConfirm {
    fn confirm(&self, message: &str) -> bool {
        print!("{} [y/N] ", message);
        let _ = io::stdout().flush();

        match read_line_blocking(&mut io::stdin().lock()) {
            Ok(Some(answer)) => is_yes(&answer),
            _ => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "có" | "co")
}

/// 读取一行终端输入，输入结束时返回 None
///
/// 读取会阻塞当前线程，所以交给 `block_in_place`，同一运行时里的流式翻译和
/// Ctrl-C 监听继续在其他工作线程上运行。需要多线程运行时。
fn read_line_blocking<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    let read = tokio::task::block_in_place(|| reader.read_line(&mut line))?;
    Ok((read > 0).then_some(line))
}

/// 应用主结构
pub struct App {
    config: Config,
    orchestrator: Arc<TranslationOrchestrator<LlmService>>,
    assume_yes: bool,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config, assume_yes: bool) -> Result<Self> {
        logging::log_startup(&config);

        let backend = Arc::new(LlmService::new(&config));
        let credentials = CredentialStore::new(config.credential_file.clone());
        let orchestrator = Arc::new(TranslationOrchestrator::new(backend, credentials, &config));

        let glossary = models::load_glossary(&config.glossary_file).await?;
        orchestrator.set_glossary(glossary);

        Ok(Self {
            config,
            orchestrator,
            assume_yes,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self, document_path: &Path) -> Result<()> {
        self.ensure_credential()?;

        // 分章失败影响整个流程
        let document = models::load_document(document_path).await?;
        let chapters = self
            .orchestrator
            .load_document(&document)
            .await
            .with_context(|| format!("无法分章: {}", document_path.display()))?;

        let file_name = document_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let titles: Vec<String> = chapters.iter().map(|c| c.title.clone()).collect();
        logging::log_chapters_loaded(&file_name, &titles);

        // Ctrl-C 只停止批量翻译，当前章节会翻译完
        let session = self.orchestrator.session().clone();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("⏹ 收到中断信号，当前章节完成后停止");
                session.update(|s| s.set_batch_active(false));
            }
        });

        let report = if self.assume_yes {
            self.orchestrator.translate_remaining(&AlwaysConfirm).await
        } else {
            self.orchestrator.translate_remaining(&TerminalConfirm).await
        };
        interrupt.abort();

        if let Some(notice) = &report.notice {
            println!("{}", notice);
        }
        if report.outcome == BatchOutcome::Declined {
            info!("未开始翻译");
            return Ok(());
        }
        if !self.orchestrator.credential_ready() {
            error!("🔑 API Key 无效或已过期，已清除。请重新运行并输入新的 Key。");
        }

        let written = self.write_translations().await?;
        self.merge_detected_terms().await?;
        self.print_notifications();

        logging::print_final_stats(
            written,
            report.failed,
            titles.len(),
            &self.config.output_dir.display().to_string(),
        );
        Ok(())
    }

    /// 没有保存 Key 时在终端要求输入
    fn ensure_credential(&self) -> Result<()> {
        if self.orchestrator.credential_ready() {
            return Ok(());
        }

        println!("Chưa có API Key. Việc sử dụng API có thể phát sinh chi phí.");
        loop {
            print!("Dán API Key của bạn vào đây: ");
            io::stdout().flush()?;

            let Some(input) = read_line_blocking(&mut io::stdin().lock())? else {
                bail!("没有输入 API Key");
            };

            match self.orchestrator.save_credential(&input) {
                Ok(()) => return Ok(()),
                Err(e) => println!("{}", e),
            }
        }
    }

    /// 把已完成章节的译文写到输出目录
    async fn write_translations(&self) -> Result<usize> {
        let output_dir = &self.config.output_dir;
        fs::create_dir_all(output_dir)
            .await
            .with_context(|| format!("无法创建输出目录: {}", output_dir.display()))?;

        let done: Vec<(usize, String, String)> = self.orchestrator.session().read(|s| {
            s.chapters()
                .iter()
                .enumerate()
                .filter(|(_, c)| s.status_kind(&c.title) == models::ChapterStatus::Done)
                .filter_map(|(i, c)| s.cached(&c.title).map(|t| (i, c.title.clone(), t.to_string())))
                .collect()
        });

        for (index, title, text) in &done {
            let path = output_path(output_dir, *index, title);
            fs::write(&path, text)
                .await
                .with_context(|| format!("无法写入译文: {}", path.display()))?;
            info!("💾 {}", path.display());
        }

        Ok(done.len())
    }

    /// 把通知中的新术语并入术语表文件
    async fn merge_detected_terms(&self) -> Result<()> {
        let detected: Vec<GlossaryTerm> = self
            .orchestrator
            .notifications()
            .iter()
            .filter(|n| n.kind == NotificationType::NewTerms)
            .flat_map(|n| n.terms().iter().map(|t| t.to_glossary_term()).collect::<Vec<_>>())
            .collect();

        if detected.is_empty() {
            return Ok(());
        }

        let report = self.orchestrator.save_new_terms(detected);
        if report.added > 0 {
            models::save_glossary(&self.config.glossary_file, &self.orchestrator.glossary()).await?;
        }
        if let Some(message) = report.message() {
            println!("{}", message);
        }
        Ok(())
    }

    fn print_notifications(&self) {
        let notifications = self.orchestrator.notifications();
        if notifications.is_empty() {
            return;
        }

        println!("\n🔔 Thông báo ({} chưa đọc)", self.orchestrator.unread_count());
        for n in &notifications {
            match n.error_detail() {
                Some(detail) => println!("  • {} {}", n.message, logging::truncate_text(detail, 120)),
                None => println!("  • {}", n.message),
            }
        }
    }
}

/// 译文文件名：序号 + 去掉非法字符的标题
fn output_path(dir: &Path, index: usize, title: &str) -> PathBuf {
    let safe: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    dir.join(format!("{:03}-{}.txt", index + 1, safe.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_sanitizes_title() {
        let path = output_path(Path::new("out"), 0, "第一章: 开始/结束?");
        assert_eq!(path, Path::new("out").join("001-第一章_ 开始_结束_.txt"));
    }

    #[test]
    fn test_yes_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" Có "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_terminal_read_does_not_stall_runtime() {
        let ticker = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            "done"
        });

        let mut input = io::Cursor::new("sk-key\n");
        let line = read_line_blocking(&mut input).unwrap();
        assert_eq!(line.as_deref(), Some("sk-key\n"));
        assert_eq!(read_line_blocking(&mut input).unwrap(), None);

        assert_eq!(ticker.await.unwrap(), "done");
    }
}
