//! 单章翻译流程 - 流程层
//!
//! 核心职责：定义"一章"的完整翻译流程
//!
//! 流程顺序：
//! 1. 幂等检查（已完成且有缓存、没有重译说明时直接跳过）
//! 2. 标记 Translating / 0%
//! 3. 消费流式响应：每个片段之前确认本次尝试仍然有效，被取消、换 Key 或被新请求接管就立刻停止
//! 4. 解析末尾的新术语 JSON，发出通知
//! 5. 标记 Done / 100%，或在失败时记录错误

use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};
use crate::infrastructure::CredentialStore;
use crate::models::{Chapter, ChapterStatus, ChapterStatusInfo, DetectedTerm, Notification};
use crate::services::llm_service::strip_code_fence;
use crate::services::{TranslationBackend, TranslationRequest};
use crate::workflow::progress::ProgressTracker;
use crate::workflow::session::SessionHandle;
use crate::workflow::term_scanner::TermScanner;

/// 凭据失效时写在章节状态上的提示
pub const CREDENTIAL_INVALID_MESSAGE: &str =
    "API Key không hợp lệ hoặc đã hết hạn. Vui lòng nhập lại.";

/// 单章处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterOutcome {
    /// 已完成且有缓存，未做任何事
    Skipped,
    /// 翻译完成
    Completed,
    /// 中途被取消或被其他操作接管
    Superseded,
    /// 翻译失败
    Failed,
    /// 凭据无效，后续调用都不会成功
    CredentialRejected,
}

enum StreamEnd {
    Finished { text: String, json: Option<String> },
    Superseded,
}

/// 单章翻译流程
///
/// - 不持有章节列表，只通过 [`SessionHandle`] 读写共享状态
/// - 每次读状态都是当下的值，不在循环开始时缓存
/// - 每次运行持有一个尝试编号，所有写入都先确认编号仍是该章节当前的编号
pub struct ChapterFlow<B: TranslationBackend> {
    backend: Arc<B>,
    session: SessionHandle,
    credentials: Arc<CredentialStore>,
}

impl<B: TranslationBackend> ChapterFlow<B> {
    pub fn new(backend: Arc<B>, session: SessionHandle, credentials: Arc<CredentialStore>) -> Self {
        Self {
            backend,
            session,
            credentials,
        }
    }

    pub async fn run(&self, chapter: &Chapter, instruction: Option<&str>) -> ChapterOutcome {
        let title = chapter.title.as_str();

        let (known, already_done) = self.session.read(|s| {
            (
                s.knows(title),
                s.status_kind(title) == ChapterStatus::Done && s.has_cache(title),
            )
        });
        if !known {
            warn!("[{}] 章节不属于当前文档，跳过", title);
            return ChapterOutcome::Skipped;
        }
        if already_done && instruction.is_none() {
            debug!("[{}] 已完成且有缓存，跳过", title);
            return ChapterOutcome::Skipped;
        }

        // 上下文和术语表在本章开始时读取
        let started = self.session.update(|s| {
            let attempt = s.begin_attempt(title)?;
            Some((
                attempt,
                s.story_context().to_string(),
                s.world_context().to_string(),
                s.glossary().to_vec(),
            ))
        });
        let Some((attempt, story_context, world_context, glossary)) = started else {
            return ChapterOutcome::Skipped;
        };

        info!("[{}] 🚀 开始翻译", title);

        let request = TranslationRequest {
            content: &chapter.content,
            story_context: &story_context,
            world_context: &world_context,
            glossary: &glossary,
            instruction,
        };

        let outcome = match self.consume(chapter, attempt, request).await {
            Ok(StreamEnd::Superseded) => ChapterOutcome::Superseded,
            Ok(StreamEnd::Finished { text, json }) => self.finish(title, attempt, &text, json),
            Err(e) => self.fail(title, attempt, e),
        };
        if outcome == ChapterOutcome::Superseded {
            info!("[{}] ⏹ 本次翻译已被取消或接管", title);
        }
        outcome
    }

    async fn consume(
        &self,
        chapter: &Chapter,
        attempt: u64,
        request: TranslationRequest<'_>,
    ) -> AppResult<StreamEnd> {
        let title = chapter.title.as_str();
        let mut stream = self.backend.stream_translate(request).await?;
        let mut scanner = TermScanner::new();
        let mut progress = ProgressTracker::new(chapter.line_count());

        while let Some(item) = stream.next().await {
            if !self.session.read(|s| s.is_current(title, attempt)) {
                return Ok(StreamEnd::Superseded);
            }
            let fragment = item?;

            let still_running = self.session.update(|s| {
                if !s.is_current(title, attempt) {
                    return false;
                }
                scanner.push(&fragment);
                let percent = progress.update(scanner.text());
                s.store_translation(title, scanner.text());
                s.set_status(title, ChapterStatusInfo::translating(percent));
                true
            });

            if !still_running {
                return Ok(StreamEnd::Superseded);
            }
        }

        let output = scanner.finish();

        // 流结束时把暂存的尾巴也写进缓存
        let still_running = self.session.update(|s| {
            if !s.is_current(title, attempt) {
                return false;
            }
            s.store_translation(title, &output.text);
            true
        });
        if !still_running {
            return Ok(StreamEnd::Superseded);
        }

        Ok(StreamEnd::Finished {
            text: output.text,
            json: output.json,
        })
    }

    fn finish(&self, title: &str, attempt: u64, text: &str, json: Option<String>) -> ChapterOutcome {
        let terms = json.map(|json| parse_new_terms(title, &json)).unwrap_or_default();

        let done = self.session.update(|s| {
            if !s.is_current(title, attempt) {
                return false;
            }
            if !terms.is_empty() {
                s.push_notification(Notification::new_terms(title, terms));
            }
            s.set_status(title, ChapterStatusInfo::done());
            true
        });

        if done {
            info!("[{}] ✅ 翻译完成，译文 {} 字符", title, text.chars().count());
            ChapterOutcome::Completed
        } else {
            ChapterOutcome::Superseded
        }
    }

    fn fail(&self, title: &str, attempt: u64, err: AppError) -> ChapterOutcome {
        let message = err.to_string();
        let credential_rejected = err.is_credential_error();

        // 已被接管的尝试不再写任何状态
        let current = self.session.update(|s| {
            if !s.is_current(title, attempt) {
                return false;
            }
            s.push_notification(Notification::chapter_error(title, message.clone()));
            if credential_rejected {
                s.set_credential_ready(false);
                s.set_batch_active(false);
                s.set_status(title, ChapterStatusInfo::failed(0, CREDENTIAL_INVALID_MESSAGE));
            } else {
                s.set_status(title, ChapterStatusInfo::failed(0, message.clone()));
            }
            true
        });
        if !current {
            debug!("[{}] 已被接管的翻译出错，忽略: {}", title, message);
            return ChapterOutcome::Superseded;
        }

        error!("[{}] ❌ 翻译失败: {}", title, message);
        if !credential_rejected {
            return ChapterOutcome::Failed;
        }

        warn!("🔑 API Key 无效或已过期，清除凭据并停止批量翻译");
        if let Err(e) = self.credentials.clear() {
            warn!("清除凭据失败: {}", e);
        }
        ChapterOutcome::CredentialRejected
    }
}

/// 解析新术语；格式错误只记日志，不影响译文本身
fn parse_new_terms(title: &str, json: &str) -> Vec<DetectedTerm> {
    let json = strip_code_fence(json);
    if json.is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Vec<DetectedTerm>>(json) {
        Ok(terms) => {
            if !terms.is_empty() {
                info!("[{}] 📝 发现 {} 个新术语", title, terms.len());
            }
            terms
        }
        Err(e) => {
            warn!("[{}] 新术语 JSON 解析失败: {}", title, e);
            debug!("[{}] JSON 内容: {}", title, json);
            Vec::new()
        }
    }
}
