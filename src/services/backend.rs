//! 外部 AI 能力的抽象
//!
//! 编排层只依赖这个 trait：生产环境由 [`LlmService`](super::LlmService) 实现，
//! 测试中可以换成按脚本吐出片段的实现。

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::AppResult;
use crate::models::{Chapter, GlossaryTerm};

/// 流式翻译返回的文本片段序列
pub type FragmentStream = BoxStream<'static, AppResult<String>>;

/// 一次章节翻译请求
#[derive(Debug, Clone, Copy)]
pub struct TranslationRequest<'a> {
    pub content: &'a str,
    pub story_context: &'a str,
    pub world_context: &'a str,
    pub glossary: &'a [GlossaryTerm],
    /// 重译时附加的说明
    pub instruction: Option<&'a str>,
}

#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// 把整份文档拆分为章节
    async fn split_chapters(&self, document: &str) -> AppResult<Vec<Chapter>>;

    /// 打开一条流式翻译
    ///
    /// 所有片段拼接后，在分隔符 `---JSON_TERMS---` 之前是译文，之后（可选）是新术语的 JSON 数组。
    async fn stream_translate(&self, request: TranslationRequest<'_>) -> AppResult<FragmentStream>;
}
