//! LLM 服务 - 业务能力层
//!
//! 只负责"分章"和"流式翻译"两种能力，不关心章节状态
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Gemini 的 OpenAI 兼容端点、Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use futures::StreamExt;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError, SetupError};
use crate::infrastructure::CredentialStore;
use crate::models::Chapter;
use crate::services::backend::{FragmentStream, TranslationBackend, TranslationRequest};
use crate::services::prompt;

/// LLM 服务
///
/// 职责：
/// - 每次调用时从凭据存储读取当前 Key（用户可能中途更换 Key）
/// - 只处理单个文档 / 单个章节
/// - 不读写章节状态、缓存和通知
pub struct LlmService {
    credentials: CredentialStore,
    api_base_url: String,
    model_name: String,
    temperature: f32,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        Self {
            credentials: CredentialStore::new(config.credential_file.clone()),
            api_base_url: config.llm_api_base_url.clone(),
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn client(&self) -> AppResult<Client<OpenAIConfig>> {
        // 错误信息包含 "API key"，编排层会据此走凭据失效流程
        let api_key = self
            .credentials
            .load()?
            .ok_or_else(|| AppError::Other("Chưa thiết lập API key.".to_string()))?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&self.api_base_url);

        Ok(Client::with_config(openai_config))
    }

    fn build_request(
        &self,
        system_message: &str,
        user_message: &str,
        stream: bool,
    ) -> AppResult<CreateChatCompletionRequest> {
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_message)
            .build()?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;

        let messages = vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .stream(stream)
            .build()?;

        Ok(request)
    }
}

#[async_trait]
impl TranslationBackend for LlmService {
    async fn split_chapters(&self, document: &str) -> AppResult<Vec<Chapter>> {
        info!("📚 正在调用 LLM 分章，文档长度: {} 字符", document.chars().count());

        let client = self.client()?;
        let request = self.build_request(
            prompt::SPLIT_SYSTEM_PROMPT,
            &prompt::build_split_prompt(document),
            false,
        )?;

        let response = client.chat().create(request).await.map_err(|e| {
            warn!("LLM 分章调用失败: {}", e);
            AppError::split_failed(e)
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                AppError::Llm(LlmError::EmptyContent {
                    model: self.model_name.clone(),
                })
            })?;

        let chapters = parse_split_response(&content)?;
        if chapters.is_empty() {
            return Err(AppError::Setup(SetupError::NoChapters));
        }

        info!("✓ 分章完成，共 {} 章", chapters.len());
        Ok(chapters)
    }

    async fn stream_translate(&self, request: TranslationRequest<'_>) -> AppResult<FragmentStream> {
        debug!(
            "调用 LLM 流式翻译，模型: {}，原文长度: {} 字符，术语 {} 条",
            self.model_name,
            request.content.chars().count(),
            request.glossary.len()
        );

        let client = self.client()?;
        let chat_request = self.build_request(
            prompt::TRANSLATION_SYSTEM_PROMPT,
            &prompt::build_translation_prompt(&request),
            true,
        )?;

        let stream = client
            .chat()
            .create_stream(chat_request)
            .await
            .map_err(|e| {
                warn!("LLM 流式翻译调用失败: {}", e);
                AppError::llm_api_failed(&self.model_name, e)
            })?;

        let model = self.model_name.clone();
        let fragments = stream.map(move |item| match item {
            Ok(chunk) => Ok(chunk
                .choices
                .into_iter()
                .filter_map(|choice| choice.delta.content)
                .collect::<String>()),
            Err(e) => Err(AppError::llm_stream_interrupted(&model, e)),
        });

        Ok(fragments.boxed())
    }
}

fn code_fence_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").ok())
        .as_ref()
}

/// 去掉模型经常包在 JSON 外面的 ```json 代码块标记
pub fn strip_code_fence(raw: &str) -> &str {
    match code_fence_regex()
        .and_then(|re| re.captures(raw))
        .and_then(|c| c.get(1))
    {
        Some(inner) => inner.as_str(),
        None => raw.trim(),
    }
}

/// 解析分章结果
///
/// 丢弃内容为空的章节；标题重复时追加序号，保证标题唯一。
pub fn parse_split_response(raw: &str) -> AppResult<Vec<Chapter>> {
    let json = strip_code_fence(raw);
    let parsed: Vec<Chapter> = serde_json::from_str(json).map_err(|e| {
        AppError::Llm(LlmError::ResponseParseFailed {
            response: truncate(json, 200),
            source: Box::new(e),
        })
    })?;

    let mut seen = HashSet::new();
    let mut chapters = Vec::with_capacity(parsed.len());

    for (index, chapter) in parsed.into_iter().enumerate() {
        if chapter.content.trim().is_empty() {
            continue;
        }

        let base = match chapter.title.trim() {
            "" => format!("Chương {}", index + 1),
            title => title.to_string(),
        };

        let mut title = base.clone();
        let mut n = 2;
        while !seen.insert(title.clone()) {
            title = format!("{} ({})", base, n);
            n += 1;
        }

        chapters.push(Chapter::new(title, chapter.content));
    }

    Ok(chapters)
}

fn truncate(text: &str, max_len: usize) -> String {
    crate::utils::logging::truncate_text(text, max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("```\n[2]\n```"), "[2]");
        assert_eq!(strip_code_fence("  [3]  "), "[3]");
    }

    #[test]
    fn test_parse_split_response_makes_titles_unique() {
        let raw = r#"```json
[
  {"title": "第一章", "content": "一"},
  {"title": "第一章", "content": "二"},
  {"title": "", "content": "三"},
  {"title": "空章", "content": "   "}
]
```"#;
        let chapters = parse_split_response(raw).unwrap();
        let titles: Vec<&str> = chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["第一章", "第一章 (2)", "Chương 3"]);
    }

    #[test]
    fn test_parse_split_response_rejects_garbage() {
        assert!(parse_split_response("not json").is_err());
    }

    /// 测试真实的流式翻译
    #[tokio::test]
    #[ignore]
    async fn test_stream_translate_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env();
        let service = LlmService::new(&config);

        let request = TranslationRequest {
            content: "林青站在青云山顶，望着远方。",
            story_context: "Tiên hiệp",
            world_context: "Tu chân",
            glossary: &[],
            instruction: None,
        };

        let mut stream = service.stream_translate(request).await.unwrap();
        let mut full = String::new();
        while let Some(fragment) = stream.next().await {
            full.push_str(&fragment.unwrap());
        }
        println!("{}", full);
        assert!(!full.is_empty());
    }
}
