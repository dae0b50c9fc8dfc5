use std::fmt;

pub use crate::infrastructure::credential_store::CredentialError;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 分章等准备阶段的错误，影响整个流程
    Setup(SetupError),
    /// LLM 服务错误
    Llm(LlmError),
    /// 凭据存储错误
    Credential(CredentialError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Setup(e) => write!(f, "准备阶段错误: {}", e),
            AppError::Llm(e) => write!(f, "LLM错误: {}", e),
            AppError::Credential(e) => write!(f, "凭据错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Setup(e) => Some(e),
            AppError::Llm(e) => Some(e),
            AppError::Credential(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 准备阶段错误
#[derive(Debug)]
pub enum SetupError {
    /// 文档中没有找到任何章节
    NoChapters,
    /// 分章请求失败
    SplitFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::NoChapters => write!(f, "Không tìm thấy chương nào trong tệp."),
            SetupError::SplitFailed { source } => write!(f, "分章失败: {}", source),
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::SplitFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            SetupError::NoChapters => None,
        }
    }
}

/// LLM 服务错误
#[derive(Debug)]
pub enum LlmError {
    /// 构建请求失败
    RequestBuildFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 调用失败
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 流式响应中途出错
    StreamInterrupted {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    EmptyContent { model: String },
    /// 返回内容无法解析
    ResponseParseFailed {
        response: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::RequestBuildFailed { source } => write!(f, "构建LLM请求失败: {}", source),
            LlmError::ApiCallFailed { model, source } => {
                write!(f, "LLM API调用失败 (模型: {}): {}", model, source)
            }
            LlmError::StreamInterrupted { model, source } => {
                write!(f, "LLM流式响应中断 (模型: {}): {}", model, source)
            }
            LlmError::EmptyContent { model } => {
                write!(f, "LLM返回内容为空 (模型: {})", model)
            }
            LlmError::ResponseParseFailed { response, source } => {
                write!(f, "无法解析LLM返回内容 (响应: {}): {}", response, source)
            }
        }
    }
}

impl std::error::Error for LlmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LlmError::RequestBuildFailed { source }
            | LlmError::ApiCallFailed { source, .. }
            | LlmError::StreamInterrupted { source, .. }
            | LlmError::ResponseParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            LlmError::EmptyContent { .. } => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        AppError::Credential(err)
    }
}

impl From<async_openai::error::OpenAIError> for AppError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        AppError::Llm(LlmError::RequestBuildFailed {
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建LLM API调用错误
    pub fn llm_api_failed(model: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建流式响应中断错误
    pub fn llm_stream_interrupted(model: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Llm(LlmError::StreamInterrupted {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建分章失败错误
    pub fn split_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Setup(SetupError::SplitFailed {
            source: Box::new(source),
        })
    }

    /// 是否属于凭据失效类错误
    pub fn is_credential_error(&self) -> bool {
        is_credential_error_message(&self.to_string())
    }
}

/// 凭据失效的错误信息特征
const CREDENTIAL_ERROR_PHRASES: &[&str] = &["api key", "requested entity was not found"];

/// 根据错误信息判断是否为凭据无效或过期
pub fn is_credential_error_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    CREDENTIAL_ERROR_PHRASES
        .iter()
        .any(|phrase| lower.contains(phrase))
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_error_detection() {
        assert!(is_credential_error_message("API key not valid. Please pass a valid API key."));
        assert!(is_credential_error_message("Requested entity was not found."));
        assert!(!is_credential_error_message("quota exceeded"));
    }

    #[test]
    fn test_no_chapters_message() {
        let err = AppError::Setup(SetupError::NoChapters);
        assert!(err.to_string().contains("Không tìm thấy chương nào"));
    }
}
