pub mod backend;
pub mod llm_service;
pub mod prompt;

pub use backend::{FragmentStream, TranslationBackend, TranslationRequest};
pub use llm_service::LlmService;
