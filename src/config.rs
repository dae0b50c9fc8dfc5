use std::path::PathBuf;

/// 默认故事背景
pub const DEFAULT_STORY_CONTEXT: &str = "Hiện đại";
/// 默认世界观
pub const DEFAULT_WORLD_CONTEXT: &str = "Bình thường";

/// 程序配置
///
/// API Key 不在这里配置，而是由凭据存储统一管理。
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    // --- 文件 ---
    /// 凭据文件路径
    pub credential_file: PathBuf,
    /// 术语表文件路径
    pub glossary_file: PathBuf,
    /// 译文输出目录
    pub output_dir: PathBuf,
    // --- 翻译上下文 ---
    pub story_context: String,
    pub world_context: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-2.5-flash".to_string(),
            llm_temperature: 0.3,
            credential_file: PathBuf::from(".novel_translate/credentials.toml"),
            glossary_file: PathBuf::from("glossary.toml"),
            output_dir: PathBuf::from("output"),
            story_context: DEFAULT_STORY_CONTEXT.to_string(),
            world_context: DEFAULT_WORLD_CONTEXT.to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: std::env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_temperature),
            credential_file: std::env::var("CREDENTIAL_FILE").map(PathBuf::from).unwrap_or(default.credential_file),
            glossary_file: std::env::var("GLOSSARY_FILE").map(PathBuf::from).unwrap_or(default.glossary_file),
            output_dir: std::env::var("OUTPUT_DIR").map(PathBuf::from).unwrap_or(default.output_dir),
            story_context: std::env::var("STORY_CONTEXT").unwrap_or(default.story_context),
            world_context: std::env::var("WORLD_CONTEXT").unwrap_or(default.world_context),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }
}
