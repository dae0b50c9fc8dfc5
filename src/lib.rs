//! # Novel Translate
//!
//! 按章节流式翻译小说（中文 → 越南语）的编排库与命令行工具
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有持久化资源，只暴露能力
//! - `CredentialStore` - 唯一一条 API Key 的读 / 写 / 删除
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"：分章、流式翻译
//! - `TranslationBackend` - 外部 AI 能力的抽象
//! - `LlmService` - 基于 async-openai 的实现
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一章"的完整翻译流程
//! - `SessionHandle` - 共享会话状态，每个挂起点重新读取
//! - `TermScanner` - 增量切分译文与新术语 JSON
//! - `ChapterFlow` - 单章流程（状态 → 流式消费 → 术语通知 → 完成 / 失败）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/translator` - 分章、单章、重译、取消、凭据、通知
//! - `orchestrator/batch` - 按原文顺序的批量翻译
//!
//! ## 模块结构

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::CredentialStore;
pub use models::{Chapter, ChapterStatus, ChapterStatusInfo, GlossaryTerm, Notification};
pub use orchestrator::{BatchReport, RetranslateReason, TranslationOrchestrator};
pub use services::{LlmService, TranslationBackend};
pub use workflow::{ChapterFlow, ChapterOutcome, SessionHandle};
