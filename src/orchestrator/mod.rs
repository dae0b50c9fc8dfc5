//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层持有会话状态，负责单章与批量翻译的调度，是界面唯一调用的入口。
//!
//! ## 模块划分
//!
//! ### `translator` - 翻译编排器
//! - 分章、单章翻译、重译、取消
//! - 凭据保存与切换
//! - 术语表合并、通知中心
//!
//! ### `batch` - 批量翻译
//! - 按原文顺序逐章翻译
//! - 批量标志的设置与清除
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator (会话、批量)
//!     ↓
//! workflow::ChapterFlow (单章流式翻译)
//!     ↓
//! services (能力层：分章 / 流式翻译)
//!     ↓
//! infrastructure (基础设施：CredentialStore)
//! ```

pub mod batch;
pub mod confirm;
pub mod retranslate;
pub mod translator;

// 重新导出主要类型
pub use batch::{BatchOutcome, BatchReport};
pub use confirm::{AlwaysConfirm, ConfirmGate};
pub use retranslate::RetranslateReason;
pub use translator::{
    NotificationAction, TranslateRequest, TranslationOrchestrator, SWITCHED_CREDENTIAL_MESSAGE,
};
