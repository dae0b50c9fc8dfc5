use serde::{Deserialize, Serialize};

/// 章节
///
/// 由分章步骤产生，之后不再修改。`title` 在同一份文档内唯一，作为所有状态表的键。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    pub content: String,
}

impl Chapter {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// 原文行数（至少为 1），用于估算翻译进度
    pub fn line_count(&self) -> usize {
        self.content.split('\n').count().max(1)
    }
}

/// 章节翻译状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChapterStatus {
    #[default]
    Idle,
    Translating,
    Done,
    Error,
}

impl ChapterStatus {
    /// 是否可以被"翻译剩余 / 翻译所选"重新排入批次
    pub fn is_pending(self) -> bool {
        matches!(self, ChapterStatus::Idle | ChapterStatus::Error)
    }

    pub fn label(self) -> &'static str {
        match self {
            ChapterStatus::Idle => "未翻译",
            ChapterStatus::Translating => "翻译中",
            ChapterStatus::Done => "已完成",
            ChapterStatus::Error => "出错",
        }
    }
}

/// 单个章节的状态信息
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChapterStatusInfo {
    pub status: ChapterStatus,
    /// 0-100
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChapterStatusInfo {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn translating(progress: u8) -> Self {
        Self {
            status: ChapterStatus::Translating,
            progress,
            error: None,
        }
    }

    pub fn done() -> Self {
        Self {
            status: ChapterStatus::Done,
            progress: 100,
            error: None,
        }
    }

    pub fn failed(progress: u8, error: impl Into<String>) -> Self {
        Self {
            status: ChapterStatus::Error,
            progress,
            error: Some(error.into()),
        }
    }
}
