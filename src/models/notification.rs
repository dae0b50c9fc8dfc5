use serde::{Deserialize, Serialize};

use super::glossary::DetectedTerm;

/// 通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Error,
    NewTerms,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotificationDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<Vec<DetectedTerm>>,
}

/// 通知中心的一条记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub message: String,
    /// 毫秒时间戳
    pub timestamp: i64,
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_chapter_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<NotificationDetails>,
}

impl Notification {
    /// 创建一条未读通知，自动分配 id 与时间戳
    pub fn new(kind: NotificationType, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            message: message.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            read: false,
            related_chapter_title: None,
            details: None,
        }
    }

    /// 章节翻译失败
    pub fn chapter_error(chapter_title: &str, error: impl Into<String>) -> Self {
        let mut n = Self::new(
            NotificationType::Error,
            format!("Lỗi dịch chương \"{}\".", chapter_title),
        );
        n.related_chapter_title = Some(chapter_title.to_string());
        n.details = Some(NotificationDetails {
            error: Some(error.into()),
            terms: None,
        });
        n
    }

    /// 章节中发现了新术语
    pub fn new_terms(chapter_title: &str, terms: Vec<DetectedTerm>) -> Self {
        let mut n = Self::new(
            NotificationType::NewTerms,
            format!(
                "Phát hiện {} thuật ngữ mới trong chương \"{}\".",
                terms.len(),
                chapter_title
            ),
        );
        n.related_chapter_title = Some(chapter_title.to_string());
        n.details = Some(NotificationDetails {
            error: None,
            terms: Some(terms),
        });
        n
    }

    pub fn terms(&self) -> &[DetectedTerm] {
        self.details
            .as_ref()
            .and_then(|d| d.terms.as_deref())
            .unwrap_or(&[])
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.details.as_ref().and_then(|d| d.error.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::glossary::TermCategory;

    #[test]
    fn test_new_terms_notification() {
        let terms = vec![DetectedTerm {
            original: "林青".to_string(),
            translation: "Lâm Thanh".to_string(),
            context: String::new(),
            category: TermCategory::ProperNoun,
        }];
        let n = Notification::new_terms("第一章", terms);

        assert_eq!(n.kind, NotificationType::NewTerms);
        assert!(!n.read);
        assert_eq!(n.related_chapter_title.as_deref(), Some("第一章"));
        assert_eq!(n.terms().len(), 1);
        assert!(n.message.contains("1 thuật ngữ mới"));
    }

    #[test]
    fn test_chapter_error_serializes_type_field() {
        let n = Notification::chapter_error("第二章", "boom");
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(n.error_detail(), Some("boom"));
    }
}
