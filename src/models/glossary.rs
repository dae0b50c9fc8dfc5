//! 术语表模型
//!
//! 术语表由用户维护，并由模型在翻译过程中发现的新术语补充。
//! 合并时按 `original` 去除首尾空白、忽略大小写去重。

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// 术语类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TermCategory {
    /// 专有名词（人名、称谓等）
    #[default]
    #[serde(rename = "Danh từ riêng", alias = "PROPER_NOUN")]
    ProperNoun,
    /// 地名
    #[serde(rename = "Tên địa danh", alias = "PLACE_NAME")]
    PlaceName,
}

impl TermCategory {
    /// 界面上显示的名称
    pub fn label(self) -> &'static str {
        match self {
            TermCategory::ProperNoun => "Danh từ riêng",
            TermCategory::PlaceName => "Tên địa danh",
        }
    }

    /// 模型输出中使用的代码
    pub fn code(self) -> &'static str {
        match self {
            TermCategory::ProperNoun => "PROPER_NOUN",
            TermCategory::PlaceName => "PLACE_NAME",
        }
    }

    /// 识别代码或显示名称，不认识时返回 None
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        [TermCategory::ProperNoun, TermCategory::PlaceName]
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(raw) || c.label() == raw)
    }
}

/// 模型给出的类别不可靠：缺失、未知或不是字符串时都按专有名词处理
fn lenient_category<'de, D>(deserializer: D) -> Result<TermCategory, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(TermCategory::parse)
        .unwrap_or_default())
}

/// 术语表条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryTerm {
    pub id: String,
    #[serde(default)]
    pub category: TermCategory,
    pub original: String,
    pub translation: String,
    #[serde(default)]
    pub notes: String,
}

impl GlossaryTerm {
    pub fn new(
        category: TermCategory,
        original: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            category,
            original: original.into(),
            translation: translation.into(),
            notes: String::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// 去重使用的键
    pub fn dedup_key(&self) -> String {
        normalize_original(&self.original)
    }
}

/// 模型在译文末尾 JSON 中报告的新术语
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedTerm {
    pub original: String,
    pub translation: String,
    /// 术语所在的原文句子
    #[serde(default)]
    pub context: String,
    #[serde(default, deserialize_with = "lenient_category")]
    pub category: TermCategory,
}

impl DetectedTerm {
    /// 转换为术语表条目，原文句子记入备注
    pub fn to_glossary_term(&self) -> GlossaryTerm {
        GlossaryTerm::new(self.category, self.original.trim(), self.translation.trim())
            .with_notes(self.context.trim())
    }
}

/// 术语合并结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeReport {
    pub added: usize,
    pub skipped: usize,
}

impl MergeReport {
    /// 给用户的提示；没有任何变化时返回 None
    pub fn message(&self) -> Option<String> {
        let mut lines = Vec::new();
        if self.added > 0 {
            lines.push(format!("Đã lưu {} thuật ngữ mới vào danh sách.", self.added));
        }
        if self.skipped > 0 {
            lines.push(format!(
                "{} thuật ngữ đã tồn tại và được bỏ qua.",
                self.skipped
            ));
        }
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

pub fn normalize_original(original: &str) -> String {
    original.trim().to_lowercase()
}

/// 将新术语合并进术语表
///
/// 已存在（或在本批中已出现过）的术语会被跳过，保持原有顺序，新术语追加在末尾。
pub fn merge_terms(glossary: &mut Vec<GlossaryTerm>, new_terms: Vec<GlossaryTerm>) -> MergeReport {
    let mut existing: HashSet<String> = glossary.iter().map(GlossaryTerm::dedup_key).collect();
    let mut report = MergeReport::default();

    for term in new_terms {
        if existing.insert(term.dedup_key()) {
            glossary.push(term);
            report.added += 1;
        } else {
            report.skipped += 1;
        }
    }

    report
}
