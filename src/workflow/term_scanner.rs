//! 流式译文切分
//!
//! 模型先输出译文，再输出可选的分隔符和新术语 JSON：
//!
//! ```text
//! 译文……
//! ---JSON_TERMS---
//! [{"original": "...", ...}]
//! ```
//!
//! 分隔符可能被拆散在任意多个片段中。扫描器只保留一段"可能是分隔符前缀"的尾巴
//! （最多 `TERMS_SEPARATOR.len() - 1` 字节），其余内容立即归入译文，不会每次重扫整段文本。

/// 译文与术语 JSON 之间的分隔符
pub const TERMS_SEPARATOR: &str = "---JSON_TERMS---";

#[derive(Debug, Default)]
pub struct TermScanner {
    text: String,
    json: String,
    /// 暂存的尾巴，可能是分隔符的开头
    pending: String,
    split_done: bool,
}

/// 一条流结束后的切分结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutput {
    pub text: String,
    /// 只有出现过分隔符时才为 Some
    pub json: Option<String>,
}

impl TermScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// 喂入一个片段
    pub fn push(&mut self, fragment: &str) {
        if self.split_done {
            self.json.push_str(fragment);
            return;
        }

        self.pending.push_str(fragment);

        if let Some(pos) = self.pending.find(TERMS_SEPARATOR) {
            self.text.push_str(&self.pending[..pos]);
            self.json.push_str(&self.pending[pos + TERMS_SEPARATOR.len()..]);
            self.pending.clear();
            self.split_done = true;
            return;
        }

        let keep = partial_separator_suffix(&self.pending);
        let cut = self.pending.len() - keep;
        self.text.push_str(&self.pending[..cut]);
        self.pending.drain(..cut);
    }

    /// 目前已确定属于译文的部分
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn found_separator(&self) -> bool {
        self.split_done
    }

    /// 流结束：暂存的尾巴不可能再组成分隔符，归还给译文
    pub fn finish(mut self) -> ScanOutput {
        if !self.split_done {
            self.text.push_str(&self.pending);
        }
        ScanOutput {
            text: self.text,
            json: self.split_done.then_some(self.json),
        }
    }
}

/// `buf` 末尾最长的、同时又是分隔符真前缀的字节数
fn partial_separator_suffix(buf: &str) -> usize {
    let max = (TERMS_SEPARATOR.len() - 1).min(buf.len());
    (1..=max)
        .rev()
        .find(|&k| {
            let start = buf.len() - k;
            buf.is_char_boundary(start) && TERMS_SEPARATOR.starts_with(&buf[start..])
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(fragments: &[&str]) -> ScanOutput {
        let mut scanner = TermScanner::new();
        for f in fragments {
            scanner.push(f);
        }
        scanner.finish()
    }

    #[test]
    fn test_no_separator() {
        let out = scan(&["Lâm Thanh ", "mỉm cười.\n", "Hết"]);
        assert_eq!(out.text, "Lâm Thanh mỉm cười.\nHết");
        assert_eq!(out.json, None);
    }

    #[test]
    fn test_separator_inside_one_fragment() {
        let out = scan(&["Dòng một\n---JSON_TERMS---[{\"a\":1}]"]);
        assert_eq!(out.text, "Dòng một\n");
        assert_eq!(out.json.as_deref(), Some("[{\"a\":1}]"));
    }

    #[test]
    fn test_separator_split_across_two_fragments() {
        let out = scan(&["Bản dịch\n---JSON_", "TERMS---[]"]);
        assert_eq!(out.text, "Bản dịch\n");
        assert_eq!(out.json.as_deref(), Some("[]"));
    }

    #[test]
    fn test_separator_split_across_many_fragments() {
        let out = scan(&["Xong", "-", "--JS", "ON", "_TER", "MS-", "-", "-", "[1", "]"]);
        assert_eq!(out.text, "Xong");
        assert_eq!(out.json.as_deref(), Some("[1]"));
    }

    #[test]
    fn test_false_prefix_is_released_as_text() {
        let mut scanner = TermScanner::new();
        scanner.push("a---JSON");
        assert_eq!(scanner.text(), "a");
        scanner.push("ified");
        assert_eq!(scanner.text(), "a---JSONified");
        assert!(!scanner.found_separator());
    }

    #[test]
    fn test_held_back_prefix_returned_on_finish() {
        let out = scan(&["kết thúc ---JSON_TE"]);
        assert_eq!(out.text, "kết thúc ---JSON_TE");
        assert_eq!(out.json, None);
    }

    #[test]
    fn test_multibyte_text_next_to_prefix() {
        let out = scan(&["林青-", "-笑", "---JSON_TERMS---"]);
        assert_eq!(out.text, "林青--笑");
        assert_eq!(out.json.as_deref(), Some(""));
    }

    #[test]
    fn test_second_separator_goes_to_json() {
        let out = scan(&["t---JSON_TERMS---x---JSON_TERMS---y"]);
        assert_eq!(out.text, "t");
        assert_eq!(out.json.as_deref(), Some("x---JSON_TERMS---y"));
    }
}
