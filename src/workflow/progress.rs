/// 单次翻译尝试的进度估算
///
/// 进度 = 译文行数 / 原文行数，流结束前最多 99，并且在一次尝试内只增不减。
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    original_lines: usize,
    current: u8,
}

/// 流结束前允许显示的最大进度
pub const MAX_STREAMING_PROGRESS: u8 = 99;

impl ProgressTracker {
    pub fn new(original_lines: usize) -> Self {
        Self {
            original_lines: original_lines.max(1),
            current: 0,
        }
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    /// 根据当前译文重新估算，返回新的进度
    pub fn update(&mut self, translated: &str) -> u8 {
        let translated_lines = translated.split('\n').count();
        let ratio = translated_lines as f64 / self.original_lines as f64 * 100.0;
        let estimate = ratio.round().min(MAX_STREAMING_PROGRESS as f64) as u8;
        self.current = self.current.max(estimate);
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_rounds_and_clamps() {
        let mut tracker = ProgressTracker::new(3);
        assert_eq!(tracker.update("một"), 33);
        assert_eq!(tracker.update("một\nhai"), 67);
        assert_eq!(tracker.update("một\nhai\nba"), 99);
        assert_eq!(tracker.update("một\nhai\nba\nbốn\nnăm"), 99);
    }

    #[test]
    fn test_progress_never_decreases() {
        let mut tracker = ProgressTracker::new(4);
        assert_eq!(tracker.update("a\nb\nc"), 75);
        assert_eq!(tracker.update("a"), 75);
    }

    #[test]
    fn test_zero_lines_treated_as_one() {
        let mut tracker = ProgressTracker::new(0);
        assert_eq!(tracker.update(""), 99);
    }
}
