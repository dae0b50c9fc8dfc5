/// 破坏性或批量操作前的确认
///
/// 命令行里由终端提问实现，测试里直接给出固定答案。
pub trait ConfirmGate: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> ConfirmGate for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// 总是同意
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl ConfirmGate for AlwaysConfirm {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}
