/// 重译原因
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RetranslateReason {
    /// 只是用新的术语表重译，不附加说明
    #[default]
    UpdateGlossary,
    /// 用户反馈上次译文不准确
    Inaccurate,
    /// 用户自己填写的说明
    Other(String),
}

const INACCURATE_INSTRUCTION: &str = "Người dùng đã báo cáo bản dịch trước đó không chính xác. \
Hãy đặc biệt chú ý đến việc dịch đúng từng câu, giữ nguyên ý nghĩa và bối cảnh. \
Tuyệt đối không thêm vào những nội dung không có trong văn bản gốc.";

impl RetranslateReason {
    /// 从界面上的原因代码解析，未知代码按"更新术语表"处理
    pub fn from_code(code: &str, custom_text: &str) -> Self {
        match code {
            "inaccurate" => RetranslateReason::Inaccurate,
            "other" => RetranslateReason::Other(custom_text.to_string()),
            _ => RetranslateReason::UpdateGlossary,
        }
    }

    /// 附加到请求里的说明
    pub fn instruction(&self) -> Option<String> {
        match self {
            RetranslateReason::UpdateGlossary => None,
            RetranslateReason::Inaccurate => Some(INACCURATE_INSTRUCTION.to_string()),
            RetranslateReason::Other(text) => {
                Some(text.trim().to_string()).filter(|t| !t.is_empty())
            }
        }
    }
}
