//! 提示词构建

use crate::models::GlossaryTerm;
use crate::services::backend::TranslationRequest;
use crate::workflow::term_scanner::TERMS_SEPARATOR;

pub const TRANSLATION_SYSTEM_PROMPT: &str = "Bạn là một dịch giả tiểu thuyết chuyên nghiệp, dịch từ tiếng Trung sang tiếng Việt. \
Hãy dịch trung thành, tự nhiên, giữ nguyên cách chia đoạn của bản gốc (mỗi đoạn một dòng) và không thêm lời bình luận.";

pub const SPLIT_SYSTEM_PROMPT: &str = "Bạn là công cụ tách chương. Chỉ trả về JSON hợp lệ, không kèm giải thích.";

/// 构建分章请求的用户消息
pub fn build_split_prompt(document: &str) -> String {
    format!(
        "Hãy tách văn bản sau thành các chương theo đúng thứ tự xuất hiện.\n\
         Trả về một mảng JSON, mỗi phần tử có dạng {{\"title\": string, \"content\": string}}.\n\
         `title` là tiêu đề chương (không trùng nhau), `content` là toàn bộ nội dung gốc của chương, không được tóm tắt hay chỉnh sửa.\n\
         Nếu không tìm thấy chương nào, trả về [].\n\n\
         VĂN BẢN:\n{}",
        document
    )
}

/// 构建翻译请求的用户消息
pub fn build_translation_prompt(request: &TranslationRequest<'_>) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!("Bối cảnh truyện: {}\n", request.story_context));
    prompt.push_str(&format!("Thế giới quan: {}\n\n", request.world_context));

    if !request.glossary.is_empty() {
        prompt.push_str("BẢNG THUẬT NGỮ (bắt buộc dùng đúng bản dịch sau):\n");
        prompt.push_str(&format_glossary(request.glossary));
        prompt.push('\n');
    }

    if let Some(instruction) = request.instruction.map(str::trim).filter(|s| !s.is_empty()) {
        prompt.push_str(&format!("YÊU CẦU DỊCH LẠI: {}\n\n", instruction));
    }

    prompt.push_str(&format!(
        "Sau khi dịch xong, nếu phát hiện danh từ riêng hoặc địa danh mới chưa có trong bảng thuật ngữ, \
         hãy xuống dòng, viết chính xác chuỗi {} rồi liệt kê chúng dưới dạng mảng JSON: \
         [{{\"original\": string, \"translation\": string, \"context\": string, \"category\": \"PROPER_NOUN\" | \"PLACE_NAME\"}}]. \
         Nếu không có thuật ngữ mới thì không viết chuỗi đó.\n\n",
        TERMS_SEPARATOR
    ));

    prompt.push_str("VĂN BẢN CẦN DỊCH:\n");
    prompt.push_str(request.content);
    prompt
}

fn format_glossary(glossary: &[GlossaryTerm]) -> String {
    glossary
        .iter()
        .map(|term| {
            if term.notes.trim().is_empty() {
                format!("- [{}] {} => {}\n", term.category.label(), term.original, term.translation)
            } else {
                format!(
                    "- [{}] {} => {} ({})\n",
                    term.category.label(),
                    term.original,
                    term.translation,
                    term.notes
                )
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TermCategory;

    #[test]
    fn test_translation_prompt_includes_glossary_and_instruction() {
        let glossary = vec![GlossaryTerm::new(TermCategory::ProperNoun, "林青", "Lâm Thanh")];
        let request = TranslationRequest {
            content: "林青笑了。",
            story_context: "Tiên hiệp",
            world_context: "Tu chân",
            glossary: &glossary,
            instruction: Some("Dịch sát nghĩa"),
        };

        let prompt = build_translation_prompt(&request);
        assert!(prompt.contains("林青 => Lâm Thanh"));
        assert!(prompt.contains("YÊU CẦU DỊCH LẠI: Dịch sát nghĩa"));
        assert!(prompt.contains(TERMS_SEPARATOR));
        assert!(prompt.ends_with("林青笑了。"));
    }

    #[test]
    fn test_blank_instruction_is_omitted() {
        let request = TranslationRequest {
            content: "x",
            story_context: "a",
            world_context: "b",
            glossary: &[],
            instruction: Some("   "),
        };
        let prompt = build_translation_prompt(&request);
        assert!(!prompt.contains("YÊU CẦU DỊCH LẠI"));
        assert!(!prompt.contains("BẢNG THUẬT NGỮ"));
    }
}
