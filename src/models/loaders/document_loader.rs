use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// 读取待翻译的文本文件
///
/// 只接受 UTF-8，开头的 BOM 会被去掉。
pub async fn load_document(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("无法读取文件: {}", path.display()))?;

    decode_document(bytes).with_context(|| format!("文件不是有效的 UTF-8 文本: {}", path.display()))
}

pub fn decode_document(bytes: Vec<u8>) -> Result<String> {
    let bytes = match bytes.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_vec(),
        None => bytes,
    };
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("第一章".as_bytes());
        assert_eq!(decode_document(bytes).unwrap(), "第一章");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        assert!(decode_document(vec![0xff, 0xfe, 0x00]).is_err());
    }
}
