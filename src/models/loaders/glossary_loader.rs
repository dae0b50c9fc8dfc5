use crate::models::glossary::GlossaryTerm;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// 术语表文件结构
///
/// ```toml
/// [[terms]]
/// id = "..."
/// category = "Danh từ riêng"
/// original = "林青"
/// translation = "Lâm Thanh"
/// notes = ""
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
struct GlossaryFile {
    #[serde(default)]
    terms: Vec<GlossaryTerm>,
}

/// 从 TOML 文件加载术语表，文件不存在时返回空表
pub async fn load_glossary(path: &Path) -> Result<Vec<GlossaryTerm>> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        tracing::info!("术语表文件不存在，使用空术语表: {}", path.display());
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取术语表文件: {}", path.display()))?;

    let file: GlossaryFile = toml::from_str(&content)
        .with_context(|| format!("无法解析术语表文件: {}", path.display()))?;

    tracing::info!("成功加载 {} 条术语", file.terms.len());
    Ok(file.terms)
}

/// 将术语表写回 TOML 文件
pub async fn save_glossary(path: &Path, terms: &[GlossaryTerm]) -> Result<()> {
    let file = GlossaryFile {
        terms: terms.to_vec(),
    };
    let content = toml::to_string_pretty(&file).context("无法序列化术语表")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("无法创建目录: {}", parent.display()))?;
    }

    fs::write(path, content)
        .await
        .with_context(|| format!("无法写入术语表文件: {}", path.display()))?;

    tracing::debug!("术语表已保存: {} 条 -> {}", terms.len(), path.display());
    Ok(())
}
