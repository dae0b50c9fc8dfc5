//! 凭据存储 - 基础设施层
//!
//! 持久化唯一的一条 API Key，只暴露读 / 写 / 删除能力。
//! 文件中是否存在该键决定了程序是进入正常流程还是先要求用户输入 Key。

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 凭据在文件中的固定键名
pub const CREDENTIAL_KEY: &str = "llm_api_key";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Vui lòng nhập API Key.")]
    Empty,

    #[error("无法读取凭据文件 {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("无法写入凭据文件 {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("凭据文件格式错误 {path}: {message}")]
    Malformed { path: String, message: String },
}

/// 凭据存储
///
/// 职责：
/// - 持有凭据文件路径
/// - 不认识章节 / 翻译流程
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取已保存的 Key，没有保存过时返回 None
    pub fn load(&self) -> Result<Option<String>, CredentialError> {
        let mut entries = self.read_entries()?;
        Ok(entries
            .remove(CREDENTIAL_KEY)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    pub fn is_present(&self) -> bool {
        matches!(self.load(), Ok(Some(_)))
    }

    /// 保存 Key（去除首尾空白），空字符串视为无效输入
    pub fn save(&self, key: &str) -> Result<(), CredentialError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(CredentialError::Empty);
        }

        let mut entries = self.read_entries()?;
        entries.insert(CREDENTIAL_KEY.to_string(), key.to_string());
        self.write_entries(&entries)?;
        debug!("凭据已保存: {}", self.path.display());
        Ok(())
    }

    /// 删除已保存的 Key，文件不存在时什么也不做
    pub fn clear(&self) -> Result<(), CredentialError> {
        let mut entries = self.read_entries()?;
        if entries.remove(CREDENTIAL_KEY).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)?;
        debug!("凭据已清除: {}", self.path.display());
        Ok(())
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(CredentialError::Read {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };

        toml::from_str(&content).map_err(|e| CredentialError::Malformed {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        let write_err = |source| CredentialError::Write {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let content = toml::to_string(entries).map_err(|e| CredentialError::Malformed {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        fs::write(&self.path, content).map_err(write_err)
    }
}
