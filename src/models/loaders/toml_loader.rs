use crate::config::UiLabels;
use crate::error::{AppResult, ConfigError, FileError};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// 配置档
///
/// 一般用来保存某种界面语言的按钮文字，例如：
///
/// ```toml
/// max_pages = 6
/// pattern = "Standup|Sync"
///
/// [labels]
/// next_page = "Nächster Monat"
/// delete_event = "Termin löschen"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    pub max_pages: Option<usize>,
    pub pattern: Option<String>,
    pub flags: Option<String>,
    pub target_url: Option<String>,
    pub labels: Option<UiLabels>,
}

/// 从 TOML 文件加载配置档
pub async fn load_profile(path: impl AsRef<Path>) -> AppResult<Profile> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;

    let profile = parse_profile(&content, &path.display().to_string())?;
    tracing::info!("已加载配置档: {}", path.display());
    Ok(profile)
}

fn parse_profile(content: &str, path: &str) -> Result<Profile, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ProfileParseFailed {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
