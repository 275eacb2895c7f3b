// src/config/external.rs

use crate::{
    config::{AgentConfig, Selectors, SiteConfig, TimingConfig},
    constants,
    error::{AppError, AppResult},
};
use anyhow::{Context, anyhow};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// `~/.courses-dl/config.json` 的内容。缺失的字段使用内置默认值。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExternalConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub selectors: Selectors,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

pub(super) fn get_config_path() -> AppResult<PathBuf> {
    let path = dirs::home_dir()
        .ok_or_else(|| AppError::Other(anyhow!("无法获取用户主目录")))?
        .join(constants::CONFIG_DIR_NAME)
        .join(constants::CONFIG_FILE_NAME);
    Ok(path)
}

pub(crate) fn load_or_create_external_config() -> AppResult<ExternalConfig> {
    load_or_create_at(&get_config_path()?)
}

fn load_or_create_at(config_path: &Path) -> AppResult<ExternalConfig> {
    if config_path.is_file() {
        debug!("读取配置文件: {}", config_path.display());
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("读取配置文件 '{}' 失败", config_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("解析配置文件 '{}' 失败", config_path.display()))
            .map_err(AppError::from)
    } else {
        info!("配置文件 {:?} 不存在，将创建默认配置。", config_path);
        let config = ExternalConfig::default();

        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir)?;
        }

        let json_content = serde_json::to_string_pretty(&config)?;
        fs::write(config_path, json_content)?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        // 配置目录尚不存在
        let path = dir.path().join(constants::CONFIG_DIR_NAME).join(constants::CONFIG_FILE_NAME);

        let config = load_or_create_at(&path).unwrap();
        assert!(path.is_file(), "默认配置文件应被写入磁盘");
        assert_eq!(config.site, SiteConfig::default());

        // 第二次读取应得到相同内容
        let reloaded = load_or_create_at(&path).unwrap();
        assert_eq!(reloaded.selectors, config.selectors);
    }

    #[test]
    fn test_partial_config_is_merged_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(constants::CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"{ "timing": { "lesson_load_ms": 100 }, "agent": { "connections": 4 } }"#,
        )
        .unwrap();

        let config = load_or_create_at(&path).unwrap();
        assert_eq!(config.timing.lesson_load_ms, Some(100));
        assert_eq!(config.agent.connections, 4);
        assert_eq!(config.agent.program, constants::agent::PROGRAM);
        assert_eq!(config.site.base_domain, constants::site::BASE_DOMAIN);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(constants::CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        assert!(load_or_create_at(&path).is_err());
    }
}
