// src/config.rs

pub mod external;

use self::external::load_or_create_external_config;
use crate::{cli::Cli, constants, error::AppResult};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// 站点相关的地址配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SiteConfig {
    pub base_domain: String,
    pub login_url: String,
    pub course_url_template: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_domain: constants::site::BASE_DOMAIN.into(),
            login_url: constants::site::LOGIN_URL.into(),
            course_url_template: constants::site::COURSE_URL_TEMPLATE.into(),
        }
    }
}

/// 页面结构的 CSS 选择器。站点改版时只需修改配置文件。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Selectors {
    pub login_marker: String,
    pub course_title: String,
    pub section_item: String,
    pub section_header: String,
    pub section_title: String,
    pub lesson_item: String,
    pub lesson_link: String,
    pub lesson_title: String,
    pub video_iframe: String,
    pub stream_source: String,
    pub content_container: String,
    pub video_proxy: String,
    pub resources_container: String,
    pub link: String,
}

impl Default for Selectors {
    fn default() -> Self {
        use constants::selectors as s;
        Self {
            login_marker: s::LOGIN_MARKER.into(),
            course_title: s::COURSE_TITLE.into(),
            section_item: s::SECTION_ITEM.into(),
            section_header: s::SECTION_HEADER.into(),
            section_title: s::SECTION_TITLE.into(),
            lesson_item: s::LESSON_ITEM.into(),
            lesson_link: s::LESSON_LINK.into(),
            lesson_title: s::LESSON_TITLE.into(),
            video_iframe: s::VIDEO_IFRAME.into(),
            stream_source: s::STREAM_SOURCE.into(),
            content_container: s::CONTENT_CONTAINER.into(),
            video_proxy: s::VIDEO_PROXY.into(),
            resources_container: s::RESOURCES_CONTAINER.into(),
            link: s::LINK.into(),
        }
    }
}

/// 配置文件中的等待时间 (`*_secs` 为秒，`*_ms` 为毫秒)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimingConfig {
    pub wait_timeout_secs: Option<u64>,
    pub content_timeout_secs: Option<u64>,
    pub course_settle_ms: Option<u64>,
    pub login_settle_ms: Option<u64>,
    pub section_expand_ms: Option<u64>,
    pub lesson_load_ms: Option<u64>,
    pub header_click_pause_ms: Option<u64>,
    pub lesson_click_pause_ms: Option<u64>,
    pub collapse_click_pause_ms: Option<u64>,
}

/// SPA 渲染所需的固定等待 (settle delay)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleDelays {
    pub course: Duration,
    pub login: Duration,
    pub section_expand: Duration,
    pub lesson_load: Duration,
    pub header_click: Duration,
    pub lesson_click: Duration,
    pub collapse_click: Duration,
}

impl SettleDelays {
    fn from_config(timing: &TimingConfig) -> Self {
        use constants::delays::*;
        let ms = |v: Option<u64>, default: u64| Duration::from_millis(v.unwrap_or(default));
        Self {
            course: ms(timing.course_settle_ms, COURSE_SETTLE_MS),
            login: ms(timing.login_settle_ms, LOGIN_SETTLE_MS),
            section_expand: ms(timing.section_expand_ms, SECTION_EXPAND_MS),
            lesson_load: ms(timing.lesson_load_ms, LESSON_LOAD_MS),
            header_click: ms(timing.header_click_pause_ms, HEADER_CLICK_PAUSE_MS),
            lesson_click: ms(timing.lesson_click_pause_ms, LESSON_CLICK_PAUSE_MS),
            collapse_click: ms(timing.collapse_click_pause_ms, COLLAPSE_CLICK_PAUSE_MS),
        }
    }

    pub fn none() -> Self {
        Self {
            course: Duration::ZERO,
            login: Duration::ZERO,
            section_expand: Duration::ZERO,
            lesson_load: Duration::ZERO,
            header_click: Duration::ZERO,
            lesson_click: Duration::ZERO,
            collapse_click: Duration::ZERO,
        }
    }
}

/// 外部下载代理 (yt-dlp + aria2c) 的调用参数
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AgentConfig {
    pub program: String,
    pub downloader: String,
    pub connections: u32,
    pub min_split_size: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            program: constants::agent::PROGRAM.into(),
            downloader: constants::agent::DOWNLOADER.into(),
            connections: constants::agent::CONNECTIONS,
            min_split_size: constants::agent::MIN_SPLIT_SIZE.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub selectors: Selectors,
    pub agent: AgentConfig,
    pub wait_timeout: Duration,
    pub content_timeout: Duration,
    pub delays: SettleDelays,
    pub output_dir: PathBuf,
    pub cookie_file: PathBuf,
    pub webdriver_url: String,
    pub headless: bool,
}

impl AppConfig {
    pub fn new(args: &Cli) -> AppResult<Self> {
        let external_config = load_or_create_external_config()?;
        let timing = &external_config.timing;

        let wait_timeout = Duration::from_secs(
            args.timeout
                .or(timing.wait_timeout_secs)
                .unwrap_or(constants::timeouts::WAIT_SECS),
        );
        // 内容容器的等待不应超过全局等待时间
        let content_timeout = Duration::from_secs(
            timing
                .content_timeout_secs
                .unwrap_or(constants::timeouts::CONTENT_WAIT_SECS),
        )
        .min(wait_timeout);

        Ok(Self {
            site: external_config.site,
            selectors: external_config.selectors,
            agent: external_config.agent,
            wait_timeout,
            content_timeout,
            delays: SettleDelays::from_config(timing),
            output_dir: args.output.clone(),
            cookie_file: args.cookies.clone(),
            webdriver_url: args.webdriver.clone(),
            headless: args.headless,
        })
    }

    /// 下载代理请求视频时携带的 Referer
    pub fn referer(&self) -> String {
        format!("{}/", self.site.base_domain.trim_end_matches('/'))
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            selectors: Selectors::default(),
            agent: AgentConfig::default(),
            wait_timeout: Duration::from_secs(1),
            content_timeout: Duration::from_secs(1),
            delays: SettleDelays::none(),
            output_dir: PathBuf::from(constants::DEFAULT_SAVE_DIR),
            cookie_file: PathBuf::from(constants::DEFAULT_COOKIE_FILE),
            webdriver_url: constants::DEFAULT_WEBDRIVER_URL.to_string(),
            headless: true,
        }
    }
}
