// src/constants.rs

pub const UI_WIDTH: usize = 88;
pub const CONFIG_DIR_NAME: &str = concat!(".", clap::crate_name!());
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_SAVE_DIR: &str = "Courses";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_COOKIE_FILE: &str = "cookies.json";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
pub const LOG_FILE_TIME_FORMAT: &str = "%d-%m-%Y_%H-%M-%S";
pub const LOG_TIME_FORMAT: &str = "%d-%m-%Y %H:%M:%S";
pub const RESOURCES_FILE_SUFFIX: &str = "Resources.txt";
pub const AGENT_STDOUT_TAIL_LINES: usize = 20;
pub const QUERY_POLL_INTERVAL_MS: u64 = 500;

pub mod site {
    pub const BASE_DOMAIN: &str = "https://cursos.devtalles.com";
    pub const LOGIN_URL: &str = "https://cursos.devtalles.com/users/sign_in";
    pub const COURSE_URL_TEMPLATE: &str = "https://cursos.devtalles.com/courses/take/{slug}/";
}

pub mod timeouts {
    pub const WAIT_SECS: u64 = 20;
    pub const CONTENT_WAIT_SECS: u64 = 10;
}

/// 页面操作后的固定等待 (毫秒)，可在配置文件的 `timing` 中覆盖
pub mod delays {
    pub const COURSE_SETTLE_MS: u64 = 10_000;
    pub const LOGIN_SETTLE_MS: u64 = 5_000;
    pub const SECTION_EXPAND_MS: u64 = 1_000;
    pub const LESSON_LOAD_MS: u64 = 4_000;
    pub const HEADER_CLICK_PAUSE_MS: u64 = 500;
    pub const LESSON_CLICK_PAUSE_MS: u64 = 200;
    pub const COLLAPSE_CLICK_PAUSE_MS: u64 = 200;
}

pub mod selectors {
    pub const LOGIN_MARKER: &str = "[id='user[email]']";
    pub const COURSE_TITLE: &str = "h1.course-progress__title";
    pub const SECTION_ITEM: &str = "div.course-player__chapters-item";
    pub const SECTION_HEADER: &str = ".course-player__chapter-item__header";
    pub const SECTION_TITLE: &str = "h2";
    pub const LESSON_ITEM: &str = "li[data-qa='content-item']";
    pub const LESSON_LINK: &str = "a.course-player__content-item__link";
    pub const LESSON_TITLE: &str = ".content-item__title";
    pub const VIDEO_IFRAME: &str = "iframe[title='Video Lesson']";
    pub const STREAM_SOURCE: &str = "source[type='application/x-mpegURL']";
    pub const CONTENT_CONTAINER: &str = ".course-player__content-inner._content-inner_n1vbpj";
    pub const VIDEO_PROXY: &str = "._videoproxy__wrapper_3iu414";
    pub const RESOURCES_CONTAINER: &str = "._content_1yintd";
    pub const LINK: &str = "a";
}

pub mod agent {
    pub const PROGRAM: &str = "yt-dlp";
    pub const DOWNLOADER: &str = "aria2c";
    pub const CONNECTIONS: u32 = 16;
    pub const MIN_SPLIT_SIZE: &str = "1M";
    pub const OUTPUT_EXT_PLACEHOLDER: &str = "%(ext)s";
}

pub const HTML_TEMPLATE_STYLE: &str = r#"        body {
            font-family: Arial, sans-serif;
            line-height: 1.6;
            margin: 20px;
        }
        .content-container {
            max-width: 900px;
            margin: auto;
        }
        h1 {
            color: #333;
            border-bottom: 2px solid #eee;
            padding-bottom: 10px;
        }"#;

pub const HELP_COOKIE_GUIDE: &str = r#"
1. 在浏览器中登录课程平台。
2. 使用 Cookie 导出扩展 (例如 "Cookie-Editor") 将当前站点的 Cookie 导出为 JSON。
3. 将导出的 JSON 数组保存为工作目录下的 cookies.json (或通过 --cookies 指定路径)。
4. 启动 chromedriver (默认监听 http://localhost:9515) 后再运行本程序。"#;
