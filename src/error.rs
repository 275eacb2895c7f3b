// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("无效的课程链接或未找到课程标识 (slug): {0}")]
    InvalidCourseUrl(String),
    #[error("未找到 Cookie 文件 '{}'，请先登录并导出 Cookie", .0.display())]
    CookieFileMissing(PathBuf),
    #[error("会话认证失败: {0}")]
    SessionRejected(String),
    #[error("未找到课程标题，请检查链接与 Cookie 会话")]
    CourseTitleMissing,
    #[error("未找到任何章节，网站结构可能已变化或会话已过期")]
    NoSections,
    #[error("页面元素不存在: {0}")]
    ElementNotFound(String),
    #[error("等待超时: {0}")]
    Timeout(String),
    #[error("无效的视频流地址: '{0}'")]
    InvalidStreamUrl(String),
    #[error("下载代理执行失败 (退出码: {code:?}): {title}")]
    AgentFailed { title: String, code: Option<i32> },
    #[error("浏览器驱动错误: {0}")]
    WebDriver(#[from] thirtyfour::error::WebDriverError),
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),
    #[error("用户中断")]
    UserInterrupt,
    #[error("未知错误: {0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// 会终止整个运行的错误。其余错误都在课时或章节边界被捕获。
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::InvalidCourseUrl(_)
                | AppError::CookieFileMissing(_)
                | AppError::SessionRejected(_)
                | AppError::CourseTitleMissing
                | AppError::NoSections
                | AppError::UserInterrupt
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
