// src/driver/mod.rs

pub mod session;
mod webdriver;
#[cfg(any(test, feature = "testing"))]
pub mod scripted;

pub use self::webdriver::WebDriverPage;

use crate::{driver::session::SessionCookie, error::*};
use async_trait::async_trait;
use std::time::Duration;

/// 进入 iframe 后得到的作用域令牌。
///
/// 令牌只能通过 [`PageDriver::leave_frame`] 归还，持有它即表示当前查询作用域位于该 iframe 内。
#[derive(Debug)]
#[must_use = "进入 iframe 后必须调用 leave_frame 恢复到顶层文档"]
pub struct FrameScope {
    selector: String,
}

impl FrameScope {
    pub(crate) fn new(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }
}

/// 页面驱动能力。导航器通过它完成所有页面查询、等待与点击操作。
///
/// `wait_for` 返回 `Ok(None)` 表示等待超时；`probe` 不等待，只检查元素是否已存在。
#[async_trait]
pub trait PageDriver: Send + Sync {
    type Element: Clone + Send + Sync;

    async fn goto(&self, url: &str) -> AppResult<()>;
    async fn current_url(&self) -> AppResult<String>;
    async fn refresh(&self) -> AppResult<()>;
    async fn add_cookie(&self, cookie: &SessionCookie) -> AppResult<()>;

    async fn wait_for(&self, selector: &str, timeout: Duration) -> AppResult<Option<Self::Element>>;
    async fn probe(&self, within: &Self::Element, selector: &str) -> AppResult<Option<Self::Element>>;
    async fn find_all(&self, selector: &str) -> AppResult<Vec<Self::Element>>;
    /// 在父元素内查找，元素不存在时返回错误
    async fn find_in(&self, parent: &Self::Element, selector: &str) -> AppResult<Self::Element>;
    async fn find_all_in(&self, parent: &Self::Element, selector: &str) -> AppResult<Vec<Self::Element>>;

    async fn text(&self, element: &Self::Element) -> AppResult<String>;
    async fn text_content(&self, element: &Self::Element) -> AppResult<String>;
    async fn inner_html(&self, element: &Self::Element) -> AppResult<String>;
    async fn attr(&self, element: &Self::Element, name: &str) -> AppResult<Option<String>>;

    async fn scroll_into_view(&self, element: &Self::Element) -> AppResult<()>;
    /// 通过脚本触发点击，绕过遮罩层对原生点击的拦截
    async fn script_click(&self, element: &Self::Element) -> AppResult<()>;

    /// 等待 iframe 出现并切换进去。超时返回 `Ok(None)`，作用域不变。
    async fn enter_frame(&self, selector: &str, timeout: Duration) -> AppResult<Option<FrameScope>>;
    async fn leave_frame(&self, scope: FrameScope) -> AppResult<()>;
    /// 无条件回到顶层文档
    async fn reset_scope(&self) -> AppResult<()>;
}
