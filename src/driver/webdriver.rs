// src/driver/webdriver.rs

use super::{FrameScope, PageDriver, session::SessionCookie};
use crate::{config::AppConfig, constants, error::*};
use async_trait::async_trait;
use log::{debug, info};
use std::time::Duration;
use thirtyfour::{ChromiumLikeCapabilities, Cookie, prelude::*};

/// 基于 W3C WebDriver (chromedriver 等) 的页面驱动
pub struct WebDriverPage {
    driver: WebDriver,
}

impl WebDriverPage {
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        info!("正在连接 WebDriver 服务: {}", config.webdriver_url);
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--incognito")?;
        caps.add_arg("--disable-blink-features=AutomationControlled")?;
        caps.add_arg("--mute-audio")?;
        if config.headless {
            caps.set_headless()?;
            caps.add_arg("--window-size=1920,1080")?;
        }

        let driver = WebDriver::new(config.webdriver_url.as_str(), caps).await?;
        if !config.headless {
            driver.maximize_window().await?;
        }
        Ok(Self { driver })
    }

    pub async fn quit(self) -> AppResult<()> {
        info!("正在关闭浏览器会话。");
        self.driver.quit().await?;
        Ok(())
    }

    fn poll_interval() -> Duration {
        Duration::from_millis(constants::QUERY_POLL_INTERVAL_MS)
    }
}

#[async_trait]
impl PageDriver for WebDriverPage {
    type Element = WebElement;

    async fn goto(&self, url: &str) -> AppResult<()> {
        debug!("打开页面: {}", url);
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> AppResult<String> {
        Ok(self.driver.current_url().await?.to_string())
    }

    async fn refresh(&self) -> AppResult<()> {
        self.driver.refresh().await?;
        Ok(())
    }

    async fn add_cookie(&self, cookie: &SessionCookie) -> AppResult<()> {
        let cookie: Cookie = serde_json::from_value(cookie.to_webdriver_json())?;
        self.driver.add_cookie(cookie).await?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> AppResult<Option<WebElement>> {
        let element = self
            .driver
            .query(By::Css(selector))
            .wait(timeout, Self::poll_interval())
            .first_opt()
            .await?;
        if element.is_none() {
            debug!("等待元素 '{}' 超时 ({:?})", selector, timeout);
        }
        Ok(element)
    }

    async fn probe(&self, within: &WebElement, selector: &str) -> AppResult<Option<WebElement>> {
        // find_all 不会因为元素缺失而报错，缺失是常见情况
        Ok(within.find_all(By::Css(selector)).await?.into_iter().next())
    }

    async fn find_all(&self, selector: &str) -> AppResult<Vec<WebElement>> {
        Ok(self.driver.find_all(By::Css(selector)).await?)
    }

    async fn find_in(&self, parent: &WebElement, selector: &str) -> AppResult<WebElement> {
        Ok(parent.find(By::Css(selector)).await?)
    }

    async fn find_all_in(&self, parent: &WebElement, selector: &str) -> AppResult<Vec<WebElement>> {
        Ok(parent.find_all(By::Css(selector)).await?)
    }

    async fn text(&self, element: &WebElement) -> AppResult<String> {
        Ok(element.text().await?)
    }

    async fn text_content(&self, element: &WebElement) -> AppResult<String> {
        Ok(element.prop("textContent").await?.unwrap_or_default())
    }

    async fn inner_html(&self, element: &WebElement) -> AppResult<String> {
        Ok(element.inner_html().await?)
    }

    /// 优先读取 DOM 属性 (property)，`href`/`src` 会被解析为绝对地址；没有时回退到原始 attribute
    async fn attr(&self, element: &WebElement, name: &str) -> AppResult<Option<String>> {
        match element.prop(name).await? {
            Some(value) if !value.is_empty() => Ok(Some(value)),
            _ => Ok(element.attr(name).await?),
        }
    }

    async fn scroll_into_view(&self, element: &WebElement) -> AppResult<()> {
        self.driver
            .execute("arguments[0].scrollIntoView(true);", vec![element.to_json()?])
            .await?;
        Ok(())
    }

    async fn script_click(&self, element: &WebElement) -> AppResult<()> {
        self.driver
            .execute("arguments[0].click();", vec![element.to_json()?])
            .await?;
        Ok(())
    }

    async fn enter_frame(&self, selector: &str, timeout: Duration) -> AppResult<Option<FrameScope>> {
        let Some(frame) = self.wait_for(selector, timeout).await? else {
            return Ok(None);
        };
        frame.enter_frame().await?;
        debug!("已切换到 iframe: {}", selector);
        Ok(Some(FrameScope::new(selector)))
    }

    async fn leave_frame(&self, scope: FrameScope) -> AppResult<()> {
        debug!("离开 iframe: {}", scope.selector());
        self.reset_scope().await
    }

    async fn reset_scope(&self) -> AppResult<()> {
        self.driver.enter_default_frame().await?;
        Ok(())
    }
}
