// src/extractor/classifier.rs

use crate::{config::Selectors, driver::PageDriver, error::*, models::LessonKind};
use log::{debug, warn};
use std::time::Duration;

/// 根据已加载的课时页面判断内容类型。任何错误都降级为 `Unidentified`，不会向上传播。
pub struct ContentClassifier<'a> {
    selectors: &'a Selectors,
    timeout: Duration,
}

impl<'a> ContentClassifier<'a> {
    pub fn new(selectors: &'a Selectors, timeout: Duration) -> Self {
        Self { selectors, timeout }
    }

    pub async fn classify<D: PageDriver>(&self, driver: &D) -> LessonKind {
        match self.try_classify(driver).await {
            Ok(kind) => kind,
            Err(e) => {
                warn!("识别课时内容时出错，按无法识别处理: {}", e);
                LessonKind::Unidentified
            }
        }
    }

    async fn try_classify<D: PageDriver>(&self, driver: &D) -> AppResult<LessonKind> {
        let Some(container) = driver
            .wait_for(&self.selectors.content_container, self.timeout)
            .await?
        else {
            debug!("内容容器在 {:?} 内未出现", self.timeout);
            return Ok(LessonKind::Unidentified);
        };

        // 容器已存在时视频标记应已渲染，不再额外等待
        if driver
            .probe(&container, &self.selectors.video_proxy)
            .await?
            .is_some()
        {
            return Ok(LessonKind::Video);
        }

        let html = driver.inner_html(&container).await?;
        if html.trim().is_empty() {
            debug!("内容容器为空");
            return Ok(LessonKind::Unidentified);
        }
        Ok(LessonKind::Text(html))
    }
}
