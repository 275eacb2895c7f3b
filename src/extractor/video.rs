// src/extractor/video.rs

use super::LessonTarget;
use crate::{
    agent::{DownloadAgent, DownloadRequest},
    config::AppConfig,
    driver::{FrameScope, PageDriver},
    error::*,
    models::ExtractionResult,
    organizer::OutputOrganizer,
};
use log::{debug, info, warn};

/// 从视频 iframe 中取出 HLS 地址，交给下载代理并等待其结束
pub struct VideoExtractor<'a, A: DownloadAgent> {
    config: &'a AppConfig,
    agent: &'a A,
}

impl<'a, A: DownloadAgent> VideoExtractor<'a, A> {
    pub fn new(config: &'a AppConfig, agent: &'a A) -> Self {
        Self { config, agent }
    }

    pub async fn extract<D: PageDriver>(
        &self,
        driver: &D,
        target: &LessonTarget<'_>,
    ) -> AppResult<ExtractionResult> {
        driver.reset_scope().await?;
        let result = self.download(driver, target).await;
        // 任何路径下都要回到顶层文档，后续的链接提取依赖它
        if let Err(e) = driver.reset_scope().await {
            warn!("恢复顶层文档失败: {}", e);
        }
        result
    }

    async fn download<D: PageDriver>(
        &self,
        driver: &D,
        target: &LessonTarget<'_>,
    ) -> AppResult<ExtractionResult> {
        let selectors = &self.config.selectors;
        let Some(scope) = driver
            .enter_frame(&selectors.video_iframe, self.config.wait_timeout)
            .await?
        else {
            return Err(AppError::Timeout(format!(
                "视频 iframe '{}' 未出现",
                selectors.video_iframe
            )));
        };

        let located = self.locate_stream(driver, &scope).await;
        driver.leave_frame(scope).await?;
        let stream_url = located?;
        info!("找到视频流地址: {}", stream_url);

        let title = target.lesson.indexed_title();
        let request = DownloadRequest {
            stream_url: stream_url.clone(),
            referer: self.config.referer(),
            dest_dir: target.section_folder.to_path_buf(),
            output_template: OutputOrganizer::video_output_template(&title),
        };
        let outcome = self.agent.fetch(&request).await?;
        if !outcome.succeeded() {
            debug!("下载代理输出末尾:\n{}", outcome.stdout_tail);
            return Err(AppError::AgentFailed {
                title,
                code: outcome.exit_code,
            });
        }
        info!("视频下载完成: {}", title);
        Ok(ExtractionResult::VideoDownloadStarted(stream_url))
    }

    async fn locate_stream<D: PageDriver>(&self, driver: &D, scope: &FrameScope) -> AppResult<String> {
        let selector = &self.config.selectors.stream_source;
        let source = driver
            .wait_for(selector, self.config.wait_timeout)
            .await?
            .ok_or_else(|| {
                AppError::Timeout(format!("iframe '{}' 内未出现视频源 '{}'", scope.selector(), selector))
            })?;
        let src = driver.attr(&source, "src").await?.unwrap_or_default();
        if src.is_empty() || !src.starts_with("http") {
            return Err(AppError::InvalidStreamUrl(src));
        }
        Ok(src)
    }
}
