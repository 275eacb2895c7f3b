// src/extractor/links.rs

use super::LessonTarget;
use crate::{
    config::Selectors, driver::PageDriver, error::*, models::ExtractionResult,
    organizer::OutputOrganizer, utils,
};
use anyhow::Context;
use log::{debug, info, warn};
use std::{collections::BTreeSet, fs};

/// 收集课时资源区中的外部链接，去重排序后写入 `NN - Resources.txt`
pub struct LinkExtractor<'a> {
    selectors: &'a Selectors,
}

impl<'a> LinkExtractor<'a> {
    pub fn new(selectors: &'a Selectors) -> Self {
        Self { selectors }
    }

    pub async fn extract<D: PageDriver>(
        &self,
        driver: &D,
        target: &LessonTarget<'_>,
    ) -> AppResult<ExtractionResult> {
        let containers = driver.find_all(&self.selectors.resources_container).await?;
        let Some(container) = containers.first() else {
            warn!("未找到资源链接区域: {}", target.lesson.indexed_title());
            return Ok(ExtractionResult::Skipped("没有资源链接区域".to_string()));
        };

        let mut links = BTreeSet::new();
        for anchor in driver.find_all_in(container, &self.selectors.link).await? {
            match driver.attr(&anchor, "href").await? {
                Some(href) if utils::is_http_url(&href) => {
                    links.insert(href);
                }
                Some(href) => debug!("忽略非 HTTP 链接: {}", href),
                None => {}
            }
        }

        let path = OutputOrganizer::resources_path(target.section_folder, target.lesson.index);
        let content: String = links.iter().map(|link| format!("{}\n", link)).collect();
        fs::write(&path, content)
            .with_context(|| format!("写入资源链接文件 '{}' 失败", path.display()))?;
        info!("{} 个资源链接已保存至 {}", links.len(), path.display());
        Ok(ExtractionResult::LinksSaved(links.len(), path))
    }
}
