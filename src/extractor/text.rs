// src/extractor/text.rs

use super::LessonTarget;
use crate::{constants, error::*, models::ExtractionResult, organizer::OutputOrganizer};
use anyhow::Context;
use log::info;
use std::fs;

/// 将文本课时保存为独立的 HTML 文件
pub struct TextExtractor;

impl TextExtractor {
    pub fn extract(target: &LessonTarget<'_>, fragment: &str) -> AppResult<ExtractionResult> {
        let title = target.lesson.indexed_title();
        let path = OutputOrganizer::html_path(target.section_folder, &title);
        fs::write(&path, render_document(&title, fragment))
            .with_context(|| format!("保存 '{}' 的 HTML 内容失败", title))?;
        info!("文本内容已保存: {}", path.display());
        Ok(ExtractionResult::TextSaved(path))
    }
}

/// 生成带内联样式的完整 HTML 文档，片段原样嵌入
pub fn render_document(title: &str, fragment: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{style}
    </style>
</head>
<body>
    <div class="content-container">
        <h1>{title}</h1>
        {fragment}
    </div>
</body>
</html>
"#,
        title = title,
        style = constants::HTML_TEMPLATE_STYLE,
        fragment = fragment,
    )
}
