// src/utils.rs

use crate::{config::SiteConfig, error::*};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static ILLEGAL_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());

/// 删除文件名中的非法字符 `< > : " / \ | ? *` 并去除首尾空白。
///
/// 该函数是幂等的: `sanitize_name(sanitize_name(x)) == sanitize_name(x)`。
pub fn sanitize_name(name: &str) -> String {
    ILLEGAL_CHARS_RE.replace_all(name, "").trim().to_string()
}

/// 生成带两位序号前缀的名称，例如 `01 - 简介`
pub fn indexed_name(index: usize, title: &str) -> String {
    format!("{:02} - {}", index, sanitize_name(title))
}

/// 取文本的第一行 (课时标题的 textContent 中常混有时长等附加信息)
pub fn first_line(text: &str) -> String {
    text.trim().lines().next().unwrap_or_default().trim().to_string()
}

/// 判断是否为绝对的 HTTP(S) 链接
pub fn is_http_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

/// 校验用户输入的课程链接，提取 slug 并拼接成标准的课程地址。
pub fn validate_course_url(input: &str, site: &SiteConfig) -> AppResult<String> {
    let pattern = Regex::new(&format!(
        r"^{}/courses(?:/take)?/([^/?#]+)(?:[/?#].*)?$",
        regex::escape(site.base_domain.trim_end_matches('/'))
    ))
    .map_err(|e| AppError::Other(e.into()))?;

    let input = input.trim();
    let slug = pattern
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        // `/courses/take/` 本身没有 slug
        .filter(|slug| *slug != "take")
        .ok_or_else(|| AppError::InvalidCourseUrl(input.to_string()))?;

    let course_url = site.course_url_template.replace("{slug}", slug);
    debug!("从链接 '{}' 中提取到课程 slug '{}'", input, slug);
    Ok(course_url)
}

pub fn truncate_text(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut end_pos = 0;
    for (i, c) in text.char_indices() {
        width += if c.is_ascii() { 1 } else { 2 };
        if width > max_width.saturating_sub(3) {
            end_pos = i;
            break;
        }
    }
    if end_pos == 0 { text.to_string() } else { format!("{}...", &text[..end_pos]) }
}
