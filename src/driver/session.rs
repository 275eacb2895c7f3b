// src/driver/session.rs

use super::PageDriver;
use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
};
use anyhow::Context;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::{fs, path::Path};

const VALID_SAME_SITE: [&str; 3] = ["Strict", "Lax", "None"];

/// 浏览器扩展导出的单条 Cookie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub secure: Option<bool>,
    #[serde(default)]
    pub http_only: Option<bool>,
    #[serde(default, alias = "expirationDate")]
    pub expiry: Option<f64>,
    #[serde(default)]
    pub same_site: Option<String>,
}

impl SessionCookie {
    /// 浏览器只接受 `Strict`/`Lax`/`None`，其余取值 (如 `no_restriction`、`unspecified`) 统一改为 `Lax`
    pub fn normalized(mut self) -> Self {
        let valid = self
            .same_site
            .as_deref()
            .is_some_and(|v| VALID_SAME_SITE.contains(&v));
        if !valid {
            self.same_site = Some("Lax".to_string());
        }
        self
    }

    /// 转换为 W3C WebDriver 协议的 Cookie 对象
    pub fn to_webdriver_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("name".into(), json!(self.name));
        object.insert("value".into(), json!(self.value));
        if let Some(domain) = &self.domain {
            object.insert("domain".into(), json!(domain));
        }
        if let Some(path) = &self.path {
            object.insert("path".into(), json!(path));
        }
        if let Some(secure) = self.secure {
            object.insert("secure".into(), json!(secure));
        }
        if let Some(http_only) = self.http_only {
            object.insert("httpOnly".into(), json!(http_only));
        }
        if let Some(expiry) = self.expiry {
            object.insert("expiry".into(), json!(expiry.trunc() as i64));
        }
        if let Some(same_site) = &self.same_site {
            object.insert("sameSite".into(), json!(same_site));
        }
        Value::Object(object)
    }
}

/// 读取 Cookie 文件。文件不存在属于致命错误。
pub fn load_cookies(path: &Path) -> AppResult<Vec<SessionCookie>> {
    if !path.is_file() {
        error!("未找到 Cookie 文件: {}", path.display());
        return Err(AppError::CookieFileMissing(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("读取 Cookie 文件 '{}' 失败", path.display()))?;
    let cookies: Vec<SessionCookie> = serde_json::from_str(&content)
        .with_context(|| format!("解析 Cookie 文件 '{}' 失败", path.display()))?;
    info!("从 {} 读取到 {} 条 Cookie", path.display(), cookies.len());
    Ok(cookies.into_iter().map(SessionCookie::normalized).collect())
}

/// 将 Cookie 注入浏览器并确认页面不再停留在登录页。
pub async fn bootstrap<D: PageDriver>(
    driver: &D,
    config: &AppConfig,
    cookies: &[SessionCookie],
) -> AppResult<()> {
    info!("正在加载 Cookie...");
    // 先打开站点页面，使 Cookie 落在正确的域名下
    driver.goto(&config.site.login_url).await?;
    if driver
        .wait_for(&config.selectors.login_marker, config.wait_timeout)
        .await?
        .is_none()
    {
        return Err(AppError::SessionRejected("登录页面未能加载".to_string()));
    }

    let mut injected = 0;
    for cookie in cookies {
        match driver.add_cookie(cookie).await {
            Ok(()) => injected += 1,
            Err(e) => debug!("添加 Cookie '{}' 失败: {}", cookie.name, e),
        }
    }
    debug!("成功注入 {}/{} 条 Cookie", injected, cookies.len());

    driver.refresh().await?;
    tokio::time::sleep(config.delays.login).await;
    info!("Cookie 已加载并刷新页面，正在验证会话...");

    let current_url = driver.current_url().await?;
    if current_url.contains(&config.site.login_url) {
        return Err(AppError::SessionRejected(
            "加载 Cookie 后仍停留在登录页面".to_string(),
        ));
    }
    info!("Cookie 认证成功");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_site_is_normalized() {
        let raw = r#"[
            {"name": "a", "value": "1", "sameSite": "no_restriction"},
            {"name": "b", "value": "2", "sameSite": "Strict"},
            {"name": "c", "value": "3"},
            {"name": "d", "value": "4", "sameSite": "None"},
            {"name": "e", "value": "5", "sameSite": "lax"}
        ]"#;
        let cookies: Vec<SessionCookie> = serde_json::from_str(raw).unwrap();
        let same_sites: Vec<_> = cookies
            .into_iter()
            .map(|c| c.normalized().same_site.unwrap())
            .collect();
        assert_eq!(same_sites, ["Lax", "Strict", "Lax", "None", "Lax"]);
    }

    #[test]
    fn test_browser_export_fields_map_to_webdriver() {
        let raw = r#"{
            "name": "_session_id", "value": "abc", "domain": ".devtalles.com",
            "path": "/", "secure": true, "httpOnly": true,
            "expirationDate": 1767225600.75, "sameSite": "unspecified",
            "hostOnly": false, "storeId": "0"
        }"#;
        let cookie: SessionCookie = serde_json::from_str(raw).unwrap();
        let value = cookie.normalized().to_webdriver_json();
        assert_eq!(value["name"], "_session_id");
        assert_eq!(value["httpOnly"], true);
        assert_eq!(value["expiry"], 1767225600_i64);
        assert_eq!(value["sameSite"], "Lax");
        assert!(value.get("hostOnly").is_none());
    }

    #[test]
    fn test_missing_cookie_file_is_fatal() {
        let err = load_cookies(Path::new("/definitely/not/here/cookies.json")).unwrap_err();
        assert!(matches!(err, AppError::CookieFileMissing(_)));
        assert!(err.is_fatal());
    }
}
