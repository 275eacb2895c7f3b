// src/lib.rs

pub mod agent;
pub mod cli;
pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod extractor;
pub mod logger;
pub mod models;
pub mod navigator;
pub mod organizer;
pub mod report;
pub mod symbols;
pub mod ui;
pub mod utils;

use crate::{
    agent::{DownloadAgent, YtDlpAgent},
    cli::Cli,
    config::AppConfig,
    driver::{
        PageDriver, WebDriverPage,
        session::{self, SessionCookie},
    },
    error::{AppError, AppResult},
    navigator::Navigator,
    report::RunReport,
};
use colored::*;
use log::{debug, info, warn};
use std::sync::Arc;

/// 库的公共入口点，由 `main.rs` 调用
pub async fn run_from_cli(args: Arc<Cli>) -> AppResult<()> {
    debug!("CLI 参数: {:?}", args);
    if args.cookie_help {
        ui::box_message(
            "导出 Cookie 指南",
            constants::HELP_COOKIE_GUIDE
                .lines()
                .collect::<Vec<_>>()
                .as_slice(),
            |s| s.cyan(),
        );
        println!(
            "\n{} 安全提醒: Cookie 等同于登录凭据，请不要分享给他人。",
            *symbols::INFO
        );
        return Ok(());
    }

    let config = AppConfig::new(&args)?;
    debug!("加载的应用配置: {:?}", config);
    ui::print_banner();

    // 所有输入都在启动浏览器之前校验
    let raw_url = match &args.url {
        Some(url) => url.clone(),
        None => ui::prompt_course_url(&config.site.base_domain)
            .map_err(|_| AppError::UserInterrupt)?,
    };
    let course_url = utils::validate_course_url(&raw_url, &config.site)?;
    info!("课程地址: {}", course_url);
    let cookies = session::load_cookies(&config.cookie_file)?;

    let driver = WebDriverPage::connect(&config).await?;
    let agent = YtDlpAgent::new(config.agent.clone());
    let result = crawl(&driver, &agent, &config, &cookies, &course_url).await;
    if let Err(e) = driver.quit().await {
        warn!("关闭浏览器失败: {}", e);
    }

    let report = result?;
    report.print();
    Ok(())
}

/// 注入 Cookie 建立会话后遍历整个课程
pub async fn crawl<D: PageDriver, A: DownloadAgent>(
    driver: &D,
    agent: &A,
    config: &AppConfig,
    cookies: &[SessionCookie],
    course_url: &str,
) -> AppResult<RunReport> {
    session::bootstrap(driver, config, cookies).await?;
    println!("{} 会话认证成功。", *symbols::OK);
    Navigator::new(driver, agent, config).run(course_url).await
}
