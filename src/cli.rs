// src/cli.rs

use crate::constants;
use clap::{Parser, ValueEnum, crate_version};
use std::path::PathBuf;

/// 定义日志输出级别
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    version = crate_version!(),
    about,
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true,
)]
pub struct Cli {
    // --- 输入 (Input) ---
    /// 课程链接 (例如 https://.../courses/take/<slug>/...)，省略时进入交互输入
    #[arg(short, long, help_heading = "Input")]
    pub url: Option<String>,
    /// 浏览器导出的 Cookie 文件 (JSON 数组)
    #[arg(short, long, value_name = "FILE", default_value_os_t = PathBuf::from(constants::DEFAULT_COOKIE_FILE), help_heading = "Input")]
    pub cookies: PathBuf,
    /// 显示如何导出 Cookie 的指南并退出
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Input")]
    pub cookie_help: bool,

    // --- 选项 (Options) ---
    /// 设置课程保存目录
    #[arg(short, long, value_name = "DIR", default_value_os_t = PathBuf::from(constants::DEFAULT_SAVE_DIR), help_heading = "Options")]
    pub output: PathBuf,
    /// WebDriver 服务地址 (例如 chromedriver)
    #[arg(long, value_name = "URL", default_value_t = constants::DEFAULT_WEBDRIVER_URL.to_string(), help_heading = "Options")]
    pub webdriver: String,
    /// 以无头模式启动浏览器
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub headless: bool,
    /// 页面元素的最长等待时间 (秒)
    #[arg(short, long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..), help_heading = "Options")]
    pub timeout: Option<u64>,

    // --- 通用选项 (General) ---
    /// 显示此帮助信息并退出
    #[arg(short = 'h', long, action = clap::ArgAction::Help, global = true, help_heading = "General")]
    _help: Option<bool>,
    /// 显示版本信息并退出
    #[arg(short = 'V', long, action = clap::ArgAction::Version, global = true, help_heading = "General")]
    _version: Option<bool>,
    /// 日志文件目录
    #[arg(long, value_name = "DIR", default_value_os_t = PathBuf::from(constants::DEFAULT_LOG_DIR), global = true, help_heading = "General")]
    pub log_dir: PathBuf,
    /// 设置日志输出级别
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true, help_heading = "General")]
    pub log_level: LogLevel,
}
