// src/main.rs

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use courses_dl::{cli::Cli, logger, run_from_cli};
use std::{env, sync::Arc, time::Duration};

#[tokio::main]
async fn main() {
    // 为 Windows 终端启用 ANSI 颜色支持。
    #[cfg(windows)]
    {
        colored::control::set_virtual_terminal(true).ok();
    }
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n{} 用户强制中断程序。", "[!]".yellow());
            tokio::time::sleep(Duration::from_millis(100)).await;
            std::process::exit(130);
        }
    });

    let bin_name = env::var("CARGO_BIN_NAME").unwrap_or_else(|_| clap::crate_name!().to_string());

    let after_help = format!(
        "示例:\n  # 交互输入课程链接\n  {bin}\n\n  # 直接下载整个课程\n  {bin} --url \"https://cursos.devtalles.com/courses/take/<slug>/...\"\n\n  # 指定 Cookie 文件与保存目录，无头运行\n  {bin} -u \"<链接>\" -c my_cookies.json -o ~/Videos/Courses --headless\n\n  # 查看如何导出 Cookie\n  {bin} --cookie-help",
        bin = bin_name
    );

    let cmd = Cli::command().after_help(after_help);
    let args = match Cli::from_arg_matches(&cmd.get_matches()) {
        Ok(args) => Arc::new(args),
        Err(e) => e.exit(),
    };

    logger::setup_logging(&args.log_dir, args.log_level);

    if let Err(e) = run_from_cli(args).await {
        log::error!("程序执行出错: {}", e);
        eprintln!("\n{} {}", "[X]".red(), format!("程序执行出错: {}", e).red());
        std::process::exit(1);
    }
}
