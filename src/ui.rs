// src/ui.rs

use crate::{constants, symbols};
use colored::*;
use std::io::{self, Write};

pub fn print_banner() {
    println!("\n{}", "═".repeat(constants::UI_WIDTH));
    println!(
        " {} {}",
        clap::crate_name!().cyan().bold(),
        format!("v{}", clap::crate_version!()).dimmed()
    );
    println!(" 课程下载器: 视频交给 yt-dlp + aria2c，文本保存为 HTML，资源链接汇总为 TXT");
    println!("{}", "═".repeat(constants::UI_WIDTH));
}

pub fn print_header(title: &str) {
    println!("\n{}", "═".repeat(constants::UI_WIDTH));
    println!(" {}", title.cyan().bold());
    println!("{}", "═".repeat(constants::UI_WIDTH));
}

pub fn print_sub_header(title: &str) {
    println!("\n--- {} ---", title.bold());
}

pub fn box_message(title: &str, content: &[&str], color_func: fn(ColoredString) -> ColoredString) {
    println!("\n┌{}┐", "─".repeat(constants::UI_WIDTH - 2));
    println!("  {}", color_func(title.bold()));
    println!("├{}┤", "─".repeat(constants::UI_WIDTH - 2));
    for line in content {
        println!("  {}", line);
    }
    println!("└{}┘", "─".repeat(constants::UI_WIDTH - 2));
}

pub fn prompt(message: &str, default: Option<&str>) -> io::Result<String> {
    let default_str = default.map_or("".to_string(), |d| format!(" (默认: {})", d));
    print!("\n>>> {}{}: ", message, default_str);
    io::stdout().flush()?;
    let mut input = String::new();
    // 读到 EOF 说明输入已关闭 (管道结束或 Ctrl+D)
    if io::stdin().read_line(&mut input)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "输入已关闭"));
    }
    let input = input.trim().to_string();
    if input.is_empty() {
        Ok(default.unwrap_or("").to_string())
    } else {
        Ok(input)
    }
}

/// 交互式索取课程链接，直到得到非空输入
pub fn prompt_course_url(base_domain: &str) -> io::Result<String> {
    println!(
        "{} 请粘贴课程链接，例如 {}/courses/take/<课程>/... (按 {} 退出)",
        *symbols::INFO,
        base_domain.trim_end_matches('/'),
        *symbols::CTRL_C
    );
    loop {
        let input = prompt("课程链接", None)?;
        if !input.is_empty() {
            return Ok(input);
        }
        println!("{}", "链接不能为空。".red());
    }
}
