// src/logger.rs

use crate::{cli::LogLevel, constants};
use fern::colors::{Color, ColoredLevelConfig};
use std::{fs, path::Path};

/// 初始化日志: 终端输出带颜色的级别，同时写入 `<log_dir>/<启动时间>.log`。
///
/// 日志文件无法创建时只输出到终端，不影响程序运行。
pub fn setup_logging(log_dir: &Path, level: LogLevel) {
    let filter: log::LevelFilter = level.into();
    if filter == log::LevelFilter::Off {
        return;
    }

    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Cyan)
        .trace(Color::BrightBlack);

    let console = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{}] [{:<5}] - {}",
                chrono::Local::now().format(constants::LOG_TIME_FORMAT),
                colors.color(record.level()),
                message
            ))
        })
        .chain(std::io::stderr());

    let mut dispatch = fern::Dispatch::new()
        .level(filter)
        // 第三方库的调试输出过于冗长
        .level_for("thirtyfour", log::LevelFilter::Warn)
        .level_for("hyper", log::LevelFilter::Warn)
        .level_for("reqwest", log::LevelFilter::Warn)
        .chain(console);

    let file_name = format!(
        "{}.log",
        chrono::Local::now().format(constants::LOG_FILE_TIME_FORMAT)
    );
    let log_file_path = log_dir.join(file_name);
    if let Err(e) = fs::create_dir_all(log_dir) {
        eprintln!("警告: 无法创建日志目录 {:?}: {}", log_dir, e);
    }
    match fern::log_file(&log_file_path) {
        Ok(file) => {
            dispatch = dispatch.chain(
                fern::Dispatch::new()
                    .format(|out, message, record| {
                        out.finish(format_args!(
                            "[{}] [{:<5}] [{}:{}] - {}",
                            chrono::Local::now().format(constants::LOG_TIME_FORMAT),
                            record.level(),
                            record.target(),
                            record.line().unwrap_or(0),
                            message
                        ))
                    })
                    .chain(file),
            );
        }
        Err(e) => {
            eprintln!(
                "警告: 无法打开日志文件 {:?}: {}。日志将只输出到终端。",
                log_file_path, e
            );
        }
    }

    if let Err(e) = dispatch.apply() {
        eprintln!("警告: 日志系统初始化失败: {}", e);
    }
}
