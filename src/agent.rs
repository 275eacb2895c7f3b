// src/agent.rs

use crate::{config::AgentConfig, constants, error::*, utils};
use anyhow::Context;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::{collections::VecDeque, path::PathBuf, process::Stdio, time::Duration};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::{ChildStdout, Command},
};

/// 一次视频下载请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub stream_url: String,
    pub referer: String,
    pub dest_dir: PathBuf,
    /// 输出文件名模板，扩展名由代理决定，例如 `01 - Intro.%(ext)s`
    pub output_template: String,
}

/// 下载代理进程结束后的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOutcome {
    /// 进程被信号终止时为 `None`
    pub exit_code: Option<i32>,
    pub stdout_tail: String,
}

impl AgentOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// 外部下载代理。调用方等待进程结束后才继续遍历。
#[async_trait]
pub trait DownloadAgent: Send + Sync {
    async fn fetch(&self, request: &DownloadRequest) -> AppResult<AgentOutcome>;
}

/// 通过 yt-dlp 调用 aria2c 多连接下载 HLS 视频
pub struct YtDlpAgent {
    config: AgentConfig,
}

impl YtDlpAgent {
    pub fn new(config: AgentConfig) -> Self {
        Self { config }
    }

    pub fn build_args(&self, request: &DownloadRequest) -> Vec<String> {
        vec![
            "--add-headers".to_string(),
            format!("Referer: {}", request.referer),
            "--downloader".to_string(),
            self.config.downloader.clone(),
            "--downloader-args".to_string(),
            format!(
                "{}:-x {} -k {}",
                self.config.downloader, self.config.connections, self.config.min_split_size
            ),
            "-P".to_string(),
            request.dest_dir.to_string_lossy().into_owned(),
            "-o".to_string(),
            request.output_template.clone(),
            request.stream_url.clone(),
        ]
    }

    /// 逐行读取代理输出并保留末尾若干行。输出不一定是 UTF-8 (例如 Windows 控制台的 cp1252)，按字节读取后有损解码。
    async fn follow_output(stdout: ChildStdout, pbar: &ProgressBar) -> VecDeque<String> {
        let mut reader = BufReader::new(stdout);
        let mut tail = VecDeque::with_capacity(constants::AGENT_STDOUT_TAIL_LINES);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                    pbar.set_message(utils::truncate_text(&line, constants::UI_WIDTH - 24));
                    if tail.len() == constants::AGENT_STDOUT_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
                Err(e) => {
                    warn!("读取下载代理输出失败: {}，继续等待进程结束", e);
                    // 继续排空管道，避免代理因管道关闭而中断
                    let _ = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await;
                    break;
                }
            }
        }
        tail
    }

    fn spinner(label: &str) -> ProgressBar {
        let pbar = ProgressBar::new_spinner();
        pbar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pbar.set_message(label.to_string());
        pbar.enable_steady_tick(Duration::from_millis(120));
        pbar
    }
}

#[async_trait]
impl DownloadAgent for YtDlpAgent {
    async fn fetch(&self, request: &DownloadRequest) -> AppResult<AgentOutcome> {
        let args = self.build_args(request);
        debug!("执行下载代理: {} {:?}", self.config.program, args);

        let mut child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("无法启动下载代理 '{}'，请确认已安装并在 PATH 中", self.config.program))?;

        let pbar = Self::spinner(&format!("下载中: {}", request.output_template));
        let tail = match child.stdout.take() {
            Some(stdout) => Self::follow_output(stdout, &pbar).await,
            None => VecDeque::new(),
        };
        // 必须等到进程结束，提前返回会触发 kill_on_drop
        let status = child.wait().await;
        pbar.finish_and_clear();
        let status = status?;

        info!("下载代理已退出: {}", status);
        Ok(AgentOutcome {
            exit_code: status.code(),
            stdout_tail: Vec::from(tail).join("\n"),
        })
    }
}

/// 记录请求并在目标目录写入占位文件的下载代理，用于测试
#[cfg(any(test, feature = "testing"))]
pub struct RecordingAgent {
    exit_code: i32,
    extension: String,
    requests: std::sync::Mutex<Vec<DownloadRequest>>,
}

#[cfg(any(test, feature = "testing"))]
impl RecordingAgent {
    pub fn succeeding() -> Self {
        Self::with_exit_code(0)
    }

    pub fn with_exit_code(exit_code: i32) -> Self {
        Self {
            exit_code,
            extension: "mp4".to_string(),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<DownloadRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[cfg(any(test, feature = "testing"))]
#[async_trait]
impl DownloadAgent for RecordingAgent {
    async fn fetch(&self, request: &DownloadRequest) -> AppResult<AgentOutcome> {
        self.requests.lock().unwrap().push(request.clone());
        if self.exit_code == 0 {
            let file_name = request
                .output_template
                .replace(constants::agent::OUTPUT_EXT_PLACEHOLDER, &self.extension);
            std::fs::write(request.dest_dir.join(file_name), b"")?;
        }
        Ok(AgentOutcome {
            exit_code: Some(self.exit_code),
            stdout_tail: format!("[download] 100% of {}", request.stream_url),
        })
    }
}
