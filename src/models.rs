// src/models.rs

use crate::utils;
use std::{fmt, path::PathBuf};

/// 课程根节点。`root_path` 在遍历开始时即被创建。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub title: String,
    pub root_path: PathBuf,
}

/// 章节，`index` 从 1 开始，按页面 (DOM) 顺序分配
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub index: usize,
    pub title: String,
    pub folder: PathBuf,
    pub lesson_count: usize,
}

impl Section {
    pub fn label(&self) -> String {
        format!("章节 {:02} '{}'", self.index, self.title)
    }
}

/// 课时只在处理期间存在，`index` 在每个章节内从 1 重新开始
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub index: usize,
    pub raw_title: String,
    pub sanitized_title: String,
    /// 分类完成前为 `None`
    pub classification: Option<LessonKind>,
}

impl Lesson {
    pub fn new(index: usize, raw_title: &str) -> Self {
        Self {
            index,
            raw_title: raw_title.to_string(),
            sanitized_title: utils::sanitize_name(raw_title),
            classification: None,
        }
    }

    pub fn classified(mut self, kind: LessonKind) -> Self {
        self.classification = Some(kind);
        self
    }

    /// 尚未分类的课时按无法识别处理
    pub fn kind(&self) -> &LessonKind {
        self.classification.as_ref().unwrap_or(&LessonKind::Unidentified)
    }

    /// 带序号的标题，同时用作输出文件名的主体，例如 `02 - Variables`
    pub fn indexed_title(&self) -> String {
        format!("{:02} - {}", self.index, self.sanitized_title)
    }
}

/// 课时内容类型。新增类型时，所有 `match` 分派点都会在编译期报错。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonKind {
    Video,
    /// 携带内容容器的 innerHTML
    Text(String),
    Unidentified,
}

impl LessonKind {
    pub fn name(&self) -> &'static str {
        match self {
            LessonKind::Video => "视频",
            LessonKind::Text(_) => "文本/HTML",
            LessonKind::Unidentified => "无法识别",
        }
    }
}

/// 单个提取策略的结果，只用于日志与运行报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    VideoDownloadStarted(String),
    TextSaved(PathBuf),
    LinksSaved(usize, PathBuf),
    Skipped(String),
}

impl fmt::Display for ExtractionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file_name = |path: &PathBuf| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        match self {
            ExtractionResult::VideoDownloadStarted(url) => write!(f, "视频已下载 (来源: {})", url),
            ExtractionResult::TextSaved(path) => write!(f, "文本已保存: {}", file_name(path)),
            ExtractionResult::LinksSaved(count, path) => {
                write!(f, "{} 个链接已保存: {}", count, file_name(path))
            }
            ExtractionResult::Skipped(reason) => write!(f, "已跳过: {}", reason),
        }
    }
}

/// 遍历状态机的各个状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Idle,
    CourseLoading,
    SectionIterating,
    SectionExpanded,
    LessonIterating,
    LessonLoaded,
    LessonDone,
    SectionCollapsed,
    CourseDone,
    FatalStop,
}

impl NavState {
    pub fn is_terminal(self) -> bool {
        matches!(self, NavState::CourseDone | NavState::FatalStop)
    }
}
