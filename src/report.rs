// src/report.rs

use crate::{
    models::{ExtractionResult, LessonKind, NavState},
    symbols, ui,
};
use colored::*;
use itertools::Itertools;
use log::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub videos: usize,
    pub texts: usize,
    pub unidentified: usize,
    pub link_files: usize,
    pub links: usize,
}

/// 一条带课时身份的记录，例如 `章节 01 'Intro' / 02 - Variables`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonIssue {
    pub lesson: String,
    pub reason: String,
}

/// 一次遍历的汇总。只用于日志与终端报告。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub course_title: Option<String>,
    pub sections: usize,
    pub lessons: usize,
    pub counts: OutcomeCounts,
    pub failures: Vec<LessonIssue>,
    pub skipped: Vec<LessonIssue>,
    pub final_state: NavState,
}

impl Default for RunReport {
    fn default() -> Self {
        Self {
            course_title: None,
            sections: 0,
            lessons: 0,
            counts: OutcomeCounts::default(),
            failures: Vec::new(),
            skipped: Vec::new(),
            final_state: NavState::Idle,
        }
    }
}

impl RunReport {
    pub fn record_kind(&mut self, kind: &LessonKind) {
        match kind {
            LessonKind::Video => self.counts.videos += 1,
            LessonKind::Text(_) => self.counts.texts += 1,
            LessonKind::Unidentified => self.counts.unidentified += 1,
        }
    }

    pub fn record_result(&mut self, lesson: &str, result: &ExtractionResult) {
        match result {
            ExtractionResult::LinksSaved(count, _) => {
                self.counts.link_files += 1;
                self.counts.links += count;
            }
            ExtractionResult::Skipped(reason) => self.record_skip(lesson, reason),
            ExtractionResult::VideoDownloadStarted(_) | ExtractionResult::TextSaved(_) => {}
        }
    }

    pub fn record_failure(&mut self, lesson: &str, reason: impl ToString) {
        self.failures.push(LessonIssue {
            lesson: lesson.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn record_skip(&mut self, lesson: &str, reason: impl ToString) {
        self.skipped.push(LessonIssue {
            lesson: lesson.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn completed(&self) -> bool {
        self.final_state == NavState::CourseDone
    }

    pub fn print(&self) {
        info!(
            "运行报告: Sections={}, Lessons={}, Video={}, Text={}, Unidentified={}, Links={}, Failed={}, State={:?}",
            self.sections,
            self.lessons,
            self.counts.videos,
            self.counts.texts,
            self.counts.unidentified,
            self.counts.links,
            self.failures.len(),
            self.final_state
        );

        if !self.skipped.is_empty() || !self.failures.is_empty() {
            ui::print_sub_header("处理详情报告");
            if !self.skipped.is_empty() {
                println!("\n{} 跳过的项目 ({}个):", *symbols::SKIP, self.skipped.len());
                print_grouped_report(&self.skipped, |s| s.cyan());
            }
            if !self.failures.is_empty() {
                println!("\n{} 失败的课时 ({}个):", *symbols::ERROR, self.failures.len());
                print_grouped_report(&self.failures, |s| s.red());
            }
        }

        ui::print_sub_header("任务总结");
        if let Some(title) = &self.course_title {
            println!("课程: {}", title.bold());
        }
        println!(
            "章节: {} | 课时: {} | {} | {} | {} | 资源链接: {}",
            self.sections,
            self.lessons,
            format!("视频: {}", self.counts.videos).green(),
            format!("文本: {}", self.counts.texts).green(),
            format!("无法识别: {}", self.counts.unidentified).yellow(),
            self.counts.links
        );
        if self.completed() && self.failures.is_empty() {
            println!("{} 所有课时均已处理完毕。", *symbols::OK);
        } else if self.completed() {
            println!(
                "{} 遍历已完成，{} 个课时处理失败，详见日志。",
                *symbols::WARN,
                self.failures.len()
            );
        } else {
            println!("{} 遍历未能完成 (状态: {:?})。", *symbols::ERROR, self.final_state);
        }
    }
}

fn print_grouped_report(items: &[LessonIssue], color_fn: fn(ColoredString) -> ColoredString) {
    let grouped = items
        .iter()
        .map(|issue| (issue.reason.as_str(), issue.lesson.as_str()))
        .into_group_map();
    for reason in grouped.keys().sorted() {
        println!("  - {}", color_fn(format!("原因: {}", reason).into()));
        // 保持课时在课程中的顺序
        for lesson in &grouped[reason] {
            println!("    - {}", lesson);
        }
    }
}
