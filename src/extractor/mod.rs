// src/extractor/mod.rs

mod classifier;
mod links;
mod text;
mod video;

pub use self::{
    classifier::ContentClassifier,
    links::LinkExtractor,
    text::{TextExtractor, render_document},
    video::VideoExtractor,
};

use crate::models::Lesson;
use std::path::Path;

/// 当前课时及其输出目录，所有提取策略共享
#[derive(Debug, Clone, Copy)]
pub struct LessonTarget<'a> {
    pub lesson: &'a Lesson,
    pub section_folder: &'a Path,
}

impl<'a> LessonTarget<'a> {
    pub fn new(lesson: &'a Lesson, section_folder: &'a Path) -> Self {
        Self {
            lesson,
            section_folder,
        }
    }
}
