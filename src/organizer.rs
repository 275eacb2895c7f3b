// src/organizer.rs

use crate::{constants, error::*, models::Course, utils};
use log::{debug, info};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// 负责输出目录的创建与文件路径的构造。只读取实体，不修改它们。
#[derive(Debug, Clone)]
pub struct OutputOrganizer {
    root: PathBuf,
}

impl OutputOrganizer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 创建 `<root>/<课程标题>`，目录已存在时直接复用
    pub fn create_course(&self, title: &str) -> AppResult<Course> {
        let root_path = self.root.join(utils::sanitize_name(title));
        fs::create_dir_all(&root_path)?;
        let display_path = dunce::canonicalize(&root_path).unwrap_or_else(|_| root_path.clone());
        info!("课程目录: \"{}\"", display_path.display());
        Ok(Course {
            title: title.to_string(),
            root_path,
        })
    }

    /// 创建 `<课程目录>/<NN - 章节标题>`。序号前缀保证同名章节不会冲突。
    pub fn create_section_folder(&self, course: &Course, index: usize, title: &str) -> AppResult<PathBuf> {
        let folder = course.root_path.join(utils::indexed_name(index, title));
        fs::create_dir_all(&folder)?;
        debug!("章节目录: {}", folder.display());
        Ok(folder)
    }

    pub fn html_path(section_folder: &Path, indexed_title: &str) -> PathBuf {
        section_folder.join(format!("{}.html", indexed_title))
    }

    pub fn resources_path(section_folder: &Path, lesson_index: usize) -> PathBuf {
        section_folder.join(format!("{:02} - {}", lesson_index, constants::RESOURCES_FILE_SUFFIX))
    }

    /// 下载代理的输出文件名模板，扩展名由代理决定
    pub fn video_output_template(indexed_title: &str) -> String {
        format!("{}.{}", indexed_title, constants::agent::OUTPUT_EXT_PLACEHOLDER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_and_section_folders_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Courses");
        let organizer = OutputOrganizer::new(&root);

        let course = organizer.create_course("Rust: de cero a experto").unwrap();
        assert_eq!(course.root_path, root.join("Rust de cero a experto"));
        assert!(course.root_path.is_dir());

        let first = organizer.create_section_folder(&course, 1, "Intro / Setup").unwrap();
        let again = organizer.create_section_folder(&course, 1, "Intro / Setup").unwrap();
        assert_eq!(first, again);
        assert_eq!(first.file_name().unwrap(), "01 - Intro  Setup");

        // 同名章节依靠序号区分
        let twin = organizer.create_section_folder(&course, 2, "Intro / Setup").unwrap();
        assert_ne!(first, twin);
    }

    #[test]
    fn test_file_paths() {
        let folder = Path::new("/x/01 - Intro");
        assert_eq!(
            OutputOrganizer::html_path(folder, "02 - Lectura"),
            folder.join("02 - Lectura.html")
        );
        assert_eq!(
            OutputOrganizer::resources_path(folder, 2),
            folder.join("02 - Resources.txt")
        );
        assert_eq!(
            OutputOrganizer::video_output_template("01 - Bienvenida"),
            "01 - Bienvenida.%(ext)s"
        );
    }
}
