// src/navigator.rs

use crate::{
    agent::DownloadAgent,
    config::AppConfig,
    driver::PageDriver,
    error::*,
    extractor::{ContentClassifier, LessonTarget, LinkExtractor, TextExtractor, VideoExtractor},
    models::{Course, ExtractionResult, Lesson, LessonKind, NavState, Section},
    organizer::OutputOrganizer,
    report::RunReport,
    ui, utils,
};
use log::{debug, error, info, warn};
use std::time::Duration;

/// 按 课程 → 章节 → 课时 的顺序遍历整个课程。
///
/// 同一时刻只有一个课时处于加载状态；课时内的任何错误都在课时边界被捕获并记录，
/// 只有课程标题缺失、没有章节等错误会终止遍历。
pub struct Navigator<'a, D: PageDriver, A: DownloadAgent> {
    driver: &'a D,
    agent: &'a A,
    config: &'a AppConfig,
    organizer: OutputOrganizer,
    state: NavState,
    report: RunReport,
}

impl<'a, D: PageDriver, A: DownloadAgent> Navigator<'a, D, A> {
    pub fn new(driver: &'a D, agent: &'a A, config: &'a AppConfig) -> Self {
        Self {
            driver,
            agent,
            config,
            organizer: OutputOrganizer::new(&config.output_dir),
            state: NavState::Idle,
            report: RunReport::default(),
        }
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub async fn run(&mut self, course_url: &str) -> AppResult<RunReport> {
        let result = self.traverse(course_url).await;
        match result {
            Ok(()) => {
                self.transition(NavState::CourseDone);
                info!("课程遍历完成。");
                Ok(self.report.clone())
            }
            Err(e) => {
                error!("遍历终止: {}", e);
                self.transition(NavState::FatalStop);
                Err(e)
            }
        }
    }

    fn transition(&mut self, next: NavState) {
        debug!("状态: {:?} -> {:?}", self.state, next);
        self.state = next;
        self.report.final_state = next;
    }

    async fn traverse(&mut self, course_url: &str) -> AppResult<()> {
        self.transition(NavState::CourseLoading);
        let course = self.load_course(course_url).await?;

        self.transition(NavState::SectionIterating);
        let sections = self
            .driver
            .find_all(&self.config.selectors.section_item)
            .await?;
        if sections.is_empty() {
            return Err(AppError::NoSections);
        }
        info!("共找到 {} 个章节", sections.len());

        for (i, element) in sections.iter().enumerate() {
            let index = i + 1;
            if let Err(e) = self.process_section(&course, index, element).await {
                if e.is_fatal() {
                    return Err(e);
                }
                error!("章节 {:02} 处理失败: {}", index, e);
                self.report
                    .record_failure(&format!("章节 {:02}", index), &e);
            }
            self.transition(NavState::SectionIterating);
        }
        Ok(())
    }

    async fn load_course(&mut self, course_url: &str) -> AppResult<Course> {
        let (driver, config) = (self.driver, self.config);
        info!("正在打开课程页面: {}", course_url);
        driver.goto(course_url).await?;
        // 单页应用首屏渲染较慢
        tokio::time::sleep(config.delays.course).await;

        let title_element = driver
            .wait_for(&config.selectors.course_title, config.wait_timeout)
            .await?
            .ok_or(AppError::CourseTitleMissing)?;
        let title = driver.text(&title_element).await?.trim().to_string();
        if utils::sanitize_name(&title).is_empty() {
            return Err(AppError::CourseTitleMissing);
        }

        ui::print_header(&format!("课程: {}", title));
        let course = self.organizer.create_course(&title)?;
        self.report.course_title = Some(title);
        Ok(course)
    }

    async fn process_section(&mut self, course: &Course, index: usize, element: &D::Element) -> AppResult<()> {
        let (driver, config) = (self.driver, self.config);
        let selectors = &config.selectors;

        let header = driver.find_in(element, &selectors.section_header).await?;
        let heading = driver.find_in(element, &selectors.section_title).await?;
        let title = driver.text(&heading).await?.trim().to_string();
        let folder = self.organizer.create_section_folder(course, index, &title)?;
        let mut section = Section {
            index,
            title,
            folder,
            lesson_count: 0,
        };
        self.report.sections += 1;
        ui::print_sub_header(&section.label());

        self.transition(NavState::SectionExpanded);
        self.click(&header, config.delays.header_click).await?;
        tokio::time::sleep(config.delays.section_expand).await;

        let items = driver.find_all_in(element, &selectors.lesson_item).await?;
        if items.is_empty() {
            warn!("{} 中没有找到课时，跳过。", section.label());
            self.report.record_skip(&section.label(), "章节内没有课时");
            return Ok(());
        }
        section.lesson_count = items.len();
        info!("{} 共 {} 个课时", section.label(), section.lesson_count);

        for (i, item) in items.iter().enumerate() {
            self.transition(NavState::LessonIterating);
            self.process_lesson(&section, i + 1, item).await;
            self.transition(NavState::LessonDone);
        }

        self.transition(NavState::SectionCollapsed);
        if let Err(e) = self.click(&header, config.delays.collapse_click).await {
            warn!("收起 {} 失败: {}", section.label(), e);
        }
        Ok(())
    }

    /// 课时边界: 这里之下的所有错误都只记录，不会向上传播
    async fn process_lesson(&mut self, section: &Section, index: usize, item: &D::Element) {
        self.report.lessons += 1;
        let lesson = match self.open_lesson(index, item).await {
            Ok(lesson) => lesson,
            Err(e) => {
                let identity = format!("{} / 课时 {:02}", section.label(), index);
                error!("{} 打开失败: {}", identity, e);
                self.report.record_failure(&identity, &e);
                return;
            }
        };
        let identity = format!("{} / {}", section.label(), lesson.indexed_title());
        self.transition(NavState::LessonLoaded);

        let (driver, config) = (self.driver, self.config);
        let kind = ContentClassifier::new(&config.selectors, config.content_timeout)
            .classify(driver)
            .await;
        info!("检测到类型: {}", kind.name());
        self.report.record_kind(&kind);
        let lesson = lesson.classified(kind);
        let target = LessonTarget::new(&lesson, &section.folder);

        let primary = match lesson.kind() {
            LessonKind::Video => {
                VideoExtractor::new(config, self.agent)
                    .extract(driver, &target)
                    .await
            }
            LessonKind::Text(html) => TextExtractor::extract(&target, html),
            LessonKind::Unidentified => {
                warn!("{} 的内容类型无法识别，不保存内容。", identity);
                Ok(ExtractionResult::Skipped("内容类型无法识别".to_string()))
            }
        };
        self.settle(&identity, primary);

        // 无论主策略结果如何都尝试提取资源链接
        let links = LinkExtractor::new(&config.selectors)
            .extract(driver, &target)
            .await;
        self.settle(&identity, links);
    }

    async fn open_lesson(&self, index: usize, item: &D::Element) -> AppResult<Lesson> {
        let selectors = &self.config.selectors;
        let link = self.driver.find_in(item, &selectors.lesson_link).await?;
        let title_element = self.driver.find_in(&link, &selectors.lesson_title).await?;
        let raw_title = utils::first_line(&self.driver.text_content(&title_element).await?);
        let lesson = Lesson::new(index, &raw_title);
        info!("正在处理课时: {}", lesson.indexed_title());

        self.click(&link, self.config.delays.lesson_click).await?;
        tokio::time::sleep(self.config.delays.lesson_load).await;
        Ok(lesson)
    }

    fn settle(&mut self, identity: &str, result: AppResult<ExtractionResult>) {
        match result {
            Ok(outcome) => {
                info!("{}: {}", identity, outcome);
                self.report.record_result(identity, &outcome);
            }
            Err(e) => {
                error!("{} 处理失败: {}", identity, e);
                self.report.record_failure(identity, &e);
            }
        }
    }

    async fn click(&self, element: &D::Element, pause: Duration) -> AppResult<()> {
        self.driver.scroll_into_view(element).await?;
        tokio::time::sleep(pause).await;
        self.driver.script_click(element).await
    }
}
