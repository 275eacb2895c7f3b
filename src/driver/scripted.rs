// src/driver/scripted.rs

//! 按脚本构造课程页面的内存驱动，用于在没有浏览器的情况下测试遍历、分类与提取逻辑。

use super::{FrameScope, PageDriver, session::SessionCookie};
use crate::{
    config::{Selectors, SiteConfig},
    error::*,
};
use anyhow::anyhow;
use async_trait::async_trait;
use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
    time::Duration,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

type Scope = HashMap<String, Vec<NodeId>>;

#[derive(Debug, Default)]
struct Node {
    text: String,
    text_content: String,
    inner_html: String,
    attrs: HashMap<String, String>,
    children: Scope,
    opens_page: Option<usize>,
    fails_on_click: bool,
    fails_on_query: bool,
}

#[derive(Debug, Default)]
struct Page {
    document: Scope,
    frames: HashMap<String, Scope>,
}

/// 课时页面上呈现的主要内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonContent {
    /// 内容容器 + 视频标记 + 视频 iframe (内含 HLS source)
    Video { stream_url: String },
    /// 有视频标记，但 iframe 始终没有出现
    VideoWithoutFrame,
    /// 只有内容容器
    Text { html: String },
    /// 内容容器从未出现
    Blank,
}

#[derive(Debug, Clone)]
pub struct LessonScript {
    pub title: String,
    pub content: LessonContent,
    /// `None` 表示页面上没有资源容器
    pub links: Option<Vec<String>>,
    /// 点击课时链接时报错
    pub broken: bool,
    /// 内容容器已出现，但在其内部查询或读取时报错 (例如元素已失效)
    pub stale_content: bool,
}

impl LessonScript {
    fn with_content(title: &str, content: LessonContent) -> Self {
        Self {
            title: title.to_string(),
            content,
            links: None,
            broken: false,
            stale_content: false,
        }
    }

    pub fn video(title: &str, stream_url: &str) -> Self {
        Self::with_content(title, LessonContent::Video { stream_url: stream_url.to_string() })
    }

    pub fn text(title: &str, html: &str) -> Self {
        Self::with_content(title, LessonContent::Text { html: html.to_string() })
    }

    pub fn blank(title: &str) -> Self {
        Self::with_content(title, LessonContent::Blank)
    }

    pub fn video_without_frame(title: &str) -> Self {
        Self::with_content(title, LessonContent::VideoWithoutFrame)
    }

    pub fn with_links(mut self, links: &[&str]) -> Self {
        self.links = Some(links.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }

    /// 内容容器在探测时报错 (元素已失效)
    pub fn with_stale_content(mut self) -> Self {
        self.stale_content = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct SectionScript {
    pub title: String,
    pub lessons: Vec<LessonScript>,
}

impl SectionScript {
    pub fn new(title: &str, lessons: Vec<LessonScript>) -> Self {
        Self {
            title: title.to_string(),
            lessons,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CourseScript {
    /// `None` 表示课程标题元素从未出现
    pub title: Option<String>,
    pub sections: Vec<SectionScript>,
}

impl CourseScript {
    pub fn new(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            sections: Vec::new(),
        }
    }

    pub fn section(mut self, title: &str, lessons: Vec<LessonScript>) -> Self {
        self.sections.push(SectionScript::new(title, lessons));
        self
    }
}

#[derive(Debug, Default)]
struct State {
    nodes: Vec<Node>,
    course: Page,
    login: Page,
    pages: Vec<Page>,
    current_page: Option<usize>,
    frame: Option<String>,
    url: String,
    on_login_page: bool,
    cookies: Vec<SessionCookie>,
    clicks: Vec<NodeId>,
    frame_entries: usize,
    frame_exits: usize,
    scope_resets: usize,
}

impl State {
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn add(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn lookup(&self, selector: &str) -> Vec<NodeId> {
        if let Some(frame) = &self.frame {
            return self
                .current_page
                .and_then(|p| self.pages[p].frames.get(frame))
                .and_then(|scope| scope.get(selector))
                .cloned()
                .unwrap_or_default();
        }
        if self.on_login_page {
            return self.login.document.get(selector).cloned().unwrap_or_default();
        }
        let mut found = self.course.document.get(selector).cloned().unwrap_or_default();
        if let Some(page) = self.current_page
            && let Some(ids) = self.pages[page].document.get(selector)
        {
            found.extend(ids);
        }
        found
    }

    fn children(&self, parent: NodeId, selector: &str) -> Vec<NodeId> {
        self.node(parent).children.get(selector).cloned().unwrap_or_default()
    }

    fn check_live(&self, id: NodeId) -> AppResult<&Node> {
        let node = self.node(id);
        if node.fails_on_query {
            return Err(AppError::Other(anyhow!("stale element reference")));
        }
        Ok(node)
    }
}

/// 脚本化的页面驱动
pub struct ScriptedDriver {
    selectors: Selectors,
    site: SiteConfig,
    accepts_session: bool,
    rejected_cookies: HashSet<String>,
    state: Mutex<State>,
}

impl ScriptedDriver {
    /// 构造一个已停留在课程页面的驱动
    pub fn course(selectors: &Selectors, script: CourseScript) -> Self {
        let driver = Self::empty(selectors);
        {
            let mut state = driver.state.lock().unwrap();
            driver.build_course(&mut state, &script);
        }
        driver
    }

    /// 构造一个已停留在某个课时页面的驱动
    pub fn lesson_page(selectors: &Selectors, lesson: LessonScript) -> Self {
        let driver = Self::empty(selectors);
        {
            let mut state = driver.state.lock().unwrap();
            let page = driver.build_page(&mut state, &lesson);
            state.current_page = Some(page);
        }
        driver
    }

    fn empty(selectors: &Selectors) -> Self {
        let site = SiteConfig::default();
        let mut state = State {
            url: site.login_url.clone(),
            ..Default::default()
        };
        let marker = state.add(Node::default());
        state.login.document.insert(selectors.login_marker.clone(), vec![marker]);
        Self {
            selectors: selectors.clone(),
            site,
            accepts_session: true,
            rejected_cookies: HashSet::new(),
            state: Mutex::new(state),
        }
    }

    /// 刷新后会话仍停留在登录页
    pub fn rejecting_session(mut self) -> Self {
        self.accepts_session = false;
        self
    }

    /// 指定名称的 Cookie 注入时报错
    pub fn rejecting_cookie(mut self, name: &str) -> Self {
        self.rejected_cookies.insert(name.to_string());
        self
    }

    fn build_course(&self, state: &mut State, script: &CourseScript) {
        let s = &self.selectors;
        if let Some(title) = &script.title {
            let title_node = state.add(Node {
                text: title.clone(),
                ..Default::default()
            });
            state.course.document.insert(s.course_title.clone(), vec![title_node]);
        }

        let mut section_nodes = Vec::new();
        for section in &script.sections {
            let header = state.add(Node::default());
            let heading = state.add(Node {
                text: section.title.clone(),
                ..Default::default()
            });

            let mut items = Vec::new();
            for lesson in &section.lessons {
                let page = self.build_page(state, lesson);
                let title_node = state.add(Node {
                    text: lesson.title.clone(),
                    text_content: format!("\n      {}\n      05:00\n    ", lesson.title),
                    ..Default::default()
                });
                let link = state.add(Node {
                    children: HashMap::from([(s.lesson_title.clone(), vec![title_node])]),
                    opens_page: Some(page),
                    fails_on_click: lesson.broken,
                    ..Default::default()
                });
                items.push(state.add(Node {
                    children: HashMap::from([(s.lesson_link.clone(), vec![link])]),
                    ..Default::default()
                }));
            }

            section_nodes.push(state.add(Node {
                children: HashMap::from([
                    (s.section_header.clone(), vec![header]),
                    (s.section_title.clone(), vec![heading]),
                    (s.lesson_item.clone(), items),
                ]),
                ..Default::default()
            }));
        }
        if !section_nodes.is_empty() {
            state.course.document.insert(s.section_item.clone(), section_nodes);
        }
    }

    fn build_page(&self, state: &mut State, lesson: &LessonScript) -> usize {
        let s = &self.selectors;
        let mut page = Page::default();

        match &lesson.content {
            LessonContent::Video { stream_url } => {
                let container = self.video_container(state);
                page.document.insert(s.content_container.clone(), vec![container]);
                let iframe = state.add(Node::default());
                page.document.insert(s.video_iframe.clone(), vec![iframe]);
                let source = state.add(Node {
                    attrs: HashMap::from([
                        ("src".to_string(), stream_url.clone()),
                        ("type".to_string(), "application/x-mpegURL".to_string()),
                    ]),
                    ..Default::default()
                });
                page.frames.insert(
                    s.video_iframe.clone(),
                    HashMap::from([(s.stream_source.clone(), vec![source])]),
                );
            }
            LessonContent::VideoWithoutFrame => {
                let container = self.video_container(state);
                page.document.insert(s.content_container.clone(), vec![container]);
            }
            LessonContent::Text { html } => {
                let container = state.add(Node {
                    inner_html: html.clone(),
                    ..Default::default()
                });
                page.document.insert(s.content_container.clone(), vec![container]);
            }
            LessonContent::Blank => {}
        }
        if lesson.stale_content {
            for id in page.document.get(&s.content_container).into_iter().flatten() {
                state.nodes[id.0].fails_on_query = true;
            }
        }

        if let Some(links) = &lesson.links {
            let anchors = links
                .iter()
                .map(|href| {
                    state.add(Node {
                        text: href.clone(),
                        attrs: HashMap::from([("href".to_string(), href.clone())]),
                        ..Default::default()
                    })
                })
                .collect();
            let container = state.add(Node {
                children: HashMap::from([(s.link.clone(), anchors)]),
                ..Default::default()
            });
            page.document.insert(s.resources_container.clone(), vec![container]);
        }

        state.pages.push(page);
        state.pages.len() - 1
    }

    fn video_container(&self, state: &mut State) -> NodeId {
        let proxy = state.add(Node::default());
        state.add(Node {
            inner_html: r#"<div class="videoproxy"></div>"#.to_string(),
            children: HashMap::from([(self.selectors.video_proxy.clone(), vec![proxy])]),
            ..Default::default()
        })
    }

    // --- 供测试断言使用的观察接口 ---

    pub fn in_frame(&self) -> bool {
        self.state.lock().unwrap().frame.is_some()
    }

    pub fn click_count(&self) -> usize {
        self.state.lock().unwrap().clicks.len()
    }

    pub fn frame_entries(&self) -> usize {
        self.state.lock().unwrap().frame_entries
    }

    pub fn frame_exits(&self) -> usize {
        self.state.lock().unwrap().frame_exits
    }

    pub fn scope_resets(&self) -> usize {
        self.state.lock().unwrap().scope_resets
    }

    pub fn injected_cookies(&self) -> Vec<SessionCookie> {
        self.state.lock().unwrap().cookies.clone()
    }
}

#[async_trait]
impl PageDriver for ScriptedDriver {
    type Element = NodeId;

    async fn goto(&self, url: &str) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.url = url.to_string();
        state.on_login_page = url.contains(&self.site.login_url);
        state.current_page = None;
        state.frame = None;
        Ok(())
    }

    async fn current_url(&self) -> AppResult<String> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn refresh(&self) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.on_login_page && self.accepts_session && !state.cookies.is_empty() {
            state.on_login_page = false;
            state.url = format!("{}/", self.site.base_domain);
        }
        Ok(())
    }

    async fn add_cookie(&self, cookie: &SessionCookie) -> AppResult<()> {
        if self.rejected_cookies.contains(&cookie.name) {
            return Err(AppError::Other(anyhow!("invalid cookie domain: {}", cookie.name)));
        }
        self.state.lock().unwrap().cookies.push(cookie.clone());
        Ok(())
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> AppResult<Option<NodeId>> {
        Ok(self.state.lock().unwrap().lookup(selector).first().copied())
    }

    async fn probe(&self, within: &NodeId, selector: &str) -> AppResult<Option<NodeId>> {
        let state = self.state.lock().unwrap();
        state.check_live(*within)?;
        Ok(state.children(*within, selector).first().copied())
    }

    async fn find_all(&self, selector: &str) -> AppResult<Vec<NodeId>> {
        Ok(self.state.lock().unwrap().lookup(selector))
    }

    async fn find_in(&self, parent: &NodeId, selector: &str) -> AppResult<NodeId> {
        self.state
            .lock()
            .unwrap()
            .children(*parent, selector)
            .first()
            .copied()
            .ok_or_else(|| AppError::ElementNotFound(selector.to_string()))
    }

    async fn find_all_in(&self, parent: &NodeId, selector: &str) -> AppResult<Vec<NodeId>> {
        Ok(self.state.lock().unwrap().children(*parent, selector))
    }

    async fn text(&self, element: &NodeId) -> AppResult<String> {
        Ok(self.state.lock().unwrap().node(*element).text.clone())
    }

    async fn text_content(&self, element: &NodeId) -> AppResult<String> {
        let state = self.state.lock().unwrap();
        let node = state.node(*element);
        Ok(if node.text_content.is_empty() {
            node.text.clone()
        } else {
            node.text_content.clone()
        })
    }

    async fn inner_html(&self, element: &NodeId) -> AppResult<String> {
        Ok(self.state.lock().unwrap().check_live(*element)?.inner_html.clone())
    }

    async fn attr(&self, element: &NodeId, name: &str) -> AppResult<Option<String>> {
        Ok(self.state.lock().unwrap().node(*element).attrs.get(name).cloned())
    }

    async fn scroll_into_view(&self, _element: &NodeId) -> AppResult<()> {
        Ok(())
    }

    async fn script_click(&self, element: &NodeId) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.clicks.push(*element);
        let (fails, opens) = {
            let node = state.node(*element);
            (node.fails_on_click, node.opens_page)
        };
        if fails {
            return Err(AppError::Other(anyhow!("element click intercepted")));
        }
        if let Some(page) = opens {
            state.current_page = Some(page);
            state.frame = None;
        }
        Ok(())
    }

    async fn enter_frame(&self, selector: &str, _timeout: Duration) -> AppResult<Option<FrameScope>> {
        let mut state = self.state.lock().unwrap();
        if state.lookup(selector).is_empty() {
            return Ok(None);
        }
        state.frame = Some(selector.to_string());
        state.frame_entries += 1;
        Ok(Some(FrameScope::new(selector)))
    }

    async fn leave_frame(&self, _scope: FrameScope) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.frame = None;
        state.frame_exits += 1;
        Ok(())
    }

    async fn reset_scope(&self) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.frame = None;
        state.scope_resets += 1;
        Ok(())
    }
}
