// tests/navigator_test.rs

use courses_dl::{
    agent::RecordingAgent,
    config::AppConfig,
    crawl,
    driver::{
        scripted::{CourseScript, LessonScript, ScriptedDriver},
        session::SessionCookie,
    },
    error::AppError,
    models::NavState,
    navigator::Navigator,
};
use std::{fs, path::Path};
use tempfile::tempdir;

const COURSE_URL: &str = "https://cursos.devtalles.com/courses/take/rust-basico/";

fn config_in(root: &Path) -> AppConfig {
    AppConfig {
        output_dir: root.to_path_buf(),
        ..AppConfig::default()
    }
}

fn text_lesson(title: &str) -> LessonScript {
    LessonScript::text(title, &format!("<p>{}</p>", title)).with_links(&["https://docs.rs"])
}

fn session_cookies() -> Vec<SessionCookie> {
    serde_json::from_str(
        r#"[{"name": "_session_id", "value": "abc", "domain": ".devtalles.com", "sameSite": "no_restriction"}]"#,
    )
    .unwrap()
}

#[tokio::test]
async fn test_failing_lesson_does_not_stop_traversal() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let script = CourseScript::new("Rust Básico")
        .section(
            "Intro",
            vec![
                text_lesson("Uno"),
                text_lesson("Dos").broken(),
                text_lesson("Tres"),
            ],
        )
        .section("Cierre", vec![text_lesson("Fin")]);
    let driver = ScriptedDriver::course(&config.selectors, script);
    let agent = RecordingAgent::succeeding();

    let mut navigator = Navigator::new(&driver, &agent, &config);
    let report = navigator.run(COURSE_URL).await.unwrap();

    assert_eq!(navigator.state(), NavState::CourseDone);
    assert!(report.completed());
    assert_eq!(report.lessons, 4);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].lesson.contains("课时 02"));

    let intro = dir.path().join("Rust Básico").join("01 - Intro");
    assert!(intro.join("01 - Uno.html").exists());
    assert!(!intro.join("02 - Dos.html").exists());
    assert!(intro.join("03 - Tres.html").exists());
    assert!(intro.join("03 - Resources.txt").exists());
    assert!(dir.path().join("Rust Básico/02 - Cierre/01 - Fin.html").exists());
}

#[tokio::test]
async fn test_failed_video_still_extracts_links() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let script = CourseScript::new("Curso").section(
        "Videos",
        vec![
            LessonScript::video_without_frame("Roto").with_links(&["https://a.com"]),
            text_lesson("Después"),
        ],
    );
    let driver = ScriptedDriver::course(&config.selectors, script);
    let agent = RecordingAgent::succeeding();

    let report = Navigator::new(&driver, &agent, &config)
        .run(COURSE_URL)
        .await
        .unwrap();

    let folder = dir.path().join("Curso/01 - Videos");
    assert_eq!(fs::read_to_string(folder.join("01 - Resources.txt")).unwrap(), "https://a.com\n");
    assert!(folder.join("02 - Después.html").exists());
    assert_eq!(report.failures.len(), 1);
    assert!(agent.requests().is_empty());
    assert!(!driver.in_frame());
}

#[tokio::test]
async fn test_sections_and_lessons_are_indexed_in_page_order() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let script = CourseScript::new("Indexado")
        .section("Intro", vec![text_lesson("a"), text_lesson("b")])
        .section("Básicos", vec![text_lesson("a"), text_lesson("b")])
        .section("Avanzado", vec![text_lesson("a"), text_lesson("b")]);
    let driver = ScriptedDriver::course(&config.selectors, script);
    let agent = RecordingAgent::succeeding();

    let report = Navigator::new(&driver, &agent, &config)
        .run(COURSE_URL)
        .await
        .unwrap();

    assert_eq!(report.sections, 3);
    assert_eq!(report.lessons, 6);
    let course = dir.path().join("Indexado");
    for section in ["01 - Intro", "02 - Básicos", "03 - Avanzado"] {
        let folder = course.join(section);
        assert!(folder.is_dir(), "缺少章节目录 {}", section);
        for file in ["01 - a.html", "02 - b.html", "01 - Resources.txt", "02 - Resources.txt"] {
            assert!(folder.join(file).exists(), "缺少 {}/{}", section, file);
        }
    }
}

#[tokio::test]
async fn test_end_to_end_video_and_text() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let stream = "https://cdn.example.com/hls/intro.m3u8";
    let script = CourseScript::new("Rust: de cero a experto").section(
        "Introducción",
        vec![
            LessonScript::video("Bienvenida", stream).with_links(&["https://github.com/devtalles"]),
            LessonScript::text("¿Qué es Rust?", "<p>Rust es…</p>")
                .with_links(&["http://b.com", "http://a.com", "http://a.com"]),
        ],
    );
    let driver = ScriptedDriver::course(&config.selectors, script);
    let agent = RecordingAgent::succeeding();

    let report = crawl(&driver, &agent, &config, &session_cookies(), COURSE_URL)
        .await
        .unwrap();

    assert!(report.completed());
    assert!(report.failures.is_empty());
    assert_eq!(report.counts.videos, 1);
    assert_eq!(report.counts.texts, 1);
    assert_eq!(report.counts.link_files, 2);

    let folder = dir.path().join("Rust de cero a experto/01 - Introducción");
    assert!(folder.join("01 - Bienvenida.mp4").exists());
    assert!(folder.join("02 - ¿Qué es Rust.html").exists());
    assert_eq!(
        fs::read_to_string(folder.join("02 - Resources.txt")).unwrap(),
        "http://a.com\nhttp://b.com\n"
    );
    assert_eq!(
        fs::read_to_string(folder.join("01 - Resources.txt")).unwrap(),
        "https://github.com/devtalles\n"
    );

    let requests = agent.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].stream_url, stream);
    assert_eq!(requests[0].dest_dir, folder);
    assert!(!driver.in_frame());
}

#[tokio::test]
async fn test_unidentified_lesson_only_saves_links() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let script = CourseScript::new("Curso").section(
        "Extras",
        vec![LessonScript::blank("Quiz").with_links(&["https://quiz.example.com"])],
    );
    let driver = ScriptedDriver::course(&config.selectors, script);
    let agent = RecordingAgent::succeeding();

    let report = Navigator::new(&driver, &agent, &config)
        .run(COURSE_URL)
        .await
        .unwrap();

    let folder = dir.path().join("Curso/01 - Extras");
    let entries: Vec<_> = fs::read_dir(&folder)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, ["01 - Resources.txt"]);
    assert_eq!(report.counts.unidentified, 1);
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn test_classifier_error_still_saves_links() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let script = CourseScript::new("Curso").section(
        "Lecturas",
        vec![
            LessonScript::text("Inestable", "<p>x</p>")
                .with_stale_content()
                .with_links(&["https://b.com", "https://a.com"]),
            text_lesson("Siguiente"),
        ],
    );
    let driver = ScriptedDriver::course(&config.selectors, script);
    let agent = RecordingAgent::succeeding();

    let report = Navigator::new(&driver, &agent, &config)
        .run(COURSE_URL)
        .await
        .unwrap();

    let folder = dir.path().join("Curso/01 - Lecturas");
    assert_eq!(
        fs::read_to_string(folder.join("01 - Resources.txt")).unwrap(),
        "https://a.com\nhttps://b.com\n"
    );
    assert!(!folder.join("01 - Inestable.html").exists());
    assert!(folder.join("02 - Siguiente.html").exists());
    assert_eq!(report.counts.unidentified, 1);
    assert!(report.failures.is_empty());
    assert!(report.completed());
}

#[tokio::test]
async fn test_empty_section_is_skipped() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let script = CourseScript::new("Curso")
        .section("Vacía", vec![])
        .section("Llena", vec![text_lesson("Uno")]);
    let driver = ScriptedDriver::course(&config.selectors, script);
    let agent = RecordingAgent::succeeding();

    let report = Navigator::new(&driver, &agent, &config)
        .run(COURSE_URL)
        .await
        .unwrap();

    assert!(report.completed());
    assert_eq!(report.skipped.len(), 1);
    assert!(report.skipped[0].lesson.contains("Vacía"));
    assert!(dir.path().join("Curso/01 - Vacía").is_dir());
    assert!(dir.path().join("Curso/02 - Llena/01 - Uno.html").exists());
}

#[tokio::test]
async fn test_missing_course_title_is_fatal() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let script = CourseScript {
        title: None,
        ..CourseScript::new("ignorado")
    }
    .section("Intro", vec![text_lesson("Uno")]);
    let driver = ScriptedDriver::course(&config.selectors, script);
    let agent = RecordingAgent::succeeding();

    let mut navigator = Navigator::new(&driver, &agent, &config);
    let err = navigator.run(COURSE_URL).await.unwrap_err();

    assert!(matches!(err, AppError::CourseTitleMissing));
    assert!(err.is_fatal());
    assert_eq!(navigator.state(), NavState::FatalStop);
    assert_eq!(driver.click_count(), 0);
}

#[tokio::test]
async fn test_course_without_sections_is_fatal() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let driver = ScriptedDriver::course(&config.selectors, CourseScript::new("Sin secciones"));
    let agent = RecordingAgent::succeeding();

    let mut navigator = Navigator::new(&driver, &agent, &config);
    let err = navigator.run(COURSE_URL).await.unwrap_err();

    assert!(matches!(err, AppError::NoSections));
    assert_eq!(navigator.state(), NavState::FatalStop);
    assert_eq!(navigator.report().final_state, NavState::FatalStop);
}

#[tokio::test]
async fn test_rejected_session_stops_before_traversal() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path());
    let script = CourseScript::new("Curso").section("Intro", vec![text_lesson("Uno")]);
    let driver = ScriptedDriver::course(&config.selectors, script).rejecting_session();
    let agent = RecordingAgent::succeeding();

    let err = crawl(&driver, &agent, &config, &session_cookies(), COURSE_URL)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::SessionRejected(_)));
    assert!(!dir.path().join("Curso").exists());
}
