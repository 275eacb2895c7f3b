// tests/extractor_test.rs

use courses_dl::{
    agent::RecordingAgent,
    config::AppConfig,
    driver::scripted::{LessonScript, ScriptedDriver},
    error::AppError,
    extractor::{LessonTarget, LinkExtractor, VideoExtractor},
    models::{ExtractionResult, Lesson},
};
use std::fs;
use tempfile::tempdir;

// --- 资源链接 ---

#[tokio::test]
async fn test_links_are_deduplicated_and_sorted() {
    let config = AppConfig::default();
    let lesson_script = LessonScript::text("Lectura", "<p>x</p>").with_links(&[
        "http://b.com",
        "http://a.com",
        "http://a.com",
    ]);
    let driver = ScriptedDriver::lesson_page(&config.selectors, lesson_script);
    let dir = tempdir().unwrap();
    let lesson = Lesson::new(1, "Lectura");
    let target = LessonTarget::new(&lesson, dir.path());

    let result = LinkExtractor::new(&config.selectors)
        .extract(&driver, &target)
        .await
        .unwrap();

    let path = dir.path().join("01 - Resources.txt");
    assert_eq!(result, ExtractionResult::LinksSaved(2, path.clone()));
    assert_eq!(fs::read_to_string(&path).unwrap(), "http://a.com\nhttp://b.com\n");
}

#[tokio::test]
async fn test_non_http_links_are_dropped() {
    let config = AppConfig::default();
    let lesson_script = LessonScript::blank("Recursos").with_links(&[
        "mailto:profe@example.com",
        "/relative/download.zip",
        "javascript:void(0)",
        "https://github.com/example/repo",
    ]);
    let driver = ScriptedDriver::lesson_page(&config.selectors, lesson_script);
    let dir = tempdir().unwrap();
    let lesson = Lesson::new(7, "Recursos");
    let target = LessonTarget::new(&lesson, dir.path());

    LinkExtractor::new(&config.selectors)
        .extract(&driver, &target)
        .await
        .unwrap();

    let content = fs::read_to_string(dir.path().join("07 - Resources.txt")).unwrap();
    assert_eq!(content, "https://github.com/example/repo\n");
}

#[tokio::test]
async fn test_missing_resources_container_writes_nothing() {
    let config = AppConfig::default();
    let driver = ScriptedDriver::lesson_page(&config.selectors, LessonScript::text("x", "<p>x</p>"));
    let dir = tempdir().unwrap();
    let lesson = Lesson::new(1, "x");
    let target = LessonTarget::new(&lesson, dir.path());

    let result = LinkExtractor::new(&config.selectors)
        .extract(&driver, &target)
        .await
        .unwrap();

    assert!(matches!(result, ExtractionResult::Skipped(_)));
    assert!(!dir.path().join("01 - Resources.txt").exists());
}

// --- 视频 ---

#[tokio::test]
async fn test_video_is_handed_to_agent_with_referer_and_template() {
    let config = AppConfig::default();
    let stream = "https://cdn.example.com/hls/master.m3u8";
    let driver = ScriptedDriver::lesson_page(&config.selectors, LessonScript::video("Bienvenida", stream));
    let agent = RecordingAgent::succeeding();
    let dir = tempdir().unwrap();
    let lesson = Lesson::new(1, "Bienvenida");
    let target = LessonTarget::new(&lesson, dir.path());

    let result = VideoExtractor::new(&config, &agent)
        .extract(&driver, &target)
        .await
        .unwrap();

    assert_eq!(result, ExtractionResult::VideoDownloadStarted(stream.to_string()));
    let requests = agent.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].stream_url, stream);
    assert_eq!(requests[0].referer, "https://cursos.devtalles.com/");
    assert_eq!(requests[0].output_template, "01 - Bienvenida.%(ext)s");
    assert_eq!(requests[0].dest_dir, dir.path());
    assert!(dir.path().join("01 - Bienvenida.mp4").exists());

    // 作用域已恢复到顶层文档
    assert!(!driver.in_frame());
    assert_eq!(driver.frame_entries(), 1);
    assert_eq!(driver.frame_exits(), 1);
    assert_eq!(driver.scope_resets(), 2);
}

#[tokio::test]
async fn test_missing_iframe_aborts_without_calling_agent() {
    let config = AppConfig::default();
    let driver = ScriptedDriver::lesson_page(&config.selectors, LessonScript::video_without_frame("x"));
    let agent = RecordingAgent::succeeding();
    let dir = tempdir().unwrap();
    let lesson = Lesson::new(1, "x");
    let target = LessonTarget::new(&lesson, dir.path());

    let err = VideoExtractor::new(&config, &agent)
        .extract(&driver, &target)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Timeout(_)));
    assert!(agent.requests().is_empty());
    assert!(!driver.in_frame());
    assert_eq!(driver.frame_entries(), 0);
}

#[tokio::test]
async fn test_non_http_stream_is_rejected_and_scope_restored() {
    let config = AppConfig::default();
    let driver = ScriptedDriver::lesson_page(&config.selectors, LessonScript::video("x", "blob:https://cdn/abc"));
    let agent = RecordingAgent::succeeding();
    let dir = tempdir().unwrap();
    let lesson = Lesson::new(1, "x");
    let target = LessonTarget::new(&lesson, dir.path());

    let err = VideoExtractor::new(&config, &agent)
        .extract(&driver, &target)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidStreamUrl(ref url) if url == "blob:https://cdn/abc"));
    assert!(agent.requests().is_empty());
    assert!(!driver.in_frame());
    assert_eq!(driver.frame_exits(), 1);
}

#[tokio::test]
async fn test_agent_failure_is_reported_not_panicked() {
    let config = AppConfig::default();
    let driver = ScriptedDriver::lesson_page(
        &config.selectors,
        LessonScript::video("Bienvenida", "https://cdn.example.com/a.m3u8"),
    );
    let agent = RecordingAgent::with_exit_code(1);
    let dir = tempdir().unwrap();
    let lesson = Lesson::new(3, "Bienvenida");
    let target = LessonTarget::new(&lesson, dir.path());

    let err = VideoExtractor::new(&config, &agent)
        .extract(&driver, &target)
        .await
        .unwrap_err();

    assert!(!err.is_fatal());
    match err {
        AppError::AgentFailed { title, code } => {
            assert_eq!(title, "03 - Bienvenida");
            assert_eq!(code, Some(1));
        }
        other => panic!("意外的错误: {other}"),
    }
    assert!(!dir.path().join("03 - Bienvenida.mp4").exists());
    assert!(!driver.in_frame());
}
