mod common;

use common::{console_logger, file_logger, read_lines};
use lumber::{Level, Logger, Options, WriteMode};
use serde_json::{json, Value};

#[test]
fn info_threshold_hides_debug_and_keeps_info() {
    let tmp = tempfile::TempDir::new().unwrap();
    let logger = Logger::new().unwrap();
    logger
        .reconfigure(Options::new().dir(tmp.path()).level("info"))
        .unwrap();

    logger.debug("hidden").unwrap();
    logger.info("shown").unwrap();
    logger.close_blocking();

    let info = read_lines(&tmp.path().join("info.log"));
    assert_eq!(info.len(), 1);
    assert!(info[0].ends_with("shown"));

    let debug = std::fs::read_to_string(tmp.path().join("debug.log")).unwrap_or_default();
    assert!(!debug.contains("hidden"));
}

#[test]
fn each_level_lands_in_its_own_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let logger = file_logger(tmp.path(), WriteMode::Synchronous);

    logger.error("e").unwrap();
    logger.info("i").unwrap();
    logger.debug("d").unwrap();

    for (file, level) in [("error.log", "ERROR"), ("info.log", "INFO"), ("debug.log", "DEBUG")] {
        let lines = read_lines(&tmp.path().join(file));
        assert_eq!(lines.len(), 1, "{}", file);
        assert!(lines[0].contains(&format!("[test] {} ", level)), "{}", lines[0]);
        assert!(!lines[0].contains("\x1b["));
    }
}

#[test]
fn mark_writes_json_metric_line() {
    let tmp = tempfile::TempDir::new().unwrap();
    let logger = file_logger(tmp.path(), WriteMode::Asynchronous);

    logger.mark("request").unwrap();
    logger.close_blocking();

    let lines = read_lines(&tmp.path().join("metrics.log"));
    assert_eq!(lines.len(), 1);
    let value: Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(value["tags"], json!(["mark"]));
    assert_eq!(value["service"], json!("request"));
    assert_eq!(value["metric"], json!(1));
    assert_eq!(value["app_name"], json!("test"));
}

#[test]
fn metrics_go_to_console_without_dir() {
    let (logger, console) = console_logger(Options::new().name("svc"));

    logger.gauge("queue_depth", 12.5).unwrap();
    logger.duration("render", 40.0).unwrap();

    let lines = console.lines();
    assert_eq!(lines.len(), 2);
    let gauge: Value = serde_json::from_str(lines[0].trim_end()).unwrap();
    assert_eq!(gauge["tags"], json!(["gauge"]));
    assert_eq!(gauge["metric"], json!(12.5));
    let time: Value = serde_json::from_str(lines[1].trim_end()).unwrap();
    assert_eq!(time["tags"], json!(["time"]));
    assert_eq!(time["service"], json!("render"));
    assert_eq!(time["metric"], json!(40));
}

#[test]
fn disabled_metrics_emit_nothing() {
    let (logger, console) = console_logger(Options::new().metrics(false));

    logger.mark("ignored").unwrap();
    logger.gauge("ignored", 3.0).unwrap();

    assert!(console.lines().is_empty());
}

#[test]
fn metrics_ignore_level_threshold() {
    let (logger, console) = console_logger(Options::new().level("error").colors(false));

    logger.info("dropped").unwrap();
    logger.mark("kept").unwrap();

    let lines = console.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("\"kept\""));
}

#[test]
fn console_lines_are_colored_when_enabled() {
    let (logger, console) = console_logger(Options::new().name("svc"));
    logger.error("boom").unwrap();

    let (plain_logger, plain) = console_logger(Options::new().name("svc").colors(false));
    plain_logger.error("boom").unwrap();

    assert!(console.lines()[0].contains("\x1b["));
    assert!(plain.lines()[0].ends_with(" [svc] ERROR boom\n"));
}

#[test]
fn unknown_level_logs_everything() {
    let (logger, console) = console_logger(Options::new().level("chatty").colors(false));

    for level in Level::ALL {
        logger.log(level, "x").unwrap();
    }

    assert_eq!(console.lines().len(), 3);
}

#[test]
fn reconfigure_replaces_everything() {
    let (logger, _console) = console_logger(Options::new().name("first").level("error"));

    logger.reconfigure(Options::new().metrics(false)).unwrap();

    let config = logger.config();
    assert_ne!(config.name, "first");
    assert_eq!(config.level, None);
    assert!(!config.metrics);
    assert!(config.colors);
}

#[test]
fn invalid_dir_fails_reconfigure_and_keeps_old_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    let occupied = tmp.path().join("file");
    std::fs::write(&occupied, "").unwrap();
    let (logger, _console) = console_logger(Options::new().name("kept"));

    let result = logger.reconfigure(Options::new().dir(&occupied));

    assert!(result.is_err());
    assert_eq!(logger.config().name, "kept");
    assert_eq!(logger.config().dir, None);
}

#[test]
fn removed_log_dir_is_recreated() {
    let tmp = tempfile::TempDir::new().unwrap();
    let dir = tmp.path().join("gone");
    let (logger, console) = console_logger(Options::new().dir(&dir));
    std::fs::remove_dir_all(&dir).unwrap();

    logger.info("back").unwrap();
    logger.flush().unwrap();

    let lines = read_lines(&dir.join("info.log"));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("INFO back"));
    assert!(console.lines().is_empty());
}

#[test]
fn unopenable_target_fails_the_write() {
    let tmp = tempfile::TempDir::new().unwrap();
    let dir = tmp.path().join("taken");
    let (logger, console) = console_logger(Options::new().dir(&dir));
    std::fs::remove_dir_all(&dir).unwrap();
    std::fs::write(&dir, "").unwrap();

    assert!(logger.info("nowhere").is_err());
    assert!(console.lines().is_empty());
    assert_eq!(logger.opened_sinks(), 0);
}

#[test]
fn timer_reports_elapsed_milliseconds() {
    let tmp = tempfile::TempDir::new().unwrap();
    let logger = file_logger(tmp.path(), WriteMode::Synchronous);

    logger
        .time(|timer| {
            std::thread::sleep(std::time::Duration::from_millis(50));
            timer.done("op")
        })
        .unwrap();

    let lines = read_lines(&tmp.path().join("metrics.log"));
    assert_eq!(lines.len(), 1);
    let value: Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(value["tags"], json!(["time"]));
    assert_eq!(value["service"], json!("op"));
    let elapsed = value["metric"].as_f64().unwrap();
    assert!((50.0..5_000.0).contains(&elapsed), "elapsed={}", elapsed);
}

#[test]
fn timer_may_fire_many_times_or_never() {
    let (logger, console) = console_logger(Options::new());

    logger.time(|_| {});
    logger.time(|timer| {
        timer.done("first").unwrap();
        timer.done("second").unwrap();
    });

    let services: Vec<Value> = console
        .lines()
        .iter()
        .map(|line| serde_json::from_str::<Value>(line.trim_end()).unwrap()["service"].clone())
        .collect();
    assert_eq!(services, vec![json!("first"), json!("second")]);
}
