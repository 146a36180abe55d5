use std::fs;

use log::{Level, LevelFilter, Log, Record};
use unwind::config::LoggingConfig;
use unwind::constants::MAX_MEMORY_LOG_ENTRIES;
use unwind::logger::Logger;

#[test]
fn test_memory_logger_newest_first() {
    let logger = Logger::new();
    assert!(!logger.is_file_enabled());

    logger.log("first".to_string());
    logger.log("second".to_string());

    let logs = logger.get_logs();
    assert_eq!(logs.len(), 2);
    assert!(logs[0].ends_with("second"));
    assert!(logs[1].ends_with("first"));
    assert!(logs[0].starts_with('['));

    logger.clear();
    assert!(logger.get_logs().is_empty());
}

#[test]
fn test_memory_logger_is_bounded() {
    let logger = Logger::new();
    for n in 0..MAX_MEMORY_LOG_ENTRIES + 5 {
        logger.log(format!("entry {n}"));
    }

    let logs = logger.get_logs();
    assert_eq!(logs.len(), MAX_MEMORY_LOG_ENTRIES);
    assert!(logs[0].ends_with(&format!("entry {}", MAX_MEMORY_LOG_ENTRIES + 4)));
    assert!(logs.last().unwrap().ends_with("entry 5"));
}

#[test]
fn test_disabled_config_logs_to_memory_only() {
    let logger = Logger::from_config(&LoggingConfig::default()).unwrap();
    assert!(!logger.is_file_enabled());
    assert_eq!(logger.log_file(), None);
}

#[test]
fn test_dispatch_writes_memory_and_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs").join("unwind.log");
    let logger = Logger::with_file(&path);
    assert_eq!(logger.log_file(), Some(path.as_path()));

    let (level, log) = logger.dispatch(LevelFilter::Info).unwrap().into_log();
    assert_eq!(level, LevelFilter::Info);

    log.log(
        &Record::builder()
            .args(format_args!("Pulled 3 journal records"))
            .level(Level::Info)
            .target("unwind::sync")
            .build(),
    );
    log.log(
        &Record::builder()
            .args(format_args!("too chatty"))
            .level(Level::Debug)
            .target("unwind::sync")
            .build(),
    );
    log.log(
        &Record::builder()
            .args(format_args!("pool internals"))
            .level(Level::Info)
            .target("sqlx::pool")
            .build(),
    );
    log.flush();

    let memory = logger.get_logs();
    assert_eq!(memory.len(), 1);
    assert!(memory[0].contains("INFO  Pulled 3 journal records"));

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("[unwind::sync] Pulled 3 journal records"));
    assert!(!content.contains("too chatty"));
    assert!(!content.contains("pool internals"));
}
