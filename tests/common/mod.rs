#![allow(dead_code)]

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use lumber::{Builder, LogSink, Logger, Options, WriteMode};

/// Console stand-in that keeps every line in memory.
#[derive(Clone, Default)]
pub struct Capture {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Capture {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl LogSink for Capture {
    fn write_line(&self, line: &str) -> eyre::Result<()> {
        self.lines.lock().unwrap().push(line.to_string());
        Ok(())
    }

    fn flush(&self) -> eyre::Result<()> {
        Ok(())
    }
}

pub fn file_logger(dir: &Path, mode: WriteMode) -> Logger {
    Builder::new()
        .with_options(Options::new().name("test").dir(dir))
        .with_mode(mode)
        .build()
        .unwrap()
}

pub fn console_logger(options: Options) -> (Logger, Capture) {
    let capture = Capture::default();
    let logger = Builder::new()
        .with_options(options)
        .with_console_sink(capture.clone())
        .build()
        .unwrap();
    (logger, capture)
}

pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|line| line.to_string())
        .collect()
}
