use std::{
    path::Path,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use eyre::Context;
use log::Log;

use super::{
    formatters::DefaultFormatter,
    lifecycle::{Latch, Lifecycle, LifecycleState},
    registry::SinkRegistry,
    sinks::{append_once, ConsoleSink},
    strategy::{dispatch, Dispatch, Flusher, Job, WriteMode},
    Category, LogFormatter, LogSink, MetricKind, Target,
};
use crate::{
    config::{Config, ConfigStore, Options},
    level::{admits, Level},
};

struct Shared {
    config: ConfigStore,
    mode: Mutex<WriteMode>,
    formatter: Box<dyn LogFormatter>,
    console: Box<dyn LogSink>,
    registry: SinkRegistry,
    lifecycle: Arc<Lifecycle>,
    flusher: Flusher,
}

/// Handle to one logging context. Clones share the same configuration,
/// sinks and lifecycle.
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
}

impl Logger {
    /// Logger with default configuration, writing to stdout.
    pub fn new() -> eyre::Result<Self> {
        Builder::new().build()
    }

    pub fn error(&self, message: impl AsRef<str>) -> eyre::Result<()> {
        self.log(Level::Error, message.as_ref())
    }

    pub fn info(&self, message: impl AsRef<str>) -> eyre::Result<()> {
        self.log(Level::Info, message.as_ref())
    }

    pub fn debug(&self, message: impl AsRef<str>) -> eyre::Result<()> {
        self.log(Level::Debug, message.as_ref())
    }

    pub fn log(&self, level: Level, message: &str) -> eyre::Result<()> {
        let config = self.shared.config.snapshot();
        if !admits(config.level, level) {
            return Ok(());
        }

        let target = Target::resolve(level.into(), &config);
        let line = self
            .shared
            .formatter
            .format_log(level, message, &config, &target);
        self.write(&target, line)
    }

    /// Unit counter metric.
    pub fn mark(&self, name: &str) -> eyre::Result<()> {
        self.metric(MetricKind::Mark, name, 1.0)
    }

    pub fn gauge(&self, name: &str, value: f64) -> eyre::Result<()> {
        self.metric(MetricKind::Gauge, name, value)
    }

    pub fn duration(&self, name: &str, millis: f64) -> eyre::Result<()> {
        self.metric(MetricKind::Time, name, millis)
    }

    fn metric(&self, kind: MetricKind, name: &str, value: f64) -> eyre::Result<()> {
        let config = self.shared.config.snapshot();
        if !config.metrics {
            return Ok(());
        }

        let target = Target::resolve(Category::Metrics, &config);
        let line = self.shared.formatter.format_metric(kind, name, value, &config);
        self.write(&target, line)
    }

    /// Runs `block` with a timer started now. Every `Timer::done` call inside
    /// (or later, from a clone) emits its own `time` metric.
    pub fn time<F, R>(&self, block: F) -> R
    where
        F: FnOnce(&Timer) -> R,
    {
        let timer = self.timer();
        block(&timer)
    }

    pub fn timer(&self) -> Timer {
        Timer {
            logger: self.clone(),
            start: Instant::now(),
        }
    }

    /// Replaces the whole configuration. On error the previous one stays active.
    pub fn reconfigure(&self, options: Options) -> eyre::Result<()> {
        let config = options.build().context("Invalid logger configuration")?;
        tracing::debug!(target: "lumber", "reconfigured: {:?}", config);
        self.shared.config.replace(config);
        Ok(())
    }

    pub fn config(&self) -> Arc<Config> {
        self.shared.config.snapshot()
    }

    pub fn set_synchronous(&self) {
        self.set_mode(WriteMode::Synchronous)
    }

    pub fn set_asynchronous(&self) {
        self.set_mode(WriteMode::Asynchronous)
    }

    fn set_mode(&self, mode: WriteMode) {
        *self.shared.mode.lock().unwrap_or_else(|e| e.into_inner()) = mode;
    }

    pub fn mode(&self) -> WriteMode {
        *self.shared.mode.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> LifecycleState {
        self.shared.lifecycle.state()
    }

    /// Number of files opened over the lifetime of this logger.
    pub fn opened_sinks(&self) -> usize {
        self.shared.registry.opened()
    }

    /// Writes every buffered line now, blocking until done.
    pub fn flush(&self) -> eyre::Result<()> {
        for sink in self.shared.registry.sinks() {
            sink.drain()?;
        }
        self.shared.console.flush()
    }

    fn write(&self, target: &Target, line: String) -> eyre::Result<()> {
        let path = match target {
            Target::Console => return self.shared.console.write_line(&line),
            Target::File(path) => path,
        };

        match dispatch(self.mode(), self.state()) {
            Dispatch::Fallback => append_once(path, &line),
            Dispatch::Queue => self.queue(path, line),
            Dispatch::Direct => match self.shared.registry.acquire(path)? {
                Some(sink) => sink.write_line(&line),
                None => append_once(path, &line),
            },
        }
    }

    fn queue(&self, path: &Path, line: String) -> eyre::Result<()> {
        let Some(sink) = self.shared.registry.acquire(path)? else {
            return append_once(path, &line);
        };

        if sink.enqueue(line)? {
            self.shared.flusher.schedule(Job::Flush(sink));
        }

        Ok(())
    }

    /// Starts draining. `on_complete` runs once every open file was flushed
    /// and released; calling this again is harmless and each call gets its own
    /// notification.
    pub fn shutdown<F>(&self, on_complete: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if !self.shared.lifecycle.begin_shutdown(Box::new(on_complete)) {
            return;
        }

        let sinks = self.shared.registry.seal();
        tracing::debug!(target: "lumber", "draining {} sink(s)", sinks.len());

        if let Err(err) = self.shared.console.flush() {
            tracing::debug!(target: "lumber", "console flush failed: {:#}", err);
        }

        let lifecycle = Arc::clone(&self.shared.lifecycle);
        let latch = Arc::new(Latch::new(sinks.len(), Box::new(move || lifecycle.finish())));

        for sink in sinks {
            self.shared
                .flusher
                .schedule(Job::Close(sink, Arc::clone(&latch)));
        }
    }

    pub async fn close(&self) {
        let (sender, receiver) = tokio::sync::oneshot::channel();
        self.shutdown(move || {
            let _ = sender.send(());
        });

        // NOTE: the sender is only dropped unsent if the flusher died mid-close.
        let _ = receiver.await;
    }

    pub fn close_blocking(&self) {
        let (sender, receiver) = std::sync::mpsc::channel();
        self.shutdown(move || {
            let _ = sender.send(());
        });

        let _ = receiver.recv();
    }

    /// Installs a clone of this logger as the global `log` logger.
    pub fn init(&self) -> eyre::Result<()> {
        log::set_max_level(log::LevelFilter::Trace);
        log::set_boxed_logger(Box::new(self.clone())).context("Failed registering boxed logger")?;

        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        admits(self.config().level, metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = record.args().to_string();
        if let Err(err) = Logger::log(self, record.level().into(), &message) {
            tracing::error!(target: "lumber", "dropped log record: {:#}", err);
        }
    }

    fn flush(&self) {
        if let Err(err) = Logger::flush(self) {
            tracing::error!(target: "lumber", "flush failed: {:#}", err);
        }
    }
}

/// Started by `Logger::time`/`Logger::timer`.
#[derive(Clone)]
pub struct Timer {
    logger: Logger,
    start: Instant,
}

impl Timer {
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Emits a `time` metric named `name` with the whole milliseconds elapsed so far.
    pub fn done(&self, name: &str) -> eyre::Result<()> {
        let millis = self.elapsed().as_millis() as f64;
        self.logger.duration(name, millis)
    }
}

pub struct Builder {
    options: Options,
    mode: WriteMode,
    formatter: Box<dyn LogFormatter>,
    console: Box<dyn LogSink>,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            options: Options::new(),
            mode: WriteMode::Asynchronous,
            formatter: Box::new(DefaultFormatter::new()),
            console: Box::new(ConsoleSink::new()),
        }
    }

    pub fn with_options(self, options: Options) -> Self {
        Self { options, ..self }
    }

    pub fn with_mode(self, mode: WriteMode) -> Self {
        Self { mode, ..self }
    }

    pub fn with_formatter(self, formatter: impl LogFormatter + 'static) -> Self {
        Self {
            formatter: Box::new(formatter),
            ..self
        }
    }

    /// Replaces stdout as the console target.
    pub fn with_console_sink(self, sink: impl LogSink + 'static) -> Self {
        Self {
            console: Box::new(sink),
            ..self
        }
    }

    pub fn build(self) -> eyre::Result<Logger> {
        let config = self
            .options
            .build()
            .context("Invalid logger configuration")?;

        let shared = Shared {
            config: ConfigStore::new(config),
            mode: Mutex::new(self.mode),
            formatter: self.formatter,
            console: self.console,
            registry: SinkRegistry::new(),
            lifecycle: Arc::new(Lifecycle::new()),
            flusher: Flusher::spawn()?,
        };

        Ok(Logger {
            shared: Arc::new(shared),
        })
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
