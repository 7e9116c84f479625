use chrono::{SecondsFormat, Utc};
use serde_json::{json, Number, Value};
use yansi::{Condition, Paint, Style};

use super::{LogFormatter, MetricKind, Target};
use crate::{config::Config, level::Level};

#[derive(Debug, Default, Clone)]
pub struct DefaultFormatter {}

impl DefaultFormatter {
    pub fn new() -> Self {
        Self {}
    }

    fn timestamp(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn style(&self, level: Level, bold: bool) -> Style {
        let style = match level {
            Level::Error => Style::new().red(),
            Level::Debug => Style::new().yellow(),
            Level::Info => Style::new(),
        };
        let style = if bold { style.bold() } else { style };

        style.whenever(Condition::ALWAYS)
    }

    fn paint(&self, text: &str, level: Level, bold: bool) -> String {
        text.paint(self.style(level, bold)).to_string()
    }
}

// Metric values that are whole numbers are written as integers so `mark` emits `1`, not `1.0`.
fn metric_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

impl LogFormatter for DefaultFormatter {
    fn format_log(&self, level: Level, message: &str, config: &Config, target: &Target) -> String {
        let prefix = format!("{} [{}]", self.timestamp(), config.name);
        let level_token = level.as_str().to_uppercase();

        if config.colors && target.is_console() {
            format!(
                "{} {} {}\n",
                self.paint(&prefix, level, false),
                self.paint(&level_token, level, true),
                self.paint(message, level, false),
            )
        } else {
            format!("{} {} {}\n", prefix, level_token, message)
        }
    }

    fn format_metric(&self, kind: MetricKind, name: &str, value: f64, config: &Config) -> String {
        let mut line = json!({
            "@timestamp": self.timestamp(),
            "app_name": config.name,
            "tags": [kind.as_str()],
            "service": name,
            "metric": metric_value(value),
        })
        .to_string();
        line.push('\n');
        line
    }
}
