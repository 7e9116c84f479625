use std::process::ExitCode;

use clap::Args;
use lumber::Logger;

#[derive(Args, Debug)]
pub struct MarkCmd {
    #[arg(index = 1, help = "Metric name.")]
    pub name: String,
}

impl MarkCmd {
    pub fn run(&self, logger: &Logger) -> eyre::Result<ExitCode> {
        logger.mark(&self.name)?;
        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Args, Debug)]
pub struct GaugeCmd {
    #[arg(index = 1, help = "Metric name.")]
    pub name: String,

    #[arg(index = 2, allow_hyphen_values = true, help = "Sampled value.")]
    pub value: f64,
}

impl GaugeCmd {
    pub fn run(&self, logger: &Logger) -> eyre::Result<ExitCode> {
        logger.gauge(&self.name, self.value)?;
        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Args, Debug)]
pub struct DurationCmd {
    #[arg(index = 1, help = "Metric name.")]
    pub name: String,

    #[arg(index = 2, value_name = "MS", help = "Duration in milliseconds.")]
    pub millis: f64,
}

impl DurationCmd {
    pub fn run(&self, logger: &Logger) -> eyre::Result<ExitCode> {
        logger.duration(&self.name, self.millis)?;
        Ok(ExitCode::SUCCESS)
    }
}
