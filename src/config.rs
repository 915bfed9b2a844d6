// config.rs

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "ttyhistd", version, about = "Keeps per-terminal command line history for the tty driver")]
pub struct Config {
    /// Directory holding the terminal device files
    #[arg(long, env = "TTYHIST_DEV_DIR", default_value = "/dev")]
    pub dev_dir: PathBuf,

    /// Where requests come from, `-` for stdin
    #[arg(long, env = "TTYHIST_REQUESTS", default_value = "-")]
    pub requests: PathBuf,

    /// Requests arriving this soon after startup are stale and get dropped
    #[arg(long, default_value_t = 2)]
    pub settle_secs: u64,

    /// Pause after a failed read before trying again
    #[arg(long, default_value_t = 1000)]
    pub retry_delay_ms: u64,

    /// More logging (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn reads_stdin(&self) -> bool {
        self.requests.as_os_str() == "-"
    }
}
