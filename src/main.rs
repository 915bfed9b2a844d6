// main.rs

use std::fs::File;
use std::io::Read;

use anyhow::Context;
use clap::Parser;

use ttyhist::config::Config;
use ttyhist::daemon::Daemon;
use ttyhist::feedback::DeviceSink;
use ttyhist::reaper::SignalProbe;
use ttyhist::source::LineSource;
use ttyhist::ttys::DeviceDirectory;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    // RUST_LOG directives win over -v
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(config.verbose);

    let ttys = DeviceDirectory::scan(&config.dev_dir)
        .with_context(|| format!("finding terminals in {}", config.dev_dir.display()))?;
    tracing::info!(ttys = ttys.len(), "ttyhistd starting");

    let reader: Box<dyn Read> = if config.reads_stdin() {
        Box::new(std::io::stdin().lock())
    } else {
        let file = File::open(&config.requests)
            .with_context(|| format!("opening {}", config.requests.display()))?;
        Box::new(file)
    };

    let mut source = LineSource::new(reader);
    let mut daemon = Daemon::new(ttys, SignalProbe, DeviceSink)
        .with_settle(config.settle())
        .with_retry_delay(config.retry_delay());
    daemon.run(&mut source).context("serving history requests")?;
    Ok(())
}
