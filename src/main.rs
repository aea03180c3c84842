use clap::Parser;
use copytrade::config::AppConfig;
use copytrade::coordination::{install_signal_handlers, shutdown_channel};
use copytrade::error::{CopyTradeError, Result};
use copytrade::services::{Collaborators, CopyTradingTask};
use copytrade::{Scheduler, SchedulerConfig};
use std::path::PathBuf;
use tracing::{error, info};

mod main_runtime;

use main_runtime::init_logging;

#[derive(Parser)]
#[command(name = "copytrade")]
#[command(version = "0.1.0")]
#[command(about = "Polymarket copy-trading agent", long_about = None)]
struct Cli {
    /// Directory holding settings.{toml,yaml,json}
    #[arg(short, long, env = "COPYTRADE_CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Force demo mode (synthetic trades and fills)
    #[arg(long)]
    demo: bool,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(&cli.config_dir)?;
    if cli.demo {
        config.runtime.demo_mode = true;
    }
    config.validate().map_err(CopyTradeError::InvalidConfig)?;

    init_logging(&config.logging);

    info!(
        config_dir = %cli.config_dir.display(),
        leaders = config.leaders.wallets.len(),
        demo_mode = config.runtime.demo_mode,
        "Copy-trading agent starting"
    );

    let task = CopyTradingTask::new(&config, Collaborators::builtin(&config));
    let mut scheduler = Scheduler::new(task, SchedulerConfig::from(&config.runtime));

    let result = if cli.once {
        scheduler.run_once().await
    } else {
        let (handle, cancel) = shutdown_channel();
        install_signal_handlers(handle);
        scheduler.run(cancel).await
    };

    match &result {
        Ok(()) => info!("Copy-trading agent stopped"),
        Err(e) => error!("Copy-trading agent exited with error: {}", e),
    }
    result
}
