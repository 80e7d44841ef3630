mod ai;
mod config;
mod db;
mod ledger;
mod logging;
mod models;
mod quota;
mod run;
mod session;
mod ui;
mod validate;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::ai::{GeminiClient, ReceiptAi, ReqwestTransport, Unconfigured};
use crate::config::{AiConfig, AppConfig};
use crate::logging::LogTarget;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args: Vec<String> = std::env::args().collect();

    let dirs = project_dirs()?;
    let config = AppConfig::load(&dirs.config).context("Failed to load configuration")?;

    let interactive = args.len() == 1;
    let target = if interactive {
        LogTarget::File(dirs.data.join("snapledger.log"))
    } else {
        LogTarget::Stderr
    };
    logging::init_logging(&config.logging, target)?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let db = db::Database::open(&dirs.data.join("snapledger.db"))?;
    let ai = build_ai(&config.ai)?;
    let mut session = session::Session::new(Box::new(db), quota::QuotaTracker::default());

    tracing::info!(version = env!("CARGO_PKG_VERSION"), interactive, "starting");

    if interactive {
        let worker = ui::worker::Worker::new(Arc::clone(&ai), runtime.handle().clone());
        run::as_tui(&mut session, &worker)
    } else {
        run::as_cli(&args, &mut session, ai.as_ref(), &runtime)
    }
}

fn build_ai(config: &AiConfig) -> Result<Arc<dyn ReceiptAi>> {
    let Some(api_key) = config.api_key.clone() else {
        tracing::warn!("no API key configured, AI features disabled");
        return Ok(Arc::new(Unconfigured));
    };
    let transport = ReqwestTransport::with_timeout(Duration::from_secs(config.timeout_secs))?;
    let client = match &config.base_url {
        Some(url) => GeminiClient::with_base_url(transport, api_key, &config.model, url),
        None => GeminiClient::new(transport, api_key, &config.model),
    };
    tracing::debug!(model = %config.model, "AI client ready");
    Ok(Arc::new(client))
}

struct Dirs {
    data: PathBuf,
    config: PathBuf,
}

fn project_dirs() -> Result<Dirs> {
    let proj_dirs = directories::ProjectDirs::from("com", "snapledger", "SnapLedger")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let dirs = Dirs {
        data: proj_dirs.data_dir().to_path_buf(),
        config: proj_dirs.config_dir().to_path_buf(),
    };
    ensure_dir(&dirs.data)?;
    Ok(dirs)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create data directory: {}", dir.display()))
}
