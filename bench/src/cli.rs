//! CLI command implementations.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::client::{ChatClient, ClientOptions};
use crate::config::BenchConfig;
use crate::pipeline::run_benchmark;
use crate::run_log::RunLog;
use crate::store::ResultStore;

/// Execute the two-phase benchmark, resuming prior progress.
pub fn run(config_path: &Path, out_dir: &Path) -> Result<()> {
    let config = BenchConfig::load(config_path).context("load config")?;
    let api_key = config.api_key()?;
    debug!(
        solvers = config.models.solvers.len(),
        judges = config.models.judges.len(),
        "config loaded"
    );

    let client = ChatClient::new(ClientOptions {
        base_url: config.api.base_url.clone(),
        api_key,
        referer: config.api.referer.clone(),
        title: config.api.title.clone(),
        timeout: config.request_timeout(),
    })
    .context("build completion client")?;

    let mut store = ResultStore::open(out_dir).context("open result store")?;
    let mut log = RunLog::create(&out_dir.join("logs")).context("create run log")?;

    let summary = run_benchmark(&config, &client, &mut store, &mut log).context("run benchmark")?;
    log.flush().context("flush run log")?;

    println!(
        "run: solved={} reused={} failed={} judged={} skipped={} error_verdicts={}",
        summary.solved,
        summary.reused,
        summary.failed_solvers,
        summary.judged,
        summary.skipped_pairs,
        summary.error_verdicts
    );
    println!(
        "run: total_critiques={} critiques={} log={}",
        store.critiques().len(),
        out_dir.join("critiques.json").display(),
        log.path().display()
    );
    Ok(())
}

/// Print the configured solver and judge lists.
pub fn models(config_path: &Path) -> Result<()> {
    let config = BenchConfig::load(config_path).context("load config")?;
    println!("solvers:");
    for model in &config.models.solvers {
        println!("  {model}");
    }
    println!("judges:");
    for model in &config.models.judges {
        println!("  {model}");
    }
    Ok(())
}

/// Remove persisted solutions, critiques, metadata, and logs.
pub fn clean(out_dir: &Path) -> Result<()> {
    for dir in ["solutions", "logs"] {
        let path = out_dir.join(dir);
        if path.exists() {
            std::fs::remove_dir_all(&path)
                .with_context(|| format!("remove {}", path.display()))?;
        }
    }
    for file in ["critiques.json", "run_meta.json"] {
        let path = out_dir.join(file);
        if path.exists() {
            std::fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
        }
    }
    println!("clean: out_dir={}", out_dir.display());
    Ok(())
}
