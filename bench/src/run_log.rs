//! Per-run progress log artifact.
//!
//! Unlike tracing diagnostics, the run log is product output: one append-only
//! file per run, opened at run start and flushed at the end. The log value is
//! owned by the run that opened it; there is no process-global log state.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

/// Append-only timestamped log for one run.
pub struct RunLog {
    path: PathBuf,
    file: File,
}

impl RunLog {
    /// Open a fresh log file under `logs_dir`.
    pub fn create(logs_dir: &Path) -> Result<Self> {
        fs::create_dir_all(logs_dir)
            .with_context(|| format!("create logs dir {}", logs_dir.display()))?;
        let name = format!("run-{}.log", Utc::now().format("%Y%m%d_%H%M%S"));
        let path = logs_dir.join(name);
        let file =
            File::create(&path).with_context(|| format!("create log {}", path.display()))?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&mut self, message: &str) {
        self.line("INFO", message);
    }

    pub fn warn(&mut self, message: &str) {
        self.line("WARN", message);
    }

    pub fn error(&mut self, message: &str) {
        self.line("ERROR", message);
    }

    /// Progress logging is best-effort: a failed write must not abort the
    /// unit of work that produced the message.
    fn line(&mut self, level: &str, message: &str) {
        let _ = writeln!(self.file, "{} [{level}] {message}", Utc::now().to_rfc3339());
    }

    pub fn flush(&mut self) -> Result<()> {
        self.file
            .flush()
            .with_context(|| format!("flush log {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_timestamped_levelled_lines() {
        let temp = tempdir().expect("tempdir");
        let mut log = RunLog::create(temp.path()).expect("create log");
        log.info("starting");
        log.warn("odd artifact");
        log.error("unit failed");
        log.flush().expect("flush");

        let contents = fs::read_to_string(log.path()).expect("read log");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("[INFO] starting"));
        assert!(lines[1].contains("[WARN] odd artifact"));
        assert!(lines[2].contains("[ERROR] unit failed"));
    }

    #[test]
    fn each_run_gets_its_own_file() {
        let temp = tempdir().expect("tempdir");
        let log = RunLog::create(temp.path()).expect("create log");
        assert!(log.path().starts_with(temp.path()));
        assert!(
            log.path()
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("run-") && name.ends_with(".log"))
        );
    }
}
