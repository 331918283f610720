//! Persistent state for resumable runs.
//!
//! Critiques live in one JSON collection rewritten in full after every append,
//! so each recorded pair is crash-safe the moment the append returns. Solution
//! documents are one file per solver model. Resume state is derived entirely
//! from what is on disk; there is no separate checkpoint.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::catalog::pair_key;
use crate::verdict::Verdict;

/// Document-root marker a persisted solution must contain to count as present.
pub const SOLUTION_MARKER: &str = "<html";

/// Recorded outcome of one (solver, judge) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Critique {
    pub solver: String,
    pub solver_slug: String,
    pub judge: String,
    pub verdict: Verdict,
    pub explanation: String,
}

impl Critique {
    pub fn key(&self) -> String {
        pair_key(&self.solver, &self.judge)
    }
}

/// Snapshot of the prompts and model lists at run start, persisted to
/// `run_meta.json`. Descriptive output only; never consulted for resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub started_at: String,
    /// Short content hash of the scheduling task for reproducibility tracking.
    pub prompt_hash: String,
    pub scheduling_prompt: String,
    pub solver_prompt: String,
    pub judge_template: String,
    pub solvers: Vec<String>,
    pub judges: Vec<String>,
}

/// Compute a short hash of content for tracking prompt revisions.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}

/// On-disk store for solutions, critiques, and run metadata.
pub struct ResultStore {
    root: PathBuf,
    critiques: Vec<Critique>,
    seen_pairs: HashSet<String>,
}

impl ResultStore {
    /// Open the store rooted at `root`, creating directories and loading any
    /// previously persisted critique collection.
    ///
    /// A critique file that cannot be read or parsed is discarded with a
    /// warning; prior corrupt state is never partially trusted.
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root.join("solutions"))
            .with_context(|| format!("create store dirs under {}", root.display()))?;

        let critiques_path = root.join("critiques.json");
        let critiques = if critiques_path.exists() {
            match fs::read_to_string(&critiques_path)
                .map_err(anyhow::Error::from)
                .and_then(|contents| {
                    serde_json::from_str::<Vec<Critique>>(&contents).map_err(anyhow::Error::from)
                }) {
                Ok(list) => {
                    debug!(count = list.len(), "loaded critique collection");
                    list
                }
                Err(err) => {
                    warn!(
                        path = %critiques_path.display(),
                        error = %err,
                        "critique collection unreadable, starting empty"
                    );
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let seen_pairs = critiques.iter().map(Critique::key).collect();
        Ok(Self {
            root: root.to_path_buf(),
            critiques,
            seen_pairs,
        })
    }

    /// Whether a critique for this pair key is already recorded.
    pub fn has_pair(&self, key: &str) -> bool {
        self.seen_pairs.contains(key)
    }

    pub fn critiques(&self) -> &[Critique] {
        &self.critiques
    }

    /// Append one critique and durably rewrite the whole collection.
    pub fn append_critique(&mut self, critique: Critique) -> Result<()> {
        self.seen_pairs.insert(critique.key());
        self.critiques.push(critique);
        let contents =
            serde_json::to_string_pretty(&self.critiques).context("serialize critiques")?;
        let path = self.root.join("critiques.json");
        fs::write(&path, format!("{contents}\n"))
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    pub fn solution_path(&self, slug: &str) -> PathBuf {
        self.root.join("solutions").join(format!("{slug}.html"))
    }

    /// Whether a usable solution artifact exists for this slug.
    ///
    /// Present means: the file exists, is non-empty, and contains the document
    /// marker case-insensitively. Anything else is absent and the solver will
    /// be re-invoked, overwriting the file.
    pub fn has_solution(&self, slug: &str) -> bool {
        match fs::read_to_string(self.solution_path(slug)) {
            Ok(contents) => !contents.is_empty() && contains_marker(&contents),
            Err(_) => false,
        }
    }

    pub fn load_solution(&self, slug: &str) -> Result<String> {
        let path = self.solution_path(slug);
        fs::read_to_string(&path).with_context(|| format!("read solution {}", path.display()))
    }

    /// Persist the canonical solution artifact for a model.
    pub fn write_solution(&self, slug: &str, text: &str) -> Result<()> {
        let path = self.solution_path(slug);
        fs::write(&path, text).with_context(|| format!("write solution {}", path.display()))
    }

    /// Overwrite the run metadata snapshot.
    pub fn write_run_meta(&self, meta: &RunMeta) -> Result<()> {
        let contents = serde_json::to_string_pretty(meta).context("serialize run meta")?;
        let path = self.root.join("run_meta.json");
        fs::write(&path, format!("{contents}\n"))
            .with_context(|| format!("write {}", path.display()))
    }
}

/// Whether text contains the document-root marker, case-insensitively.
pub fn contains_marker(text: &str) -> bool {
    text.to_lowercase().contains(SOLUTION_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn critique(solver: &str, judge: &str, verdict: Verdict) -> Critique {
        Critique {
            solver: solver.to_string(),
            solver_slug: crate::catalog::model_slug(solver),
            judge: judge.to_string(),
            verdict,
            explanation: "because".to_string(),
        }
    }

    #[test]
    fn opens_empty_without_prior_file() {
        let temp = tempdir().expect("tempdir");
        let store = ResultStore::open(temp.path()).expect("open");
        assert!(store.critiques().is_empty());
        assert!(!store.has_pair("a|b"));
    }

    #[test]
    fn append_persists_and_reload_restores_membership() {
        let temp = tempdir().expect("tempdir");
        let mut store = ResultStore::open(temp.path()).expect("open");
        store
            .append_critique(critique("s", "j", Verdict::Affirmative))
            .expect("append");
        assert!(store.has_pair("s|j"));

        let reloaded = ResultStore::open(temp.path()).expect("reopen");
        assert_eq!(reloaded.critiques().len(), 1);
        assert!(reloaded.has_pair("s|j"));
        assert!(!reloaded.has_pair("s|other"));
    }

    #[test]
    fn append_rewrites_whole_collection() {
        let temp = tempdir().expect("tempdir");
        let mut store = ResultStore::open(temp.path()).expect("open");
        store
            .append_critique(critique("s1", "j", Verdict::Negative))
            .expect("append");
        store
            .append_critique(critique("s2", "j", Verdict::Affirmative))
            .expect("append");

        let contents =
            fs::read_to_string(temp.path().join("critiques.json")).expect("read collection");
        let parsed: Vec<Critique> = serde_json::from_str(&contents).expect("parse collection");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].solver, "s1");
        assert_eq!(parsed[1].solver, "s2");
    }

    #[test]
    fn corrupt_collection_is_discarded_with_empty_start() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("critiques.json"), "{not json").expect("write corrupt");
        let store = ResultStore::open(temp.path()).expect("open");
        assert!(store.critiques().is_empty());
    }

    #[test]
    fn wrong_shape_collection_is_discarded() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("critiques.json"), "{\"solver\": \"s\"}")
            .expect("write wrong shape");
        let store = ResultStore::open(temp.path()).expect("open");
        assert!(store.critiques().is_empty());
    }

    #[test]
    fn solution_membership_requires_marker() {
        let temp = tempdir().expect("tempdir");
        let store = ResultStore::open(temp.path()).expect("open");

        assert!(!store.has_solution("missing"));

        store.write_solution("empty", "").expect("write");
        assert!(!store.has_solution("empty"));

        store
            .write_solution("markerless", "just some text")
            .expect("write");
        assert!(!store.has_solution("markerless"));

        store
            .write_solution("upper", "<HTML><body>ok</body></HTML>")
            .expect("write");
        assert!(store.has_solution("upper"));
    }

    #[test]
    fn write_then_load_roundtrips_solution() {
        let temp = tempdir().expect("tempdir");
        let store = ResultStore::open(temp.path()).expect("open");
        store
            .write_solution("model_a", "<html>schedule</html>")
            .expect("write");
        assert!(store.has_solution("model_a"));
        let text = store.load_solution("model_a").expect("load");
        assert_eq!(text, "<html>schedule</html>");
    }

    #[test]
    fn run_meta_is_overwritten() {
        let temp = tempdir().expect("tempdir");
        let store = ResultStore::open(temp.path()).expect("open");
        let mut meta = RunMeta {
            started_at: "t1".to_string(),
            prompt_hash: content_hash("task"),
            scheduling_prompt: "task".to_string(),
            solver_prompt: "solve".to_string(),
            judge_template: "judge".to_string(),
            solvers: vec!["s".to_string()],
            judges: vec!["j".to_string()],
        };
        store.write_run_meta(&meta).expect("write meta");
        meta.started_at = "t2".to_string();
        store.write_run_meta(&meta).expect("overwrite meta");

        let contents = fs::read_to_string(temp.path().join("run_meta.json")).expect("read meta");
        let parsed: RunMeta = serde_json::from_str(&contents).expect("parse meta");
        assert_eq!(parsed.started_at, "t2");
    }

    #[test]
    fn content_hash_is_short_and_deterministic() {
        assert_eq!(content_hash("abc"), content_hash("abc"));
        assert_ne!(content_hash("abc"), content_hash("abd"));
        assert_eq!(content_hash("abc").len(), 16);
    }
}
