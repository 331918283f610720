//! Two-phase benchmark orchestration.
//!
//! Phase one generates missing solutions; phase two has every judge critique
//! every solution. Both phases consult the store before each unit, so a
//! restarted process never repeats completed work. A failing unit is logged
//! and isolated at its own boundary; it never aborts the loop over the rest.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::catalog::{self, JudgeUnit, Solution};
use crate::client::Completion;
use crate::config::BenchConfig;
use crate::prompts;
use crate::run_log::RunLog;
use crate::store::{self, Critique, ResultStore, RunMeta};
use crate::verdict::{Verdict, parse_verdict};

/// Counters describing one completed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Solutions generated this run.
    pub solved: usize,
    /// Solutions reused from disk without a generation call.
    pub reused: usize,
    /// Solvers dropped from the run after a failed unit.
    pub failed_solvers: usize,
    /// Critiques appended this run, error verdicts included.
    pub judged: usize,
    /// Pairs skipped because a critique was already recorded.
    pub skipped_pairs: usize,
    /// Appended critiques whose verdict is `error`.
    pub error_verdicts: usize,
}

/// Run both phases over the configured model lists.
pub fn run_benchmark(
    config: &BenchConfig,
    client: &impl Completion,
    store: &mut ResultStore,
    log: &mut RunLog,
) -> Result<RunSummary> {
    let meta = RunMeta {
        started_at: Utc::now().to_rfc3339(),
        prompt_hash: store::content_hash(prompts::SCHEDULING_PROMPT),
        scheduling_prompt: prompts::SCHEDULING_PROMPT.to_string(),
        solver_prompt: prompts::solver_prompt(),
        judge_template: prompts::judge_template(),
        solvers: config.models.solvers.clone(),
        judges: config.models.judges.clone(),
    };
    store.write_run_meta(&meta).context("write run meta")?;

    let mut summary = RunSummary::default();
    let solutions = run_solve_phase(config, client, store, log, &mut summary);
    run_judge_phase(config, client, store, log, &solutions, &mut summary);

    info!(?summary, "run complete");
    log.info(&format!(
        "run complete: solved={} reused={} failed={} judged={} skipped={} error_verdicts={}",
        summary.solved,
        summary.reused,
        summary.failed_solvers,
        summary.judged,
        summary.skipped_pairs,
        summary.error_verdicts
    ));
    Ok(summary)
}

/// Generate or reload a solution for every solver item, in catalog order.
///
/// A solver whose call fails contributes nothing to the returned set and
/// therefore no judge pairs this run.
fn run_solve_phase(
    config: &BenchConfig,
    client: &impl Completion,
    store: &ResultStore,
    log: &mut RunLog,
    summary: &mut RunSummary,
) -> Vec<Solution> {
    let solver_prompt = prompts::solver_prompt();
    let items = catalog::solver_items(&config.models.solvers);
    log.info(&format!("solve phase: {} solver items", items.len()));

    let mut solutions = Vec::with_capacity(items.len());
    for item in items {
        if store.has_solution(&item.slug) {
            match store.load_solution(&item.slug) {
                Ok(text) => {
                    debug!(model = %item.model, "solution already on disk");
                    log.info(&format!(
                        "solution for {} already present, skipping generation",
                        item.model
                    ));
                    summary.reused += 1;
                    solutions.push(Solution {
                        model: item.model,
                        slug: item.slug,
                        text,
                    });
                    continue;
                }
                Err(err) => {
                    warn!(model = %item.model, error = %err, "existing solution unreadable, regenerating");
                    log.warn(&format!(
                        "could not read existing solution for {}: {err:#}",
                        item.model
                    ));
                }
            }
        }

        info!(model = %item.model, "requesting solution");
        log.info(&format!("solving with {}", item.model));
        match client.complete(
            &item.model,
            &solver_prompt,
            Some(config.budgets.solve_max_tokens),
        ) {
            Ok(text) => {
                if !store::contains_marker(&text) {
                    warn!(model = %item.model, "solution lacks document marker");
                    log.warn(&format!(
                        "solution from {} lacks document marker, keeping it for judging anyway",
                        item.model
                    ));
                }
                if let Err(err) = store.write_solution(&item.slug, &text) {
                    warn!(model = %item.model, error = %err, "could not persist solution, dropping solver");
                    log.error(&format!(
                        "could not persist solution for {}: {err:#}",
                        item.model
                    ));
                    summary.failed_solvers += 1;
                    continue;
                }
                summary.solved += 1;
                solutions.push(Solution {
                    model: item.model,
                    slug: item.slug,
                    text,
                });
            }
            Err(err) => {
                warn!(model = %item.model, error = %err, "solver call failed");
                log.error(&format!("solver {} failed: {err}", item.model));
                summary.failed_solvers += 1;
            }
        }
    }
    solutions
}

/// Judge every solution with every judge, skipping recorded pairs.
fn run_judge_phase(
    config: &BenchConfig,
    client: &impl Completion,
    store: &mut ResultStore,
    log: &mut RunLog,
    solutions: &[Solution],
    summary: &mut RunSummary,
) {
    let units = catalog::judge_units(solutions, &config.models.judges);
    log.info(&format!("judge phase: {} pairs", units.len()));

    for unit in units {
        let key = unit.key();
        if store.has_pair(&key) {
            debug!(key = %key, "critique already recorded");
            summary.skipped_pairs += 1;
            continue;
        }

        info!(solver = %unit.solution.model, judge = %unit.judge, "judging solution");
        log.info(&format!(
            "judging {} with {}",
            unit.solution.model, unit.judge
        ));
        let critique = judge_one(config, client, &unit);
        if critique.verdict == Verdict::Error {
            summary.error_verdicts += 1;
            log.error(&format!(
                "judgment {key} recorded as error: {}",
                critique.explanation
            ));
        }
        match store.append_critique(critique) {
            Ok(()) => summary.judged += 1,
            Err(err) => {
                warn!(key = %key, error = %err, "could not persist critique");
                log.error(&format!("could not persist critique for {key}: {err:#}"));
            }
        }
    }
}

/// Produce the critique for one pair. A failed call is still a terminal,
/// recorded outcome: the failure's string representation becomes the
/// explanation of an error-verdict critique.
fn judge_one(config: &BenchConfig, client: &impl Completion, unit: &JudgeUnit<'_>) -> Critique {
    let raw = match complete_judgment(config, client, unit) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(judge = %unit.judge, error = %err, "judge unit failed");
            return critique_for(unit, Verdict::Error, format!("{err:#}"));
        }
    };
    let parsed = parse_verdict(&raw);
    critique_for(unit, parsed.verdict, parsed.explanation)
}

fn complete_judgment(
    config: &BenchConfig,
    client: &impl Completion,
    unit: &JudgeUnit<'_>,
) -> Result<String> {
    let prompt =
        prompts::render_judge_prompt(&unit.solution.text).context("render judge prompt")?;
    let raw = client.complete(unit.judge, &prompt, Some(config.budgets.judge_max_tokens))?;
    Ok(raw)
}

fn critique_for(unit: &JudgeUnit<'_>, verdict: Verdict, explanation: String) -> Critique {
    Critique {
        solver: unit.solution.model.clone(),
        solver_slug: unit.solution.slug.clone(),
        judge: unit.judge.to_string(),
        verdict,
        explanation,
    }
}
