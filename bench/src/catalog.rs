//! Work enumeration for the two benchmark phases.
//!
//! Solver items come from the configured solver list in order; judge units are
//! the solver×judge cross product restricted to solvers that actually produced
//! a solution.

/// One unit of solve-phase work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverItem {
    pub model: String,
    pub slug: String,
}

/// A solution held in memory for the judge phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub model: String,
    pub slug: String,
    pub text: String,
}

/// One unit of judge-phase work.
#[derive(Debug, Clone, Copy)]
pub struct JudgeUnit<'a> {
    pub solution: &'a Solution,
    pub judge: &'a str,
}

impl JudgeUnit<'_> {
    pub fn key(&self) -> String {
        pair_key(&self.solution.model, self.judge)
    }
}

/// Filesystem-safe slug for a model identifier.
///
/// Deterministic and stable for lookup; not reversible.
pub fn model_slug(model: &str) -> String {
    model
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect()
}

/// Unique key for a (solver, judge) pair.
pub fn pair_key(solver: &str, judge: &str) -> String {
    format!("{solver}|{judge}")
}

/// Enumerate solver items in configured order.
///
/// Duplicates are kept: they share a slug and resolve to the same persisted
/// artifact, so later occurrences reuse the first result.
pub fn solver_items(solvers: &[String]) -> Vec<SolverItem> {
    solvers
        .iter()
        .map(|model| SolverItem {
            model: model.clone(),
            slug: model_slug(model),
        })
        .collect()
}

/// Enumerate judge units: outer loop over solutions in the order they were
/// obtained, inner loop over judges in configured order.
pub fn judge_units<'a>(solutions: &'a [Solution], judges: &'a [String]) -> Vec<JudgeUnit<'a>> {
    let mut units = Vec::with_capacity(solutions.len() * judges.len());
    for solution in solutions {
        for judge in judges {
            units.push(JudgeUnit { solution, judge });
        }
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solution(model: &str) -> Solution {
        Solution {
            model: model.to_string(),
            slug: model_slug(model),
            text: "<html></html>".to_string(),
        }
    }

    #[test]
    fn slug_replaces_path_unsafe_characters() {
        assert_eq!(model_slug("openai/gpt-4o"), "openai_gpt_4o");
        assert_eq!(model_slug("qwen/qwen-2.5:72b"), "qwen_qwen_2_5_72b");
        assert_eq!(model_slug("plain"), "plain");
    }

    #[test]
    fn slug_is_deterministic() {
        assert_eq!(model_slug("a/b c"), model_slug("a/b c"));
    }

    #[test]
    fn solver_items_preserve_order_and_duplicates() {
        let solvers = vec![
            "a/one".to_string(),
            "b/two".to_string(),
            "a/one".to_string(),
        ];
        let items = solver_items(&solvers);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].model, "a/one");
        assert_eq!(items[1].model, "b/two");
        assert_eq!(items[0].slug, items[2].slug);
    }

    #[test]
    fn judge_units_cross_product_in_order() {
        let solutions = vec![solution("s1"), solution("s2")];
        let judges = vec!["j1".to_string(), "j2".to_string()];
        let units = judge_units(&solutions, &judges);
        let keys: Vec<String> = units.iter().map(JudgeUnit::key).collect();
        assert_eq!(keys, vec!["s1|j1", "s1|j2", "s2|j1", "s2|j2"]);
    }

    #[test]
    fn judge_units_empty_for_no_solutions() {
        let judges = vec!["j1".to_string()];
        assert!(judge_units(&[], &judges).is_empty());
    }
}
