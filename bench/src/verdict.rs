//! Judge output classification.
//!
//! Judges answer free-form; only the first non-empty line carries the verdict
//! and everything after it is rationale.

use serde::{Deserialize, Serialize};

/// Closed verdict set for one (solver, judge) pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Affirmative,
    Negative,
    Error,
}

/// Verdict plus rationale extracted from raw judge output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVerdict {
    pub verdict: Verdict,
    pub explanation: String,
}

/// Classify raw judge output into a verdict and explanation.
///
/// The first non-empty trimmed line decides the verdict: an exact
/// case-insensitive `YES` is affirmative, an exact `NO` is negative, and any
/// other value also maps to negative. An ambiguous or truncated first line
/// must never count as an affirmative verdict.
pub fn parse_verdict(raw: &str) -> ParsedVerdict {
    let lines: Vec<&str> = raw.lines().map(str::trim).collect();
    let Some(first) = lines.iter().position(|line| !line.is_empty()) else {
        return ParsedVerdict {
            verdict: Verdict::Error,
            explanation: "Empty response".to_string(),
        };
    };

    let verdict = match lines[first] {
        line if line.eq_ignore_ascii_case("YES") => Verdict::Affirmative,
        line if line.eq_ignore_ascii_case("NO") => Verdict::Negative,
        // Anything that is not an exact YES is read as a refusal to affirm.
        _ => Verdict::Negative,
    };

    let explanation = lines[first + 1..].join("\n").trim().to_string();
    ParsedVerdict {
        verdict,
        explanation,
    }
}
