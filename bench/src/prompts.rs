//! Fixed prompt text for the scheduling benchmark.
//!
//! The scheduling task never changes between runs. Solvers get the task plus
//! output instructions; judges get a fixed template with the candidate
//! solution document substituted in.

use anyhow::{Context, Result};
use minijinja::{Environment, context};

/// The single hard constraint-satisfaction task every solver is given.
pub const SCHEDULING_PROMPT: &str = "\
Produce a complete season schedule for a 12-team amateur hockey league.

Teams are numbered 1 through 12. Teams 1-6 form the North division and
teams 7-12 form the South division.

Hard constraints, all of which must hold simultaneously:

1. Double round-robin: every team plays every other team exactly twice,
   once at home and once away (22 games per team, 132 games total).
2. The season is exactly 22 weeks long and every team plays exactly one
   game per week. No byes.
3. Games are played only on Tuesday and Thursday evenings. The league has
   three rinks; each rink hosts at most one game per evening, so at most
   six games can be played in any week. Each week has exactly six games.
4. Every intra-division pairing must be played once in the first eleven
   weeks and once in the last eleven weeks.
5. No team may play more than two consecutive home games, and no team may
   play more than two consecutive away games, across the whole season.
6. Rink 1 is unavailable on Tuesdays in weeks 7 and 14; no game may be
   assigned to it on those evenings.
7. Each team must play on Tuesday at least eight times and on Thursday at
   least eight times over the season.

For every game, state the week number, the day (Tuesday or Thursday), the
rink (1, 2, or 3), the home team, and the away team.";

const SOLVER_INSTRUCTIONS: &str = "\
Present the full schedule as a single self-contained HTML document: one
table listing every game, plus a short section per constraint explaining
how the schedule satisfies it. Output only the HTML document, starting
with <html> — no commentary before or after it.";

const JUDGE_INSTRUCTIONS: &str = "\
On the first line of your reply answer with exactly YES if the candidate
schedule satisfies every constraint, or exactly NO if it violates any of
them. From the second line on, explain which constraints were checked and,
for a NO, identify at least one concrete violation.";

/// The prompt sent to every solver model.
pub fn solver_prompt() -> String {
    format!("{SCHEDULING_PROMPT}\n\n{SOLVER_INSTRUCTIONS}")
}

/// The judge template with its single `{{ solution }}` substitution point.
pub fn judge_template() -> String {
    format!(
        "You are auditing a candidate schedule for the following task.\n\n\
         {SCHEDULING_PROMPT}\n\n\
         Candidate solution document:\n\n\
         {{{{ solution }}}}\n\n\
         {JUDGE_INSTRUCTIONS}"
    )
}

/// Render the judge prompt for one candidate solution document.
pub fn render_judge_prompt(solution: &str) -> Result<String> {
    let template_content = judge_template();

    let mut env = Environment::new();
    env.add_template("judge", &template_content)
        .context("parse judge template")?;

    let template = env.get_template("judge")?;
    let rendered = template.render(context! { solution => solution })?;
    Ok(rendered)
}
