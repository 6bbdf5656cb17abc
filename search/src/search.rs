//! Tree-building entry point and rollout loop.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::SearchError;
use crate::graph::GraphStats;
use crate::tree::MctsTree;

/// Rollouts between progress log lines.
const PROGRESS_INTERVAL: u64 = 100;

/// Why the rollout loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The target met the terminal criteria; no rollouts were run.
    TargetTerminal,
    /// The root became done: nothing left worth expanding.
    RootDone,
    /// The root was solved and the policy asked to stop at the first solution.
    FirstSolution,
    /// Wall-clock budget spent.
    TimeBudget,
    /// `max_iterations` rollouts completed.
    IterationBudget,
    /// `max_chemicals` chemical nodes created.
    ChemicalBudget,
    /// `max_reactions` reaction nodes created.
    ReactionBudget,
    /// Selection found no option although the root was not done.
    SelectionExhausted,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::TargetTerminal => "target terminal",
            Self::RootDone => "root done",
            Self::FirstSolution => "first solution",
            Self::TimeBudget => "time budget",
            Self::IterationBudget => "iteration budget",
            Self::ChemicalBudget => "chemical budget",
            Self::ReactionBudget => "reaction budget",
            Self::SelectionExhausted => "selection exhausted",
        };
        f.write_str(s)
    }
}

/// Outcome of [`build_tree`].
///
/// Budget exhaustion and unsolvable targets are ordinary outcomes; inspect
/// `termination` and `root_solved`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    pub iterations: u64,
    #[serde(serialize_with = "secs")]
    pub elapsed: Duration,
    #[serde(serialize_with = "opt_secs")]
    pub time_to_first_solution: Option<Duration>,
    pub termination: TerminationReason,
    pub root_solved: bool,
    pub stats: GraphStats,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

#[allow(clippy::ref_option)]
fn opt_secs<S: serde::Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match d {
        Some(d) => s.serialize_some(&d.as_secs_f64()),
        None => s.serialize_none(),
    }
}

/// Initialize `tree` at `target` and run rollouts until a budget or the
/// root state ends the search.
///
/// # Errors
///
/// Returns [`SearchError::InvalidArgument`] for an unusable expansion
/// budget. Selection exhaustion is reported as a termination reason, not an
/// error.
pub fn build_tree(tree: &mut MctsTree<'_>, target: &str) -> Result<BuildReport, SearchError> {
    let budget = tree.policy().expansion_budget()?;
    let start = Instant::now();
    let root = tree.initialize(target);

    if tree.target_meets_criteria() && !tree.policy().expand_terminal_target {
        tree.mark_target_terminal()?;
        info!(chemical = target, "target meets terminal criteria, skipping expansion");
        return Ok(finish(tree, 0, start, Some(start.elapsed()), TerminationReason::TargetTerminal));
    }

    let mut iterations: u64 = 0;
    let mut first_solution: Option<Duration> = None;

    let termination = loop {
        if let Some(reason) = budget_reached(tree, iterations, start.elapsed(), budget) {
            break reason;
        }

        match tree.rollout() {
            Ok(record) => debug!(
                iteration = iterations,
                template = %record.template,
                accepted = record.outcomes.iter().filter(|o| o.accepted()).count(),
                "rollout"
            ),
            Err(SearchError::SelectionExhausted) => {
                if tree.refresh_chemical_done(root) {
                    break TerminationReason::RootDone;
                }
                warn!(iteration = iterations, "selection exhausted below an open root");
                break TerminationReason::SelectionExhausted;
            }
            Err(e) => return Err(e),
        }
        iterations += 1;

        if first_solution.is_none() && tree.is_solved() {
            let at = start.elapsed();
            first_solution = Some(at);
            info!(iteration = iterations, elapsed_s = at.as_secs_f64(), "found first solution");
        }
        if tree.policy().return_first && tree.is_solved() {
            break TerminationReason::FirstSolution;
        }

        if iterations % PROGRESS_INTERVAL == 0 {
            let stats = tree.graph().stats();
            info!(
                iteration = iterations,
                elapsed_s = start.elapsed().as_secs_f64(),
                chemicals = stats.chemicals,
                reactions = stats.reactions,
                solved = tree.is_solved(),
                "progress"
            );
        }
    };

    Ok(finish(tree, iterations, start, first_solution, termination))
}

/// The first budget or root condition that ends the loop, if any.
fn budget_reached(
    tree: &MctsTree<'_>,
    iterations: u64,
    elapsed: Duration,
    budget: Duration,
) -> Option<TerminationReason> {
    let policy = tree.policy();
    let graph = tree.graph();
    if tree.is_root_done() {
        Some(TerminationReason::RootDone)
    } else if elapsed >= budget {
        Some(TerminationReason::TimeBudget)
    } else if policy.max_iterations.is_some_and(|m| iterations >= m) {
        Some(TerminationReason::IterationBudget)
    } else if policy
        .max_chemicals
        .is_some_and(|m| graph.chemical_count() >= m)
    {
        Some(TerminationReason::ChemicalBudget)
    } else if policy
        .max_reactions
        .is_some_and(|m| graph.reaction_count() >= m)
    {
        Some(TerminationReason::ReactionBudget)
    } else {
        None
    }
}

fn finish(
    tree: &MctsTree<'_>,
    iterations: u64,
    start: Instant,
    time_to_first_solution: Option<Duration>,
    termination: TerminationReason,
) -> BuildReport {
    let report = BuildReport {
        iterations,
        elapsed: start.elapsed(),
        time_to_first_solution,
        termination,
        root_solved: tree.is_solved(),
        stats: tree.graph().stats(),
    };
    info!(
        iterations,
        elapsed_s = report.elapsed.as_secs_f64(),
        %termination,
        solved = report.root_solved,
        chemicals = report.stats.chemicals,
        reactions = report.stats.reactions,
        edges = report.stats.edges,
        avg_in_degree = report.stats.average_in_degree,
        avg_out_degree = report.stats.average_out_degree,
        "tree build finished"
    );
    report
}
