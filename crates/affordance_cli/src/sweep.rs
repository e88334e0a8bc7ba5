//! Invariant sweep across seeded random snapshots, one seed per rayon task.

use affordance_core::{audit, audit_progression, Context, Registry, RuleSet, SnapshotPermissions};
use affordance_world::seeded_snapshot;
use rayon::prelude::*;
use serde::Serialize;
use std::ops::Range;

#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub seed: u64,
    pub affordances: usize,
    pub violations: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub seeds: usize,
    pub affordances: usize,
    pub violations: usize,
    pub failing_seeds: Vec<SeedReport>,
}

pub fn run_sweep(rules: &RuleSet, seeds: Range<u64>, now: u64, step: u64) -> SweepSummary {
    let reports: Vec<SeedReport> = seeds
        .into_par_iter()
        .map(|seed| sweep_seed(rules, seed, now, step))
        .collect();
    summarize(reports)
}

/// Audit one seed at `now`, then check nothing regressed by `now + step`.
pub fn sweep_seed(rules: &RuleSet, seed: u64, now: u64, step: u64) -> SeedReport {
    let registry = Registry::standard();
    let earlier = seeded_snapshot(seed, now);
    let later = earlier.at(now.saturating_add(step));
    let earlier_oracle = SnapshotPermissions::new(&earlier);
    let later_oracle = SnapshotPermissions::new(&later);

    let contexts = (
        Context::new(&earlier, rules, &earlier_oracle),
        Context::new(&later, rules, &later_oracle),
    );
    let (before, after) = match contexts {
        (Ok(before), Ok(after)) => (before, after),
        (Err(err), _) | (_, Err(err)) => {
            return SeedReport {
                seed,
                affordances: 0,
                violations: vec![format!("generated snapshot rejected: {err}")],
            }
        }
    };

    let affordances = affordance_core::evaluate(&registry, &before).len();
    let violations = audit(&registry, &before)
        .into_iter()
        .chain(audit_progression(&registry, &before, &after))
        .map(|violation| violation.to_string())
        .collect();
    SeedReport {
        seed,
        affordances,
        violations,
    }
}

fn summarize(reports: Vec<SeedReport>) -> SweepSummary {
    let seeds = reports.len();
    let affordances = reports.iter().map(|report| report.affordances).sum();
    let violations = reports.iter().map(|report| report.violations.len()).sum();
    let failing_seeds = reports
        .into_iter()
        .filter(|report| !report.violations.is_empty())
        .collect();
    SweepSummary {
        seeds,
        affordances,
        violations,
        failing_seeds,
    }
}
