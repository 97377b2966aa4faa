use serde::{Deserialize, Serialize};

use crate::gap::calculator::compute_with_table;
use crate::gap::{GapAnalysisResult, PerformanceSnapshot, RecognitionLevel};
use crate::program::ThresholdTable;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CountField {
    ClubBase,
    PaidClubs,
    DistinguishedClubs,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountChange {
    pub field: CountField,
    pub from: u32,
    pub to: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LevelChange {
    Gained,
    Lost,
    Unchanged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatIfResult {
    pub changes_applied: Vec<CountChange>,
    pub before: GapAnalysisResult,
    pub after: GapAnalysisResult,
    pub level_change: LevelChange,
}

/// Applies signed deltas to the snapshot and compares the analyses.
/// Counts saturate at zero.
pub fn simulate_whatif(
    snapshot: &PerformanceSnapshot,
    table: &ThresholdTable,
    adjustments: &[(CountField, i64)],
) -> WhatIfResult {
    let before = compute_with_table(snapshot, table);

    let mut changed = *snapshot;
    let mut changes_applied = Vec::new();
    for (field, delta) in adjustments {
        let slot = match field {
            CountField::ClubBase => &mut changed.club_base,
            CountField::PaidClubs => &mut changed.paid_clubs,
            CountField::DistinguishedClubs => &mut changed.distinguished_clubs,
        };
        let from = *slot;
        let to = apply_delta(from, *delta);
        if to != from {
            *slot = to;
            changes_applied.push(CountChange {
                field: *field,
                from,
                to,
            });
        }
    }

    let after = compute_with_table(&changed, table);
    let level_change = match after.current_level.cmp(&before.current_level) {
        std::cmp::Ordering::Greater => LevelChange::Gained,
        std::cmp::Ordering::Less => LevelChange::Lost,
        std::cmp::Ordering::Equal => LevelChange::Unchanged,
    };

    WhatIfResult {
        changes_applied,
        before,
        after,
        level_change,
    }
}

/// Additions that take a snapshot to `level`. Visit counts are per round and
/// stay zero unless the area visit gate applies to the snapshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReachPlan {
    pub level: RecognitionLevel,
    pub distinguished_clubs: u32,
    pub paid_clubs: u32,
    pub first_round_visits: u32,
    pub second_round_visits: u32,
}

impl ReachPlan {
    pub fn needs_visits(&self) -> bool {
        self.first_round_visits > 0 || self.second_round_visits > 0
    }
}

/// What must be added to reach `level`, or `None` when it is already
/// achieved. The paid and visit additions cover the eligibility gate too.
pub fn clubs_to_reach(
    snapshot: &PerformanceSnapshot,
    table: &ThresholdTable,
    level: RecognitionLevel,
) -> Option<ReachPlan> {
    let tier = table.tier(level)?;
    let result = compute_with_table(snapshot, table);
    let gap = result.gap_for(level)?;
    if gap.achieved {
        return None;
    }
    let gate_paid = table
        .gate_paid_requirement(snapshot.club_base)
        .saturating_sub(snapshot.paid_clubs);
    let (first_round_visits, second_round_visits) =
        match (snapshot.club_visits, table.required_visits(snapshot.club_base)) {
            (Some(visits), Some(required)) => (
                required.saturating_sub(visits.first_round),
                required.saturating_sub(visits.second_round),
            ),
            _ => (0, 0),
        };
    Some(ReachPlan {
        level,
        distinguished_clubs: tier
            .required_distinguished(snapshot.club_base)
            .saturating_sub(snapshot.distinguished_clubs),
        paid_clubs: gap.paid_clubs_needed.max(gate_paid),
        first_round_visits,
        second_round_visits,
    })
}

/// Plan for the lowest tier not yet achieved.
pub fn next_reach_plan(
    snapshot: &PerformanceSnapshot,
    table: &ThresholdTable,
    result: &GapAnalysisResult,
) -> Option<ReachPlan> {
    let target = result.next_target()?;
    clubs_to_reach(snapshot, table, target.level)
}

fn apply_delta(value: u32, delta: i64) -> u32 {
    let next = i64::from(value).saturating_add(delta).max(0);
    u32::try_from(next).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{clubs_to_reach, next_reach_plan, simulate_whatif, CountField, LevelChange};
    use crate::gap::{compute_with_table, PerformanceSnapshot, RecognitionLevel};
    use crate::program::ThresholdTable;

    #[test]
    fn adding_distinguished_clubs_gains_a_level() {
        let table = ThresholdTable::division();
        let snapshot = PerformanceSnapshot::new(50, 52, 26);
        let result = simulate_whatif(&snapshot, &table, &[(CountField::DistinguishedClubs, 2)]);
        assert_eq!(result.level_change, LevelChange::Gained);
        assert_eq!(result.after.current_level, RecognitionLevel::Presidents);
        assert_eq!(result.changes_applied.len(), 1);
        assert_eq!(result.changes_applied[0].to, 28);
    }

    #[test]
    fn losing_paid_clubs_drops_to_none() {
        let table = ThresholdTable::division();
        let snapshot = PerformanceSnapshot::new(50, 52, 26);
        let result = simulate_whatif(&snapshot, &table, &[(CountField::PaidClubs, -3)]);
        assert_eq!(result.level_change, LevelChange::Lost);
        assert_eq!(result.after.current_level, RecognitionLevel::None);
    }

    #[test]
    fn deltas_saturate_and_noops_are_skipped() {
        let table = ThresholdTable::area();
        let snapshot = PerformanceSnapshot::new(4, 4, 1);
        let result = simulate_whatif(
            &snapshot,
            &table,
            &[
                (CountField::DistinguishedClubs, -10),
                (CountField::PaidClubs, 0),
            ],
        );
        assert_eq!(result.changes_applied.len(), 1);
        assert_eq!(result.changes_applied[0].to, 0);
        assert_eq!(result.level_change, LevelChange::Unchanged);
    }

    #[test]
    fn clubs_to_reach_covers_the_gate() {
        let table = ThresholdTable::division();
        let snapshot = PerformanceSnapshot::new(20, 18, 5);
        let plan = clubs_to_reach(&snapshot, &table, RecognitionLevel::Distinguished).unwrap();
        assert_eq!((plan.distinguished_clubs, plan.paid_clubs), (4, 2));
        assert!(!plan.needs_visits());
        let snapshot = PerformanceSnapshot::new(20, 22, 11);
        assert_eq!(
            clubs_to_reach(&snapshot, &table, RecognitionLevel::Presidents),
            None
        );
        assert_eq!(clubs_to_reach(&snapshot, &table, RecognitionLevel::None), None);
    }

    #[test]
    fn clubs_to_reach_includes_missing_area_visits() {
        let table = ThresholdTable::area();
        let snapshot = PerformanceSnapshot::new(4, 4, 1).with_visits(2, 3);
        let plan = clubs_to_reach(&snapshot, &table, RecognitionLevel::Distinguished).unwrap();
        assert_eq!(plan.distinguished_clubs, 1);
        assert_eq!(plan.paid_clubs, 0);
        assert_eq!((plan.first_round_visits, plan.second_round_visits), (1, 0));

        // Clubs alone leave the visit gate failing.
        let clubs_only = simulate_whatif(
            &snapshot,
            &table,
            &[(CountField::DistinguishedClubs, i64::from(plan.distinguished_clubs))],
        );
        assert_eq!(clubs_only.after.current_level, RecognitionLevel::None);
        assert!(!clubs_only.after.meets_eligibility_gate);

        let visited = PerformanceSnapshot::new(4, 4, 1).with_visits(3, 3);
        let reached = simulate_whatif(
            &visited,
            &table,
            &[(CountField::DistinguishedClubs, i64::from(plan.distinguished_clubs))],
        );
        assert_eq!(reached.after.current_level, RecognitionLevel::Distinguished);
    }

    #[test]
    fn visit_shortfall_is_ignored_without_the_visit_gate() {
        let table = ThresholdTable::area().without_visit_gate();
        let snapshot = PerformanceSnapshot::new(4, 4, 1).with_visits(0, 0);
        let plan = clubs_to_reach(&snapshot, &table, RecognitionLevel::Distinguished).unwrap();
        assert!(!plan.needs_visits());
    }

    #[test]
    fn next_plan_targets_lowest_missing_tier() {
        let table = ThresholdTable::division();
        let snapshot = PerformanceSnapshot::new(50, 52, 26);
        let result = compute_with_table(&snapshot, &table);
        let plan = next_reach_plan(&snapshot, &table, &result).unwrap();
        assert_eq!(plan.level, RecognitionLevel::Presidents);
        assert_eq!(plan.distinguished_clubs, 2);

        let done = PerformanceSnapshot::new(50, 52, 28);
        let result = compute_with_table(&done, &table);
        assert_eq!(next_reach_plan(&done, &table, &result), None);
    }
}
