use serde::{Deserialize, Serialize};

use crate::alert::rules::AlertEventKind;
use crate::district::UnitAnalysis;
use crate::gap::AnalysisRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub kind: AlertEventKind,
    pub unit_id: String,
    pub title: String,
    pub body: String,
}

/// Compares each unit against its last stored record. Units without a
/// previous record produce no events.
pub fn evaluate_alerts(previous: &[AnalysisRecord], current: &[UnitAnalysis]) -> Vec<AlertEvent> {
    let mut events = Vec::new();

    for unit in current {
        let Some(before) = previous
            .iter()
            .find(|r| r.unit_id == unit.unit_id && r.program == unit.program)
        else {
            continue;
        };
        let after = &unit.result;
        let label = format!("{} {}", unit.program, unit.unit_id);

        if after.current_level > before.level {
            events.push(AlertEvent {
                kind: AlertEventKind::LevelGained,
                unit_id: unit.unit_id.clone(),
                title: format!("{label} reached {}", after.current_level),
                body: format!("Previously {} as of {}.", before.level, before.as_of),
            });
        } else if after.current_level < before.level {
            events.push(AlertEvent {
                kind: AlertEventKind::LevelLost,
                unit_id: unit.unit_id.clone(),
                title: format!("{label} dropped to {}", after.current_level),
                body: format!("Previously {} as of {}.", before.level, before.as_of),
            });
        }

        if before.meets_no_net_loss_requirement && !after.meets_no_net_loss_requirement {
            events.push(AlertEvent {
                kind: AlertEventKind::NetLossEntered,
                unit_id: unit.unit_id.clone(),
                title: format!("{label} has a net club loss"),
                body: format!(
                    "{} paid clubs against a base of {}.",
                    unit.snapshot.paid_clubs, unit.snapshot.club_base
                ),
            });
        } else if !before.meets_no_net_loss_requirement && after.meets_no_net_loss_requirement {
            events.push(AlertEvent {
                kind: AlertEventKind::NetLossRecovered,
                unit_id: unit.unit_id.clone(),
                title: format!("{label} recovered from net club loss"),
                body: format!(
                    "{} paid clubs against a base of {}.",
                    unit.snapshot.paid_clubs, unit.snapshot.club_base
                ),
            });
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::evaluate_alerts;
    use crate::alert::rules::AlertEventKind;
    use crate::district::UnitAnalysis;
    use crate::gap::history::record_from_result;
    use crate::gap::{compute_gap_analysis, PerformanceSnapshot};
    use crate::program::ProgramType;

    fn unit(id: &str, snapshot: PerformanceSnapshot) -> UnitAnalysis {
        UnitAnalysis {
            unit_id: id.to_string(),
            program: ProgramType::Division,
            rank: 1,
            result: compute_gap_analysis(&snapshot, ProgramType::Division),
            snapshot,
        }
    }

    fn previous(id: &str, snapshot: PerformanceSnapshot) -> crate::gap::AnalysisRecord {
        let result = compute_gap_analysis(&snapshot, ProgramType::Division);
        let as_of = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        record_from_result(id, as_of, &snapshot, &result)
    }

    #[test]
    fn reports_level_and_net_loss_transitions() {
        let before = vec![
            previous("A", PerformanceSnapshot::new(10, 10, 5)),
            previous("B", PerformanceSnapshot::new(10, 11, 5)),
        ];
        let now = vec![
            unit("A", PerformanceSnapshot::new(10, 11, 5)),
            unit("B", PerformanceSnapshot::new(10, 9, 5)),
            unit("C", PerformanceSnapshot::new(10, 12, 9)),
        ];
        let events = evaluate_alerts(&before, &now);
        let kinds = events.iter().map(|e| (e.unit_id.as_str(), e.kind)).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                ("A", AlertEventKind::LevelGained),
                ("B", AlertEventKind::LevelLost),
                ("B", AlertEventKind::NetLossEntered),
            ]
        );
        assert!(events[0].title.contains("Select Distinguished"));
    }
}
