pub mod loader;
pub mod ranking;

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::gap::{compute_with_table, GapAnalysisResult, PerformanceSnapshot, RecognitionLevel};
use crate::program::{ProgramType, ThresholdTable};
use crate::validate::{validate_area_in_division, validate_snapshot, ValidationError};

pub use loader::load_area_rows;
pub use ranking::rank_units;

/// One area's counts as exported from the district dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AreaRow {
    pub division: String,
    pub area: String,
    pub club_base: u32,
    pub paid_clubs: u32,
    pub distinguished_clubs: u32,
    #[serde(default)]
    pub first_round_visits: Option<u32>,
    #[serde(default)]
    pub second_round_visits: Option<u32>,
}

impl AreaRow {
    pub fn snapshot(&self) -> PerformanceSnapshot {
        let snapshot =
            PerformanceSnapshot::new(self.club_base, self.paid_clubs, self.distinguished_clubs);
        match (self.first_round_visits, self.second_round_visits) {
            (Some(first), Some(second)) => snapshot.with_visits(first, second),
            _ => snapshot,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitAnalysis {
    pub unit_id: String,
    pub program: ProgramType,
    pub rank: usize,
    pub snapshot: PerformanceSnapshot,
    pub result: GapAnalysisResult,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelCounts {
    pub presidents: usize,
    pub select: usize,
    pub distinguished: usize,
    pub not_distinguished: usize,
    pub net_loss: usize,
}

impl LevelCounts {
    fn from_units(units: &[UnitAnalysis]) -> Self {
        let mut counts = Self::default();
        for unit in units {
            match unit.result.current_level {
                RecognitionLevel::Presidents => counts.presidents += 1,
                RecognitionLevel::Select => counts.select += 1,
                RecognitionLevel::Distinguished => counts.distinguished += 1,
                RecognitionLevel::None => counts.not_distinguished += 1,
            }
            if !unit.result.meets_no_net_loss_requirement {
                counts.net_loss += 1;
            }
        }
        counts
    }

    pub fn recognized(&self) -> usize {
        self.presidents + self.select + self.distinguished
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistrictSummary {
    pub areas: LevelCounts,
    pub divisions: LevelCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistrictReport {
    pub areas: Vec<UnitAnalysis>,
    pub divisions: Vec<UnitAnalysis>,
    pub summary: DistrictSummary,
}

impl DistrictReport {
    pub fn units(&self) -> impl Iterator<Item = &UnitAnalysis> {
        self.divisions.iter().chain(self.areas.iter())
    }
}

/// Analyzes every area, then rolls each division's areas up into a
/// division snapshot. Division snapshots carry no visit data. Each area id
/// may appear once and must sit under its own division.
pub fn build_district_report(
    rows: &[AreaRow],
    area_table: &ThresholdTable,
    division_table: &ThresholdTable,
) -> Result<DistrictReport> {
    let mut areas = Vec::with_capacity(rows.len());
    let mut division_totals: BTreeMap<String, PerformanceSnapshot> = BTreeMap::new();
    let mut seen = BTreeSet::new();

    for row in rows {
        validate_area_in_division(&row.area, &row.division)
            .with_context(|| format!("row for area {}", row.area))?;
        if !seen.insert(row.area.as_str()) {
            return Err(ValidationError::DuplicateId {
                kind: "area",
                value: row.area.clone(),
            })
            .with_context(|| format!("division {}", row.division));
        }
        let snapshot = row.snapshot();
        validate_snapshot(&snapshot).with_context(|| format!("area {}", row.area))?;

        let total = division_totals.entry(row.division.clone()).or_default();
        total.club_base += snapshot.club_base;
        total.paid_clubs += snapshot.paid_clubs;
        total.distinguished_clubs += snapshot.distinguished_clubs;

        areas.push(UnitAnalysis {
            unit_id: row.area.clone(),
            program: ProgramType::Area,
            rank: 0,
            result: compute_with_table(&snapshot, area_table),
            snapshot,
        });
    }

    let mut divisions = division_totals
        .into_iter()
        .map(|(division, snapshot)| UnitAnalysis {
            unit_id: division,
            program: ProgramType::Division,
            rank: 0,
            result: compute_with_table(&snapshot, division_table),
            snapshot,
        })
        .collect::<Vec<_>>();

    rank_units(&mut areas);
    rank_units(&mut divisions);

    let summary = DistrictSummary {
        areas: LevelCounts::from_units(&areas),
        divisions: LevelCounts::from_units(&divisions),
    };
    Ok(DistrictReport {
        areas,
        divisions,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::{build_district_report, AreaRow};
    use crate::gap::RecognitionLevel;
    use crate::validate::ValidationError;
    use crate::program::ThresholdTable;

    fn row(division: &str, area: &str, base: u32, paid: u32, dist: u32) -> AreaRow {
        AreaRow {
            division: division.to_string(),
            area: area.to_string(),
            club_base: base,
            paid_clubs: paid,
            distinguished_clubs: dist,
            first_round_visits: None,
            second_round_visits: None,
        }
    }

    #[test]
    fn rolls_areas_up_into_divisions() {
        let rows = vec![
            row("A", "A1", 5, 6, 3),
            row("A", "A2", 5, 5, 2),
            row("B", "B1", 4, 3, 3),
        ];
        let report =
            build_district_report(&rows, &ThresholdTable::area(), &ThresholdTable::division())
                .unwrap();

        assert_eq!(report.areas.len(), 3);
        assert_eq!(report.divisions.len(), 2);
        let a = report.divisions.iter().find(|d| d.unit_id == "A").unwrap();
        assert_eq!(a.snapshot.club_base, 10);
        assert_eq!(a.snapshot.paid_clubs, 11);
        assert_eq!(a.snapshot.distinguished_clubs, 5);
        assert_eq!(a.result.current_level, RecognitionLevel::Select);
        assert_eq!(a.rank, 1);

        let b = report.divisions.iter().find(|d| d.unit_id == "B").unwrap();
        assert!(!b.result.meets_no_net_loss_requirement);
        assert_eq!(report.summary.divisions.net_loss, 1);
        assert_eq!(report.summary.areas.recognized(), 1);
        assert_eq!(report.units().count(), 5);
    }

    #[test]
    fn rejects_invalid_rows() {
        let rows = vec![row("A", "A1", 5, 3, 4)];
        assert!(
            build_district_report(&rows, &ThresholdTable::area(), &ThresholdTable::division())
                .is_err()
        );
        let rows = vec![row("A", "area one", 5, 5, 4)];
        assert!(
            build_district_report(&rows, &ThresholdTable::area(), &ThresholdTable::division())
                .is_err()
        );
    }

    #[test]
    fn rejects_area_filed_under_another_division() {
        let rows = vec![row("A", "A1", 5, 6, 3), row("A", "B1", 4, 4, 2)];
        let err =
            build_district_report(&rows, &ThresholdTable::area(), &ThresholdTable::division())
                .unwrap_err();
        assert!(format!("{err:#}").contains("area B1 is not in division A"));
        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::AreaOutsideDivision { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_area_rows() {
        let rows = vec![
            row("A", "A1", 5, 6, 3),
            row("A", "A2", 5, 5, 2),
            row("A", "A1", 5, 6, 3),
        ];
        let err =
            build_district_report(&rows, &ThresholdTable::area(), &ThresholdTable::division())
                .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::DuplicateId { kind: "area", .. })
        ));
        assert!(format!("{err:#}").contains("duplicate area id: A1"));
    }
}
