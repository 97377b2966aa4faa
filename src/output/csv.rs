use anyhow::Result;

use crate::display::{badge_for, gap_token};
use crate::district::UnitAnalysis;
use crate::gap::{AnalysisRecord, GapAnalysisResult, PerformanceSnapshot};

const UNIT_HEADER: [&str; 13] = [
    "rank",
    "unit",
    "program",
    "club_base",
    "paid_clubs",
    "distinguished_clubs",
    "level",
    "badge",
    "no_net_loss",
    "eligible",
    "distinguished_gap",
    "select_gap",
    "presidents_gap",
];

fn unit_record(
    rank: usize,
    unit_id: &str,
    snapshot: &PerformanceSnapshot,
    result: &GapAnalysisResult,
) -> Vec<String> {
    vec![
        rank.to_string(),
        unit_id.to_string(),
        result.program.as_slug().to_string(),
        snapshot.club_base.to_string(),
        snapshot.paid_clubs.to_string(),
        snapshot.distinguished_clubs.to_string(),
        result.current_level.as_slug().to_string(),
        badge_for(result).style.as_key().to_string(),
        result.meets_no_net_loss_requirement.to_string(),
        result.meets_eligibility_gate.to_string(),
        gap_token(&result.distinguished_gap).to_string(),
        gap_token(&result.select_gap).to_string(),
        gap_token(&result.presidents_gap).to_string(),
    ]
}

pub fn units_to_csv(units: &[UnitAnalysis]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(UNIT_HEADER)?;
    for unit in units {
        writer.write_record(unit_record(
            unit.rank,
            &unit.unit_id,
            &unit.snapshot,
            &unit.result,
        ))?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn analysis_to_csv(
    unit_id: &str,
    snapshot: &PerformanceSnapshot,
    result: &GapAnalysisResult,
) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(UNIT_HEADER)?;
    writer.write_record(unit_record(1, unit_id, snapshot, result))?;
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn history_to_csv(records: &[AnalysisRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "as_of",
        "unit",
        "program",
        "club_base",
        "paid_clubs",
        "distinguished_clubs",
        "level",
        "no_net_loss",
        "captured_at",
    ])?;
    for rec in records {
        writer.write_record([
            rec.as_of.to_string(),
            rec.unit_id.clone(),
            rec.program.as_slug().to_string(),
            rec.club_base.to_string(),
            rec.paid_clubs.to_string(),
            rec.distinguished_clubs.to_string(),
            rec.level.as_slug().to_string(),
            rec.meets_no_net_loss_requirement.to_string(),
            rec.captured_at.to_rfc3339(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use super::analysis_to_csv;
    use crate::gap::{compute_gap_analysis, PerformanceSnapshot};
    use crate::program::ProgramType;

    #[test]
    fn exports_one_row_per_unit() {
        let snapshot = PerformanceSnapshot::new(50, 48, 30);
        let result = compute_gap_analysis(&snapshot, ProgramType::Division);
        let out = analysis_to_csv("A", &snapshot, &result).unwrap();
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("rank,unit,program"));
        assert_eq!(lines[1], "1,A,division,50,48,30,none,net_loss,false,false,N/A,N/A,N/A");
    }
}
