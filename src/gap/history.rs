use chrono::{NaiveDate, Utc};

use crate::gap::{AnalysisRecord, GapAnalysisResult, PerformanceSnapshot, RecognitionLevel};
use crate::program::ProgramType;

pub fn record_from_result(
    unit_id: impl Into<String>,
    as_of: NaiveDate,
    snapshot: &PerformanceSnapshot,
    result: &GapAnalysisResult,
) -> AnalysisRecord {
    AnalysisRecord {
        unit_id: unit_id.into(),
        program: result.program,
        as_of,
        club_base: snapshot.club_base,
        paid_clubs: snapshot.paid_clubs,
        distinguished_clubs: snapshot.distinguished_clubs,
        level: result.current_level,
        meets_no_net_loss_requirement: result.meets_no_net_loss_requirement,
        captured_at: Utc::now(),
    }
}

pub fn summarize_timeline(records: &[AnalysisRecord], program: Option<ProgramType>) -> String {
    if records.is_empty() {
        return "No history records found.".to_string();
    }

    let mut recognized = 0usize;
    let mut total = 0usize;
    let mut best = RecognitionLevel::None;
    for rec in records {
        if let Some(program) = program {
            if rec.program != program {
                continue;
            }
        }
        total += 1;
        if rec.level > RecognitionLevel::None {
            recognized += 1;
        }
        best = best.max(rec.level);
    }

    if total == 0 {
        return "No matching records for selected program.".to_string();
    }

    format!(
        "Recognized in {recognized}/{total} snapshots ({:.1}%), best level: {best}",
        (recognized as f64 / total as f64) * 100.0
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{record_from_result, summarize_timeline};
    use crate::gap::{compute_gap_analysis, PerformanceSnapshot};
    use crate::program::ProgramType;

    fn record(unit: &str, program: ProgramType, snapshot: PerformanceSnapshot) -> crate::gap::AnalysisRecord {
        let result = compute_gap_analysis(&snapshot, program);
        let as_of = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        record_from_result(unit, as_of, &snapshot, &result)
    }

    #[test]
    fn summarizes_recognized_share_and_best_level() {
        let records = vec![
            record("A", ProgramType::Division, PerformanceSnapshot::new(10, 9, 6)),
            record("A", ProgramType::Division, PerformanceSnapshot::new(10, 11, 5)),
        ];
        let summary = summarize_timeline(&records, None);
        assert!(summary.contains("1/2"));
        assert!(summary.contains("Select Distinguished"));
    }

    #[test]
    fn program_filter_without_matches() {
        let records = vec![record("A1", ProgramType::Area, PerformanceSnapshot::new(4, 4, 2))];
        assert_eq!(
            summarize_timeline(&records, Some(ProgramType::Division)),
            "No matching records for selected program."
        );
        assert_eq!(summarize_timeline(&[], None), "No history records found.");
    }
}
