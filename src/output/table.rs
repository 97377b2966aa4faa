use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::display::{badge_for, gap_token, BadgeStyle};
use crate::district::{DistrictReport, UnitAnalysis};
use crate::gap::whatif::{ReachPlan, WhatIfResult};
use crate::gap::{AnalysisRecord, GapAnalysisResult, PerformanceSnapshot};
use crate::program::{EligibilityGate, ThresholdTable};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn badge_cell(result: &GapAnalysisResult) -> Cell {
    let badge = badge_for(result);
    let color = match badge.style {
        BadgeStyle::Presidents => Color::Magenta,
        BadgeStyle::Select => Color::Blue,
        BadgeStyle::Distinguished => Color::Green,
        BadgeStyle::NotDistinguished => Color::Grey,
        BadgeStyle::NetLoss => Color::Red,
    };
    Cell::new(badge.label).fg(color)
}

pub fn render_analysis_table(snapshot: &PerformanceSnapshot, result: &GapAnalysisResult) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Tier",
        "Achieved",
        "Distinguished (have/need)",
        "Paid (have/need)",
        "Gap",
    ]);

    for gap in result.gaps() {
        let achieved = if gap.achieved {
            Cell::new("YES").fg(Color::Green)
        } else if gap.achievable {
            Cell::new("NO").fg(Color::Yellow)
        } else {
            Cell::new("N/A").fg(Color::Red)
        };
        table.add_row(Row::from(vec![
            Cell::new(gap.level.to_string()),
            achieved,
            Cell::new(format!(
                "{}/{}",
                snapshot.distinguished_clubs, gap.required_distinguished
            )),
            Cell::new(format!("{}/{}", snapshot.paid_clubs, gap.required_paid)),
            Cell::new(gap_token(gap).to_string()),
        ]));
    }

    let mut out = table.to_string();
    out.push_str(&format!(
        "\n{} status: {}\nClub base {}, paid {} ({:+}), distinguished {}\nNo net loss: {}, eligibility gate: {}",
        result.program,
        badge_for(result).label,
        snapshot.club_base,
        snapshot.paid_clubs,
        snapshot.net_growth(),
        snapshot.distinguished_clubs,
        yes_no(result.meets_no_net_loss_requirement),
        yes_no(result.meets_eligibility_gate),
    ));
    out
}

/// One line naming what is still missing for the plan's tier.
pub fn render_reach_plan(plan: &ReachPlan) -> String {
    let mut parts = Vec::new();
    if plan.distinguished_clubs > 0 {
        parts.push(format!("+{} distinguished", plan.distinguished_clubs));
    }
    if plan.paid_clubs > 0 {
        parts.push(format!("+{} paid", plan.paid_clubs));
    }
    if plan.first_round_visits > 0 {
        parts.push(format!("+{} first-round visits", plan.first_round_visits));
    }
    if plan.second_round_visits > 0 {
        parts.push(format!("+{} second-round visits", plan.second_round_visits));
    }
    format!("Next: {} needs {}", plan.level, parts.join(", "))
}

pub fn render_units_table(units: &[UnitAnalysis]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Rank",
        "Unit",
        "Base",
        "Paid",
        "Dist.",
        "Status",
        "Distinguished",
        "Select",
        "President's",
    ]);
    for unit in units {
        table.add_row(Row::from(vec![
            Cell::new(unit.rank),
            Cell::new(&unit.unit_id),
            Cell::new(unit.snapshot.club_base),
            Cell::new(unit.snapshot.paid_clubs),
            Cell::new(unit.snapshot.distinguished_clubs),
            badge_cell(&unit.result),
            Cell::new(gap_token(&unit.result.distinguished_gap).to_string()),
            Cell::new(gap_token(&unit.result.select_gap).to_string()),
            Cell::new(gap_token(&unit.result.presidents_gap).to_string()),
        ]));
    }
    table.to_string()
}

pub fn render_report(report: &DistrictReport) -> String {
    let summary = &report.summary;
    format!(
        "Divisions\n{}\n\nAreas\n{}\n\nDivisions recognized: {}/{} (net loss: {})\nAreas recognized: {}/{} (net loss: {})",
        render_units_table(&report.divisions),
        render_units_table(&report.areas),
        summary.divisions.recognized(),
        report.divisions.len(),
        summary.divisions.net_loss,
        summary.areas.recognized(),
        report.areas.len(),
        summary.areas.net_loss,
    )
}

pub fn render_whatif_table(result: &WhatIfResult) -> String {
    let mut table = new_table();
    table.set_header(vec!["Tier", "Before", "After"]);
    for (before, after) in result.before.gaps().into_iter().zip(result.after.gaps()) {
        table.add_row(vec![
            before.level.to_string(),
            gap_token(before).to_string(),
            gap_token(after).to_string(),
        ]);
    }

    let changes = result
        .changes_applied
        .iter()
        .map(|c| format!("{:?} {} -> {}", c.field, c.from, c.to))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{}\nChanges: {}\nLevel: {} -> {} ({:?})",
        table,
        if changes.is_empty() { "none" } else { changes.as_str() },
        result.before.current_level,
        result.after.current_level,
        result.level_change,
    )
}

pub fn render_thresholds_table(table_def: &ThresholdTable, club_base: Option<u32>) -> String {
    let mut table = new_table();
    let mut header = vec![
        "Tier".to_string(),
        "Paid clubs".to_string(),
        "Distinguished clubs".to_string(),
    ];
    if let Some(base) = club_base {
        header.push(format!("Paid @ base {base}"));
        header.push(format!("Distinguished @ base {base}"));
    }
    table.set_header(header);

    for tier in &table_def.tiers {
        let paid = if tier.paid_offset == 0 {
            "base".to_string()
        } else {
            format!("base + {}", tier.paid_offset)
        };
        let distinguished = if tier.distinguished_surplus == 0 {
            format!("{}% of base", tier.distinguished_percent)
        } else {
            format!(
                "{}% of base + {}",
                tier.distinguished_percent, tier.distinguished_surplus
            )
        };
        let mut row = vec![tier.level.to_string(), paid, distinguished];
        if let Some(base) = club_base {
            row.push(tier.required_paid(base).to_string());
            row.push(tier.required_distinguished(base).to_string());
        }
        table.add_row(row);
    }

    let gate = match table_def.gate {
        EligibilityGate::PaidPercentOfBase(pct) => format!("paid clubs >= {pct}% of base"),
        EligibilityGate::NoNetLoss => "paid clubs >= base (no net loss)".to_string(),
    };
    let mut out = format!("{} program\n{}\nEligibility: {}", table_def.program, table, gate);
    if let Some(pct) = table_def.visit_percent {
        out.push_str(&format!(
            "\nClub visits: {pct}% of base in each round, when visit data is available"
        ));
    }
    out
}

pub fn render_history_table(records: &[AnalysisRecord]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "As Of",
        "Unit",
        "Program",
        "Base",
        "Paid",
        "Dist.",
        "Level",
        "No Net Loss",
    ]);
    for rec in records {
        table.add_row(vec![
            rec.as_of.to_string(),
            rec.unit_id.clone(),
            rec.program.to_string(),
            rec.club_base.to_string(),
            rec.paid_clubs.to_string(),
            rec.distinguished_clubs.to_string(),
            rec.level.to_string(),
            yes_no(rec.meets_no_net_loss_requirement).to_string(),
        ]);
    }
    table.to_string()
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
