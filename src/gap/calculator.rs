use crate::gap::{GapAnalysisResult, LevelGap, PerformanceSnapshot, RecognitionLevel};
use crate::program::{ProgramType, ThresholdTable, TierRequirement};

pub fn compute_gap_analysis(
    snapshot: &PerformanceSnapshot,
    program: ProgramType,
) -> GapAnalysisResult {
    compute_with_table(snapshot, &ThresholdTable::for_program(program))
}

pub fn compute_with_table(
    snapshot: &PerformanceSnapshot,
    table: &ThresholdTable,
) -> GapAnalysisResult {
    let meets_no_net_loss_requirement = snapshot.paid_clubs >= snapshot.club_base;
    let meets_eligibility_gate = passes_gate(snapshot, table);

    let [distinguished_gap, select_gap, presidents_gap] = table
        .tiers
        .map(|tier| evaluate_tier(snapshot, &tier, meets_eligibility_gate));

    let current_level = [&distinguished_gap, &select_gap, &presidents_gap]
        .into_iter()
        .filter(|g| g.achieved)
        .map(|g| g.level)
        .max()
        .unwrap_or(RecognitionLevel::None);

    GapAnalysisResult {
        program: table.program,
        current_level,
        meets_no_net_loss_requirement,
        meets_eligibility_gate,
        distinguished_gap,
        select_gap,
        presidents_gap,
    }
}

pub fn passes_gate(snapshot: &PerformanceSnapshot, table: &ThresholdTable) -> bool {
    if snapshot.paid_clubs < table.gate_paid_requirement(snapshot.club_base) {
        return false;
    }
    match (snapshot.club_visits, table.required_visits(snapshot.club_base)) {
        (Some(visits), Some(required)) => {
            visits.first_round >= required && visits.second_round >= required
        }
        _ => true,
    }
}

fn evaluate_tier(
    snapshot: &PerformanceSnapshot,
    tier: &TierRequirement,
    eligible: bool,
) -> LevelGap {
    let required_distinguished = tier.required_distinguished(snapshot.club_base);
    let required_paid = tier.required_paid(snapshot.club_base);
    let distinguished_clubs_needed =
        required_distinguished.saturating_sub(snapshot.distinguished_clubs);
    let paid_clubs_needed = required_paid.saturating_sub(snapshot.paid_clubs);
    let achieved = eligible && distinguished_clubs_needed == 0 && paid_clubs_needed == 0;

    LevelGap {
        level: tier.level,
        achieved,
        achievable: eligible,
        distinguished_clubs_needed,
        paid_clubs_needed,
        required_distinguished,
        required_paid,
    }
}

#[cfg(test)]
mod tests {
    use super::{compute_gap_analysis, compute_with_table};
    use crate::gap::{PerformanceSnapshot, RecognitionLevel};
    use crate::program::{ProgramType, ThresholdTable};

    fn division(base: u32, paid: u32, distinguished: u32) -> crate::gap::GapAnalysisResult {
        compute_gap_analysis(
            &PerformanceSnapshot::new(base, paid, distinguished),
            ProgramType::Division,
        )
    }

    fn area(base: u32, paid: u32, distinguished: u32) -> crate::gap::GapAnalysisResult {
        compute_gap_analysis(
            &PerformanceSnapshot::new(base, paid, distinguished),
            ProgramType::Area,
        )
    }

    #[test]
    fn division_select_with_presidents_gap() {
        let result = division(50, 52, 26);
        assert!(result.meets_no_net_loss_requirement);
        assert_eq!(result.current_level, RecognitionLevel::Select);
        assert!(result.select_gap.achieved);
        assert!(!result.presidents_gap.achieved);
        assert!(result.presidents_gap.achievable);
        assert_eq!(result.presidents_gap.required_distinguished, 28);
        assert_eq!(result.presidents_gap.distinguished_clubs_needed, 2);
        assert_eq!(result.presidents_gap.paid_clubs_needed, 0);
    }

    #[test]
    fn division_net_loss_blocks_every_tier() {
        let result = division(50, 48, 30);
        assert!(!result.meets_no_net_loss_requirement);
        assert!(!result.meets_eligibility_gate);
        assert_eq!(result.current_level, RecognitionLevel::None);
        for gap in result.gaps() {
            assert!(!gap.achievable);
            assert!(!gap.achieved);
        }
        assert_eq!(result.distinguished_gap.paid_clubs_needed, 2);
        assert_eq!(result.presidents_gap.paid_clubs_needed, 4);
    }

    #[test]
    fn area_zero_base_lands_on_distinguished() {
        let result = area(0, 0, 0);
        assert!(result.meets_eligibility_gate);
        assert!(result.meets_no_net_loss_requirement);
        assert_eq!(result.distinguished_gap.required_distinguished, 0);
        assert_eq!(result.current_level, RecognitionLevel::Distinguished);
        assert_eq!(result.select_gap.distinguished_clubs_needed, 1);
        assert_eq!(result.presidents_gap.paid_clubs_needed, 1);
    }

    #[test]
    fn division_zero_base_needs_only_paid_growth() {
        let result = division(0, 0, 0);
        for gap in result.gaps() {
            assert_eq!(gap.required_distinguished, 0);
        }
        assert_eq!(result.current_level, RecognitionLevel::Distinguished);
        assert_eq!(result.select_gap.paid_clubs_needed, 1);
        assert_eq!(result.presidents_gap.paid_clubs_needed, 2);
    }

    #[test]
    fn area_gate_passes_below_club_base_but_no_tier_is_achieved() {
        let result = area(8, 6, 6);
        assert!(result.meets_eligibility_gate);
        assert!(!result.meets_no_net_loss_requirement);
        assert_eq!(result.current_level, RecognitionLevel::None);
        assert!(result.distinguished_gap.achievable);
        assert_eq!(result.distinguished_gap.paid_clubs_needed, 2);
        assert_eq!(result.distinguished_gap.distinguished_clubs_needed, 0);
    }

    #[test]
    fn area_gate_fails_below_three_quarters_paid() {
        let result = area(8, 5, 5);
        assert!(!result.meets_eligibility_gate);
        assert!(result.gaps().iter().all(|g| !g.achievable));
    }

    #[test]
    fn area_presidents_requires_growth_and_majority_plus_one() {
        let result = area(11, 12, 7);
        assert_eq!(result.current_level, RecognitionLevel::Presidents);
        let result = area(11, 11, 7);
        assert_eq!(result.current_level, RecognitionLevel::Select);
        assert_eq!(result.presidents_gap.paid_clubs_needed, 1);
        let result = area(11, 12, 6);
        assert_eq!(result.current_level, RecognitionLevel::Distinguished);
    }

    #[test]
    fn area_visit_gate_applies_only_with_visit_data() {
        let table = ThresholdTable::area();
        let without = PerformanceSnapshot::new(4, 4, 2);
        assert!(compute_with_table(&without, &table).meets_eligibility_gate);

        let short = without.with_visits(3, 2);
        let result = compute_with_table(&short, &table);
        assert!(!result.meets_eligibility_gate);
        assert_eq!(result.current_level, RecognitionLevel::None);

        let relaxed = table.without_visit_gate();
        assert_eq!(
            compute_with_table(&short, &relaxed).current_level,
            RecognitionLevel::Distinguished
        );
    }

    #[test]
    fn achieved_tiers_report_zero_gap() {
        for program in ProgramType::ALL {
            for base in 0..=12 {
                for paid in 0..=base + 3 {
                    for dist in 0..=paid {
                        let result = compute_gap_analysis(
                            &PerformanceSnapshot::new(base, paid, dist),
                            program,
                        );
                        for gap in result.gaps() {
                            if gap.achieved {
                                assert_eq!(gap.distinguished_clubs_needed, 0);
                                assert_eq!(gap.paid_clubs_needed, 0);
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn more_distinguished_clubs_never_lower_the_level() {
        for program in ProgramType::ALL {
            for base in 0..=15 {
                for paid in base..=base + 3 {
                    let mut previous = RecognitionLevel::None;
                    let mut previous_achieved = [false; 3];
                    for dist in 0..=paid {
                        let result = compute_gap_analysis(
                            &PerformanceSnapshot::new(base, paid, dist),
                            program,
                        );
                        assert!(result.current_level >= previous);
                        for (was, gap) in previous_achieved.iter().zip(result.gaps()) {
                            assert!(!*was || gap.achieved);
                        }
                        previous = result.current_level;
                        previous_achieved = result.gaps().map(|g| g.achieved);
                    }
                }
            }
        }
    }

    #[test]
    fn failed_gate_means_no_level_regardless_of_distinguished() {
        for base in 1..=20 {
            for dist in 0..=base {
                let result = division(base, base - 1, dist);
                assert_eq!(result.current_level, RecognitionLevel::None);
                assert!(result.gaps().iter().all(|g| !g.achievable && !g.achieved));
            }
        }
    }

    #[test]
    fn next_target_skips_achieved_tiers() {
        let result = division(50, 52, 26);
        let next = result.next_target().unwrap();
        assert_eq!(next.level, RecognitionLevel::Presidents);
        assert!(division(10, 12, 6).next_target().is_none());
    }
}
