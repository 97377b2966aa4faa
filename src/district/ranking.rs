use std::cmp::Ordering;

use crate::district::UnitAnalysis;

/// Orders units best-first and assigns 1-based ranks: level, then
/// distinguished share of the club base, then net club growth, then id.
pub fn rank_units(units: &mut [UnitAnalysis]) {
    units.sort_by(compare_units);
    for (idx, unit) in units.iter_mut().enumerate() {
        unit.rank = idx + 1;
    }
}

fn compare_units(a: &UnitAnalysis, b: &UnitAnalysis) -> Ordering {
    b.result
        .current_level
        .cmp(&a.result.current_level)
        .then_with(|| {
            b.snapshot
                .distinguished_share()
                .total_cmp(&a.snapshot.distinguished_share())
        })
        .then_with(|| b.snapshot.net_growth().cmp(&a.snapshot.net_growth()))
        .then_with(|| a.unit_id.cmp(&b.unit_id))
}
