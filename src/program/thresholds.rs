//! Recognition thresholds for the Distinguished Area and Distinguished
//! Division programs.
//!
//! Percentages are whole numbers and always apply to the club base, never
//! to the paid count. Every percentage is rounded up so that meeting the
//! requirement means actually reaching the share (50% of 11 clubs is 6).

use serde::{Deserialize, Serialize};

use crate::gap::RecognitionLevel;
use crate::program::ProgramType;

/// Share of the club base that must be paid before an area can earn any
/// recognition.
pub const AREA_PAID_GATE_PERCENT: u32 = 75;

/// Share of the club base that must receive a club visit in each round.
pub const AREA_VISIT_PERCENT: u32 = 75;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityGate {
    PaidPercentOfBase(u32),
    NoNetLoss,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierRequirement {
    pub level: RecognitionLevel,
    /// Paid clubs must reach `club_base + paid_offset`.
    pub paid_offset: u32,
    pub distinguished_percent: u32,
    /// Fixed number of clubs added on top of the percentage share.
    pub distinguished_surplus: u32,
}

impl TierRequirement {
    pub fn required_paid(&self, club_base: u32) -> u32 {
        club_base.saturating_add(self.paid_offset)
    }

    pub fn required_distinguished(&self, club_base: u32) -> u32 {
        percent_of_base(club_base, self.distinguished_percent)
            .saturating_add(self.distinguished_surplus)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThresholdTable {
    pub program: ProgramType,
    pub gate: EligibilityGate,
    /// Ascending: Distinguished, Select, President's.
    pub tiers: [TierRequirement; 3],
    /// Club-visit share required in each round, checked only when visit
    /// data is supplied.
    pub visit_percent: Option<u32>,
}

impl ThresholdTable {
    pub fn for_program(program: ProgramType) -> Self {
        match program {
            ProgramType::Area => Self::area(),
            ProgramType::Division => Self::division(),
        }
    }

    /// The Select and President's `+1` is a fixed club count added after the
    /// percentage, not part of it: a zero base still needs one distinguished
    /// club for those tiers, while the percentage component stays zero.
    pub fn area() -> Self {
        Self {
            program: ProgramType::Area,
            gate: EligibilityGate::PaidPercentOfBase(AREA_PAID_GATE_PERCENT),
            tiers: [
                tier(RecognitionLevel::Distinguished, 0, 50, 0),
                tier(RecognitionLevel::Select, 0, 50, 1),
                tier(RecognitionLevel::Presidents, 1, 50, 1),
            ],
            visit_percent: Some(AREA_VISIT_PERCENT),
        }
    }

    pub fn division() -> Self {
        Self {
            program: ProgramType::Division,
            gate: EligibilityGate::NoNetLoss,
            tiers: [
                tier(RecognitionLevel::Distinguished, 0, 45, 0),
                tier(RecognitionLevel::Select, 1, 50, 0),
                tier(RecognitionLevel::Presidents, 2, 55, 0),
            ],
            visit_percent: None,
        }
    }

    pub fn without_visit_gate(mut self) -> Self {
        self.visit_percent = None;
        self
    }

    pub fn tier(&self, level: RecognitionLevel) -> Option<&TierRequirement> {
        self.tiers.iter().find(|t| t.level == level)
    }

    /// Paid clubs needed to pass the eligibility gate.
    pub fn gate_paid_requirement(&self, club_base: u32) -> u32 {
        match self.gate {
            EligibilityGate::PaidPercentOfBase(pct) => percent_of_base(club_base, pct),
            EligibilityGate::NoNetLoss => club_base,
        }
    }

    pub fn required_visits(&self, club_base: u32) -> Option<u32> {
        self.visit_percent
            .map(|pct| percent_of_base(club_base, pct))
    }
}

fn tier(
    level: RecognitionLevel,
    paid_offset: u32,
    distinguished_percent: u32,
    distinguished_surplus: u32,
) -> TierRequirement {
    TierRequirement {
        level,
        paid_offset,
        distinguished_percent,
        distinguished_surplus,
    }
}

/// `ceil(club_base * percent / 100)` in integer arithmetic.
pub fn percent_of_base(club_base: u32, percent: u32) -> u32 {
    if club_base == 0 || percent == 0 {
        return 0;
    }
    let scaled = u64::from(club_base) * u64::from(percent);
    let rounded = scaled.div_ceil(100);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
