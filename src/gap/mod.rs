pub mod calculator;
pub mod history;
pub mod whatif;

use std::fmt::{Display, Formatter};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::program::ProgramType;

pub use calculator::{compute_gap_analysis, compute_with_table};

/// Club counts for one area or division at a point in the program year.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PerformanceSnapshot {
    /// Clubs at the start of the program year.
    pub club_base: u32,
    pub paid_clubs: u32,
    /// Paid clubs holding club-level Distinguished status or better.
    /// Expected to be at most `paid_clubs`.
    pub distinguished_clubs: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club_visits: Option<ClubVisits>,
}

impl PerformanceSnapshot {
    pub fn new(club_base: u32, paid_clubs: u32, distinguished_clubs: u32) -> Self {
        Self {
            club_base,
            paid_clubs,
            distinguished_clubs,
            club_visits: None,
        }
    }

    pub fn with_visits(mut self, first_round: u32, second_round: u32) -> Self {
        self.club_visits = Some(ClubVisits {
            first_round,
            second_round,
        });
        self
    }

    pub fn net_growth(&self) -> i64 {
        i64::from(self.paid_clubs) - i64::from(self.club_base)
    }

    pub fn distinguished_share(&self) -> f64 {
        if self.club_base == 0 {
            return 0.0;
        }
        f64::from(self.distinguished_clubs) / f64::from(self.club_base)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClubVisits {
    pub first_round: u32,
    pub second_round: u32,
}

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionLevel {
    #[default]
    None,
    Distinguished,
    Select,
    Presidents,
}

impl RecognitionLevel {
    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Distinguished => "distinguished",
            Self::Select => "select",
            Self::Presidents => "presidents",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "none" => Some(Self::None),
            "distinguished" => Some(Self::Distinguished),
            "select" => Some(Self::Select),
            "presidents" => Some(Self::Presidents),
            _ => None,
        }
    }
}

impl Display for RecognitionLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::None => "Not Distinguished",
            Self::Distinguished => "Distinguished",
            Self::Select => "Select Distinguished",
            Self::Presidents => "President's Distinguished",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelGap {
    pub level: RecognitionLevel,
    pub achieved: bool,
    /// False when the eligibility gate fails; no count of distinguished
    /// clubs makes the tier reachable until it passes again.
    pub achievable: bool,
    pub distinguished_clubs_needed: u32,
    pub paid_clubs_needed: u32,
    pub required_distinguished: u32,
    pub required_paid: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GapAnalysisResult {
    pub program: ProgramType,
    pub current_level: RecognitionLevel,
    /// Paid clubs at or above the club base.
    pub meets_no_net_loss_requirement: bool,
    /// The program's own gate: no net loss for divisions, the paid share
    /// (and visit share, when known) for areas.
    pub meets_eligibility_gate: bool,
    pub distinguished_gap: LevelGap,
    pub select_gap: LevelGap,
    pub presidents_gap: LevelGap,
}

impl GapAnalysisResult {
    pub fn gaps(&self) -> [&LevelGap; 3] {
        [&self.distinguished_gap, &self.select_gap, &self.presidents_gap]
    }

    pub fn gap_for(&self, level: RecognitionLevel) -> Option<&LevelGap> {
        match level {
            RecognitionLevel::None => None,
            RecognitionLevel::Distinguished => Some(&self.distinguished_gap),
            RecognitionLevel::Select => Some(&self.select_gap),
            RecognitionLevel::Presidents => Some(&self.presidents_gap),
        }
    }

    /// Lowest tier not yet achieved.
    pub fn next_target(&self) -> Option<&LevelGap> {
        self.gaps().into_iter().find(|g| !g.achieved)
    }
}

/// One stored analysis, as persisted in the history store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRecord {
    pub unit_id: String,
    pub program: ProgramType,
    pub as_of: NaiveDate,
    pub club_base: u32,
    pub paid_clubs: u32,
    pub distinguished_clubs: u32,
    pub level: RecognitionLevel,
    pub meets_no_net_loss_requirement: bool,
    pub captured_at: DateTime<Utc>,
}
