//! Badge labels and compact gap tokens for dashboards and tables.
//!
//! Kept apart from the calculator: these only read a finished
//! [`GapAnalysisResult`].

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::gap::{GapAnalysisResult, LevelGap, RecognitionLevel};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BadgeStyle {
    Presidents,
    Select,
    Distinguished,
    NotDistinguished,
    NetLoss,
}

impl BadgeStyle {
    pub fn as_key(&self) -> &'static str {
        match self {
            Self::Presidents => "presidents",
            Self::Select => "select",
            Self::Distinguished => "distinguished",
            Self::NotDistinguished => "not_distinguished",
            Self::NetLoss => "net_loss",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub style: BadgeStyle,
}

pub fn badge_for(result: &GapAnalysisResult) -> Badge {
    match result.current_level {
        RecognitionLevel::Presidents => Badge {
            label: "President's Distinguished",
            style: BadgeStyle::Presidents,
        },
        RecognitionLevel::Select => Badge {
            label: "Select Distinguished",
            style: BadgeStyle::Select,
        },
        RecognitionLevel::Distinguished => Badge {
            label: "Distinguished",
            style: BadgeStyle::Distinguished,
        },
        RecognitionLevel::None if !result.meets_no_net_loss_requirement => Badge {
            label: "Net Loss",
            style: BadgeStyle::NetLoss,
        },
        RecognitionLevel::None => Badge {
            label: "Not Distinguished",
            style: BadgeStyle::NotDistinguished,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapToken {
    Achieved,
    NotAchievable,
    Needed { distinguished: u32, paid: u32 },
}

pub fn gap_token(gap: &LevelGap) -> GapToken {
    if gap.achieved {
        GapToken::Achieved
    } else if !gap.achievable {
        GapToken::NotAchievable
    } else {
        GapToken::Needed {
            distinguished: gap.distinguished_clubs_needed,
            paid: gap.paid_clubs_needed,
        }
    }
}

impl Display for GapToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Achieved => write!(f, "✓"),
            Self::NotAchievable => write!(f, "N/A"),
            Self::Needed {
                distinguished,
                paid: 0,
            } => write!(f, "{distinguished}"),
            Self::Needed {
                distinguished: 0,
                paid,
            } => write!(f, "+{paid}p"),
            Self::Needed {
                distinguished,
                paid,
            } => write!(f, "{distinguished} +{paid}p"),
        }
    }
}

impl Serialize for GapToken {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
