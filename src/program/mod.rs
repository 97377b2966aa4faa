pub mod thresholds;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use thresholds::{EligibilityGate, ThresholdTable, TierRequirement};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ProgramType {
    Area,
    Division,
}

impl ProgramType {
    pub const ALL: [ProgramType; 2] = [ProgramType::Area, ProgramType::Division];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Area => "area",
            Self::Division => "division",
        }
    }
}

impl Display for ProgramType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Area => "Area",
            Self::Division => "Division",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown program type: {0}")]
pub struct ProgramParseError(pub String);

impl FromStr for ProgramType {
    type Err = ProgramParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "area" | "areas" | "dap" => Ok(Self::Area),
            "division" | "divisions" | "ddp" => Ok(Self::Division),
            _ => Err(ProgramParseError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::ProgramType;

    #[test]
    fn parses_slugs_and_aliases() {
        assert_eq!(ProgramType::from_str("Area").unwrap(), ProgramType::Area);
        assert_eq!(ProgramType::from_str(" DDP ").unwrap(), ProgramType::Division);
        assert!(ProgramType::from_str("district").is_err());
    }

    #[test]
    fn slug_round_trips_through_from_str() {
        for program in ProgramType::ALL {
            assert_eq!(ProgramType::from_str(program.as_slug()).unwrap(), program);
        }
    }
}
