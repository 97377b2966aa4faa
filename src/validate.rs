//! Input checks applied before counts reach the calculator.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::gap::PerformanceSnapshot;
use crate::program::ProgramType;

/// Upper bound on any club count for a single area or division.
pub const MAX_CLUB_COUNT: u32 = 1_000;

static AREA_ID: OnceLock<Result<Regex, String>> = OnceLock::new();
static DIVISION_ID: OnceLock<Result<Regex, String>> = OnceLock::new();
static PROGRAM_YEAR: OnceLock<Result<Regex, String>> = OnceLock::new();

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be at most {max}, got {value}")]
    TooLarge {
        field: &'static str,
        value: u32,
        max: u32,
    },
    #[error("distinguished clubs ({distinguished}) exceed paid clubs ({paid})")]
    DistinguishedExceedsPaid { distinguished: u32, paid: u32 },
    #[error("{round} visits ({visits}) exceed club base ({club_base})")]
    VisitsExceedBase {
        round: &'static str,
        visits: u32,
        club_base: u32,
    },
    #[error("invalid {kind} id: {value:?}")]
    InvalidId { kind: &'static str, value: String },
    #[error("area {area} is not in division {division}")]
    AreaOutsideDivision { area: String, division: String },
    #[error("duplicate {kind} id: {value}")]
    DuplicateId { kind: &'static str, value: String },
    #[error("invalid program year {0:?}, expected YYYY-YYYY")]
    InvalidProgramYear(String),
    #[error("goal {target} is below the current count {current}")]
    GoalBelowCurrent { current: u32, target: u32 },
    #[error("invalid pattern: {0}")]
    Pattern(String),
}

pub fn validate_snapshot(snapshot: &PerformanceSnapshot) -> Result<(), ValidationError> {
    check_max("club_base", snapshot.club_base)?;
    check_max("paid_clubs", snapshot.paid_clubs)?;
    check_max("distinguished_clubs", snapshot.distinguished_clubs)?;
    if snapshot.distinguished_clubs > snapshot.paid_clubs {
        return Err(ValidationError::DistinguishedExceedsPaid {
            distinguished: snapshot.distinguished_clubs,
            paid: snapshot.paid_clubs,
        });
    }
    if let Some(visits) = snapshot.club_visits {
        for (round, count) in [
            ("first round", visits.first_round),
            ("second round", visits.second_round),
        ] {
            if count > snapshot.club_base {
                return Err(ValidationError::VisitsExceedBase {
                    round,
                    visits: count,
                    club_base: snapshot.club_base,
                });
            }
        }
    }
    Ok(())
}

/// Area ids are a division letter followed by one or two digits (`B7`).
pub fn validate_area_id(value: &str) -> Result<(), ValidationError> {
    check_pattern(&AREA_ID, r"^[A-Z][0-9]{1,2}$", "area", value)
}

pub fn validate_division_id(value: &str) -> Result<(), ValidationError> {
    check_pattern(&DIVISION_ID, r"^[A-Z]$", "division", value)
}

/// The area id's letter must name the division it is filed under.
pub fn validate_area_in_division(area: &str, division: &str) -> Result<(), ValidationError> {
    validate_area_id(area)?;
    validate_division_id(division)?;
    if !area.starts_with(division) {
        return Err(ValidationError::AreaOutsideDivision {
            area: area.to_string(),
            division: division.to_string(),
        });
    }
    Ok(())
}

pub fn validate_unit_id(program: ProgramType, value: &str) -> Result<(), ValidationError> {
    match program {
        ProgramType::Area => validate_area_id(value),
        ProgramType::Division => validate_division_id(value),
    }
}

pub fn validate_program_year(value: &str) -> Result<(), ValidationError> {
    let re = compiled(&PROGRAM_YEAR, r"^(\d{4})-(\d{4})$")?;
    let invalid = || ValidationError::InvalidProgramYear(value.to_string());
    let caps = re.captures(value.trim()).ok_or_else(invalid)?;
    let start: u32 = caps[1].parse().map_err(|_| invalid())?;
    let end: u32 = caps[2].parse().map_err(|_| invalid())?;
    if end != start + 1 {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_goal(current: u32, target: u32) -> Result<(), ValidationError> {
    check_max("goal", target)?;
    if target < current {
        return Err(ValidationError::GoalBelowCurrent { current, target });
    }
    Ok(())
}

fn check_max(field: &'static str, value: u32) -> Result<(), ValidationError> {
    if value > MAX_CLUB_COUNT {
        return Err(ValidationError::TooLarge {
            field,
            value,
            max: MAX_CLUB_COUNT,
        });
    }
    Ok(())
}

fn compiled(
    cell: &'static OnceLock<Result<Regex, String>>,
    pattern: &str,
) -> Result<&'static Regex, ValidationError> {
    cell.get_or_init(|| Regex::new(pattern).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| ValidationError::Pattern(e.clone()))
}

fn check_pattern(
    cell: &'static OnceLock<Result<Regex, String>>,
    pattern: &str,
    kind: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    let re = compiled(cell, pattern)?;
    if re.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidId {
            kind,
            value: value.to_string(),
        })
    }
}
