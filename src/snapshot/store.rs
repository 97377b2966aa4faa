use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use tracing::{debug, warn};

use crate::gap::{AnalysisRecord, RecognitionLevel};
use crate::program::ProgramType;
use crate::snapshot::migrations::BASE_MIGRATION;

pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        debug!("opened history store at {}", path.display());
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(BASE_MIGRATION)?;
        Ok(())
    }

    pub fn insert_record(&self, record: &AnalysisRecord) -> Result<()> {
        self.conn.execute(
            r#"
INSERT INTO analysis_history(
    unit_id, program, as_of, club_base, paid_clubs, distinguished_clubs,
    level, no_net_loss, captured_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
"#,
            params![
                record.unit_id,
                record.program.as_slug(),
                record.as_of.to_string(),
                record.club_base,
                record.paid_clubs,
                record.distinguished_clubs,
                record.level.as_slug(),
                if record.meets_no_net_loss_requirement { 1 } else { 0 },
                record.captured_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// Most recent first.
    pub fn load_history(
        &self,
        unit_id: &str,
        program: Option<ProgramType>,
        limit: usize,
    ) -> Result<Vec<AnalysisRecord>> {
        let sql = if program.is_some() {
            r#"
SELECT unit_id, program, as_of, club_base, paid_clubs, distinguished_clubs,
       level, no_net_loss, captured_at
FROM analysis_history
WHERE unit_id = ?1 AND program = ?2
ORDER BY as_of DESC, id DESC
LIMIT ?3
"#
        } else {
            r#"
SELECT unit_id, program, as_of, club_base, paid_clubs, distinguished_clubs,
       level, no_net_loss, captured_at
FROM analysis_history
WHERE unit_id = ?1
ORDER BY as_of DESC, id DESC
LIMIT ?2
"#
        };

        let mut stmt = self.conn.prepare(sql)?;
        let rows = if let Some(program) = program {
            stmt.query_map(
                params![unit_id, program.as_slug(), limit as i64],
                row_to_record,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![unit_id, limit as i64], row_to_record)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        };
        Ok(rows)
    }

    pub fn latest_record(
        &self,
        unit_id: &str,
        program: ProgramType,
    ) -> Result<Option<AnalysisRecord>> {
        Ok(self
            .load_history(unit_id, Some(program), 1)?
            .into_iter()
            .next())
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<AnalysisRecord> {
    let unit_id: String = row.get(0)?;
    let program_raw: String = row.get(1)?;
    let program = program_raw.parse::<ProgramType>().unwrap_or_else(|_| {
        warn!("history row for {unit_id}: unknown program {program_raw:?}, reading as area");
        ProgramType::Area
    });
    let as_of_raw: String = row.get(2)?;
    let as_of = as_of_raw.parse::<NaiveDate>().unwrap_or_else(|_| {
        warn!("history row for {unit_id}: bad as_of {as_of_raw:?}, using today");
        Utc::now().date_naive()
    });
    let level_raw: String = row.get(6)?;
    let level = RecognitionLevel::from_slug(&level_raw).unwrap_or_else(|| {
        warn!("history row for {unit_id}: unknown level {level_raw:?}, reading as none");
        RecognitionLevel::None
    });
    let captured_at_raw: String = row.get(8)?;
    let captured_at = DateTime::parse_from_rfc3339(&captured_at_raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            warn!("history row for {unit_id}: bad captured_at {captured_at_raw:?}, using now");
            Utc::now()
        });
    Ok(AnalysisRecord {
        unit_id,
        program,
        as_of,
        club_base: row.get(3)?,
        paid_clubs: row.get(4)?,
        distinguished_clubs: row.get(5)?,
        level,
        meets_no_net_loss_requirement: row.get::<_, i64>(7)? != 0,
        captured_at,
    })
}
