pub const BASE_MIGRATION: &str = r#"
CREATE TABLE IF NOT EXISTS analysis_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    unit_id TEXT NOT NULL,
    program TEXT NOT NULL,
    as_of TEXT NOT NULL,
    club_base INTEGER NOT NULL,
    paid_clubs INTEGER NOT NULL,
    distinguished_clubs INTEGER NOT NULL,
    level TEXT NOT NULL,
    no_net_loss INTEGER NOT NULL,
    captured_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_analysis_unit_program_as_of
    ON analysis_history(unit_id, program, as_of DESC);
"#;
