use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};

use crate::district::AreaRow;

/// Reads area rows from a `.csv` or `.json` file.
pub fn load_area_rows(path: &Path) -> Result<Vec<AreaRow>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let rows = match extension.as_str() {
        "csv" => {
            let file = fs::File::open(path)
                .with_context(|| format!("failed opening area file: {}", path.display()))?;
            parse_csv(file)
                .with_context(|| format!("failed parsing CSV: {}", path.display()))?
        }
        "json" => {
            let data = fs::read_to_string(path)
                .with_context(|| format!("failed reading area file: {}", path.display()))?;
            parse_json(&data)
                .with_context(|| format!("failed parsing JSON: {}", path.display()))?
        }
        other => {
            return Err(anyhow!(
                "unsupported area file extension {other:?}, expected csv or json"
            ))
        }
    };
    info!("loaded {} area rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<AreaRow>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for (idx, record) in reader.deserialize::<AreaRow>().enumerate() {
        let row = record.with_context(|| format!("invalid record {}", idx + 1))?;
        debug!("area {} in division {}", row.area, row.division);
        rows.push(row);
    }
    Ok(rows)
}

pub fn parse_json(data: &str) -> Result<Vec<AreaRow>> {
    Ok(serde_json::from_str(data)?)
}

#[cfg(test)]
mod tests {
    use super::{parse_csv, parse_json};

    #[test]
    fn parses_csv_with_optional_visits() {
        let data = "\
division,area,club_base,paid_clubs,distinguished_clubs,first_round_visits,second_round_visits
A, A1, 5, 6, 3, 5, 4
B,B2,4,4,2,,
";
        let rows = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].area, "A1");
        assert_eq!(rows[0].snapshot().club_visits.unwrap().second_round, 4);
        assert_eq!(rows[1].first_round_visits, None);
        assert!(rows[1].snapshot().club_visits.is_none());
    }

    #[test]
    fn rejects_negative_counts() {
        let data = "division,area,club_base,paid_clubs,distinguished_clubs\nA,A1,5,-1,0\n";
        assert!(parse_csv(data.as_bytes()).is_err());
    }

    #[test]
    fn parses_json_rows() {
        let rows = parse_json(
            r#"[{"division":"C","area":"C3","club_base":6,"paid_clubs":6,"distinguished_clubs":3}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].division, "C");
        assert_eq!(rows[0].club_base, 6);
    }
}
