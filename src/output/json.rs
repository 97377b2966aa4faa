use anyhow::Result;
use serde::Serialize;

pub fn render_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> Result<String> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::render_json;
    use crate::gap::{compute_gap_analysis, PerformanceSnapshot};
    use crate::program::ProgramType;

    #[test]
    fn renders_snake_case_fields() {
        let result = compute_gap_analysis(&PerformanceSnapshot::new(50, 52, 26), ProgramType::Division);
        let compact = render_json(&result, true).unwrap();
        assert!(compact.contains(r#""current_level":"select""#));
        assert!(compact.contains(r#""meets_no_net_loss_requirement":true"#));
        assert!(!compact.contains('\n'));
        assert!(render_json(&result, false).unwrap().contains('\n'));
    }
}
