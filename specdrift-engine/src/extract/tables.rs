//! Markdown table and scalar value parsing.

use specdrift_core::model::AttrValue;

/// A parsed markdown table: header cells plus body rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parse the first markdown table found in `lines`.
///
/// Expects `| a | b |` header, a `|---|---|` separator, then body rows.
/// Returns `None` when no table is present; rows with a different cell
/// count than the header are skipped.
pub fn parse_table(lines: &[&str]) -> Option<Table> {
    let mut iter = lines.iter().enumerate();
    let (header_idx, header) = loop {
        let (i, line) = iter.next()?;
        if let Some(cells) = split_row(line) {
            break (i, cells);
        }
    };

    // Separator row must directly follow the header.
    let sep = lines.get(header_idx + 1)?;
    let sep_cells = split_row(sep)?;
    if sep_cells.len() != header.len() || !sep_cells.iter().all(|c| is_separator(c)) {
        return None;
    }

    let mut rows = Vec::new();
    for line in &lines[header_idx + 2..] {
        match split_row(line) {
            Some(cells) if cells.len() == header.len() => rows.push(cells),
            Some(_) => continue,
            None => break,
        }
    }

    Some(Table { header, rows })
}

fn split_row(line: &str) -> Option<Vec<String>> {
    let trimmed = line.trim();
    if !trimmed.starts_with('|') || !trimmed.ends_with('|') || trimmed.len() < 2 {
        return None;
    }
    let inner = &trimmed[1..trimmed.len() - 1];
    Some(inner.split('|').map(|c| c.trim().to_string()).collect())
}

fn is_separator(cell: &str) -> bool {
    !cell.is_empty() && cell.chars().all(|c| c == '-' || c == ':')
}

/// Parse a scalar attribute value: bool, integer, float, or string.
pub fn parse_scalar(raw: &str) -> AttrValue {
    let trimmed = raw.trim();
    match trimmed {
        "true" => return AttrValue::Bool(true),
        "false" => return AttrValue::Bool(false),
        _ => {}
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return AttrValue::Int(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return AttrValue::Float(f);
    }
    AttrValue::Str(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_table() {
        let lines = [
            "| from | event | to |",
            "|------|-------|----|",
            "| Draft | submit | Open |",
            "| Open | pay | Paid |",
        ];
        let refs: Vec<&str> = lines.to_vec();
        let table = parse_table(&refs).unwrap();
        assert_eq!(table.header, vec!["from", "event", "to"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["Open", "pay", "Paid"]);
    }

    #[test]
    fn missing_separator_is_not_a_table() {
        let refs = vec!["| a | b |", "| 1 | 2 |"];
        assert_eq!(parse_table(&refs), None);
    }

    #[test]
    fn scalar_parsing_prefers_narrower_types() {
        assert_eq!(parse_scalar("true"), AttrValue::Bool(true));
        assert_eq!(parse_scalar("42"), AttrValue::Int(42));
        assert_eq!(parse_scalar("1.5"), AttrValue::Float(1.5));
        assert_eq!(parse_scalar("open"), AttrValue::Str("open".to_string()));
    }
}
