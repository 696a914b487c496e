use std::path::Path;

/// Column names of the measurement table inside a report file.
pub const RESULT_COLUMNS: [&str; 5] = ["dut_no", "switch", "test_type", "value", "result"];

/// Read all CSV records as string rows.
pub fn read_rows_csv(filepath: &Path) -> Result<Vec<Vec<String>>, String> {
    // Try UTF-8 first, then latin1 (read as bytes and convert)
    let content = std::fs::read(filepath).map_err(|e| format!("Cannot read file: {e}"))?;

    let text = String::from_utf8(content.clone()).unwrap_or_else(|_| {
        // Fallback: treat as latin1 (each byte maps to same Unicode code point)
        content.iter().map(|&b| b as char).collect()
    });

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => rows.push(record.iter().map(|s| s.to_string()).collect()),
            Err(_) => continue,
        }
    }

    if rows.is_empty() {
        return Err("No data found in file".to_string());
    }
    Ok(rows)
}

/// Read the first sheet of an Excel workbook as string rows.
pub fn read_rows_excel(filepath: &Path) -> Result<Vec<Vec<String>>, String> {
    use calamine::{open_workbook_auto, Data, Reader};

    let mut workbook =
        open_workbook_auto(filepath).map_err(|e| format!("Cannot open Excel file: {e}"))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .ok_or("No sheets found")?
        .clone();

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Cannot read sheet: {e}"))?;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    Data::String(s) => s.clone(),
                    Data::Float(f) => f.to_string(),
                    Data::Int(i) => i.to_string(),
                    Data::Bool(b) => b.to_string(),
                    Data::DateTime(dt) => dt.to_string(),
                    Data::DateTimeIso(s) => s.clone(),
                    Data::DurationIso(s) => s.clone(),
                    Data::Error(e) => format!("{e:?}"),
                })
                .collect()
        })
        .collect();

    if rows.is_empty() {
        return Err("No data in sheet".to_string());
    }
    Ok(rows)
}

/// Find the measurement-table header row: the first row whose leading
/// cells spell out [`RESULT_COLUMNS`]. Rows above it are `key,value`
/// report metadata.
pub fn detect_result_header(rows: &[Vec<String>]) -> Option<usize> {
    rows.iter().position(|row| {
        row.len() >= RESULT_COLUMNS.len()
            && RESULT_COLUMNS
                .iter()
                .zip(row.iter())
                .all(|(want, cell)| cell.trim().eq_ignore_ascii_case(want))
    })
}

/// Parse a measurement cell. Empty and non-numeric cells are null
/// measurements, not errors; non-finite numbers are discarded too.
pub fn parse_measurement(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn header_detection_skips_metadata_rows() {
        let rows = rows(&[
            &["pn", "9007-05-10"],
            &["relays_tested", "100"],
            &["dut_no", "switch", "test_type", "value", "result"],
            &["1", "0", "CRS", "500.3", "PASS"],
        ]);
        assert_eq!(detect_result_header(&rows), Some(2));
    }

    #[test]
    fn header_detection_is_case_insensitive() {
        let rows = rows(&[&["DUT_NO", "Switch", "TEST_TYPE", "Value", "Result"]]);
        assert_eq!(detect_result_header(&rows), Some(0));
    }

    #[test]
    fn missing_header_is_none() {
        let rows = rows(&[&["pn", "9007-05-10"], &["1", "0", "CRS", "500.3", "PASS"]]);
        assert_eq!(detect_result_header(&rows), None);
    }

    #[test]
    fn measurement_cells_parse_leniently() {
        assert_eq!(parse_measurement(" 500.3 "), Some(500.3));
        assert_eq!(parse_measurement("0"), Some(0.0));
        assert_eq!(parse_measurement(""), None);
        assert_eq!(parse_measurement("n/a"), None);
        assert_eq!(parse_measurement("NaN"), None);
        assert_eq!(parse_measurement("inf"), None);
    }
}
