//! Delimited text to attribute rows.

use incident_map_records_models::Attributes;

use crate::RecordsError;

/// Parses comma-separated `text` with a header row into one [`Attributes`]
/// per data row.
///
/// Header names are trimmed. Rows with fewer fields than the header are
/// skipped; extra trailing fields are ignored.
///
/// # Errors
///
/// Returns [`RecordsError::Csv`] on malformed input and
/// [`RecordsError::Empty`] when no usable data row remains.
pub fn parse_rows(text: &str, uri: &str) -> Result<Vec<Attributes>, RecordsError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(RecordsError::Source {
            uri: uri.to_string(),
            message: "no header row".to_string(),
        });
    }

    let mut rows = Vec::new();
    let mut short = 0_usize;

    for result in reader.records() {
        let record = result?;
        if record.len() < headers.len() {
            short += 1;
            continue;
        }
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.as_str(), v))
                .collect::<Attributes>(),
        );
    }

    if short > 0 {
        log::debug!("[{uri}] skipped {short} short row(s)");
    }

    if rows.is_empty() {
        return Err(RecordsError::Empty {
            uri: uri.to_string(),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_with_trimmed_headers() {
        let rows = parse_rows(" MUNICIPIO , ZONA\nTepeaca,Norte\n", "t.csv").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("MUNICIPIO"), Some("Tepeaca"));
        assert_eq!(rows[0].get("ZONA"), Some("Norte"));
    }

    #[test]
    fn skips_rows_shorter_than_header() {
        let rows = parse_rows("A,B,C\n1,2,3\n4,5\n6,7,8,9\n", "t.csv").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("C"), Some("8"));
        assert_eq!(rows[1].len(), 3);
    }

    #[test]
    fn handles_quoted_commas() {
        let rows = parse_rows("LUGAR,Municipio\n\"Km 5, carretera\",Amozoc\n", "t.csv").unwrap();
        assert_eq!(rows[0].get("LUGAR"), Some("Km 5, carretera"));
    }

    #[test]
    fn header_only_file_is_empty() {
        assert!(matches!(
            parse_rows("A,B\n", "t.csv"),
            Err(RecordsError::Empty { .. })
        ));
        assert!(matches!(
            parse_rows("", "t.csv"),
            Err(RecordsError::Source { .. })
        ));
    }
}
