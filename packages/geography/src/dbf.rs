//! dBase attribute tables (`.dbf`).
//!
//! Text is stored single-byte; the state shapefiles use Latin-1, so every
//! field is decoded as Windows-1252 and mojibake repair happens later, once
//! the feature survives filtering.

use std::io::Cursor;

use chrono::NaiveDate;
use dbase::FieldValue;
use dbase::encoding::EncodingRs;
use incident_map_records_models::Attributes;

use crate::GeoError;

fn dbf_error(e: impl std::fmt::Display) -> GeoError {
    GeoError::Dbf {
        message: e.to_string(),
    }
}

/// Reads the rows of an in-memory `.dbf` file as [`Attributes`].
pub struct DbfReader<'a> {
    inner: dbase::Reader<Cursor<&'a [u8]>>,
    fields: Vec<String>,
}

impl<'a> DbfReader<'a> {
    /// Parses the header and field descriptors.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Dbf`] if the header is truncated or invalid.
    pub fn new(bytes: &'a [u8]) -> Result<Self, GeoError> {
        let inner = dbase::Reader::new_with_encoding(
            Cursor::new(bytes),
            EncodingRs::from(encoding_rs::WINDOWS_1252),
        )
        .map_err(dbf_error)?;
        let fields = inner
            .fields()
            .iter()
            .map(|field| field.name().trim().to_string())
            .collect();
        Ok(Self { inner, fields })
    }

    /// Column names in file order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Decodes rows in file order. Every column is present in each row;
    /// blank or unparseable cells map to `None`.
    pub fn rows(&mut self) -> impl Iterator<Item = Result<Attributes, GeoError>> + '_ {
        let fields = &self.fields;
        self.inner.iter_records().map(move |record| {
            let record = record.map_err(dbf_error)?;
            let mut attributes = Attributes::new();
            for name in fields {
                attributes.insert(name.clone(), record.get(name).and_then(cell_text));
            }
            Ok(attributes)
        })
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn number(value: f64) -> Option<String> {
    value.is_finite().then(|| value.to_string())
}

fn cell_text(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Character(text) => text.as_deref().and_then(non_empty),
        FieldValue::Memo(text) => non_empty(text),
        FieldValue::Numeric(n) => n.and_then(number),
        FieldValue::Float(n) => n.map(f64::from).and_then(number),
        FieldValue::Double(n) | FieldValue::Currency(n) => number(*n),
        FieldValue::Integer(n) => Some(n.to_string()),
        FieldValue::Logical(flag) => flag.map(|b| b.to_string()),
        FieldValue::Date(date) => date.as_ref().and_then(|d| {
            NaiveDate::from_ymd_opt(i32::try_from(d.year()).ok()?, d.month(), d.day())
                .map(|d| d.format("%Y-%m-%d").to_string())
        }),
        other => {
            log::debug!("Ignoring unsupported dbf value {other:?}");
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const DESCRIPTOR_LEN: usize = 32;

    /// Builds a dBase III file with `(name, type, width)` columns and raw
    /// rows.
    pub fn build_dbf(fields: &[(&str, u8, u8)], rows: &[&[&[u8]]]) -> Vec<u8> {
        let record_len: usize = 1 + fields.iter().map(|f| usize::from(f.2)).sum::<usize>();
        let header_len = DESCRIPTOR_LEN + fields.len() * DESCRIPTOR_LEN + 1;

        let mut out = vec![0_u8; DESCRIPTOR_LEN];
        out[0] = 3;
        out[1] = 124;
        out[2] = 1;
        out[3] = 1;
        out[4..8].copy_from_slice(&u32::try_from(rows.len()).unwrap().to_le_bytes());
        out[8..10].copy_from_slice(&u16::try_from(header_len).unwrap().to_le_bytes());
        out[10..12].copy_from_slice(&u16::try_from(record_len).unwrap().to_le_bytes());

        for (name, kind, width) in fields {
            let mut descriptor = [0_u8; DESCRIPTOR_LEN];
            descriptor[..name.len()].copy_from_slice(name.as_bytes());
            descriptor[11] = *kind;
            descriptor[16] = *width;
            out.extend_from_slice(&descriptor);
        }
        out.push(0x0D);

        for row in rows {
            out.push(b' ');
            for ((_, _, width), value) in fields.iter().zip(row.iter()) {
                let mut cell = vec![b' '; usize::from(*width)];
                cell[..value.len()].copy_from_slice(value);
                out.extend_from_slice(&cell);
            }
        }
        out.push(0x1A);
        out
    }

    #[test]
    fn decodes_typed_columns() {
        let file = build_dbf(
            &[
                ("NOMGEO", b'C', 20),
                ("CVEGEO", b'C', 5),
                ("DPFGE_2014", b'N', 6),
                ("ACTIVO", b'L', 1),
                ("FECHA", b'D', 8),
            ],
            &[
                &[b"Ca\xF1ada Morelos", b"21026", b"   12", b"T", b"20140315"],
                &[b"", b"21001", b"", b"?", b""],
            ],
        );
        let mut reader = DbfReader::new(&file).unwrap();
        assert_eq!(
            reader.fields(),
            ["NOMGEO", "CVEGEO", "DPFGE_2014", "ACTIVO", "FECHA"]
        );

        let rows: Vec<_> = reader.rows().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(first.get("NOMGEO"), Some("Cañada Morelos"));
        assert_eq!(first.get("CVEGEO"), Some("21026"));
        assert_eq!(first.get("DPFGE_2014"), Some("12"));
        assert_eq!(first.get("ACTIVO"), Some("true"));
        assert_eq!(first.get("FECHA"), Some("2014-03-15"));

        let second = &rows[1];
        assert!(second.contains_key("NOMGEO"));
        assert_eq!(second.get("NOMGEO"), None);
        assert_eq!(second.get("DPFGE_2014"), None);
        assert_eq!(second.get("ACTIVO"), None);
        assert_eq!(second.get("FECHA"), None);
    }

    #[test]
    fn decimal_fields_keep_their_value() {
        let file = build_dbf(&[("TASA", b'N', 8)], &[&[b"  3.50"]]);
        let row = DbfReader::new(&file).unwrap().rows().next().unwrap().unwrap();
        assert_eq!(row.get("TASA"), Some("3.5"));
    }

    #[test]
    fn rejects_truncated_files() {
        assert!(DbfReader::new(&[0_u8; 8]).is_err());

        let mut file = build_dbf(&[("A", b'C', 4)], &[&[b"x"], &[b"y"]]);
        file.truncate(file.len() - 6);
        let mut reader = DbfReader::new(&file).unwrap();
        let mut rows = reader.rows();
        assert!(rows.next().unwrap().is_ok());
        assert!(rows.next().unwrap().is_err());
    }
}
