//! CSV source reader.

use super::row::{SourceRow, SourceSchema};
use super::{SourceReader, SourceTable};
use crate::error::SourceError;
use csv::ReaderBuilder;
use encoding_rs::UTF_8;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Character encoding of the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// ISO-8859-1; every byte maps to the code point of the same value.
    ///
    /// Decoded by hand: `encoding_rs` resolves the `latin1` label to
    /// windows-1252, which maps 0x80..=0x9F to different characters.
    #[default]
    Latin1,
    Utf8,
}

impl Encoding {
    /// Decode raw file contents.
    pub fn decode(self, bytes: Vec<u8>) -> Result<String, SourceError> {
        match self {
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Encoding::Utf8 => {
                let (text, had_errors) = UTF_8.decode_with_bom_removal(&bytes);
                if had_errors {
                    return Err(SourceError::Encoding(format!(
                        "invalid UTF-8 at byte {}",
                        encoding_rs::Encoding::utf8_valid_up_to(&bytes)
                    )));
                }
                Ok(text.into_owned())
            }
        }
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Encoding::Latin1),
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            other => Err(format!(
                "unsupported encoding '{}'. Supported: latin-1, utf-8",
                other
            )),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Latin1 => write!(f, "latin-1"),
            Encoding::Utf8 => write!(f, "utf-8"),
        }
    }
}

/// Reads the denormalized dataset from a CSV file with a header row.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    encoding: Encoding,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>, encoding: Encoding) -> Self {
        Self {
            path: path.into(),
            encoding,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse already-decoded CSV text.
    pub fn parse_str(contents: &str) -> Result<SourceTable, SourceError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(contents.as_bytes());

        let schema = SourceSchema::resolve(reader.headers()?.iter())?;
        for column in schema.missing() {
            warn!(column = %column, "Source column missing, values read as absent");
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(SourceRow::from_cells(&schema, |i| record.get(i)));
        }

        Ok(SourceTable { schema, rows })
    }
}

impl SourceReader for CsvSource {
    fn read(&self) -> Result<SourceTable, SourceError> {
        if !self.path.exists() {
            return Err(SourceError::NotFound(self.path.clone()));
        }

        let bytes = std::fs::read(&self.path)?;
        let contents = self.encoding.decode(bytes)?;
        let table = Self::parse_str(&contents)?;

        info!(
            path = %self.path.display(),
            rows = table.rows.len(),
            encoding = %self.encoding,
            "Loaded source"
        );
        Ok(table)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::FieldValue;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Customer Id,Customer Fname,Product Name,Latitude\n";

    #[test]
    fn test_parse_str_rows_in_order() {
        let csv = format!("{}1,Mary,Smart watch ,18.25\n2,,Golf bag,nan\n", HEADER);
        let table = CsvSource::parse_str(&csv).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].customer_fname, FieldValue::Text("Mary".to_string()));
        assert_eq!(table.rows[1].customer_fname, FieldValue::Null);
        assert_eq!(table.rows[1].latitude, FieldValue::Null);
        assert_eq!(table.rows[1].order_status, FieldValue::Null);
    }

    #[test]
    fn test_parse_str_quoted_fields() {
        let csv = format!("{}7,\"Smith, Jr\",\"Perfect Fitness, Rip Deck\",1\n", HEADER);
        let table = CsvSource::parse_str(&csv).unwrap();

        assert_eq!(
            table.rows[0].product_name,
            FieldValue::Text("Perfect Fitness, Rip Deck".to_string())
        );
    }

    #[test]
    fn test_parse_str_missing_required_column() {
        let err = CsvSource::parse_str("Customer Id,Latitude\n1,2\n").unwrap_err();
        assert!(matches!(err, SourceError::MissingColumn("Product Name")));
    }

    #[test]
    fn test_read_latin1_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        // latin-1 e-acute
        file.write_all(b"3,Jos\xe9,Cleats,18.2\n").unwrap();

        let source = CsvSource::new(file.path(), Encoding::Latin1);
        let table = source.read().unwrap();

        assert_eq!(table.rows[0].customer_fname, FieldValue::Text("José".to_string()));
    }

    #[test]
    fn test_read_utf8_rejects_latin1_bytes() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        file.write_all(b"3,Jos\xe9,Cleats,18.2\n").unwrap();

        let err = CsvSource::new(file.path(), Encoding::Utf8).read().unwrap_err();
        assert!(matches!(err, SourceError::Encoding(_)));
    }

    #[test]
    fn test_latin1_keeps_c1_range() {
        // windows-1252 would give curly quotes here
        let text = Encoding::Latin1.decode(vec![0x93, b'x', 0x94]).unwrap();
        assert_eq!(text, "\u{93}x\u{94}");
    }

    #[test]
    fn test_utf8_strips_byte_order_mark() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(HEADER.as_bytes());
        bytes.extend_from_slice("4,Zoë,Tent,1.5\n".as_bytes());

        let text = Encoding::Utf8.decode(bytes).unwrap();
        let table = CsvSource::parse_str(&text).unwrap();
        assert_eq!(table.rows[0].customer_id, FieldValue::Text("4".to_string()));
        assert_eq!(table.rows[0].customer_fname, FieldValue::Text("Zoë".to_string()));
    }

    #[test]
    fn test_utf8_error_reports_offset() {
        let err = Encoding::Utf8.decode(b"ab\xffcd".to_vec()).unwrap_err();
        assert!(matches!(err, SourceError::Encoding(msg) if msg == "invalid UTF-8 at byte 2"));
    }

    #[test]
    fn test_read_missing_file() {
        let err = CsvSource::new("/nonexistent/supply.csv", Encoding::Latin1)
            .read()
            .unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[test]
    fn test_encoding_from_str() {
        assert_eq!("LATIN_1".parse::<Encoding>(), Ok(Encoding::Latin1));
        assert_eq!("utf8".parse::<Encoding>(), Ok(Encoding::Utf8));
        assert!("ebcdic".parse::<Encoding>().is_err());
    }
}
