//! CSV builder for legacy-encoded bank files
//!
//! Every field is transcoded on its own, so an unmappable character is
//! reported together with the column it came from. A row is encoded into a
//! scratch buffer first and only appended once all of its fields succeed:
//! a failed row never leaves partial bytes in the output.

use crate::encoding::LegacyEncoder;
use crate::error::{ExportError, ExportResult};

/// CSV line terminator expected by bank import tools
const CRLF: &[u8] = b"\r\n";

/// Legacy-encoded CSV builder
///
/// ```
/// use atelier_export::{CsvBuilder, ShiftJisEncoder};
///
/// let mut csv = CsvBuilder::new(ShiftJisEncoder).with_columns(&["name", "amount"]);
/// csv.header().unwrap();
/// csv.row(&["山田", "1000"]).unwrap();
/// assert_eq!(csv.row_count(), 1);
/// ```
pub struct CsvBuilder<E> {
    buf: Vec<u8>,
    encoder: E,
    columns: Vec<String>,
    rows: usize,
}

impl<E: LegacyEncoder> CsvBuilder<E> {
    pub fn new(encoder: E) -> Self {
        Self {
            buf: Vec::with_capacity(4096),
            encoder,
            columns: Vec::new(),
            rows: 0,
        }
    }

    /// Name the columns, used for the header row and in error reports
    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Append the header row built from [`with_columns`](Self::with_columns)
    ///
    /// The header is not counted by [`row_count`](Self::row_count).
    pub fn header(&mut self) -> ExportResult<&mut Self> {
        if self.columns.is_empty() {
            return Err(ExportError::InvalidRow("no columns declared".into()));
        }
        let columns = self.columns.clone();
        let refs: Vec<&str> = columns.iter().map(String::as_str).collect();
        let line = self.encode_line(&refs)?;
        self.buf.extend_from_slice(&line);
        Ok(self)
    }

    /// Append one data row
    ///
    /// On error nothing is written.
    pub fn row<S: AsRef<str>>(&mut self, fields: &[S]) -> ExportResult<&mut Self> {
        if !self.columns.is_empty() && fields.len() != self.columns.len() {
            return Err(ExportError::InvalidRow(format!(
                "expected {} fields, got {}",
                self.columns.len(),
                fields.len()
            )));
        }
        let refs: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
        let line = self.encode_line(&refs)?;
        self.buf.extend_from_slice(&line);
        self.rows += 1;
        Ok(self)
    }

    /// Number of data rows written so far
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Build final bytes
    pub fn build(self) -> Vec<u8> {
        self.buf
    }

    fn encode_line(&self, fields: &[&str]) -> ExportResult<Vec<u8>> {
        let mut line = Vec::with_capacity(128);
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                line.push(b',');
            }
            let encoded = self.encoder.encode(&quote(field)).map_err(|e| ExportError::Field {
                field: self.column_name(i),
                source: Box::new(e),
            })?;
            line.extend_from_slice(&encoded);
        }
        line.extend_from_slice(CRLF);
        Ok(line)
    }

    fn column_name(&self, index: usize) -> String {
        self.columns
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("#{}", index + 1))
    }
}

/// RFC 4180 quoting, only when needed
fn quote(field: &str) -> std::borrow::Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        std::borrow::Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        std::borrow::Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::ShiftJisEncoder;

    #[test]
    fn test_rows_are_crlf_terminated() {
        let mut csv = CsvBuilder::new(ShiftJisEncoder);
        csv.row(&["a", "b"]).unwrap().row(&["c", "d"]).unwrap();
        assert_eq!(csv.row_count(), 2);
        assert_eq!(csv.build(), b"a,b\r\nc,d\r\n");
    }

    #[test]
    fn test_quoting() {
        let mut csv = CsvBuilder::new(ShiftJisEncoder);
        csv.row(&["a,b", "say \"hi\"", "plain"]).unwrap();
        assert_eq!(csv.build(), b"\"a,b\",\"say \"\"hi\"\"\",plain\r\n");
    }

    #[test]
    fn test_header_not_counted() {
        let mut csv = CsvBuilder::new(ShiftJisEncoder).with_columns(&["name", "amount"]);
        csv.header().unwrap();
        csv.row(&["x", "1"]).unwrap();
        assert_eq!(csv.row_count(), 1);
        assert_eq!(csv.build(), b"name,amount\r\nx,1\r\n");
    }

    #[test]
    fn test_header_requires_columns() {
        let mut csv = CsvBuilder::new(ShiftJisEncoder);
        assert!(matches!(csv.header(), Err(ExportError::InvalidRow(_))));
    }

    #[test]
    fn test_field_count_mismatch() {
        let mut csv = CsvBuilder::new(ShiftJisEncoder).with_columns(&["a", "b"]);
        assert!(matches!(csv.row(&["only"]), Err(ExportError::InvalidRow(_))));
        assert_eq!(csv.row_count(), 0);
    }

    #[test]
    fn test_japanese_fields_are_shift_jis() {
        let mut csv = CsvBuilder::new(ShiftJisEncoder);
        csv.row(&["ア", "1"]).unwrap();
        assert_eq!(csv.build(), vec![0x83, 0x41, b',', b'1', b'\r', b'\n']);
    }

    #[test]
    fn test_failed_row_leaves_no_partial_bytes() {
        let mut csv = CsvBuilder::new(ShiftJisEncoder).with_columns(&["holder", "amount"]);
        csv.row(&["ヤマダ", "100"]).unwrap();

        let err = csv.row(&["😀", "200"]).err().unwrap();
        match &err {
            ExportError::Field { field, .. } => assert_eq!(field, "holder"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.unencodable_char(), Some('😀'));

        csv.row(&["スズキ", "300"]).unwrap();
        assert_eq!(csv.row_count(), 2);

        let bytes = csv.build();
        let (decoded, _, had_errors) = encoding_rs::SHIFT_JIS.decode(&bytes);
        assert!(!had_errors);
        assert_eq!(decoded, "ヤマダ,100\r\nスズキ,300\r\n");
    }

    #[test]
    fn test_unnamed_column_in_error() {
        let mut csv = CsvBuilder::new(ShiftJisEncoder);
        match csv.row(&["ok", "€"]) {
            Err(ExportError::Field { field, .. }) => assert_eq!(field, "#2"),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }
}
