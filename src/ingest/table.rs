//! Comma-separated tabular reader.
//!
//! T020: Implement header + record parsing for set exports
//!
//! The whole file is held in memory. Fields may be double-quoted, in which
//! case they can contain commas, newlines, and `""` escaped quotes. Only
//! whitespace may follow a closing quote before the next separator. Blank
//! lines are skipped. Every data record must have as many fields as the
//! header.

use crate::ingest::types::IngestError;

/// A parsed data record with the line it started on (1-based).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub line: usize,
    pub fields: Vec<String>,
}

/// An in-memory table: header names plus data records.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    /// Parse a table from text content.
    pub fn parse(content: &str) -> Result<Self, IngestError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut rows = parse_rows(content)?.into_iter();

        let headers = match rows.next() {
            Some(header) => header
                .fields
                .into_iter()
                .map(|name| name.trim().to_string())
                .collect::<Vec<_>>(),
            None => Vec::new(),
        };

        let mut records = Vec::new();
        for row in rows {
            if row.fields.len() != headers.len() {
                return Err(IngestError::Malformed {
                    line: row.line,
                    reason: format!(
                        "expected {} fields, found {}",
                        headers.len(),
                        row.fields.len()
                    ),
                });
            }
            records.push(row);
        }

        Ok(Self { headers, records })
    }

    /// Position of a column by exact header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Number of data records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the table has no data records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Split content into rows of fields, honoring quotes.
fn parse_rows(content: &str) -> Result<Vec<Record>, IngestError> {
    let mut rows = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_start = 1;
    // Distinguishes a blank line from a row holding a single empty field.
    let mut row_has_content = false;
    // Set between a closing quote and the next separator.
    let mut quote_closed = false;

    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => {
                    in_quotes = false;
                    quote_closed = true;
                }
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if !quote_closed && field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
                row_has_content = true;
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                row_has_content = true;
                quote_closed = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                if row_has_content || !field.trim().is_empty() {
                    fields.push(std::mem::take(&mut field));
                    rows.push(Record {
                        line: row_start,
                        fields: std::mem::take(&mut fields),
                    });
                }
                field.clear();
                row_has_content = false;
                quote_closed = false;
                line += 1;
                row_start = line;
            }
            c if quote_closed && c.is_whitespace() => {}
            _ if quote_closed => {
                return Err(IngestError::Malformed {
                    line,
                    reason: "unexpected text after closing quote".to_string(),
                });
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(IngestError::Malformed {
            line: row_start,
            reason: "unterminated quoted field".to_string(),
        });
    }

    if row_has_content || !field.trim().is_empty() {
        fields.push(field);
        rows.push(Record {
            line: row_start,
            fields,
        });
    }

    Ok(rows)
}
