//! Delimited text tables as a sortable dataset
//!
//! The first non-blank line is the header; it names the columns that sort
//! requests may refer to. Files are memory-mapped and decoded once, then
//! split into owned records so the mapping can be dropped right away.

use crate::column::ColumnMap;
use crate::config::{KeyMode, TableConfig};
use crate::error::{SortContext, SortResult};
use crate::page::PageResult;
use itertools::Itertools;
use memmap2::Mmap;
use serde::Serialize;
use std::cmp::Ordering;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

/// One data row of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Field at `index`; rows shorter than the header read as empty
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// Header plus records loaded from delimited text
#[derive(Debug, Clone, Default)]
pub struct Table {
    header: Vec<String>,
    records: Vec<Record>,
    separator: Option<char>,
}

impl Table {
    /// Load a table from a file through a read-only memory map
    pub fn open(path: &Path, config: &TableConfig) -> SortResult<Self> {
        let name = path.display().to_string();
        let file = File::open(path).with_file_context(&name)?;

        if file.metadata().with_file_context(&name)?.len() == 0 {
            return Ok(Self::parse("", config.field_separator));
        }

        // SAFETY: the map is read-only and dropped before this function
        // returns; the text is copied into owned records first.
        let mmap = unsafe { Mmap::map(&file) }.with_file_context(&name)?;
        let text = std::str::from_utf8(&mmap)?;
        let table = Self::parse(text, config.field_separator);

        tracing::debug!(file = %name, records = table.len(), "loaded table");
        Ok(table)
    }

    /// Load a table from a stream such as stdin
    pub fn from_reader<R: Read>(mut reader: R, config: &TableConfig) -> SortResult<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let text = std::str::from_utf8(&bytes)?;
        Ok(Self::parse(text, config.field_separator))
    }

    /// Split `text` into header and records. Blank lines are skipped.
    pub fn parse(text: &str, separator: Option<char>) -> Self {
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());

        let header = lines
            .next()
            .map(|line| split_fields(line, separator))
            .unwrap_or_default();
        let records = lines
            .map(|line| Record::new(split_fields(line, separator)))
            .collect();

        Self {
            header,
            records,
            separator,
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Build sort columns from the header, keyed per `config`'s modes.
    /// When a header name repeats, the first occurrence wins.
    pub fn column_map(&self, config: &TableConfig) -> ColumnMap<'static, Record> {
        let mut columns = ColumnMap::<Record>::new();

        for (index, name) in self.header.iter().enumerate() {
            if columns.contains(name) {
                tracing::warn!(column = %name, index, "duplicate column name, keeping first");
                continue;
            }

            match config.mode_for(name) {
                KeyMode::Lexicographic => {
                    columns.insert_ref(name.as_str(), move |r| r.field(index));
                }
                KeyMode::IgnoreCase => {
                    columns.insert(name.as_str(), move |r| r.field(index).to_lowercase());
                }
                KeyMode::Numeric => {
                    columns.insert_by(name.as_str(), move |a, b| {
                        compare_numeric(a.field(index), b.field(index))
                    });
                }
            }
        }

        for column in config.column_modes.keys() {
            if !columns.contains(column) {
                tracing::warn!(column = %column, "key mode set for a column the header lacks");
            }
        }

        columns
    }

    fn output_separator(&self) -> String {
        self.separator
            .map(String::from)
            .unwrap_or_else(|| "\t".to_string())
    }

    /// Write the header followed by the page's rows
    pub fn write_page<W: Write>(&self, page: &PageResult<Record>, out: &mut W) -> io::Result<()> {
        let sep = self.output_separator();
        if !self.header.is_empty() {
            writeln!(out, "{}", self.header.iter().join(&sep))?;
        }
        for record in page {
            writeln!(out, "{}", record.fields().iter().join(&sep))?;
        }
        Ok(())
    }

    /// Turn each record of a page into a JSON object keyed by column name
    pub fn page_to_json(&self, page: PageResult<Record>) -> PageResult<serde_json::Value> {
        page.map(|record| {
            let object = self
                .header
                .iter()
                .enumerate()
                .map(|(index, name)| (name.clone(), record.field(index).into()))
                .collect::<serde_json::Map<String, serde_json::Value>>();
            serde_json::Value::Object(object)
        })
    }
}

fn split_fields(line: &str, separator: Option<char>) -> Vec<String> {
    match separator {
        Some(sep) => line.split(sep).map(str::to_string).collect(),
        None => line.split_whitespace().map(str::to_string).collect(),
    }
}

/// General numeric value of a field. Accepts scientific notation, `inf`
/// and `nan` (which sorts after every number); empty or non-numeric fields
/// sort before every number.
fn numeric_key(field: &str) -> f64 {
    field.trim().parse::<f64>().unwrap_or(f64::NEG_INFINITY)
}

fn compare_numeric(a: &str, b: &str) -> Ordering {
    numeric_key(a).total_cmp(&numeric_key(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageRequest;
    use crate::paginate::Paginator;
    use crate::request::SortRequest;
    use std::fs;
    use tempfile::TempDir;

    const PEOPLE: &str = "name age city\n\
                          Charlie 30 NewYork\n\
                          alice 25 Paris\n\
                          Bob 9 LosAngeles\n\
                          \n\
                          David 100 LosAngeles\n";

    fn sorted_names(table: &Table, config: &TableConfig, specs: &[&str]) -> Vec<String> {
        let columns = table.column_map(config);
        let request = SortRequest::from_specs(specs).expect("Failed to parse specs");
        Paginator::default()
            .paginate(table.records(), &request, &columns, PageRequest::of_size(10))
            .expect("Failed to paginate")
            .into_iter()
            .map(|r| r.field(0).to_string())
            .collect()
    }

    #[test]
    fn test_parse_whitespace_table() {
        let table = Table::parse(PEOPLE, None);
        assert_eq!(table.header(), ["name", "age", "city"]);
        assert_eq!(table.len(), 4);
        assert_eq!(table.records()[2].field(2), "LosAngeles");
        assert_eq!(table.records()[2].field(7), "");
    }

    #[test]
    fn test_parse_with_separator_keeps_empty_fields() {
        let table = Table::parse("a,b,c\r\n1,,3\r\n4,5\r\n", Some(','));
        assert_eq!(table.header(), ["a", "b", "c"]);
        assert_eq!(table.records()[0].fields(), ["1", "", "3"]);
        assert_eq!(table.records()[1].field(2), "");
    }

    #[test]
    fn test_lexicographic_and_numeric_modes() {
        let table = Table::parse(PEOPLE, None);

        let text = TableConfig::new();
        assert_eq!(
            sorted_names(&table, &text, &["age"]),
            ["David", "alice", "Charlie", "Bob"]
        );

        let numeric = TableConfig::new().with_column_mode("age", KeyMode::Numeric);
        assert_eq!(
            sorted_names(&table, &numeric, &["age,desc"]),
            ["David", "Charlie", "alice", "Bob"]
        );
    }

    #[test]
    fn test_ignore_case_mode() {
        let table = Table::parse(PEOPLE, None);
        let exact = TableConfig::new();
        assert_eq!(
            sorted_names(&table, &exact, &["name"]),
            ["Bob", "Charlie", "David", "alice"]
        );

        let folded = TableConfig::new().with_default_mode(KeyMode::IgnoreCase);
        assert_eq!(
            sorted_names(&table, &folded, &["name"]),
            ["alice", "Bob", "Charlie", "David"]
        );
    }

    #[test]
    fn test_city_then_name_tie_break() {
        let table = Table::parse(PEOPLE, None);
        let config = TableConfig::new().with_default_mode(KeyMode::IgnoreCase);
        assert_eq!(
            sorted_names(&table, &config, &["city", "name,desc"]),
            ["David", "Bob", "Charlie", "alice"]
        );
    }

    #[test]
    fn test_numeric_key_handles_special_values() {
        assert_eq!(compare_numeric("1e3", "999"), Ordering::Greater);
        assert_eq!(compare_numeric("-inf", "-1e308"), Ordering::Less);
        assert_eq!(compare_numeric("inf", "1e308"), Ordering::Greater);
        assert_eq!(compare_numeric("n/a", "-5"), Ordering::Less);
        assert_eq!(compare_numeric("", "0"), Ordering::Less);
        assert_eq!(compare_numeric(" 2.50 ", "2.5"), Ordering::Equal);
        assert_eq!(compare_numeric("NaN", "inf"), Ordering::Greater);
    }

    #[test]
    fn test_duplicate_header_keeps_first() {
        let table = Table::parse("k k\n2 1\n1 2\n", None);
        let columns = table.column_map(&TableConfig::new());
        assert_eq!(columns.len(), 1);

        let compare = columns.get("k").expect("k column");
        assert_eq!(
            compare(&table.records()[0], &table.records()[1]),
            Ordering::Greater
        );
    }

    #[test]
    fn test_open_memory_mapped_file() -> SortResult<()> {
        let temp_dir = TempDir::new()?;
        let input_file = temp_dir.path().join("people.csv");
        fs::write(&input_file, "name,score\nann,3\nben,12\n")?;

        let config = TableConfig::new()
            .with_field_separator(Some(','))
            .with_column_mode("score", KeyMode::Numeric);
        let table = Table::open(&input_file, &config)?;
        assert_eq!(table.len(), 2);
        assert_eq!(sorted_names(&table, &config, &["score,desc"]), ["ben", "ann"]);

        Ok(())
    }

    #[test]
    fn test_open_empty_and_missing_files() -> SortResult<()> {
        let temp_dir = TempDir::new()?;
        let empty = temp_dir.path().join("empty.txt");
        fs::write(&empty, "")?;

        let table = Table::open(&empty, &TableConfig::new())?;
        assert!(table.is_empty());
        assert!(table.header().is_empty());

        let missing = temp_dir.path().join("missing.txt");
        let err = Table::open(&missing, &TableConfig::new()).unwrap_err();
        assert_eq!(err.exit_code(), crate::SORT_FAILURE);

        Ok(())
    }

    #[test]
    fn test_from_reader_rejects_invalid_utf8() {
        let bytes: &[u8] = &[b'a', b'\n', 0xff, 0xfe, b'\n'];
        assert!(Table::from_reader(bytes, &TableConfig::new()).is_err());

        let table = Table::from_reader("x\n1\n".as_bytes(), &TableConfig::new())
            .expect("Failed to read table");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_write_page_and_json() -> io::Result<()> {
        let table = Table::parse("name;age\nann;3\nben;12\n", Some(';'));
        let page = PageResult::new(vec![table.records()[1].clone()], PageRequest::new(1, 1), 2);

        let mut out = Vec::new();
        table.write_page(&page, &mut out)?;
        assert_eq!(String::from_utf8_lossy(&out), "name;age\nben;12\n");

        let json = table.page_to_json(page);
        assert_eq!(json.content()[0]["name"], "ben");
        assert_eq!(json.content()[0]["age"], "12");
        assert_eq!(json.total_elements(), 2);

        Ok(())
    }
}
