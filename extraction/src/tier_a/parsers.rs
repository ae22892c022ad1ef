//! Tier A deterministic parsers for code blocks, tables, and embedded
//! structured data (spec §4.2/§4.3). Grounded on
//! `original_source/packages/extraction/tier_a/parsers.py`.

use regex::Regex;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Extracts fenced code blocks (` ```lang\n...\n``` `) from markdown text.
pub fn parse_code_blocks(content: &str) -> Vec<CodeBlock> {
    if content.is_empty() {
        return Vec::new();
    }

    let pattern = Regex::new(r"(?s)```(\w*)\n(.*?)```").expect("static pattern is valid");
    pattern
        .captures_iter(content)
        .map(|cap| CodeBlock {
            language: cap[1].to_string(),
            code: cap[2].trim().to_string(),
        })
        .collect()
}

/// Extracts pipe-delimited markdown tables (header row, `---` separator,
/// then data rows) from text.
pub fn parse_tables(content: &str) -> Vec<Table> {
    if content.is_empty() {
        return Vec::new();
    }

    let separator_pattern = Regex::new(r"^\|[\s\-|]+\|$").expect("static pattern is valid");
    let lines: Vec<&str> = content.lines().collect();
    let mut tables = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        if line.starts_with('|') && line.ends_with('|') {
            let headers = split_row(line);

            if i + 1 < lines.len() && separator_pattern.is_match(lines[i + 1].trim()) {
                let mut rows = Vec::new();
                let mut j = i + 2;
                while j < lines.len() {
                    let row_line = lines[j].trim();
                    if row_line.starts_with('|') && row_line.ends_with('|') {
                        rows.push(split_row(row_line));
                        j += 1;
                    } else {
                        break;
                    }
                }
                tables.push(Table { headers, rows });
                i = j;
                continue;
            }
        }
        i += 1;
    }

    tables
}

fn split_row(line: &str) -> Vec<String> {
    line.trim_matches('|')
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect()
}

/// Parses `content` as either YAML or JSON, returning `None` if it doesn't
/// parse or doesn't resolve to an object/array (matches the Python's
/// `isinstance(result, (dict, list))` guard — scalars aren't structured
/// data worth extracting).
pub fn parse_yaml_json(content: &str, format: StructuredFormat) -> Option<Value> {
    if content.trim().is_empty() {
        return None;
    }

    let value = match format {
        StructuredFormat::Yaml => serde_yaml::from_str::<Value>(content).ok()?,
        StructuredFormat::Json => serde_json::from_str::<Value>(content).ok()?,
    };

    match value {
        Value::Object(_) | Value::Array(_) => Some(value),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredFormat {
    Yaml,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_code_blocks_extracts_language_and_trimmed_code() {
        let content = "text\n```python\nprint('hi')\n```\nmore text";
        let blocks = parse_code_blocks(content);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "python");
        assert_eq!(blocks[0].code, "print('hi')");
    }

    #[test]
    fn parse_tables_extracts_headers_and_rows() {
        let content = "| a | b |\n|---|---|\n| 1 | 2 |\n| 3 | 4 |";
        let tables = parse_tables(content);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].headers, vec!["a", "b"]);
        assert_eq!(tables[0].rows, vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn parse_yaml_json_rejects_scalar_results() {
        assert!(parse_yaml_json("42", StructuredFormat::Json).is_none());
        assert!(parse_yaml_json("\"just a string\"", StructuredFormat::Yaml).is_none());
    }

    #[test]
    fn parse_yaml_json_accepts_objects() {
        let value = parse_yaml_json("key: value", StructuredFormat::Yaml).unwrap();
        assert_eq!(value["key"], "value");
    }
}
