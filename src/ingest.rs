//! File ingestion and text preprocessing
//!
//! Loads the two sides of a comparison, enforces the size ceiling, and
//! applies the optional preprocessing (JSON pretty-printing, line sorting)
//! before the text reaches the diff engine.

use std::fs;
use std::path::Path;

use thiserror::Error;

/// Content ceiling; large inputs are refused outright rather than diffed
/// partially.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{name} is {size} bytes, over the {limit} byte limit")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    #[error("failed to read {name}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} is not valid UTF-8 text")]
    NotUtf8 { name: String },
}

/// One side of a comparison, as delivered to the core
#[derive(Debug, Clone)]
pub struct FileContent {
    pub content: String,
    pub name: String,
    pub mime_type: String,
}

impl FileContent {
    pub fn is_json(&self) -> bool {
        self.mime_type == "application/json"
    }
}

pub fn load_file(path: &Path) -> Result<FileContent, IngestError> {
    load_file_with_limit(path, MAX_FILE_SIZE)
}

fn load_file_with_limit(path: &Path, limit: u64) -> Result<FileContent, IngestError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let metadata = fs::metadata(path).map_err(|source| IngestError::Io {
        name: name.clone(),
        source,
    })?;
    if metadata.len() > limit {
        return Err(IngestError::FileTooLarge {
            name,
            size: metadata.len(),
            limit,
        });
    }

    let bytes = fs::read(path).map_err(|source| IngestError::Io {
        name: name.clone(),
        source,
    })?;
    let content = String::from_utf8(bytes).map_err(|_| IngestError::NotUtf8 {
        name: name.clone(),
    })?;

    let mime_type = if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    {
        "application/json".to_string()
    } else {
        "text/plain".to_string()
    };

    Ok(FileContent {
        content,
        name,
        mime_type,
    })
}

/// Reformat JSON with two-space indentation. Text that does not parse
/// passes through untouched; the flat diff still works on it.
pub fn pretty_print_json(content: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(content) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| content.to_string()),
        Err(_) => content.to_string(),
    }
}

/// Sort lines lexicographically, keeping the first `header_rows` lines in
/// place. Useful for comparing exports whose row order is unstable.
pub fn sort_lines(content: &str, header_rows: usize) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let split = header_rows.min(lines.len());
    let mut sorted = lines[split..].to_vec();
    sorted.sort_unstable();

    let mut result: Vec<&str> = lines[..split].to_vec();
    result.extend(sorted);
    result.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn loads_text_with_mime_from_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{\"a\":1}").unwrap();

        let file = load_file(&path).unwrap();
        assert_eq!(file.name, "data.json");
        assert_eq!(file.content, "{\"a\":1}");
        assert!(file.is_json());

        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();
        let file = load_file(&path).unwrap();
        assert!(!file.is_json());
    }

    #[test]
    fn oversized_file_is_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.txt");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(&[b'x'; 64]).unwrap();

        let err = load_file_with_limit(&path, 16).unwrap_err();
        assert!(matches!(err, IngestError::FileTooLarge { size: 64, .. }));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let dir = tempdir().unwrap();
        let err = load_file(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }

    #[test]
    fn pretty_print_normalizes_valid_json() {
        let out = pretty_print_json("{\"b\":1,\"a\":[2,3]}");
        assert!(out.contains("\"b\": 1"));
        assert!(out.lines().count() > 1);

        // Member order survives (serde_json preserve_order).
        let b = out.find("\"b\"").unwrap();
        let a = out.find("\"a\"").unwrap();
        assert!(b < a);
    }

    #[test]
    fn pretty_print_passes_invalid_json_through() {
        assert_eq!(pretty_print_json("not json"), "not json");
        assert_eq!(pretty_print_json(""), "");
    }

    #[test]
    fn sort_lines_keeps_header_rows() {
        let sorted = sort_lines("name,age\ncarol,3\nalice,1\nbob,2", 1);
        assert_eq!(sorted, "name,age\nalice,1\nbob,2\ncarol,3");
    }

    #[test]
    fn sort_lines_with_oversized_header_is_identity() {
        assert_eq!(sort_lines("b\na", 10), "b\na");
    }
}
