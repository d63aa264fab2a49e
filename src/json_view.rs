//! JSON-aware rendering of diff blocks
//!
//! A visualization aid over the line diff, not a semantic object diff:
//! the whole subtree inherits the change kind of the line it came from.
//! Expansion state is keyed by node path so it survives re-renders of the
//! same comparison.

use std::collections::HashSet;

use serde_json::Value;

use crate::engine::{ChangeKind, DiffBlock};
use crate::render::{RenderLine, Span};

/// Set of node paths currently shown expanded
#[derive(Debug, Default)]
pub struct ExpansionSet {
    paths: HashSet<String>,
}

impl ExpansionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn toggle(&mut self, path: &str) {
        if !self.paths.remove(path) {
            self.paths.insert(path.to_string());
        }
    }
}

/// Render a block as a collapsible JSON tree.
///
/// Only the block's first line is parsed; a block holding a multi-line
/// JSON document therefore fails here and the caller falls back to the
/// flat line view. Parsing the concatenated block text instead would
/// change which blocks get the tree view, so single-line parsing stays.
pub fn render_json_block(block: &DiffBlock, expansion: &ExpansionSet) -> Option<Vec<RenderLine>> {
    let first = block.lines.first()?;
    let value: Value = serde_json::from_str(&first.text).ok()?;

    let mut rows = Vec::new();
    render_node(&value, "", None, first.kind, 0, expansion, &mut rows);
    Some(rows)
}

/// Emit the rows for one node. `label` carries the `key: ` prefix for
/// object members and array elements.
fn render_node(
    value: &Value,
    path: &str,
    label: Option<&str>,
    kind: ChangeKind,
    depth: usize,
    expansion: &ExpansionSet,
    rows: &mut Vec<RenderLine>,
) {
    match value {
        Value::Object(map) => {
            let expanded = expansion.is_expanded(path);
            rows.push(header_row(label, "{", path, expanded, kind, depth));
            if expanded {
                for (key, child) in map {
                    let child_path = format!("{path}.{key}");
                    render_node(
                        child,
                        &child_path,
                        Some(key.as_str()),
                        kind,
                        depth + 1,
                        expansion,
                        rows,
                    );
                }
            }
            rows.push(token_row("}", kind, depth));
        }
        Value::Array(items) => {
            let expanded = expansion.is_expanded(path);
            rows.push(header_row(label, "[", path, expanded, kind, depth));
            if expanded {
                for (index, child) in items.iter().enumerate() {
                    let key = index.to_string();
                    let child_path = format!("{path}.{key}");
                    render_node(
                        child,
                        &child_path,
                        Some(key.as_str()),
                        kind,
                        depth + 1,
                        expansion,
                        rows,
                    );
                }
            }
            rows.push(token_row("]", kind, depth));
        }
        scalar => {
            let text = match label {
                Some(label) => format!("{label}: {scalar}"),
                None => scalar.to_string(),
            };
            rows.push(token_row(&text, kind, depth));
        }
    }
}

fn header_row(
    label: Option<&str>,
    open: &str,
    path: &str,
    expanded: bool,
    kind: ChangeKind,
    depth: usize,
) -> RenderLine {
    let text = match label {
        Some(label) => format!("{label}: {open}"),
        None => open.to_string(),
    };
    RenderLine {
        spans: vec![Span {
            text,
            kind: ChangeKind::Unchanged,
        }],
        kind,
        number: None,
        indent: depth,
        toggle_path: Some(path.to_string()),
        expanded,
    }
}

fn token_row(text: &str, kind: ChangeKind, depth: usize) -> RenderLine {
    RenderLine {
        spans: vec![Span {
            text: text.to_string(),
            kind: ChangeKind::Unchanged,
        }],
        kind,
        number: None,
        indent: depth,
        toggle_path: None,
        expanded: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LineRecord;

    fn block_of(text: &str, kind: ChangeKind) -> DiffBlock {
        DiffBlock {
            lines: vec![LineRecord {
                kind,
                text: text.to_string(),
                left_no: None,
                right_no: Some(1),
                inline: None,
            }],
            start_line: 1,
            end_line: 1,
        }
    }

    fn row_text(row: &RenderLine) -> String {
        row.spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn collapsed_root_shows_only_the_braces() {
        let block = block_of(r#"{"a":1,"b":2}"#, ChangeKind::Added);
        let rows = render_json_block(&block, &ExpansionSet::new()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(row_text(&rows[0]), "{");
        assert_eq!(rows[0].toggle_path.as_deref(), Some(""));
        assert!(!rows[0].expanded);
        assert_eq!(row_text(&rows[1]), "}");
        assert!(rows.iter().all(|r| r.kind == ChangeKind::Added));
    }

    #[test]
    fn expanding_the_root_reveals_members_in_order() {
        let mut expansion = ExpansionSet::new();
        expansion.toggle("");

        let block = block_of(r#"{"b":1,"a":[true]}"#, ChangeKind::Removed);
        let rows = render_json_block(&block, &expansion).unwrap();

        let texts: Vec<String> = rows.iter().map(row_text).collect();
        // Member order is document order, and the collapsed array renders
        // as its bracket pair.
        assert_eq!(texts, vec!["{", "b: 1", "a: [", "]", "}"]);
        assert_eq!(rows[2].toggle_path.as_deref(), Some(".a"));
        assert_eq!(rows[1].indent, 1);
    }

    #[test]
    fn nested_paths_address_each_node_uniquely() {
        let mut expansion = ExpansionSet::new();
        expansion.toggle("");
        expansion.toggle(".items");

        let block = block_of(r#"{"items":[10,20]}"#, ChangeKind::Added);
        let rows = render_json_block(&block, &expansion).unwrap();
        let texts: Vec<String> = rows.iter().map(row_text).collect();
        assert_eq!(texts, vec!["{", "items: [", "0: 10", "1: 20", "]", "}"]);
    }

    #[test]
    fn scalar_root_renders_as_literal() {
        let block = block_of("42", ChangeKind::Unchanged);
        let rows = render_json_block(&block, &ExpansionSet::new()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(row_text(&rows[0]), "42");

        let block = block_of(r#""hi""#, ChangeKind::Unchanged);
        let rows = render_json_block(&block, &ExpansionSet::new()).unwrap();
        assert_eq!(row_text(&rows[0]), "\"hi\"");
    }

    #[test]
    fn invalid_first_line_falls_back() {
        // Pretty-printed JSON split across lines: the first line alone is
        // not a document, so JSON rendering declines.
        let block = block_of("{", ChangeKind::Added);
        assert!(render_json_block(&block, &ExpansionSet::new()).is_none());

        let block = block_of("not json at all", ChangeKind::Added);
        assert!(render_json_block(&block, &ExpansionSet::new()).is_none());
    }

    #[test]
    fn expansion_state_is_keyed_by_path() {
        let mut expansion = ExpansionSet::new();
        expansion.toggle("");
        expansion.toggle(".a");

        // Re-rendering a reparsed equivalent document sees the same state.
        let block = block_of(r#"{"a":{"x":1}}"#, ChangeKind::Added);
        let rows = render_json_block(&block, &expansion).unwrap();
        let texts: Vec<String> = rows.iter().map(row_text).collect();
        assert_eq!(texts, vec!["{", "a: {", "x: 1", "}", "}"]);

        expansion.toggle(".a");
        let rows = render_json_block(&block, &expansion).unwrap();
        let texts: Vec<String> = rows.iter().map(row_text).collect();
        assert_eq!(texts, vec!["{", "a: {", "}", "}"]);
    }
}
