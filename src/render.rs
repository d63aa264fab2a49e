//! Block rendering
//!
//! Produces backend-neutral rows from diff blocks; the TUI turns rows into
//! styled terminal lines and `--print` writes them as plain text.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::engine::{ChangeKind, DiffBlock, LineRecord};
use crate::json_view::{self, ExpansionSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Unified,
    Split,
}

/// A styled fragment of a row. `kind` marks word-level emphasis inside a
/// paired line; `Unchanged` means no emphasis beyond the row's own kind.
#[derive(Debug, Clone)]
pub struct Span {
    pub text: String,
    pub kind: ChangeKind,
}

/// One renderable row of a block view
#[derive(Debug, Clone)]
pub struct RenderLine {
    pub spans: Vec<Span>,
    pub kind: ChangeKind,
    /// Displayed line number, when the row corresponds to a source line
    pub number: Option<u32>,
    /// Nesting depth for tree rows
    pub indent: usize,
    /// Set on collapsible JSON headers; toggling it flips the node
    pub toggle_path: Option<String>,
    pub expanded: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub is_json: bool,
    pub view_mode: ViewMode,
}

/// The renderable tree for one block
#[derive(Debug, Clone)]
pub enum BlockView {
    Unified(Vec<RenderLine>),
    Split {
        left: Vec<RenderLine>,
        right: Vec<RenderLine>,
    },
    Json(Vec<RenderLine>),
}

/// Render a block under the requested view. JSON rendering is attempted
/// first when the content is declared structured and silently falls back
/// to the flat view when the block does not parse.
pub fn render(block: &DiffBlock, options: &RenderOptions, expansion: &ExpansionSet) -> BlockView {
    if options.is_json {
        if let Some(rows) = json_view::render_json_block(block, expansion) {
            return BlockView::Json(rows);
        }
    }

    match options.view_mode {
        ViewMode::Unified => BlockView::Unified(
            block
                .lines
                .iter()
                .map(|line| flat_row(line, line.left_no.or(line.right_no)))
                .collect(),
        ),
        ViewMode::Split => BlockView::Split {
            left: block
                .lines
                .iter()
                .filter(|line| line.kind != ChangeKind::Added)
                .map(|line| flat_row(line, line.left_no))
                .collect(),
            right: block
                .lines
                .iter()
                .filter(|line| line.kind != ChangeKind::Removed)
                .map(|line| flat_row(line, line.right_no))
                .collect(),
        },
    }
}

fn flat_row(line: &LineRecord, number: Option<u32>) -> RenderLine {
    let spans = match &line.inline {
        Some(inline) => inline
            .iter()
            .map(|span| Span {
                text: span.text.clone(),
                kind: span.kind,
            })
            .collect(),
        None => vec![Span {
            text: line.text.clone(),
            kind: ChangeKind::Unchanged,
        }],
    };

    RenderLine {
        spans,
        kind: line.kind,
        number,
        indent: 0,
        toggle_path: None,
        expanded: false,
    }
}

/// Plain unified rendering of all blocks, for `--print` output
pub fn unified_text(blocks: &[DiffBlock]) -> String {
    let mut out = String::new();

    for (index, block) in blocks.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        for line in &block.lines {
            let marker = match line.kind {
                ChangeKind::Added => '+',
                ChangeKind::Removed => '-',
                ChangeKind::Unchanged => ' ',
            };
            let left = line.left_no.map(|n| n.to_string()).unwrap_or_default();
            let right = line.right_no.map(|n| n.to_string()).unwrap_or_default();
            let _ = writeln!(out, "{left:>5} {right:>5} {marker} {}", line.text);
        }
    }

    out
}
