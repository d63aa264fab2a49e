//! Diff block assembly engine
//!
//! Turns two text bodies into a sequence of navigable display blocks.
//! Line-level change runs come from `similar`; this module numbers the
//! lines, groups them into blocks, and attaches word-level sub-diffs to
//! adjacent changed-line pairs.

use similar::{Algorithm, ChangeTag, TextDiff};

/// How a line (or word span) differs between the two inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Unchanged,
}

/// A word-level span within a paired changed line
#[derive(Debug, Clone)]
pub struct InlineSpan {
    pub text: String,
    pub kind: ChangeKind,
}

/// One logical line of either (or both) inputs
#[derive(Debug, Clone)]
pub struct LineRecord {
    pub kind: ChangeKind,
    pub text: String,
    /// 1-based line number in the original text; absent for added lines
    pub left_no: Option<u32>,
    /// 1-based line number in the modified text; absent for removed lines
    pub right_no: Option<u32>,
    /// Word-level sub-diff, present only when this line was paired with
    /// the immediately preceding opposite-kind line
    pub inline: Option<Vec<InlineSpan>>,
}

/// A maximal display unit: one or more contiguous change runs plus the
/// context run that immediately follows them
#[derive(Debug, Clone)]
pub struct DiffBlock {
    pub lines: Vec<LineRecord>,
    /// First known line number on either side, for scroll targeting
    pub start_line: u32,
    pub end_line: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DiffOptions {
    /// Drop unchanged context lines from the output blocks
    pub show_only_diffs: bool,
    /// Trim every line of both inputs before diffing
    pub ignore_whitespace: bool,
}

/// A maximal run of same-kind lines from the line differ
struct ChangeRun {
    kind: ChangeKind,
    lines: Vec<String>,
}

/// Compute the display blocks for a pair of texts.
///
/// Returns an empty sequence when the inputs are line-identical under the
/// active options; callers render that as "files are identical".
pub fn compute_blocks(old: &str, new: &str, options: &DiffOptions) -> Vec<DiffBlock> {
    let (old, new) = if options.ignore_whitespace {
        (trim_lines(old), trim_lines(new))
    } else {
        (old.to_string(), new.to_string())
    };

    let runs = change_runs(&old, &new);
    assemble(runs, options.show_only_diffs)
}

fn trim_lines(text: &str) -> String {
    text.lines().map(str::trim).collect::<Vec<_>>().join("\n")
}

fn tag_kind(tag: ChangeTag) -> ChangeKind {
    match tag {
        ChangeTag::Insert => ChangeKind::Added,
        ChangeTag::Delete => ChangeKind::Removed,
        ChangeTag::Equal => ChangeKind::Unchanged,
    }
}

/// Run the line differ and group its per-line changes into maximal
/// same-kind runs. Line values keep no trailing newline, so a text ending
/// in a newline never produces a phantom empty final line.
fn change_runs(old: &str, new: &str) -> Vec<ChangeRun> {
    let diff = TextDiff::from_lines(old, new);
    let mut runs: Vec<ChangeRun> = Vec::new();

    for change in diff.iter_all_changes() {
        let kind = tag_kind(change.tag());
        let text = change
            .value()
            .strip_suffix('\n')
            .map(|v| v.strip_suffix('\r').unwrap_or(v))
            .unwrap_or(change.value())
            .to_string();

        match runs.last_mut() {
            Some(run) if run.kind == kind => run.lines.push(text),
            _ => runs.push(ChangeRun {
                kind,
                lines: vec![text],
            }),
        }
    }

    runs
}

/// Group numbered line records into blocks.
///
/// An accumulator collects records until an unchanged run arrives after at
/// least one change; the accumulator then closes into a block. Context
/// before the first change joins the first block but never forms a block
/// on its own. With `show_only_diffs` the unchanged runs only advance the
/// counters and each one closes the open block.
fn assemble(runs: Vec<ChangeRun>, show_only_diffs: bool) -> Vec<DiffBlock> {
    let mut blocks = Vec::new();
    let mut current: Vec<LineRecord> = Vec::new();
    let mut has_changes = false;
    let mut left = 1u32;
    let mut right = 1u32;

    for run in runs {
        let kind = run.kind;

        if kind == ChangeKind::Unchanged && show_only_diffs {
            left += run.lines.len() as u32;
            right += run.lines.len() as u32;
            if has_changes && !current.is_empty() {
                blocks.push(close_block(std::mem::take(&mut current)));
                has_changes = false;
            }
            continue;
        }

        for text in run.lines {
            let inline = if kind == ChangeKind::Unchanged {
                None
            } else {
                pair_inline(current.last(), kind, &text)
            };

            let (left_no, right_no) = match kind {
                ChangeKind::Added => {
                    let n = right;
                    right += 1;
                    (None, Some(n))
                }
                ChangeKind::Removed => {
                    let n = left;
                    left += 1;
                    (Some(n), None)
                }
                ChangeKind::Unchanged => {
                    let l = left;
                    let r = right;
                    left += 1;
                    right += 1;
                    (Some(l), Some(r))
                }
            };

            current.push(LineRecord {
                kind,
                text,
                left_no,
                right_no,
                inline,
            });
        }

        if kind != ChangeKind::Unchanged {
            has_changes = true;
        } else if has_changes && !current.is_empty() {
            blocks.push(close_block(std::mem::take(&mut current)));
            has_changes = false;
        }
    }

    if has_changes && !current.is_empty() {
        blocks.push(close_block(current));
    }

    blocks
}

/// Greedy adjacent pairing: a changed line gets a word-level sub-diff only
/// when the record right before it in the open accumulator has the opposite
/// kind. Across a removed-run/added-run seam this pairs the last removed
/// line with the first added line; deeper lines of same-kind runs stay
/// unpaired.
fn pair_inline(
    prev: Option<&LineRecord>,
    kind: ChangeKind,
    text: &str,
) -> Option<Vec<InlineSpan>> {
    let prev = prev?;
    let opposite = matches!(
        (prev.kind, kind),
        (ChangeKind::Removed, ChangeKind::Added) | (ChangeKind::Added, ChangeKind::Removed)
    );
    if !opposite {
        return None;
    }

    let spans = similar::utils::diff_words(Algorithm::Myers, prev.text.as_str(), text)
        .into_iter()
        .map(|(tag, word)| InlineSpan {
            text: word.to_string(),
            kind: tag_kind(tag),
        })
        .collect();
    Some(spans)
}

fn close_block(lines: Vec<LineRecord>) -> DiffBlock {
    let number = |record: &LineRecord| record.left_no.or(record.right_no).unwrap_or(0);
    let start_line = lines.first().map(&number).unwrap_or(0);
    let end_line = lines.last().map(&number).unwrap_or(0);
    DiffBlock {
        lines,
        start_line,
        end_line,
    }
}
