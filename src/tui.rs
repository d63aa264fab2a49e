//! TUI layer using ratatui and crossterm
//!
//! Interactive diff viewing: cyclic next/previous-difference navigation,
//! unified and split layouts, and collapsible JSON trees.

use crate::engine::{compute_blocks, ChangeKind, DiffBlock};
use crate::ingest::FileContent;
use crate::render::{self, BlockView, RenderLine, RenderOptions, ViewMode};
use crate::session::{Direction as NavDirection, Session};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use unicode_width::UnicodeWidthChar;

/// One visual row of the scrollable diff area
struct Row {
    block: usize,
    content: RowContent,
}

enum RowContent {
    /// Unified or JSON-tree row
    Single(RenderLine),
    /// Split row: left and right cells, either possibly empty
    Pair(Option<RenderLine>, Option<RenderLine>),
    /// Blank separator between blocks
    Gap,
}

/// Application state
pub struct App {
    old: FileContent,
    new: FileContent,
    is_json: bool,

    session: Session,
    blocks: Vec<DiffBlock>,
    rows: Vec<Row>,

    cursor: usize,
    show_help: bool,
    message: Option<String>,
}

impl App {
    pub fn new(old: FileContent, new: FileContent, is_json: bool, session: Session) -> Self {
        let mut app = Self {
            old,
            new,
            is_json,
            session,
            blocks: Vec::new(),
            rows: Vec::new(),
            cursor: 0,
            show_help: false,
            message: None,
        };
        app.refresh();
        app
    }

    /// Recompute the block sequence after an option change. Navigation is
    /// clamped because the sequence may have shrunk; the expansion set is
    /// deliberately left alone.
    fn refresh(&mut self) {
        self.blocks = compute_blocks(&self.old.content, &self.new.content, &self.session.options);
        self.session.nav.clamp(self.blocks.len());
        self.rebuild_rows();
    }

    fn rebuild_rows(&mut self) {
        let options = RenderOptions {
            is_json: self.is_json,
            view_mode: self.session.view_mode,
        };

        self.rows.clear();
        for (index, block) in self.blocks.iter().enumerate() {
            if index > 0 {
                self.rows.push(Row {
                    block: index,
                    content: RowContent::Gap,
                });
            }
            match render::render(block, &options, &self.session.expansion) {
                BlockView::Unified(lines) | BlockView::Json(lines) => {
                    for line in lines {
                        self.rows.push(Row {
                            block: index,
                            content: RowContent::Single(line),
                        });
                    }
                }
                BlockView::Split { left, right } => {
                    let rows = left.len().max(right.len());
                    let mut left = left.into_iter();
                    let mut right = right.into_iter();
                    for _ in 0..rows {
                        self.rows.push(Row {
                            block: index,
                            content: RowContent::Pair(left.next(), right.next()),
                        });
                    }
                }
            }
        }

        if self.cursor >= self.rows.len() {
            self.cursor = self.rows.len().saturating_sub(1);
        }
    }

    fn navigate(&mut self, direction: NavDirection) {
        let index = self.session.navigate(direction, self.blocks.len());
        if let Some(position) = self
            .rows
            .iter()
            .position(|row| row.block == index && !matches!(row.content, RowContent::Gap))
        {
            self.cursor = position;
        }
    }

    fn toggle_node_at_cursor(&mut self) {
        let path = match self.rows.get(self.cursor) {
            Some(Row {
                content: RowContent::Single(line),
                ..
            }) => line.toggle_path.clone(),
            _ => None,
        };
        if let Some(path) = path {
            self.session.toggle_expansion(&path);
            self.rebuild_rows();
        }
    }

    fn handle_input(&mut self, key: KeyEvent) -> bool {
        self.message = None;

        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('?') => self.show_help = !self.show_help,

            // Cursor movement
            KeyCode::Char('j') | KeyCode::Down => {
                if self.cursor + 1 < self.rows.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Char('g') => self.cursor = 0,
            KeyCode::Char('G') => self.cursor = self.rows.len().saturating_sub(1),

            // Difference navigation (cyclic)
            KeyCode::Char('n') => self.navigate(NavDirection::Next),
            KeyCode::Char('p') => self.navigate(NavDirection::Previous),

            // Options
            KeyCode::Char('d') => {
                let on = self.session.toggle_only_diffs();
                self.refresh();
                self.message = Some(format!(
                    "Show only differences: {}",
                    if on { "on" } else { "off" }
                ));
            }
            KeyCode::Char('w') => {
                let on = self.session.toggle_whitespace();
                self.refresh();
                self.message = Some(format!(
                    "Ignore whitespace: {}",
                    if on { "on" } else { "off" }
                ));
            }
            KeyCode::Char('v') => {
                let mode = self.session.toggle_view_mode();
                self.rebuild_rows();
                self.message = Some(format!(
                    "View: {}",
                    match mode {
                        ViewMode::Unified => "unified",
                        ViewMode::Split => "split",
                    }
                ));
            }

            // JSON tree
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_node_at_cursor(),

            _ => {}
        }

        false
    }
}

/// Runs the TUI application
pub fn run(old: FileContent, new: FileContent, is_json: bool, session: Session) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(old, new, is_json, session);

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if app.handle_input(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Diff content
            Constraint::Length(3), // Status
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_diff(f, app, chunks[1]);
    render_status(f, app, chunks[2]);

    if app.show_help {
        render_help(f);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let counter = if app.blocks.is_empty() {
        "no differences".to_string()
    } else {
        format!(
            "diff {} of {}",
            app.session.nav.index() + 1,
            app.blocks.len()
        )
    };
    let header = Paragraph::new(format!(
        " {} → {}  [{}]",
        app.old.name, app.new.name, counter
    ))
    .style(Style::default().fg(Color::Cyan))
    .block(Block::default().borders(Borders::ALL).title(" tdiff "));

    f.render_widget(header, area);
}

fn render_diff(f: &mut Frame, app: &App, area: Rect) {
    if app.blocks.is_empty() {
        let empty = Paragraph::new("\nThe files are identical")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(ratatui::layout::Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, area);
        return;
    }

    let visible_height = area.height.saturating_sub(2) as usize;
    let scroll_offset = if app.cursor >= visible_height {
        app.cursor - visible_height + 1
    } else {
        0
    };

    let items: Vec<ListItem> = app
        .rows
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_height)
        .map(|(idx, row)| {
            let current = idx == app.cursor;
            let line = match &row.content {
                RowContent::Gap => Line::from(""),
                RowContent::Single(render_line) => single_line(render_line, current),
                RowContent::Pair(left, right) => {
                    pair_line(left.as_ref(), right.as_ref(), area.width as usize, current)
                }
            };
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL));
    f.render_widget(list, area);
}

fn kind_style(kind: ChangeKind) -> Style {
    match kind {
        ChangeKind::Added => Style::default().fg(Color::Green),
        ChangeKind::Removed => Style::default().fg(Color::Red),
        ChangeKind::Unchanged => Style::default(),
    }
}

fn content_spans(line: &RenderLine, base: Style) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    if line.indent > 0 {
        spans.push(Span::raw("  ".repeat(line.indent)));
    }
    if line.toggle_path.is_some() {
        spans.push(Span::styled(
            if line.expanded { "▾ " } else { "▸ " },
            base,
        ));
    }
    for span in &line.spans {
        let style = if span.kind == ChangeKind::Unchanged {
            base
        } else {
            kind_style(span.kind).add_modifier(Modifier::REVERSED)
        };
        spans.push(Span::styled(span.text.clone(), style));
    }

    spans
}

fn single_line(line: &RenderLine, current: bool) -> Line<'static> {
    let mut base = kind_style(line.kind);
    if current {
        base = base.add_modifier(Modifier::BOLD);
    }

    let marker = match line.kind {
        ChangeKind::Added => "+",
        ChangeKind::Removed => "-",
        ChangeKind::Unchanged => " ",
    };
    let gutter = match line.number {
        Some(n) => format!("{:>5} ", n),
        None => "      ".to_string(),
    };

    let mut spans = vec![
        Span::styled(gutter, Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{} ", marker), base),
    ];
    spans.extend(content_spans(line, base));

    if current {
        spans.insert(0, Span::styled("▌", Style::default().fg(Color::Cyan)));
    } else {
        spans.insert(0, Span::raw(" "));
    }

    Line::from(spans)
}

fn pair_line(
    left: Option<&RenderLine>,
    right: Option<&RenderLine>,
    total_width: usize,
    current: bool,
) -> Line<'static> {
    // Borders eat two columns, the divider one more.
    let cell_width = total_width.saturating_sub(3) / 2;

    let mut spans = Vec::new();
    if current {
        spans.push(Span::styled("▌", Style::default().fg(Color::Cyan)));
    } else {
        spans.push(Span::raw(" "));
    }
    spans.extend(cell_spans(left, cell_width.saturating_sub(1), current));
    spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
    spans.extend(cell_spans(right, cell_width, current));

    Line::from(spans)
}

fn cell_spans(line: Option<&RenderLine>, width: usize, current: bool) -> Vec<Span<'static>> {
    let Some(line) = line else {
        return vec![Span::raw(" ".repeat(width))];
    };

    let mut base = kind_style(line.kind);
    if current {
        base = base.add_modifier(Modifier::BOLD);
    }

    let gutter = match line.number {
        Some(n) => format!("{:>5} ", n),
        None => "      ".to_string(),
    };
    let mut spans = vec![Span::styled(gutter, Style::default().fg(Color::DarkGray))];

    let mut used = 6usize;
    for span in &line.spans {
        if used >= width {
            break;
        }
        let clipped = clip(&span.text, width - used);
        used += display_width(&clipped);
        let style = if span.kind == ChangeKind::Unchanged {
            base
        } else {
            kind_style(span.kind).add_modifier(Modifier::REVERSED)
        };
        spans.push(Span::styled(clipped, style));
    }
    if used < width {
        spans.push(Span::raw(" ".repeat(width - used)));
    }

    spans
}

fn display_width(text: &str) -> usize {
    text.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// Cut `text` to at most `width` terminal columns.
fn clip(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let content = if let Some(msg) = &app.message {
        format!(" {}", msg)
    } else {
        let opts = &app.session.options;
        format!(
            " n/p: diff | j/k: scroll | d: only diffs [{}] | w: whitespace [{}] | v: view [{}] | enter: expand | ?: help | q: quit",
            if opts.show_only_diffs { "on" } else { "off" },
            if opts.ignore_whitespace { "on" } else { "off" },
            match app.session.view_mode {
                ViewMode::Unified => "unified",
                ViewMode::Split => "split",
            },
        )
    };

    let status = Paragraph::new(content)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(status, area);
}

fn render_help(f: &mut Frame) {
    let area = centered_rect(60, 70, f.area());

    let help_text = vec![
        "",
        "  Navigation:",
        "    n         Next difference (wraps around)",
        "    p         Previous difference",
        "    j / ↓     Move down",
        "    k / ↑     Move up",
        "    g         Go to top",
        "    G         Go to bottom",
        "",
        "  Options:",
        "    d         Toggle show-only-differences",
        "    w         Toggle ignore-whitespace",
        "    v         Toggle unified/split view",
        "",
        "  JSON view:",
        "    Enter     Expand/collapse the node under the cursor",
        "",
        "  Other:",
        "    ?         Toggle this help",
        "    q         Quit",
        "",
    ];

    let help = Paragraph::new(help_text.join("\n"))
        .style(Style::default())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(help, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
