//! TUI rendering for cordon using ratatui.
//!
//! Draws a committed [`Rendered`] tree plus fault diagnostics. The drawing
//! layer never inspects boundary internals: a faulted subtree already shows
//! up here as its fallback's rendering.

mod theme;

pub use theme::{Glyphs, Palette, UiOptions, glyphs, palette, styles};

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use cordon_engine::RuntimeStats;
use cordon_types::{CaughtError, RenderTrace, Rendered, single_line, truncate_with_ellipsis};

/// Trace frames shown in the fault panel before clipping.
const MAX_TRACE_ROWS: usize = 4;

/// Everything one frame needs, assembled by the host each draw.
pub struct FrameModel<'a> {
    pub tree: &'a Rendered,
    pub error: Option<&'a CaughtError>,
    pub trace: Option<&'a RenderTrace>,
    pub stats: RuntimeStats,
    /// Key hints for the status bar, as (key, action) pairs.
    pub hints: &'a [(&'static str, &'static str)],
}

/// Main draw function
pub fn draw(frame: &mut Frame, model: &FrameModel, options: UiOptions) {
    let palette = palette(options);
    let glyphs = glyphs(options);

    // Clear with background color
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let fault_height = model.error.map_or(0, |_| {
        let frames = model
            .trace
            .map_or(0, |trace| trace.frames().len().min(MAX_TRACE_ROWS));
        (frames + 3) as u16
    });

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),              // Tree
            Constraint::Length(fault_height), // Fault panel
            Constraint::Length(1),           // Status bar
        ])
        .split(frame.area());

    draw_tree(frame, model.tree, chunks[0], &palette, &glyphs);
    if let Some(error) = model.error {
        draw_fault_panel(frame, error, model.trace, chunks[1], &palette, &glyphs);
    }
    draw_status_bar(frame, model, chunks[2], &palette, &glyphs);
}

fn draw_tree(frame: &mut Frame, tree: &Rendered, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let mut lines = Vec::new();
    push_tree_lines(tree, 0, &mut lines, palette, glyphs);
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "(nothing rendered)",
            Style::default().fg(palette.text_muted),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.bg_border))
        .title(Span::styled(" cordon ", styles::panel_title(palette)));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn push_tree_lines(
    node: &Rendered,
    depth: usize,
    lines: &mut Vec<Line<'static>>,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let indent = "  ".repeat(depth);
    match node {
        Rendered::Nothing => {}
        Rendered::Text(text) => {
            for row in text.lines() {
                lines.push(Line::from(Span::styled(
                    format!("{indent}{row}"),
                    Style::default().fg(palette.text_primary),
                )));
            }
        }
        Rendered::Group { label, children } => {
            // Anonymous groups are containers (boundaries among them) and
            // stay invisible: children render at the same depth.
            if label.is_empty() {
                for child in children {
                    push_tree_lines(child, depth, lines, palette, glyphs);
                }
            } else {
                lines.push(Line::from(Span::styled(
                    format!("{indent}{} {label}", glyphs.bullet),
                    styles::group_label(palette),
                )));
                for child in children {
                    push_tree_lines(child, depth + 1, lines, palette, glyphs);
                }
            }
        }
    }
}

fn draw_fault_panel(
    frame: &mut Frame,
    error: &CaughtError,
    trace: Option<&RenderTrace>,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let width = area.width.saturating_sub(4).max(8) as usize;
    let message = truncate_with_ellipsis(&single_line(&error.to_string()), width);

    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{} ", glyphs.fault), styles::fault_text(palette)),
        Span::styled(message, styles::fault_text(palette)),
    ])];
    if let Some(trace) = trace {
        for frame_name in trace.frames().iter().take(MAX_TRACE_ROWS) {
            lines.push(Line::from(Span::styled(
                format!("    in {frame_name}"),
                Style::default().fg(palette.text_muted),
            )));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.error))
        .title(Span::styled(
            format!(" {} last fault ", glyphs.shield),
            styles::fault_text(palette),
        ));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_status_bar(
    frame: &mut Frame,
    model: &FrameModel,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let mut left = Vec::new();
    for (index, (key, action)) in model.hints.iter().enumerate() {
        if index > 0 {
            left.push(Span::styled(
                format!(" {} ", glyphs.separator),
                styles::key_hint(palette),
            ));
        }
        left.push(Span::styled(*key, styles::key_highlight(palette)));
        left.push(Span::styled(format!(" {action}"), styles::key_hint(palette)));
    }

    let stats = model.stats;
    let (state_glyph, state_style) = if model.error.is_some() {
        (glyphs.fault, styles::fault_text(palette))
    } else {
        (glyphs.ok, styles::status_ok(palette))
    };
    let summary = format!(
        "{state_glyph} {} faults {} {} passes",
        stats.faults_intercepted, glyphs.separator, stats.passes
    );

    let left_width: usize = left.iter().map(|span| span.content.width()).sum();
    let pad = (area.width as usize)
        .saturating_sub(left_width)
        .saturating_sub(summary.width())
        .saturating_sub(1);
    let mut spans = left;
    spans.push(Span::raw(" ".repeat(pad)));
    spans.push(Span::styled(summary, state_style));

    let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(palette.bg_panel));
    frame.render_widget(bar, area);
}
