//! Clickable UI components. Each one renders itself and registers the click
//! targets for what it drew, so hit regions can never drift from the text.

use ratzilla::ratatui::layout::{Constraint, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::Line;
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::ClickState;

// ── TabBar ─────────────────────────────────────────────────────

/// Bottom navigation: equal-width segments, one per tab, each fully tappable.
///
/// ```ignore
/// TabBar::new(Color::Green)
///     .tab("MINE", true, TAB_MINER)
///     .tab("WALLET", false, TAB_WALLET)
///     .render(f, area, &mut cs);
/// ```
pub struct TabBar {
    tabs: Vec<(String, bool, u16)>,
    accent: Color,
}

impl TabBar {
    pub fn new(accent: Color) -> Self {
        Self {
            tabs: Vec::new(),
            accent,
        }
    }

    pub fn tab(mut self, label: impl Into<String>, active: bool, action_id: u16) -> Self {
        self.tabs.push((label.into(), active, action_id));
        self
    }

    fn style(&self, active: bool) -> Style {
        if active {
            Style::default()
                .fg(Color::Black)
                .bg(self.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    }

    /// Segment rects for `area`, before any widget is drawn.
    pub fn segments(&self, area: Rect) -> Vec<Rect> {
        let n = self.tabs.len() as u32;
        if n == 0 {
            return Vec::new();
        }
        Layout::horizontal((0..n).map(|_| Constraint::Ratio(1, n)))
            .split(area)
            .to_vec()
    }

    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        for ((label, active, action_id), segment) in self.tabs.iter().zip(self.segments(area)) {
            let block = Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray));
            let text = Paragraph::new(Line::from(label.as_str()).centered())
                .style(self.style(*active))
                .block(block);
            f.render_widget(text, segment);
            cs.add_click_target(segment, *action_id);
        }
    }
}

// ── ClickableList ──────────────────────────────────────────────

/// Lines annotated with click actions as they are pushed.
///
/// Rows are resolved at registration time, so inserting a line above a
/// clickable one moves its target along with it.
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line_index, action_id)`
    actions: Vec<(usize, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        self.actions.push((self.lines.len(), action_id));
        self.lines.push(line);
    }

    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Rows one line occupies once wrapped to `width` columns.
    ///
    /// Uses ratatui's own word wrapper so targets match what is drawn.
    fn visual_height(line: &Line<'a>, width: u16) -> u16 {
        if width == 0 {
            return 1;
        }
        let rows = Paragraph::new(line.clone())
            .wrap(Wrap { trim: false })
            .line_count(width);
        rows.max(1) as u16
    }

    /// Register targets for every clickable line rendered in `area` inside
    /// `block` with word wrapping enabled.
    pub fn register_targets(&self, area: Rect, block: &Block, cs: &mut ClickState) {
        let inner = block.inner(area);
        let mut row = inner.y;
        let mut next_action = self.actions.iter().peekable();

        for (idx, line) in self.lines.iter().enumerate() {
            if row >= inner.bottom() {
                break;
            }
            let height = Self::visual_height(line, inner.width);
            if let Some(&(_, action_id)) = next_action.next_if(|(i, _)| *i == idx) {
                for r in row..(row + height).min(inner.bottom()) {
                    cs.add_row_target(area, r, action_id);
                }
            }
            row += height;
        }
    }

    /// Render wrapped inside `block` and register targets in one step.
    pub fn render(self, f: &mut Frame, area: Rect, block: Block<'a>, cs: &mut ClickState) {
        self.register_targets(area, &block, cs);
        let widget = Paragraph::new(self.into_lines())
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(widget, area);
    }
}
