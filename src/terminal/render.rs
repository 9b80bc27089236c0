//! $CAP Terminal rendering: loading screen, Miner/Wallet/Shop tabs and the
//! bottom navigation bar.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{ClickableList, TabBar};

use super::actions::*;
use super::state::{ShopItem, Snapshot, Tab, MAX_ENERGY, MINE_ENERGY_COST};
use super::TerminalApp;

const NEON: Color = Color::Rgb(57, 255, 20);

/// Reactor core, idle. 5 lines, 15 chars wide.
const REACTOR_ART: &[&str] = &[
    "  ╭─┄┄┄┄┄┄┄─╮  ",
    " ┆  ◢█████◣  ┆ ",
    " ┆  ██ ◉ ██  ┆ ",
    " ┆  ◥█████◤  ┆ ",
    "  ╰─┄┄┄┄┄┄┄─╯  ",
];

/// Reactor core while a tap is being processed.
const REACTOR_HIT_ART: &[&str] = &[
    "  ╭━━━━━━━━━╮  ",
    " ┃ ◢███████◣ ┃ ",
    " ┃ ███ ✦ ███ ┃ ",
    " ┃ ◥███████◤ ┃ ",
    "  ╰━━━━━━━━━╯  ",
];

const SPINNER: &[char] = &['◐', '◓', '◑', '◒'];

/// Group digits in thousands: `1234567` → `"1,234,567"`.
pub fn format_cap(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn render(app: &TerminalApp, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let Some(session) = app.session() else {
        render_loading(app.now, f, area);
        return;
    };
    let state = session.snapshot();

    let chunks = Layout::vertical([
        Constraint::Length(1), // header
        Constraint::Min(6),    // active tab
        Constraint::Length(3), // navigation
    ])
    .split(area);

    render_header(&state, f, chunks[0]);
    match app.tab {
        Tab::Miner => render_miner(app, &state, f, chunks[1], click_state),
        Tab::Wallet => render_wallet(&state, f, chunks[1]),
        Tab::Shop => render_shop(&state, f, chunks[1], click_state),
    }
    render_tab_bar(app.tab, f, chunks[2], click_state);
}

fn render_loading(now: u64, f: &mut Frame, area: Rect) {
    let spinner = SPINNER[(now / 150) as usize % SPINNER.len()];
    let rows = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .split(area);
    let text = Paragraph::new(Line::from(vec![
        Span::styled(format!("{spinner} "), Style::default().fg(NEON)),
        Span::styled(
            "INITIALIZING $CAP TERMINAL...",
            Style::default().fg(NEON).add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(text, rows[1]);
}

fn render_header(state: &Snapshot, f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" $CAP TERMINAL ", Style::default().fg(Color::Black).bg(NEON).add_modifier(Modifier::BOLD)),
        Span::styled(format!("  {} $CAP", format_cap(state.score)), Style::default().fg(Color::White)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_miner(
    app: &TerminalApp,
    state: &Snapshot,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let low = state.energy < MINE_ENERGY_COST;
    let narrow = is_narrow_layout(area.width);
    let art_height = if narrow { 0 } else { REACTOR_ART.len() as u16 + 2 };

    let chunks = Layout::vertical([
        Constraint::Length(4),          // balance + energy
        Constraint::Min(art_height.max(3)), // reactor
        Constraint::Length(2),          // hint
    ])
    .split(area);

    // ── Stats ──
    let stats = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(" BALANCE / ENERGY ", Style::default().fg(NEON)));
    let inner = stats.inner(chunks[0]);
    f.render_widget(stats, chunks[0]);

    let energy_color = if low { Color::Red } else { NEON };
    let stat_rows = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(inner);
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format_cap(state.score),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" $CAP", Style::default().fg(NEON)),
            Span::raw("   "),
            Span::styled("⚡", Style::default().fg(energy_color)),
            Span::styled(
                format!("{}", state.energy),
                Style::default().fg(energy_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("/{MAX_ENERGY}"), Style::default().fg(Color::DarkGray)),
        ])),
        stat_rows[0],
    );
    f.render_widget(
        Gauge::default()
            .percent(state.energy_percent())
            .label("")
            .gauge_style(Style::default().fg(energy_color).bg(Color::Black)),
        stat_rows[1],
    );

    // ── Reactor ──
    let flashing = app.now < app.mine_flash_until;
    let border_color = if flashing {
        Color::White
    } else if low {
        Color::Red
    } else {
        NEON
    };
    let reactor_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let reactor_area = chunks[1];

    let art = if flashing { REACTOR_HIT_ART } else { REACTOR_ART };
    let art_style = if flashing {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(NEON)
    };
    let mut lines: Vec<Line> = Vec::new();
    if narrow {
        lines.push(Line::from(Span::styled("◢ AI CORE ◣", art_style)));
    } else {
        let top_pad = reactor_block.inner(reactor_area).height.saturating_sub(art.len() as u16) / 2;
        lines.extend((0..top_pad).map(|_| Line::from("")));
        lines.extend(art.iter().map(|row| Line::from(Span::styled(*row, art_style))));
    }
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(reactor_block),
        reactor_area,
    );
    click_state.borrow_mut().add_click_target(reactor_area, MINE);

    if low {
        let inner = Block::default().borders(Borders::ALL).inner(reactor_area);
        let w = 14.min(inner.width);
        let overlay = Rect::new(
            inner.x + (inner.width - w) / 2,
            inner.y + inner.height / 2,
            w,
            1.min(inner.height),
        );
        f.render_widget(Clear, overlay);
        f.render_widget(
            Paragraph::new(Span::styled(
                "LOW ENERGY",
                Style::default().fg(Color::Red).bg(Color::Black).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            overlay,
        );
    }

    // ── Hint ──
    let mut cs = click_state.borrow_mut();
    let mut cl = ClickableList::new();
    cl.push_clickable(
        Line::from(vec![
            Span::styled(" [M] ", Style::default().fg(NEON).add_modifier(Modifier::BOLD)),
            Span::styled("TAP THE CORE TO MINE", Style::default().fg(Color::Gray)),
        ]),
        MINE,
    );
    cl.push(Line::from(Span::styled(
        " NEURAL LINK ESTABLISHED",
        Style::default().fg(NEON).add_modifier(Modifier::DIM),
    )));
    cl.render(f, chunks[2], Block::default(), &mut cs);
}

fn render_wallet(state: &Snapshot, f: &mut Frame, area: Rect) {
    let label = Style::default().fg(Color::Gray);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    let lines = vec![
        Line::from(Span::styled("TOTAL NET WORTH", label)),
        Line::from(vec![
            Span::styled(format_cap(state.score), value),
            Span::styled(" $CAP", Style::default().fg(NEON)),
        ]),
        Line::from(""),
        Line::from(Span::styled("ASSETS INVENTORY", Style::default().fg(Color::DarkGray))),
        Line::from(vec![
            Span::styled("  AI Scanners  ", Style::default().fg(Color::Blue)),
            Span::styled(state.owned(ShopItem::Scanner).to_string(), value),
        ]),
        Line::from(vec![
            Span::styled("  Signal Pass  ", Style::default().fg(Color::Magenta)),
            Span::styled(state.owned(ShopItem::Signal).to_string(), value),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "SECURE CONNECTION ESTABLISHED",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(NEON))
        .title(Span::styled(" TERMINAL WALLET ", Style::default().fg(NEON).add_modifier(Modifier::BOLD)));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_shop(state: &Snapshot, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let mut cl = ClickableList::new();

    for (i, item) in ShopItem::all().iter().enumerate() {
        let affordable = state.can_afford(item.cost());
        let (key_style, name_style, price_style) = if affordable {
            (
                Style::default().fg(NEON).add_modifier(Modifier::BOLD),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                Style::default().fg(Color::Black).bg(NEON).add_modifier(Modifier::BOLD),
            )
        } else {
            let dim = Style::default().fg(Color::DarkGray);
            (dim, dim, dim)
        };

        cl.push_clickable(
            Line::from(vec![
                Span::styled(format!(" [{}] ", item.key().to_ascii_uppercase()), key_style),
                Span::styled(item.name(), name_style),
                Span::raw("  "),
                Span::styled(format!(" {} $CAP ", format_cap(item.cost())), price_style),
            ]),
            BUY_ITEM_BASE + i as u16,
        );
        cl.push(Line::from(Span::styled(
            format!("     {}", item.description()),
            Style::default().fg(Color::Gray),
        )));
        cl.push(Line::from(Span::styled(
            format!("     {}", item.details()),
            Style::default().fg(Color::DarkGray),
        )));
        cl.push(Line::from(""));
    }

    cl.push(Line::from(Span::styled(
        " ⚠ INSTANT SYNC: A PURCHASE CLOSES THE TERMINAL.",
        Style::default().fg(Color::Yellow),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(NEON))
        .title(Span::styled(" MARKETPLACE ", Style::default().fg(NEON).add_modifier(Modifier::BOLD)));

    let mut cs = click_state.borrow_mut();
    cl.render(f, area, block, &mut cs);
}

fn render_tab_bar(active: Tab, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let action = |tab: Tab| match tab {
        Tab::Miner => TAB_MINER,
        Tab::Wallet => TAB_WALLET,
        Tab::Shop => TAB_SHOP,
    };
    let bar = Tab::all().iter().fold(TabBar::new(NEON), |bar, tab| {
        bar.tab(tab.label(), *tab == active, action(*tab))
    });
    let mut cs = click_state.borrow_mut();
    bar.render(f, area, &mut cs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_cap_groups_thousands() {
        assert_eq!(format_cap(0), "0");
        assert_eq!(format_cap(999), "999");
        assert_eq!(format_cap(1000), "1,000");
        assert_eq!(format_cap(2500), "2,500");
        assert_eq!(format_cap(1_234_567), "1,234,567");
        assert_eq!(format_cap(u64::MAX), "18,446,744,073,709,551,615");
    }

    #[test]
    fn reactor_frames_share_dimensions() {
        assert_eq!(REACTOR_ART.len(), REACTOR_HIT_ART.len());
        for (a, b) in REACTOR_ART.iter().zip(REACTOR_HIT_ART) {
            assert_eq!(Line::from(*a).width(), Line::from(*b).width());
        }
    }
}
