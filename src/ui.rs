use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::app::{App, FocusPane};
use crate::model::RefreshPhase;

const BG: Color = Color::Rgb(10, 14, 23);
const PANEL: Color = Color::Rgb(17, 24, 39);
const ACCENT: Color = Color::Rgb(56, 189, 248);
const MUTED: Color = Color::Rgb(140, 156, 178);
const WARN: Color = Color::Rgb(251, 191, 36);
const ERROR: Color = Color::Rgb(248, 113, 113);
const SELECTION: Color = Color::Rgb(30, 41, 59);

pub fn render(frame: &mut Frame, app: &App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, root[0]);
    render_body(frame, root[1], app);
    render_footer(frame, root[2], app);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            " lakeview ",
            Style::default().fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "  [tab] switch pane  [enter] use workspace  [r] refresh  [x] delete  [q] quit",
            Style::default().fg(MUTED),
        ),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(BG)), area);
}

fn render_body(frame: &mut Frame, area: Rect, app: &App) {
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_workspaces(frame, panes[0], app, app.focus() == FocusPane::Workspaces);
    render_catalogs(frame, panes[1], app, app.focus() == FocusPane::Catalogs);
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(ACCENT)
        } else {
            Style::default().fg(MUTED)
        })
        .style(Style::default().bg(PANEL))
}

fn render_workspaces(frame: &mut Frame, area: Rect, app: &App, focused: bool) {
    let block = pane_block(format!("Workspaces ({})", app.profiles().len()), focused);

    if app.profiles().is_empty() {
        let placeholder = Paragraph::new("(no workspaces)\nrun: lakeview login")
            .block(block)
            .style(Style::default().fg(MUTED));
        frame.render_widget(placeholder, area);
        return;
    }

    let header = Row::new([
        Cell::from("Name").style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from("Host").style(Style::default().add_modifier(Modifier::BOLD)),
    ])
    .height(1)
    .style(Style::default().fg(ACCENT));

    let rows = app.profiles().iter().map(|profile| {
        let is_active = app.active_name() == Some(profile.name.as_str());
        let host = if is_active {
            format!("{}  [active]", profile.host)
        } else {
            profile.host.clone()
        };
        let name_style = if is_active {
            Style::default().fg(ACCENT)
        } else {
            Style::default().fg(Color::White)
        };
        Row::new([
            Cell::from(profile.name.clone()).style(name_style),
            Cell::from(host).style(Style::default().fg(MUTED)),
        ])
    });

    let table = Table::new(
        rows,
        [Constraint::Length(20), Constraint::Min(20)],
    )
    .header(header)
    .block(block)
    .column_spacing(1)
    .row_highlight_style(
        Style::default()
            .bg(SELECTION)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("▸ ");

    let mut state = TableState::default();
    state.select(Some(app.selected()));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_catalogs(frame: &mut Frame, area: Rect, app: &App, focused: bool) {
    let block = pane_block(format!("Catalogs ({})", app.catalogs().len()), focused);

    if app.catalogs().is_empty() {
        let hint = match app.phase() {
            RefreshPhase::Loading => "(loading...)",
            RefreshPhase::Error => "(error)",
            _ => "(none)",
        };
        let placeholder = Paragraph::new(hint)
            .block(block)
            .style(Style::default().fg(MUTED));
        frame.render_widget(placeholder, area);
        return;
    }

    let rows = app
        .catalogs()
        .iter()
        .map(|catalog| Row::new([Cell::from(catalog.clone()).style(Style::default().fg(Color::White))]));

    let table = Table::new(rows, [Constraint::Min(10)])
        .block(block)
        .row_highlight_style(
            Style::default()
                .bg(SELECTION)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut state = TableState::default();
    state.select(focused.then_some(app.catalog_cursor()));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let (badge, badge_color) = match app.phase() {
        RefreshPhase::Idle => (" idle ", MUTED),
        RefreshPhase::Loading => (" load ", WARN),
        RefreshPhase::Ready => (" ready ", ACCENT),
        RefreshPhase::Error => (" error ", ERROR),
    };

    let left = Line::from(vec![
        Span::styled(
            badge,
            Style::default().fg(Color::Black).bg(badge_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {}", app.status()), Style::default().fg(Color::White)),
    ]);

    let Some(stamp) = app.last_refreshed() else {
        frame.render_widget(Paragraph::new(left).style(Style::default().bg(BG)), area);
        return;
    };

    let right = Line::from(Span::styled(
        format!("updated {} ", stamp.format("%H:%M:%S")),
        Style::default().fg(MUTED),
    ));
    let right_width = right.width() as u16;
    if right_width >= area.width {
        frame.render_widget(Paragraph::new(left).style(Style::default().bg(BG)), area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(right_width)])
        .split(area);
    frame.render_widget(Paragraph::new(left).style(Style::default().bg(BG)), chunks[0]);
    frame.render_widget(
        Paragraph::new(right)
            .style(Style::default().bg(BG))
            .alignment(Alignment::Right),
        chunks[1],
    );
}
