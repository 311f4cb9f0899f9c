use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

pub mod layout;
pub mod widgets;

use crate::app::{App, Focus, InputMode, LookupPhase, StatusLevel};

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.size();
    let areas = layout::areas(size);

    draw_header(f, areas.header, app);
    draw_input(f, areas.input, app);
    draw_gallery(f, areas.gallery, app);
    draw_status_line(f, areas.status_line, app);

    if app.help_open {
        draw_help_popup(f, areas.size);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let title = Line::from(vec![
        Span::styled(
            "Glimpse",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("RPC", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {} ", display_or_dash(&app.endpoint))),
        Span::styled("Node", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {}", app.node_kind)),
    ]);
    let left = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    let mut wallet = app
        .wallet_address
        .as_deref()
        .map(short_address)
        .unwrap_or_else(|| "not connected".to_string());
    if app.wallet_accounts.len() > 1 {
        wallet.push_str(&format!(" (+{})", app.wallet_accounts.len() - 1));
    }
    let right_line = Line::from(vec![
        Span::styled("Wallet ", Style::default().fg(Color::DarkGray)),
        Span::raw(wallet),
    ]);
    let right = Paragraph::new(right_line)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    f.render_widget(left, chunks[0]);
    f.render_widget(right, chunks[1]);
}

fn draw_input(f: &mut Frame, area: Rect, app: &App) {
    let editing = app.input_mode == InputMode::Editing;
    let border_style = if editing || app.focus == Focus::Input {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let input = Paragraph::new(app.input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Owner address or ENS name")
            .border_style(border_style),
    );
    f.render_widget(input, area);

    if editing {
        let cursor_x = area.x + 1 + app.input.chars().count() as u16;
        f.set_cursor(cursor_x.min(area.x + area.width.saturating_sub(2)), area.y + 1);
    }
}

fn draw_gallery(f: &mut Frame, area: Rect, app: &mut App) {
    match app.phase {
        LookupPhase::Idle => {
            let hint = Paragraph::new(vec![
                Line::from(""),
                Line::from("Enter an address and this tool will list all of its NFTs."),
                Line::from(""),
                Line::from(Span::styled(
                    "i edit address  Enter fetch  c connect wallet  ? help",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Gallery"));
            f.render_widget(hint, area);
        }
        LookupPhase::Loading => {
            let loading = Paragraph::new(vec![
                Line::from(""),
                Line::from("Fetching NFTs… the query may take a few seconds."),
            ])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Gallery"));
            f.render_widget(loading, area);
        }
        LookupPhase::Error => {
            let message = app.error.clone().unwrap_or_else(|| "Lookup failed".to_string());
            let error = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(message, Style::default().fg(Color::Red))),
                Line::from(""),
                Line::from(Span::styled(
                    "r retry  i edit address",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Gallery"));
            f.render_widget(error, area);
        }
        LookupPhase::Success => {
            let title = match (&app.owner, app.truncated) {
                (Some(owner), false) => format!("Gallery - {}", short_address(owner)),
                (Some(owner), true) => {
                    format!("Gallery - {} (first page)", short_address(owner))
                }
                (None, _) => "Gallery".to_string(),
            };
            let block = Block::default().borders(Borders::ALL).title(title);
            let inner = block.inner(area);
            f.render_widget(block, area);

            if app.cells.is_empty() {
                let empty = Paragraph::new("No NFTs found for this address.")
                    .alignment(Alignment::Center);
                f.render_widget(empty, inner);
                return;
            }

            // Keyboard navigation must agree with what was just laid out
            app.grid_columns = widgets::gallery::geometry(inner).columns;
            widgets::gallery::render(
                f,
                inner,
                &app.cells,
                app.selected,
                app.focus == Focus::Gallery,
            );
        }
    }
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let line = match app.status_text() {
        Some((text, level)) => {
            let style = match level {
                StatusLevel::Info => Style::default().fg(Color::Gray),
                StatusLevel::Warn => Style::default().fg(Color::Yellow),
                StatusLevel::Error => Style::default().fg(Color::Red),
            };
            Line::from(Span::styled(text.to_string(), style))
        }
        None => Line::from(Span::styled(
            "q quit  i edit  Enter fetch  c connect  y copy contract  Y copy image  ? help",
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_help_popup(f: &mut Frame, size: Rect) {
    let area = centered_rect(50, 60, size);
    f.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(
            "Keys",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("i / /      edit the owner address"),
        Line::from("Enter      fetch NFTs for the address"),
        Line::from("Esc        stop editing / close help"),
        Line::from("c          connect wallet (request accounts)"),
        Line::from("r          retry the last lookup"),
        Line::from("h j k l    move around the gallery"),
        Line::from("y          copy selected contract address"),
        Line::from("Y          copy selected image URI"),
        Line::from("q          quit"),
    ];

    let help = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "--"
    } else {
        value
    }
}

fn short_address(value: &str) -> String {
    if value.len() <= 12 {
        return value.to_string();
    }
    format!("{}..{}", &value[..8], &value[value.len() - 4..])
}
