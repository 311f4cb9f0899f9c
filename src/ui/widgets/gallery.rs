//! Gallery grid widget - renders owned tokens as a grid of cells

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::GalleryCell;

/// Narrowest cell that still fits a title and an image URI
const MIN_CELL_WIDTH: u16 = 32;
/// Border + title + contract + token id + image line
const CELL_HEIGHT: u16 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    pub columns: usize,
    pub cell_width: u16,
    pub visible_rows: usize,
}

/// Column count follows the terminal width, like the 4-column web grid
/// followed the viewport
pub fn geometry(area: Rect) -> GridGeometry {
    let columns = (area.width / MIN_CELL_WIDTH).max(1) as usize;
    let cell_width = area.width / columns as u16;
    let visible_rows = (area.height / CELL_HEIGHT).max(1) as usize;
    GridGeometry {
        columns,
        cell_width,
        visible_rows,
    }
}

/// First visible row so the selected cell stays on screen
pub fn first_visible_row(selected: usize, columns: usize, visible_rows: usize) -> usize {
    let selected_row = selected / columns.max(1);
    selected_row.saturating_sub(visible_rows.saturating_sub(1))
}

pub fn render(f: &mut Frame, area: Rect, cells: &[GalleryCell], selected: usize, focused: bool) {
    let geo = geometry(area);
    if cells.is_empty() || geo.columns == 0 {
        return;
    }

    let first_row = first_visible_row(selected, geo.columns, geo.visible_rows);
    let first_index = first_row * geo.columns;

    for (offset, cell) in cells.iter().skip(first_index).enumerate() {
        let index = first_index + offset;
        let row = offset / geo.columns;
        let col = offset % geo.columns;
        if row >= geo.visible_rows {
            break;
        }

        let cell_area = Rect {
            x: area.x + col as u16 * geo.cell_width,
            y: area.y + row as u16 * CELL_HEIGHT,
            width: geo.cell_width.min(area.width.saturating_sub(col as u16 * geo.cell_width)),
            height: CELL_HEIGHT.min(area.height.saturating_sub(row as u16 * CELL_HEIGHT)),
        };
        if cell_area.width < 4 || cell_area.height < 3 {
            continue;
        }

        let is_selected = index == selected;
        let border_style = if is_selected && focused {
            Style::default().fg(Color::Cyan)
        } else if is_selected {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let inner_width = cell_area.width.saturating_sub(2) as usize;
        let lines = vec![
            Line::from(Span::styled(
                truncate(&cell.title, inner_width),
                Style::default()
                    .fg(Color::LightCyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled("contract ", Style::default().fg(Color::DarkGray)),
                Span::raw(truncate(&short_hex(&cell.contract_address), inner_width)),
            ]),
            Line::from(vec![
                Span::styled("token    ", Style::default().fg(Color::DarkGray)),
                Span::raw(truncate(&cell.token_id, inner_width.saturating_sub(9))),
            ]),
            Line::from(vec![
                Span::styled("image    ", Style::default().fg(Color::DarkGray)),
                Span::raw(truncate(&cell.image_uri, inner_width.saturating_sub(9))),
            ]),
        ];

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        );
        f.render_widget(paragraph, cell_area);
    }
}

fn truncate(value: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if value.chars().count() <= width {
        return value.to_string();
    }
    let kept: String = value.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn short_hex(value: &str) -> String {
    if value.len() <= 12 {
        return value.to_string();
    }
    format!("{}..{}", &value[..8], &value[value.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_scales_columns_with_width() {
        let narrow = geometry(Rect::new(0, 0, 40, 24));
        assert_eq!(narrow.columns, 1);

        let wide = geometry(Rect::new(0, 0, 130, 24));
        assert_eq!(wide.columns, 4);
        assert_eq!(wide.visible_rows, 4);
    }

    #[test]
    fn tiny_terminal_still_gets_one_column() {
        let geo = geometry(Rect::new(0, 0, 10, 5));
        assert_eq!(geo.columns, 1);
        assert_eq!(geo.visible_rows, 1);
    }

    #[test]
    fn selected_cell_scrolls_into_view() {
        // 3 columns, 2 visible rows: cell 8 sits on row 2
        assert_eq!(first_visible_row(0, 3, 2), 0);
        assert_eq!(first_visible_row(5, 3, 2), 0);
        assert_eq!(first_visible_row(8, 3, 2), 1);
        assert_eq!(first_visible_row(12, 3, 2), 3);
    }

    #[test]
    fn truncate_marks_clipped_values() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("longer-than-width", 8), "longer-…");
        assert_eq!(truncate("anything", 0), "");
    }

    #[test]
    fn short_hex_keeps_ends() {
        assert_eq!(
            short_hex("0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d"),
            "0xbc4ca0..f13d"
        );
        assert_eq!(short_hex("0x1"), "0x1");
    }
}
