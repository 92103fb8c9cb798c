use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::game::{Game2048, Outcome, SIDE};
use crate::games::runner::renderer::centered;

const CELL_W: u16 = 8;
const CELL_H: u16 = 3;

pub fn draw(frame: &mut Frame, game: &Game2048) {
    let area = frame.area();
    if area.width < SIDE as u16 * CELL_W + 2 || area.height < SIDE as u16 * CELL_H + 4 {
        frame.render_widget(Paragraph::new("Terminal too small"), area);
        return;
    }

    let board = centered(area, SIDE as u16 * CELL_W + 2, SIDE as u16 * CELL_H + 2);
    frame.render_widget(
        Block::default().borders(Borders::ALL).title(" 2048 "),
        board,
    );

    for row in 0..SIDE {
        for col in 0..SIDE {
            let cell = Rect::new(
                board.x + 1 + col as u16 * CELL_W,
                board.y + 1 + row as u16 * CELL_H,
                CELL_W,
                CELL_H,
            );
            let value = game.tile(row, col);
            let text = if value == 0 {
                "·".to_string()
            } else {
                value.to_string()
            };
            frame.render_widget(
                Paragraph::new(format!("\n{}", text))
                    .alignment(Alignment::Center)
                    .style(tile_style(value)),
                cell,
            );
        }
    }

    let header = Rect::new(board.x, board.y.saturating_sub(1), board.width, 1);
    frame.render_widget(
        Paragraph::new(format!("SCORE {}   BEST {}", game.score(), game.best()))
            .alignment(Alignment::Left),
        header,
    );
    let footer_y = (board.y + board.height).min(area.height.saturating_sub(1));
    frame.render_widget(
        Paragraph::new("WASD/arrows move tiles · Esc back").alignment(Alignment::Center),
        Rect::new(board.x, footer_y, board.width, 1),
    );

    match game.outcome() {
        Outcome::Playing => {}
        Outcome::Won => overlay(frame, area, "🎉 YOU WON! 🎉", game.score()),
        Outcome::Lost => overlay(frame, area, "GAME OVER", game.score()),
    }
}

fn tile_style(value: u32) -> Style {
    let color = match value {
        0 => Color::DarkGray,
        2 | 4 => Color::White,
        8 | 16 => Color::LightYellow,
        32 | 64 => Color::LightRed,
        128 | 256 | 512 => Color::Yellow,
        _ => Color::LightMagenta,
    };
    Style::default().fg(color)
}

fn overlay(frame: &mut Frame, area: Rect, title: &str, score: u32) {
    let popup = centered(area, 34, 7);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(format!(
            "{}\n\nFINAL SCORE: {}\n\n[R] Play again  [B] Menu",
            title, score
        ))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL)),
        popup,
    );
}
