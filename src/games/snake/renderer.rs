use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::game::{SnakeGame, GRID};
use crate::games::runner::renderer::centered;

pub fn draw(frame: &mut Frame, game: &SnakeGame) {
    let area = frame.area();
    if area.width < GRID as u16 * 2 + 2 || area.height < GRID as u16 + 4 {
        frame.render_widget(Paragraph::new("Terminal too small"), area);
        return;
    }

    // Two terminal columns per grid cell to get roughly square cells.
    let board = centered(area, GRID as u16 * 2 + 2, GRID as u16 + 2);
    frame.render_widget(
        Block::default().borders(Borders::ALL).title(" SNAKE "),
        board,
    );
    let inner = Rect::new(board.x + 1, board.y + 1, GRID as u16 * 2, GRID as u16);

    for (i, segment) in game.body().enumerate() {
        let color = if i == 0 { Color::LightGreen } else { Color::Green };
        frame.render_widget(
            Paragraph::new("██").style(Style::default().fg(color)),
            cell_rect(inner, segment.x, segment.y),
        );
    }

    let food = game.food();
    frame.render_widget(
        Paragraph::new("◆").style(Style::default().fg(Color::Red)),
        cell_rect(inner, food.x, food.y),
    );

    let header = Rect::new(board.x, board.y.saturating_sub(1), board.width, 1);
    frame.render_widget(
        Paragraph::new(format!("SCORE {}", game.score())).alignment(Alignment::Left),
        header,
    );
    let footer_y = (board.y + board.height).min(area.height.saturating_sub(1));
    frame.render_widget(
        Paragraph::new("WASD/arrows move · Esc back").alignment(Alignment::Center),
        Rect::new(board.x, footer_y, board.width, 1),
    );

    if game.game_over() {
        let overlay = centered(area, 34, 7);
        frame.render_widget(Clear, overlay);
        frame.render_widget(
            Paragraph::new(format!(
                "GAME OVER\n\nFINAL SCORE: {}\n\n[R] Play again  [B] Menu",
                game.score()
            ))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
            overlay,
        );
    }
}

fn cell_rect(inner: Rect, x: i16, y: i16) -> Rect {
    Rect::new(
        inner.x + (x.max(0) as u16) * 2,
        inner.y + y.max(0) as u16,
        2,
        1,
    )
}
