use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::game::{lane_center, EntityKind, RunnerGame, FIELD_HEIGHT, FIELD_WIDTH, LANES};

const TRACK_COLS: u16 = 31;
const TRACK_ROWS: u16 = 20;

pub fn draw(frame: &mut Frame, game: &RunnerGame) {
    let area = frame.area();
    if area.width < TRACK_COLS + 2 || area.height < TRACK_ROWS + 4 {
        frame.render_widget(Paragraph::new("Terminal too small"), area);
        return;
    }

    // Fixed-size track centered in the terminal; the simulation's field
    // coordinates are scaled onto it.
    let track = centered(area, TRACK_COLS + 2, TRACK_ROWS + 2);
    frame.render_widget(
        Block::default().borders(Borders::ALL).title(" PIXEL RUNNER "),
        track,
    );
    let inner = Rect::new(track.x + 1, track.y + 1, TRACK_COLS, TRACK_ROWS);

    // Lane dividers
    for divider in 1..LANES {
        let x = inner.x + (divider as u16 * TRACK_COLS) / LANES as u16;
        for row in 0..inner.height {
            frame.render_widget(
                Paragraph::new("·").style(Style::default().fg(Color::DarkGray)),
                Rect::new(x, inner.y + row, 1, 1),
            );
        }
    }

    for entity in game.entities() {
        draw_entity(frame, inner, entity.kind, entity.lane, entity.y);
    }

    // Player, lifted one row while airborne
    let player_col = field_col(inner, lane_center(game.lane()));
    let player_row = if game.airborne() {
        inner.y + inner.height.saturating_sub(4)
    } else {
        inner.y + inner.height.saturating_sub(3)
    };
    frame.render_widget(
        Paragraph::new("♠").style(Style::default().add_modifier(Modifier::BOLD)),
        Rect::new(player_col, player_row, 1, 1),
    );

    // Score + controls around the track
    let header = Rect::new(track.x, track.y.saturating_sub(1), track.width, 1);
    frame.render_widget(
        Paragraph::new(format!("SCORE {}", game.score())).alignment(Alignment::Left),
        header,
    );
    let footer_y = (track.y + track.height).min(area.height.saturating_sub(1));
    frame.render_widget(
        Paragraph::new("A/D move · Space jump · Esc back").alignment(Alignment::Center),
        Rect::new(track.x, footer_y, track.width, 1),
    );

    if game.game_over() {
        draw_game_over(frame, area, game.score());
    }
}

fn draw_entity(frame: &mut Frame, inner: Rect, kind: EntityKind, lane: usize, y: f32) {
    let sprite = match kind {
        EntityKind::Block => "■\n■",
        EntityKind::Train => "■\n■\n■\n■",
        EntityKind::Wall => "■\n■\n■",
        EntityKind::Spike => "▲",
        EntityKind::Barrier => "═══\n═══",
        EntityKind::Coin => "○",
        EntityKind::GoldCoin => "◉",
        EntityKind::Gem => "◆",
    };
    let rows = sprite.lines().count() as u16;
    let cols = sprite.lines().map(|l| l.chars().count()).max().unwrap_or(1) as u16;

    let Some(row) = field_row(inner, y) else { return };
    let col = field_col(inner, lane_center(lane)).saturating_sub(cols / 2);
    let height = rows.min((inner.y + inner.height).saturating_sub(row));
    if height == 0 {
        return;
    }

    let style = if kind.is_obstacle() {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::Yellow)
    };
    frame.render_widget(
        Paragraph::new(sprite).style(style),
        Rect::new(col, row, cols, height),
    );
}

fn field_col(inner: Rect, x: f32) -> u16 {
    let col = (x / FIELD_WIDTH * f32::from(inner.width)) as i32;
    inner.x + col.clamp(0, i32::from(inner.width) - 1) as u16
}

/// Map a field y offset to a terminal row; `None` while still above the
/// visible area.
fn field_row(inner: Rect, y: f32) -> Option<u16> {
    if y < 0.0 {
        return None;
    }
    let row = (y / FIELD_HEIGHT * f32::from(inner.height)) as i32;
    if row >= i32::from(inner.height) {
        return None;
    }
    Some(inner.y + row as u16)
}

fn draw_game_over(frame: &mut Frame, area: Rect, score: u32) {
    let overlay = centered(area, 34, 7);
    frame.render_widget(Clear, overlay);
    frame.render_widget(
        Paragraph::new(format!(
            "GAME OVER\n\nFINAL SCORE: {}\n\n[R] Play again  [B] Menu",
            score
        ))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL)),
        overlay,
    );
}

pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
