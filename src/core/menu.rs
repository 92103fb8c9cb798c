use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::core::game::GameKind;
use crate::core::store::Scoreboard;

pub enum MenuResult {
    Play(GameKind),
    Quit,
}

/// The launcher screen: a list of the registered games with their stored
/// best scores. Owns only the selection cursor; game metadata comes from
/// the [`GameKind`] table.
pub struct MenuManager {
    pub selected: usize,
}

impl MenuManager {
    pub fn new() -> Self {
        Self { selected: 0 }
    }

    pub fn run(
        &mut self,
        terminal: &mut ratatui::DefaultTerminal,
        scores: &Scoreboard,
    ) -> Result<MenuResult> {
        loop {
            terminal.draw(|f| self.render(f, scores))?;

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match key.code {
                        KeyCode::Up | KeyCode::Char('k') => {
                            self.selected = self.selected.saturating_sub(1);
                        }
                        KeyCode::Down | KeyCode::Char('j') => {
                            self.selected = (self.selected + 1).min(GameKind::ALL.len() - 1);
                        }
                        KeyCode::Enter => {
                            return Ok(MenuResult::Play(GameKind::ALL[self.selected]));
                        }
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(MenuResult::Quit),
                        _ => {}
                    }
                }
            }
        }
    }

    fn render(&self, f: &mut Frame, scores: &Scoreboard) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(f.area());

        f.render_widget(
            Paragraph::new(" T E R M C A D E \nTake a break while your code compiles!")
                .block(Block::default().borders(Borders::ALL))
                .alignment(ratatui::layout::Alignment::Center),
            chunks[0],
        );

        let items: Vec<ListItem> = GameKind::ALL
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                let style = if i == self.selected {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(format!(
                    " » {} {} : {}  [best {}]",
                    kind.icon(),
                    kind.name(),
                    kind.description(),
                    scores.best(*kind),
                ))
                .style(style)
            })
            .collect();

        f.render_widget(
            List::new(items).block(Block::default().title(" GAMES ").borders(Borders::ALL)),
            chunks[1],
        );

        f.render_widget(
            Paragraph::new("[↑/↓] Navigate  [Enter] Play  [Q] Quit")
                .alignment(ratatui::layout::Alignment::Center),
            chunks[2],
        );
    }
}

impl Default for MenuManager {
    fn default() -> Self {
        Self::new()
    }
}
