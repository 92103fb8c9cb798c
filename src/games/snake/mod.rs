pub mod game;
pub mod renderer;

pub use game::SnakeGame;
