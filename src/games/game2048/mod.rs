pub mod game;
pub mod renderer;

pub use game::Game2048;
