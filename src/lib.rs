pub mod config;
pub mod error;
pub mod food;
pub mod game;
pub mod input;
pub mod log_buffer;
pub mod port;
pub mod renderer;
pub mod snake;
pub mod speed;
pub mod terminal_runtime;
