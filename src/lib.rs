//! Grid snake core: movement queue, collisions, growth, energy, food and
//! obstacles, plus a ratatui presentation shell.

pub mod config;
pub mod energy;
pub mod food;
pub mod game;
pub mod geometry;
pub mod input;
pub mod obstacle;
pub mod presentation;
pub mod renderer;
pub mod score;
pub mod snake;
pub mod spawner;
pub mod terminal_runtime;
pub mod ui;
