pub mod config;
pub mod events;
pub mod game;
pub mod gesture;
pub mod sys;
