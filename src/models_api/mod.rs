pub mod event;
pub mod scoreboard;
