pub mod player;
pub mod snapshot;
