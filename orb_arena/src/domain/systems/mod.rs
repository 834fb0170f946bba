pub mod player;
pub mod visibility;
