pub mod orb;
pub mod player;
