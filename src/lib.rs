pub mod game;
pub mod stats;
pub mod storage;
pub mod theme;

pub mod test_helpers;
