pub mod compose;
pub mod export;
pub mod trace;
