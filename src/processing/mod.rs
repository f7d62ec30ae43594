pub mod downsampling;
pub mod statistics;
pub mod triangulation;
