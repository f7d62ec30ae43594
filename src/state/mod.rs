pub mod color_axis;
pub mod figure;
pub mod options;
pub mod style;
pub mod theme;
