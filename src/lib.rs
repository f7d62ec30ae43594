pub mod config;
pub mod data;
pub mod error;
pub mod gallery;
pub mod plot3d;
pub mod processing;
pub mod render;
pub mod state;

pub use config::GalleryConfig;
pub use data::sweep::{Sample, SweepKind, SweepRecord};
pub use error::{IvError, Result};
pub use gallery::{build_gallery, Dataset};
pub use render::compose::{compose, overlay};
pub use render::export::{figure_json, to_html, write_html};
pub use state::figure::{FigureState, Panel, PanelLayout};
pub use state::options::{PlotOptions, View};
pub use state::theme::Theme;
