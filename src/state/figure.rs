use crate::data::sweep::SweepRecord;
use crate::error::Result;
use crate::plot3d::camera::OrbitalCamera;
use crate::render::compose;
use crate::render::trace::Trace;
use crate::state::color_axis::{ColorAxisId, ColorAxisRange};
use crate::state::options::{PlotOptions, View};
use crate::state::style::{colorscale_name, LabelColors};

/// Panel arrangement, fixed when the figure is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelLayout {
    /// 2x3 grid: gate panels left, 3D scenes middle, drain panels right.
    SixPanel,
    /// Two stacked 3D scenes.
    ThreeDOnly,
}

impl PanelLayout {
    pub fn for_view(view: View) -> Self {
        match view {
            View::ThreeD => PanelLayout::ThreeDOnly,
            _ => PanelLayout::SixPanel,
        }
    }

    pub fn has_2d_panels(&self) -> bool {
        matches!(self, PanelLayout::SixPanel)
    }

    pub fn panels(&self) -> &'static [Panel] {
        match self {
            PanelLayout::SixPanel => &[
                Panel::GateLog,
                Panel::SceneLog,
                Panel::DrainLog,
                Panel::GateLin,
                Panel::SceneLin,
                Panel::DrainLin,
            ],
            PanelLayout::ThreeDOnly => &[Panel::SceneLog, Panel::SceneLin],
        }
    }
}

/// A named panel. The upper row holds log10 currents, the lower row linear ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    GateLog,
    GateLin,
    SceneLog,
    SceneLin,
    DrainLog,
    DrainLin,
}

impl Panel {
    pub fn is_scene(&self) -> bool {
        matches!(self, Panel::SceneLog | Panel::SceneLin)
    }

    pub fn is_log(&self) -> bool {
        matches!(self, Panel::GateLog | Panel::SceneLog | Panel::DrainLog)
    }

    /// Color axis the panel's traces bind to, for 2D panels.
    pub fn color_axis(&self) -> Option<ColorAxisId> {
        match self {
            Panel::GateLog | Panel::GateLin => Some(ColorAxisId::DrainOnGate),
            Panel::DrainLog | Panel::DrainLin => Some(ColorAxisId::GateOnDrain),
            Panel::SceneLog | Panel::SceneLin => None,
        }
    }

    pub fn title(&self, layout: PanelLayout) -> &'static str {
        match (self, layout) {
            (Panel::GateLog, _) => "Ids vs Vgs [log]",
            (Panel::GateLin, _) => "Ids vs Vgs [lin]",
            (Panel::DrainLog, _) => "Ids vs Vds [log]",
            (Panel::DrainLin, _) => "Ids vs Vds [lin]",
            (Panel::SceneLog, PanelLayout::SixPanel) => "3D: Ids(Vgs,Vds) [log]",
            (Panel::SceneLin, PanelLayout::SixPanel) => "3D: Ids(Vgs,Vds) [lin]",
            (Panel::SceneLog, PanelLayout::ThreeDOnly) => "Ids(Vgs,Vds) [log]",
            (Panel::SceneLin, PanelLayout::ThreeDOnly) => "Ids(Vgs,Vds) [lin]",
        }
    }
}

/// A trace and the panel it was placed in.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTrace {
    pub panel: Panel,
    pub trace: Trace,
}

/// Figure state threaded through repeated composition calls.
///
/// Holds the layout, the two shared color-axis ranges, the label color table
/// and every trace placed so far. Ranges only widen and label colors never
/// change for the lifetime of the state.
#[derive(Debug, Clone)]
pub struct FigureState {
    layout: PanelLayout,
    pub(crate) title: String,
    colorscale: String,
    pub(crate) drain_on_gate: ColorAxisRange,
    pub(crate) gate_on_drain: ColorAxisRange,
    pub(crate) label_colors: LabelColors,
    pub(crate) traces: Vec<PlacedTrace>,
    pub camera: OrbitalCamera,
    pub link_cameras: bool,
}

impl FigureState {
    /// Empty figure laid out for `options.view`, titled `options.title`.
    pub fn new(options: &PlotOptions) -> Self {
        Self {
            layout: PanelLayout::for_view(options.view),
            title: options.title.clone(),
            colorscale: colorscale_name(&options.colorscale).to_string(),
            drain_on_gate: ColorAxisRange::default(),
            gate_on_drain: ColorAxisRange::default(),
            label_colors: LabelColors::default(),
            traces: Vec::new(),
            camera: OrbitalCamera::default(),
            link_cameras: options.link_cameras,
        }
    }

    /// Overlay `sweeps` onto this figure. On error nothing is committed.
    pub fn overlay(&mut self, sweeps: &[SweepRecord], options: &PlotOptions) -> Result<()> {
        compose::overlay(self, sweeps, options)
    }

    pub fn layout(&self) -> PanelLayout {
        self.layout
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Renderer color-scale name shared by both color axes.
    pub fn colorscale(&self) -> &str {
        &self.colorscale
    }

    pub fn color_range(&self, axis: ColorAxisId) -> ColorAxisRange {
        match axis {
            ColorAxisId::DrainOnGate => self.drain_on_gate,
            ColorAxisId::GateOnDrain => self.gate_on_drain,
        }
    }

    pub fn label_colors(&self) -> &LabelColors {
        &self.label_colors
    }

    pub fn traces(&self) -> &[PlacedTrace] {
        &self.traces
    }

    pub fn traces_in(&self, panel: Panel) -> impl Iterator<Item = &Trace> {
        self.traces
            .iter()
            .filter(move |p| p.panel == panel)
            .map(|p| &p.trace)
    }
}
