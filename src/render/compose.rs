use crate::data::sweep::{Sample, SweepKind, SweepRecord};
use crate::error::Result;
use crate::processing::downsampling::{apply_mask, downsample, log_mask, LOG_EPSILON};
use crate::processing::triangulation::delaunay;
use crate::render::trace::{Marker, MarkerColor, Mesh3d, Scatter2d, Scatter3d, Trace};
use crate::state::color_axis::{ColorAxisId, ColorAxisRange};
use crate::state::figure::{FigureState, Panel, PlacedTrace};
use crate::state::options::PlotOptions;
use crate::state::style::{
    adaptive_alpha, marker_scale_3d, marker_symbol, LabelColors, DEFAULT_SERIES_NAME,
};

const DEFAULT_TITLE: &str = "Transistor Curves";

/// Compose into the figure held by `slot`, creating it on the first call.
///
/// An existing figure is reused as-is (layout and title are not rebuilt).
/// If the call fails, an existing figure is left unchanged and an empty slot
/// stays empty.
pub fn compose<'a>(
    slot: &'a mut Option<FigureState>,
    sweeps: &[SweepRecord],
    options: &PlotOptions,
) -> Result<&'a mut FigureState> {
    let existing = slot.is_some();
    let mut state = slot
        .take()
        .unwrap_or_else(|| FigureState::new(options));
    match overlay(&mut state, sweeps, options) {
        Ok(()) => Ok(slot.insert(state)),
        Err(err) => {
            if existing {
                *slot = Some(state);
            }
            Err(err)
        }
    }
}

/// Overlay `sweeps` onto `state`. Nothing is committed unless every pool succeeds.
pub fn overlay(state: &mut FigureState, sweeps: &[SweepRecord], options: &PlotOptions) -> Result<()> {
    options.validate()?;

    let mut staged = Staged::from_state(state);
    let has_2d = state.layout().has_2d_panels();

    for family in [Family::Gate, Family::Drain] {
        if !family.requested(options) {
            continue;
        }
        if !has_2d {
            tracing::warn!(
                "figure has no 2D panels; skipping {} panels",
                family.name()
            );
            continue;
        }
        stage_2d(&mut staged, family, sweeps, options);
    }

    if options.view.includes_3d() {
        stage_3d(&mut staged, sweeps, options)?;
        if let Some(label) = options.label() {
            if state.title().contains(DEFAULT_TITLE) {
                staged.title = Some(format!("{DEFAULT_TITLE} — last added: {label}"));
            }
        }
    }

    let added = staged.traces.len();
    staged.commit(state);
    tracing::debug!(
        "overlay view={} added {added} traces ({} total)",
        options.view,
        state.traces().len()
    );
    Ok(())
}

/// Changes produced by one call, applied atomically by [`Staged::commit`].
struct Staged {
    drain_on_gate: ColorAxisRange,
    gate_on_drain: ColorAxisRange,
    label_colors: LabelColors,
    traces: Vec<PlacedTrace>,
    title: Option<String>,
}

impl Staged {
    fn from_state(state: &FigureState) -> Self {
        Self {
            drain_on_gate: state.drain_on_gate,
            gate_on_drain: state.gate_on_drain,
            label_colors: state.label_colors.clone(),
            traces: Vec::new(),
            title: None,
        }
    }

    fn range_mut(&mut self, axis: ColorAxisId) -> &mut ColorAxisRange {
        match axis {
            ColorAxisId::DrainOnGate => &mut self.drain_on_gate,
            ColorAxisId::GateOnDrain => &mut self.gate_on_drain,
        }
    }

    fn place(&mut self, panel: Panel, trace: Trace) {
        self.traces.push(PlacedTrace { panel, trace });
    }

    fn commit(self, state: &mut FigureState) {
        state.drain_on_gate = self.drain_on_gate;
        state.gate_on_drain = self.gate_on_drain;
        state.label_colors = self.label_colors;
        state.traces.extend(self.traces);
        if let Some(title) = self.title {
            state.title = title;
        }
    }
}

/// The two 2D panel families. Each plots current against its own voltage
/// and colors points by the other one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Gate,
    Drain,
}

impl Family {
    fn name(&self) -> &'static str {
        match self {
            Family::Gate => "gate",
            Family::Drain => "drain",
        }
    }

    fn requested(&self, options: &PlotOptions) -> bool {
        match self {
            Family::Gate => options.view.includes_gate(),
            Family::Drain => options.view.includes_drain(),
        }
    }

    fn accepts(&self, kind: SweepKind) -> bool {
        match self {
            Family::Gate => kind.feeds_gate_panels(),
            Family::Drain => kind.feeds_drain_panels(),
        }
    }

    fn panels(&self) -> (Panel, Panel) {
        match self {
            Family::Gate => (Panel::GateLog, Panel::GateLin),
            Family::Drain => (Panel::DrainLog, Panel::DrainLin),
        }
    }

    fn color_axis(&self) -> ColorAxisId {
        match self {
            Family::Gate => ColorAxisId::DrainOnGate,
            Family::Drain => ColorAxisId::GateOnDrain,
        }
    }

    fn x(&self, s: &Sample) -> f64 {
        match self {
            Family::Gate => s.vgs,
            Family::Drain => s.vds,
        }
    }

    fn color(&self, s: &Sample) -> f64 {
        match self {
            Family::Gate => s.vds,
            Family::Drain => s.vgs,
        }
    }

    fn hovertemplate(&self, log: bool, label: &str) -> String {
        let (x, c) = match self {
            Family::Gate => ("Vgs", "Vds"),
            Family::Drain => ("Vds", "Vgs"),
        };
        let y = if log {
            "log10(Ids)=%{y:.3g}"
        } else {
            "Ids=%{y:.3e} A"
        };
        format!("{x}=%{{x:.3g}} V<br>{y}<br>{c}=%{{marker.color:.3g}} V<extra>{label}</extra>")
    }
}

/// Concatenate the samples of every accepted record: record order, then sample order.
fn pool(sweeps: &[SweepRecord], accept: impl Fn(SweepKind) -> bool) -> Vec<Sample> {
    sweeps
        .iter()
        .filter(|r| accept(r.kind))
        .flat_map(|r| r.data.iter().copied())
        .collect()
}

/// Downsampled pool with its currents split into the log and linear views.
struct Prepared {
    samples: Vec<Sample>,
    ids: Vec<f64>,
    mask: Vec<bool>,
    ids_log: Vec<f64>,
    opacity: f64,
}

impl Prepared {
    fn new(pool: &[Sample], options: &PlotOptions) -> Self {
        let samples = downsample(pool, options.max_samples, options.seed).into_owned();
        let ids: Vec<f64> = samples.iter().map(|s| s.ids).collect();
        let (mask, ids_log) = log_mask(&ids, LOG_EPSILON);
        let opacity = options
            .opacity
            .unwrap_or_else(|| adaptive_alpha(samples.len()));
        Self {
            samples,
            ids,
            mask,
            ids_log,
            opacity,
        }
    }

    fn column(&self, f: impl Fn(&Sample) -> f64) -> Vec<f64> {
        self.samples.iter().map(f).collect()
    }

    fn any_positive(&self) -> bool {
        self.mask.iter().any(|&m| m)
    }
}

fn stage_2d(staged: &mut Staged, family: Family, sweeps: &[SweepRecord], options: &PlotOptions) {
    let samples = pool(sweeps, |k| family.accepts(k));
    if samples.is_empty() {
        tracing::debug!("{} pool is empty; skipping", family.name());
        return;
    }
    let prep = Prepared::new(&samples, options);
    let xs = prep.column(|s| family.x(s));
    let colors = prep.column(|s| family.color(s));
    let axis = family.color_axis();

    // Bounds are widened with the full pool before any trace is placed.
    staged.range_mut(axis).update(&colors);

    let (log_panel, lin_panel) = family.panels();
    let name = options.label().unwrap_or(DEFAULT_SERIES_NAME);
    let hover_label = options.label().unwrap_or("");
    let scatter = |x: Vec<f64>, y: Vec<f64>, c: Vec<f64>, log: bool| {
        Trace::Scatter(Scatter2d {
            x,
            y,
            mode: "markers",
            marker: Marker {
                symbol: marker_symbol(&options.marker).to_string(),
                size: options.marker_size,
                opacity: prep.opacity,
                color: MarkerColor::Values(c),
                coloraxis: Some(axis.layout_key().to_string()),
            },
            name: name.to_string(),
            legendgroup: name.to_string(),
            showlegend: false,
            hovertemplate: family.hovertemplate(log, hover_label),
        })
    };

    if prep.any_positive() {
        let trace = scatter(
            apply_mask(&xs, &prep.mask),
            prep.ids_log.clone(),
            apply_mask(&colors, &prep.mask),
            true,
        );
        staged.place(log_panel, trace);
    }
    let trace = scatter(xs, prep.ids.clone(), colors, false);
    staged.place(lin_panel, trace);
}

fn stage_3d(staged: &mut Staged, sweeps: &[SweepRecord], options: &PlotOptions) -> Result<()> {
    let samples = pool(sweeps, |_| true);
    if samples.is_empty() {
        tracing::debug!("3d pool is empty; skipping");
        return Ok(());
    }
    let prep = Prepared::new(&samples, options);
    let color = staged
        .label_colors
        .resolve(options.label(), options.color.as_deref());
    let vgs = prep.column(|s| s.vgs);
    let vds = prep.column(|s| s.vds);

    let mut scenes = Vec::with_capacity(2);
    if prep.any_positive() {
        scenes.push((
            Panel::SceneLog,
            apply_mask(&vgs, &prep.mask),
            apply_mask(&vds, &prep.mask),
            prep.ids_log.clone(),
        ));
    }
    scenes.push((Panel::SceneLin, vgs, vds, prep.ids.clone()));

    for (panel, x, y, z) in scenes {
        let trace = scene_trace(panel, x, y, z, &color, prep.opacity, options)?;
        staged.place(panel, trace);
    }
    Ok(())
}

fn scene_trace(
    panel: Panel,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    color: &str,
    opacity: f64,
    options: &PlotOptions,
) -> Result<Trace> {
    let label = options.label();
    let name = label.unwrap_or(DEFAULT_SERIES_NAME).to_string();
    // One legend row per label: only the upper scene shows it.
    let showlegend = label.is_some() && panel == Panel::SceneLog;

    if options.surface && z.len() >= 3 {
        let triangles = delaunay(&x, &y)?;
        let (i, (j, k)): (Vec<usize>, (Vec<usize>, Vec<usize>)) = triangles
            .iter()
            .map(|t| (t[0], (t[1], t[2])))
            .unzip();
        return Ok(Trace::Mesh3d(Mesh3d {
            x,
            y,
            z,
            i,
            j,
            k,
            color: color.to_string(),
            opacity,
            name: name.clone(),
            legendgroup: name,
            showlegend,
            showscale: false,
        }));
    }
    if options.surface {
        tracing::debug!(
            "{} points are too few for a surface; drawing points",
            z.len()
        );
    }

    let symbol = marker_symbol(&options.marker);
    Ok(Trace::Scatter3d(Scatter3d {
        x,
        y,
        z,
        mode: "markers",
        marker: Marker {
            symbol: symbol.to_string(),
            size: options.marker_size * marker_scale_3d(symbol),
            opacity,
            color: MarkerColor::Fixed(color.to_string()),
            coloraxis: None,
        },
        name: name.clone(),
        legendgroup: name,
        showlegend,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::figure::PanelLayout;
    use crate::state::options::View;

    fn record(kind: SweepKind, rows: &[(f64, f64, f64)]) -> SweepRecord {
        SweepRecord::new(
            rows.iter().map(|&(g, d, i)| Sample::new(g, d, i)).collect(),
            kind,
        )
    }

    fn opts(view: View) -> PlotOptions {
        PlotOptions {
            view,
            ..Default::default()
        }
    }

    #[test]
    fn compose_creates_then_reuses() {
        let sweeps = [record(SweepKind::Mixed, &[(0.0, 0.1, 1e-9), (1.0, 0.2, 1e-6)])];
        let mut slot = None;
        compose(&mut slot, &sweeps, &opts(View::ThreeD)).unwrap();
        let first = slot.as_ref().unwrap().traces().len();
        // A later call with another view keeps the original layout.
        compose(&mut slot, &sweeps, &opts(View::All)).unwrap();
        let fig = slot.unwrap();
        assert_eq!(fig.layout(), PanelLayout::ThreeDOnly);
        assert_eq!(fig.traces().len(), first * 2);
        assert_eq!(fig.traces_in(Panel::GateLin).count(), 0);
    }

    #[test]
    fn two_d_pool_places_log_and_linear() {
        let sweeps = [record(
            SweepKind::Gate,
            &[(0.0, 0.5, -1e-12), (0.5, 0.5, 1e-9), (1.0, 0.5, 1e-6)],
        )];
        let mut fig = FigureState::new(&opts(View::Gate));
        fig.overlay(&sweeps, &opts(View::Gate)).unwrap();
        let log: Vec<_> = fig.traces_in(Panel::GateLog).collect();
        let lin: Vec<_> = fig.traces_in(Panel::GateLin).collect();
        assert_eq!(log.len(), 1);
        assert_eq!(lin.len(), 1);
        assert_eq!(log[0].point_count(), 2);
        assert_eq!(lin[0].point_count(), 3);
        assert!(!log[0].show_legend());
        match lin[0] {
            Trace::Scatter(s) => {
                assert_eq!(s.marker.coloraxis.as_deref(), Some("coloraxis"));
                assert_eq!(s.marker.opacity, 0.8);
            }
            other => panic!("unexpected trace {other:?}"),
        }
    }

    #[test]
    fn all_negative_currents_skip_log_panels() {
        let sweeps = [record(SweepKind::Mixed, &[(0.0, 0.1, -1e-9), (1.0, 0.2, 0.0)])];
        let mut fig = FigureState::new(&PlotOptions::default());
        fig.overlay(&sweeps, &PlotOptions::default()).unwrap();
        assert_eq!(fig.traces_in(Panel::GateLog).count(), 0);
        assert_eq!(fig.traces_in(Panel::SceneLog).count(), 0);
        assert_eq!(fig.traces_in(Panel::SceneLin).count(), 1);
    }

    #[test]
    fn explicit_opacity_wins() {
        let sweeps = [record(SweepKind::Mixed, &[(0.0, 0.1, 1e-9)])];
        let options = PlotOptions {
            opacity: Some(0.33),
            marker: "+".into(),
            ..opts(View::ThreeD)
        };
        let mut fig = FigureState::new(&options);
        fig.overlay(&sweeps, &options).unwrap();
        let trace = fig.traces_in(Panel::SceneLin).next();
        match trace {
            Some(Trace::Scatter3d(t)) => {
                assert_eq!(t.marker.opacity, 0.33);
                assert_eq!(t.marker.symbol, "cross");
                assert!((t.marker.size - 6.0 * 0.3).abs() < 1e-12);
            }
            other => panic!("unexpected trace {other:?}"),
        }
    }

    #[test]
    fn surface_builds_mesh() {
        let sweeps = [record(
            SweepKind::Mixed,
            &[
                (0.0, 0.0, 1e-9),
                (1.0, 0.0, 1e-8),
                (0.0, 1.0, 1e-7),
                (1.0, 1.0, 1e-6),
            ],
        )];
        let options = PlotOptions {
            surface: true,
            ..opts(View::ThreeD)
        };
        let mut fig = FigureState::new(&options);
        fig.overlay(&sweeps, &options).unwrap();
        let trace = fig.traces_in(Panel::SceneLog).next();
        match trace {
            Some(Trace::Mesh3d(m)) => assert_eq!(m.triangle_count(), 2),
            other => panic!("unexpected trace {other:?}"),
        }
    }

    #[test]
    fn title_tracks_last_label() {
        let sweeps = [record(SweepKind::Mixed, &[(0.0, 0.1, 1e-9)])];
        let options = PlotOptions {
            label: Some("W10L1".into()),
            ..Default::default()
        };
        let mut fig = FigureState::new(&options);
        fig.overlay(&sweeps, &options).unwrap();
        assert_eq!(fig.title(), "Transistor Curves — last added: W10L1");

        let mut named = FigureState::new(&PlotOptions {
            title: "die 4".into(),
            ..Default::default()
        });
        named.overlay(&sweeps, &options).unwrap();
        assert_eq!(named.title(), "die 4");
    }

    #[test]
    fn invalid_options_fail_before_any_change() {
        let sweeps = [record(SweepKind::Mixed, &[(0.0, 0.1, 1e-9)])];
        let mut fig = FigureState::new(&PlotOptions::default());
        let bad = PlotOptions {
            marker_size: -1.0,
            ..Default::default()
        };
        assert!(fig.overlay(&sweeps, &bad).is_err());
        assert!(fig.traces().is_empty());
    }
}
