use std::path::Path;

use serde_json::{json, Map, Value};

use crate::error::{IvError, Result};
use crate::state::color_axis::ColorAxisId;
use crate::state::figure::{FigureState, Panel, PanelLayout};
use crate::state::theme::Theme;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const HORIZONTAL_SPACING: f64 = 0.08;
const VERTICAL_SPACING: f64 = 0.12;

/// Element id of the figure div in exported documents.
const FIGURE_DIV: &str = "ivplot";

/// Mirrors camera changes between the two scenes once the user lets go.
/// The 60 ms settle delay and the 30 ms guard keep the mirrored relayout
/// from echoing back into the source scene.
const CAMERA_LINK_JS: &str = r#"
  var syncing = false;
  var timer = null;
  gd.on("plotly_relayout", function (e) {
    if (syncing || !e || typeof e !== "object") return;
    var target, cam;
    if (e["scene.camera"]) { target = "scene2.camera"; cam = e["scene.camera"]; }
    else if (e["scene2.camera"]) { target = "scene.camera"; cam = e["scene2.camera"]; }
    else return;
    clearTimeout(timer);
    timer = setTimeout(function () {
      syncing = true;
      var update = {};
      update[target] = cam;
      Plotly.relayout(gd, update).then(
        function () { setTimeout(function () { syncing = false; }, 30); },
        function () { syncing = false; }
      );
    }, 60);
  });
"#;

/// Evenly split `[0, 1]` into `n` cells separated by `spacing`.
fn domains(n: usize, spacing: f64) -> Vec<(f64, f64)> {
    let width = (1.0 - spacing * (n as f64 - 1.0)) / n as f64;
    (0..n)
        .map(|i| {
            let start = i as f64 * (width + spacing);
            (start, (start + width).min(1.0))
        })
        .collect()
}

/// Grid cell of a panel as (row from top, column).
fn cell(layout: PanelLayout, panel: Panel) -> (usize, usize) {
    match (layout, panel) {
        (PanelLayout::ThreeDOnly, Panel::SceneLog) => (0, 0),
        (PanelLayout::ThreeDOnly, _) => (1, 0),
        (PanelLayout::SixPanel, Panel::GateLog) => (0, 0),
        (PanelLayout::SixPanel, Panel::SceneLog) => (0, 1),
        (PanelLayout::SixPanel, Panel::DrainLog) => (0, 2),
        (PanelLayout::SixPanel, Panel::GateLin) => (1, 0),
        (PanelLayout::SixPanel, Panel::SceneLin) => (1, 1),
        (PanelLayout::SixPanel, Panel::DrainLin) => (1, 2),
    }
}

/// Cartesian axis pair number (1-based, in row-major order of the 2D cells)
/// or scene number of a panel.
fn subplot_index(panel: Panel) -> usize {
    match panel {
        Panel::GateLog | Panel::SceneLog => 1,
        Panel::DrainLog | Panel::SceneLin => 2,
        Panel::GateLin => 3,
        Panel::DrainLin => 4,
    }
}

fn numbered(prefix: &str, n: usize) -> String {
    if n == 1 {
        prefix.to_string()
    } else {
        format!("{prefix}{n}")
    }
}

/// Keys binding a trace to its panel.
fn anchor(panel: Panel) -> Vec<(&'static str, String)> {
    let n = subplot_index(panel);
    if panel.is_scene() {
        vec![("scene", numbered("scene", n))]
    } else {
        vec![("xaxis", numbered("x", n)), ("yaxis", numbered("y", n))]
    }
}

fn current_title(panel: Panel) -> &'static str {
    if panel.is_log() {
        "Ids (A, log10)"
    } else {
        "Ids (A)"
    }
}

fn panel_domain(layout: PanelLayout, panel: Panel) -> ((f64, f64), (f64, f64)) {
    let cols = match layout {
        PanelLayout::SixPanel => 3,
        PanelLayout::ThreeDOnly => 1,
    };
    let (row, col) = cell(layout, panel);
    let x = domains(cols, HORIZONTAL_SPACING)[col];
    // Rows are numbered from the top; paper y grows upward.
    let mut rows = domains(2, VERTICAL_SPACING);
    rows.reverse();
    (x, rows[row])
}

fn scene_json(fig: &FigureState, panel: Panel, x: (f64, f64), y: (f64, f64)) -> Value {
    json!({
        "domain": { "x": [x.0, x.1], "y": [y.0, y.1] },
        "xaxis": { "title": { "text": "Vgs (V)" } },
        "yaxis": { "title": { "text": "Vds (V)" } },
        "zaxis": { "title": { "text": current_title(panel) } },
        "aspectmode": "cube",
        "dragmode": "turntable",
        "camera": fig.camera.to_json(),
    })
}

fn color_axis_json(fig: &FigureState, axis: ColorAxisId) -> Value {
    let bar_x = match axis {
        ColorAxisId::DrainOnGate => -0.08,
        ColorAxisId::GateOnDrain => 1.06,
    };
    let mut value = json!({
        "colorscale": fig.colorscale(),
        "colorbar": { "title": { "text": axis.title() }, "x": bar_x, "xanchor": "left" },
    });
    if let (Some((lo, hi)), Some(obj)) = (fig.color_range(axis).bounds(), value.as_object_mut()) {
        obj.insert("cmin".into(), json!(lo));
        obj.insert("cmax".into(), json!(hi));
    }
    value
}

/// Renderer layout object for the figure.
pub fn layout_json(fig: &FigureState, theme: Theme) -> Value {
    let layout = fig.layout();
    let mut obj = Map::new();
    obj.insert("title".into(), json!({ "text": fig.title() }));
    obj.insert("template".into(), json!(theme.plot_template()));
    obj.insert("margin".into(), json!({ "l": 40, "r": 40, "t": 60, "b": 40 }));
    obj.insert(
        "legend".into(),
        json!({ "orientation": "h", "yanchor": "bottom", "y": 1.02, "xanchor": "left", "x": 0.66 }),
    );
    obj.insert("uirevision".into(), json!("keep"));

    let mut annotations = Vec::new();
    for &panel in layout.panels() {
        let (x, y) = panel_domain(layout, panel);
        annotations.push(json!({
            "text": panel.title(layout),
            "x": (x.0 + x.1) / 2.0,
            "y": y.1,
            "xref": "paper",
            "yref": "paper",
            "xanchor": "center",
            "yanchor": "bottom",
            "showarrow": false,
            "font": { "size": 16 },
        }));

        let n = subplot_index(panel);
        if panel.is_scene() {
            obj.insert(numbered("scene", n), scene_json(fig, panel, x, y));
            continue;
        }
        let x_title = match panel.color_axis() {
            Some(ColorAxisId::DrainOnGate) => "Vgs (V)",
            _ => "Vds (V)",
        };
        obj.insert(
            numbered("xaxis", n),
            json!({
                "domain": [x.0, x.1],
                "anchor": numbered("y", n),
                "title": { "text": x_title },
            }),
        );
        obj.insert(
            numbered("yaxis", n),
            json!({
                "domain": [y.0, y.1],
                "anchor": numbered("x", n),
                "title": { "text": current_title(panel) },
            }),
        );
    }
    obj.insert("annotations".into(), Value::Array(annotations));

    if layout.has_2d_panels() {
        for axis in [ColorAxisId::DrainOnGate, ColorAxisId::GateOnDrain] {
            obj.insert(axis.layout_key().into(), color_axis_json(fig, axis));
        }
    }
    Value::Object(obj)
}

/// Renderer figure: `{"data": [...], "layout": {...}}`.
pub fn figure_json(fig: &FigureState, theme: Theme) -> Result<Value> {
    let mut data = Vec::with_capacity(fig.traces().len());
    for placed in fig.traces() {
        let mut trace = serde_json::to_value(&placed.trace)?;
        if let Some(obj) = trace.as_object_mut() {
            for (key, value) in anchor(placed.panel) {
                obj.insert(key.into(), Value::String(value));
            }
        }
        data.push(trace);
    }
    Ok(json!({ "data": data, "layout": layout_json(fig, theme) }))
}

/// Escape text for HTML element content and quoted attributes.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// JSON that is safe to inline inside a `<script>` element.
fn script_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Self-contained HTML document rendering the figure with the CDN renderer.
pub fn to_html(fig: &FigureState, theme: Theme) -> Result<String> {
    let figure = figure_json(fig, theme)?;
    let data = script_json(&figure["data"])?;
    let layout = script_json(&figure["layout"])?;
    let link = if fig.link_cameras {
        CAMERA_LINK_JS
    } else {
        ""
    };
    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{cdn}" charset="utf-8"></script>
<style>
html, body {{ margin: 0; height: 100%; background: {bg}; }}
#{div} {{ width: 100%; height: 100vh; }}
</style>
</head>
<body>
<div id="{div}"></div>
<script>
Plotly.newPlot("{div}", {data}, {layout}, {{"responsive": true}}).then(function (gd) {{{link}}});
</script>
</body>
</html>
"#,
        title = escape_html(fig.title()),
        cdn = PLOTLY_CDN,
        bg = theme.page_bg(),
        div = FIGURE_DIV,
    ))
}

/// Write the figure document to `path`, creating parent directories.
pub fn write_html(fig: &FigureState, path: &Path, theme: Theme) -> Result<()> {
    let html = to_html(fig, theme)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| IvError::io(parent, e))?;
    }
    std::fs::write(path, html).map_err(|e| IvError::io(path, e))?;
    tracing::info!("Wrote figure to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sweep::{Sample, SweepKind, SweepRecord};
    use crate::state::options::{PlotOptions, View};

    fn figure(view: View) -> FigureState {
        let options = PlotOptions {
            view,
            label: Some("A".into()),
            ..Default::default()
        };
        let sweeps = [SweepRecord::new(
            vec![Sample::new(0.0, 0.1, 1e-9), Sample::new(1.0, 0.4, 1e-6)],
            SweepKind::Mixed,
        )];
        let mut fig = FigureState::new(&options);
        fig.overlay(&sweeps, &options).unwrap();
        fig
    }

    #[test]
    fn six_panel_domains() {
        let cols = domains(3, HORIZONTAL_SPACING);
        assert!((cols[0].1 - 0.28).abs() < 1e-9);
        assert!((cols[1].0 - 0.36).abs() < 1e-9);
        assert!((cols[2].1 - 1.0).abs() < 1e-9);
        let (x, y) = panel_domain(PanelLayout::SixPanel, Panel::DrainLin);
        assert!((x.0 - 0.72).abs() < 1e-9);
        assert!((y.1 - 0.44).abs() < 1e-9);
    }

    #[test]
    fn traces_are_anchored_to_their_panels() {
        let fig = figure(View::All);
        let v = figure_json(&fig, Theme::Light).unwrap();
        let data = v["data"].as_array().unwrap();
        assert_eq!(data.len(), 6);
        for (placed, trace) in fig.traces().iter().zip(data) {
            match placed.panel {
                Panel::GateLin => assert_eq!(trace["xaxis"], "x3"),
                Panel::DrainLog => assert_eq!(trace["yaxis"], "y2"),
                Panel::SceneLin => assert_eq!(trace["scene"], "scene2"),
                Panel::SceneLog => assert_eq!(trace["scene"], "scene"),
                _ => {}
            }
        }
    }

    #[test]
    fn color_axes_carry_tracked_bounds() {
        let fig = figure(View::All);
        let layout = layout_json(&fig, Theme::Dark);
        assert_eq!(layout["coloraxis"]["cmin"], 0.1);
        assert_eq!(layout["coloraxis"]["cmax"], 0.4);
        assert_eq!(layout["coloraxis2"]["cmax"], 1.0);
        assert_eq!(layout["coloraxis2"]["colorscale"], "Viridis");
        assert_eq!(layout["template"], "plotly_dark");
        assert_eq!(layout["scene2"]["zaxis"]["title"]["text"], "Ids (A)");
    }

    #[test]
    fn three_d_layout_has_only_scenes() {
        let fig = figure(View::ThreeD);
        let layout = layout_json(&fig, Theme::Light);
        assert!(layout.get("xaxis").is_none());
        assert!(layout.get("coloraxis").is_none());
        assert_eq!(layout["scene"]["domain"]["x"][1], 1.0);
        assert_eq!(layout["annotations"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn html_escapes_title_and_script_json() {
        let mut fig = figure(View::ThreeD);
        fig.set_title("<b>dev</b></script>");
        let html = to_html(&fig, Theme::Light).unwrap();
        assert!(html.contains("<title>&lt;b&gt;dev&lt;/b&gt;&lt;/script&gt;</title>"));
        assert_eq!(html.matches("</script>").count(), 2);
        assert!(html.contains("plotly_relayout"));
        assert!(html.contains(PLOTLY_CDN));
    }

    #[test]
    fn camera_link_can_be_disabled() {
        let mut fig = figure(View::ThreeD);
        fig.link_cameras = false;
        let html = to_html(&fig, Theme::Light).unwrap();
        assert!(!html.contains("plotly_relayout"));
    }

    #[test]
    fn write_html_creates_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("fig.html");
        write_html(&figure(View::All), &path, Theme::Light).unwrap();
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .starts_with("<!DOCTYPE html>"));
    }
}
