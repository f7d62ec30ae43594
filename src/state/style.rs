/// Named colors handed out to labelled series, in assignment order.
pub const LABEL_PALETTE: [&str; 9] = [
    "crimson",
    "royalblue",
    "darkorange",
    "seagreen",
    "purple",
    "deeppink",
    "dodgerblue",
    "chocolate",
    "limegreen",
];

/// Color used for unlabelled series without an explicit color.
pub const DEFAULT_SERIES_COLOR: &str = "gray";

/// Legend name for unlabelled series.
pub const DEFAULT_SERIES_NAME: &str = "dataset";

pub fn color_for_index(index: usize) -> &'static str {
    LABEL_PALETTE[index % LABEL_PALETTE.len()]
}

/// Marker opacity from the number of plotted points.
///
/// Sparse sets stay opaque (0.8 up to 100 points), dense ones fade to 0.1
/// at 1000 points and beyond, linear in between.
pub fn adaptive_alpha(n: usize) -> f64 {
    let n = n.max(1);
    if n <= 100 {
        0.8
    } else if n >= 1000 {
        0.1
    } else {
        0.8 - (n - 100) as f64 * (0.7 / 900.0)
    }
}

/// Translate a marker shorthand (`o`, `+`, `^`, ...) to the renderer's symbol name.
/// Unknown tokens pass through unchanged.
pub fn marker_symbol(token: &str) -> &str {
    match token {
        "" | "o" | "." | "," => "circle",
        "x" => "x",
        "+" => "cross",
        "s" => "square",
        "D" | "d" => "diamond",
        "^" => "triangle-up",
        "v" => "triangle-down",
        "<" => "triangle-left",
        ">" => "triangle-right",
        "p" => "pentagon",
        "*" => "star",
        other => other,
    }
}

/// Whether the 3D renderer draws this symbol oversized.
pub fn is_cross_like(symbol: &str) -> bool {
    matches!(symbol, "x" | "cross")
}

/// Marker size scale applied in 3D scenes.
pub fn marker_scale_3d(symbol: &str) -> f64 {
    if is_cross_like(symbol) {
        0.3
    } else {
        1.0
    }
}

/// Translate a colormap name to the renderer's color-scale name.
/// Empty means Viridis; unknown names pass through unchanged.
pub fn colorscale_name(name: &str) -> &str {
    if name.trim().is_empty() {
        return "Viridis";
    }
    match name.to_lowercase().as_str() {
        "viridis" => "Viridis",
        "plasma" => "Plasma",
        "cividis" => "Cividis",
        "magma" => "Magma",
        "inferno" => "Inferno",
        "turbo" => "Turbo",
        "hot" => "Hot",
        "jet" => "Jet",
        _ => name,
    }
}

/// Insertion-ordered label to color table.
///
/// A label keeps the first color it was given for the lifetime of the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelColors {
    entries: Vec<(String, String)>,
}

impl LabelColors {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| c.as_str())
    }

    /// Color for a series. Unlabelled series get `explicit` or gray;
    /// labelled ones get their stored color, assigning the next palette
    /// entry on first sight.
    pub fn resolve(&mut self, label: Option<&str>, explicit: Option<&str>) -> String {
        let label = match label.filter(|l| !l.is_empty()) {
            Some(label) => label,
            None => return explicit.unwrap_or(DEFAULT_SERIES_COLOR).to_string(),
        };
        if let Some(color) = self.get(label) {
            return color.to_string();
        }
        let color = color_for_index(self.entries.len()).to_string();
        self.entries.push((label.to_string(), color.clone()));
        color
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
