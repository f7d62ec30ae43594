use serde::Serialize;

/// Renderable trace descriptor, serialized in the renderer's trace schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Scatter(Scatter2d),
    Scatter3d(Scatter3d),
    Mesh3d(Mesh3d),
}

impl Trace {
    pub fn show_legend(&self) -> bool {
        match self {
            Trace::Scatter(t) => t.showlegend,
            Trace::Scatter3d(t) => t.showlegend,
            Trace::Mesh3d(t) => t.showlegend,
        }
    }

    pub fn point_count(&self) -> usize {
        match self {
            Trace::Scatter(t) => t.x.len(),
            Trace::Scatter3d(t) => t.x.len(),
            Trace::Mesh3d(t) => t.x.len(),
        }
    }
}

/// Marker color: per-point values mapped through a shared color axis, or one fixed color.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkerColor {
    Values(Vec<f64>),
    Fixed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub symbol: String,
    pub size: f64,
    pub opacity: f64,
    pub color: MarkerColor,
    /// Shared color axis the values are mapped through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coloraxis: Option<String>,
}

/// 2D marker scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter2d {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub mode: &'static str,
    pub marker: Marker,
    pub name: String,
    pub legendgroup: String,
    pub showlegend: bool,
    pub hovertemplate: String,
}

/// 3D point cloud.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter3d {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub mode: &'static str,
    pub marker: Marker,
    pub name: String,
    pub legendgroup: String,
    pub showlegend: bool,
}

/// Triangulated surface; `i`, `j`, `k` index the vertex arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mesh3d {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub i: Vec<usize>,
    pub j: Vec<usize>,
    pub k: Vec<usize>,
    pub color: String,
    pub opacity: f64,
    pub name: String,
    pub legendgroup: String,
    pub showlegend: bool,
    pub showscale: bool,
}

impl Mesh3d {
    pub fn triangle_count(&self) -> usize {
        self.i.len()
    }
}
