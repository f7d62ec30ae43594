use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IvError;

/// Which panel families a call contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum View {
    #[serde(rename = "gate", alias = "vgs")]
    Gate,
    #[serde(rename = "drain", alias = "vds")]
    Drain,
    #[serde(rename = "3d")]
    ThreeD,
    #[default]
    #[serde(rename = "all")]
    All,
}

impl View {
    pub fn includes_gate(&self) -> bool {
        matches!(self, View::Gate | View::All)
    }

    pub fn includes_drain(&self) -> bool {
        matches!(self, View::Drain | View::All)
    }

    pub fn includes_3d(&self) -> bool {
        matches!(self, View::ThreeD | View::All)
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Gate => "gate",
            View::Drain => "drain",
            View::ThreeD => "3d",
            View::All => "all",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for View {
    type Err = IvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gate" | "vgs" => Ok(View::Gate),
            "drain" | "vds" => Ok(View::Drain),
            "3d" => Ok(View::ThreeD),
            "all" => Ok(View::All),
            _ => Err(IvError::UnknownView(s.to_string())),
        }
    }
}

/// Style and sampling options for one composition call.
///
/// Every field has a default, so a partial JSON document deserializes;
/// unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    pub view: View,
    /// Colormap name, translated for the renderer (`viridis`, `jet`, ...).
    pub colorscale: String,
    /// Marker shorthand or renderer symbol name.
    pub marker: String,
    pub marker_size: f64,
    /// Explicit marker opacity; adaptive to the point count when unset.
    pub opacity: Option<f64>,
    /// Color for unlabelled 3D series.
    pub color: Option<String>,
    pub label: Option<String>,
    /// Cap on samples per pool; pools above it are randomly downsampled.
    pub max_samples: Option<usize>,
    pub seed: u64,
    /// Draw the 3D scenes as triangulated surfaces instead of point clouds.
    pub surface: bool,
    /// Title used when a new figure is created.
    pub title: String,
    /// Mirror camera moves between the two 3D scenes in exported documents.
    pub link_cameras: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            view: View::All,
            colorscale: "viridis".to_string(),
            marker: "circle".to_string(),
            marker_size: 6.0,
            opacity: None,
            color: None,
            label: None,
            max_samples: None,
            seed: 0,
            surface: false,
            title: "Transistor Curves".to_string(),
            link_cameras: true,
        }
    }
}

impl PlotOptions {
    /// Reject options the renderer cannot draw. Style tokens are not checked.
    pub fn validate(&self) -> Result<(), IvError> {
        if !self.marker_size.is_finite() || self.marker_size <= 0.0 {
            return Err(IvError::InvalidOption {
                name: "marker_size",
                reason: format!("must be a positive number, got {}", self.marker_size),
            });
        }
        if let Some(opacity) = self.opacity {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(IvError::InvalidOption {
                    name: "opacity",
                    reason: format!("must lie in [0, 1], got {opacity}"),
                });
            }
        }
        Ok(())
    }

    /// Label if set and non-empty.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref().filter(|l| !l.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_parses_names_and_aliases() {
        assert_eq!("3d".parse::<View>().unwrap(), View::ThreeD);
        assert_eq!("VGS".parse::<View>().unwrap(), View::Gate);
        assert_eq!("drain".parse::<View>().unwrap(), View::Drain);
        assert!(matches!("side".parse::<View>(), Err(IvError::UnknownView(_))));
    }

    #[test]
    fn view_membership() {
        assert!(View::All.includes_gate() && View::All.includes_drain() && View::All.includes_3d());
        assert!(!View::Gate.includes_3d());
        assert!(!View::ThreeD.includes_drain());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let opts: PlotOptions =
            serde_json::from_str(r#"{"view":"vds","surface":true,"unknown_key":1}"#).unwrap();
        assert_eq!(opts.view, View::Drain);
        assert!(opts.surface);
        assert_eq!(opts.marker_size, 6.0);
        assert_eq!(opts.title, "Transistor Curves");
    }

    #[test]
    fn validation() {
        assert!(PlotOptions::default().validate().is_ok());
        let bad = PlotOptions {
            opacity: Some(1.5),
            ..Default::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(IvError::InvalidOption { name: "opacity", .. })
        ));
        let bad = PlotOptions {
            marker_size: f64::NAN,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
