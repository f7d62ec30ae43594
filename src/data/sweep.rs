use serde::{Deserialize, Serialize};

use crate::error::{IvError, Result};

/// One measurement row: gate voltage, drain voltage and drain current.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub vgs: f64,
    pub vds: f64,
    pub ids: f64,
}

impl Sample {
    pub fn new(vgs: f64, vds: f64, ids: f64) -> Self {
        Self { vgs, vds, ids }
    }
}

/// Which voltage a sweep varies. Decides which 2D panel family it feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepKind {
    /// Gate voltage swept at fixed drain voltage.
    #[serde(alias = "g")]
    Gate,
    /// Drain voltage swept at fixed gate voltage.
    #[serde(alias = "d")]
    Drain,
    /// Both vary, e.g. a loaded drain instead of a fixed drain voltage.
    #[default]
    #[serde(alias = "both")]
    Mixed,
}

impl SweepKind {
    /// Lenient tag parsing used by the file loaders; anything unrecognised is `Mixed`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "g" | "gate" | "vgs" => SweepKind::Gate,
            "d" | "drain" | "vds" => SweepKind::Drain,
            _ => SweepKind::Mixed,
        }
    }

    pub fn feeds_gate_panels(&self) -> bool {
        matches!(self, SweepKind::Gate | SweepKind::Mixed)
    }

    pub fn feeds_drain_panels(&self) -> bool {
        matches!(self, SweepKind::Drain | SweepKind::Mixed)
    }
}

/// One logical measurement set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepRecord {
    pub data: Vec<Sample>,
    #[serde(default, alias = "type")]
    pub kind: SweepKind,
}

impl SweepRecord {
    pub fn new(data: Vec<Sample>, kind: SweepKind) -> Self {
        Self { data, kind }
    }

    /// Build a record from named numeric columns.
    ///
    /// Column names are matched exactly (`vgs`, `vds`, `ids`); extra columns
    /// are ignored. The first missing field is reported by name.
    pub fn from_columns(columns: &[(&str, &[f64])], kind: SweepKind) -> Result<Self> {
        let find = |field: &'static str| {
            columns
                .iter()
                .find(|(name, _)| *name == field)
                .map(|(_, values)| *values)
                .ok_or(IvError::MissingField(field))
        };
        let vgs = find("vgs")?;
        let vds = find("vds")?;
        let ids = find("ids")?;

        let expected = vgs.len();
        for (field, values) in [("vds", vds), ("ids", ids)] {
            if values.len() != expected {
                return Err(IvError::ColumnLength {
                    field,
                    expected,
                    found: values.len(),
                });
            }
        }

        let data = vgs
            .iter()
            .zip(vds)
            .zip(ids)
            .map(|((&vgs, &vds), &ids)| Sample { vgs, vds, ids })
            .collect();
        Ok(Self { data, kind })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
