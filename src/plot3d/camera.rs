use glam::DVec3;
use serde_json::{json, Value};

/// Orbital camera for a 3D scene, with Z as the up axis.
///
/// The eye position is derived from spherical coordinates (azimuth,
/// elevation, distance) around the scene center, in the renderer's
/// normalised scene units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalCamera {
    /// Angle in the XY plane from +X, radians.
    pub azimuth: f64,
    /// Angle above the XY plane, radians, clamped to (-PI/2 + 0.01, PI/2 - 0.01).
    pub elevation: f64,
    /// Distance from the scene center.
    pub distance: f64,
}

const ELEVATION_LIMIT: f64 = std::f64::consts::FRAC_PI_2 - 0.01;
const DISTANCE_MIN: f64 = 0.1;
const DISTANCE_MAX: f64 = 50.0;

impl Default for OrbitalCamera {
    /// Starts looking from (1.6, 1.6, 1.0).
    fn default() -> Self {
        Self::from_eye(DVec3::new(1.6, 1.6, 1.0))
    }
}

impl OrbitalCamera {
    pub fn new(azimuth: f64, elevation: f64, distance: f64) -> Self {
        Self {
            azimuth,
            elevation: elevation.clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT),
            distance: distance.clamp(DISTANCE_MIN, DISTANCE_MAX),
        }
    }

    pub fn from_eye(eye: DVec3) -> Self {
        let distance = eye.length();
        let elevation = (eye.z / distance).asin();
        let azimuth = eye.y.atan2(eye.x);
        Self::new(azimuth, elevation, distance)
    }

    pub fn eye(&self) -> DVec3 {
        let (sin_el, cos_el) = self.elevation.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        DVec3::new(cos_el * cos_az, cos_el * sin_az, sin_el) * self.distance
    }

    pub fn up(&self) -> DVec3 {
        DVec3::Z
    }

    /// Renderer camera object (`{"up": {...}, "eye": {...}}`).
    pub fn to_json(&self) -> Value {
        json!({
            "up": vec3_json(self.up()),
            "eye": vec3_json(self.eye()),
        })
    }
}

fn vec3_json(v: DVec3) -> Value {
    json!({ "x": v.x, "y": v.y, "z": v.z })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_eye_round_trips() {
        let eye = OrbitalCamera::default().eye();
        assert!((eye - DVec3::new(1.6, 1.6, 1.0)).length() < 1e-9);
    }

    #[test]
    fn clamps_elevation_and_distance() {
        let cam = OrbitalCamera::new(0.0, 10.0, 1000.0);
        assert!(cam.elevation < std::f64::consts::FRAC_PI_2);
        assert_eq!(cam.distance, DISTANCE_MAX);
    }

    #[test]
    fn json_is_z_up() {
        let v = OrbitalCamera::default().to_json();
        assert_eq!(v["up"]["z"], 1.0);
        assert_eq!(v["up"]["x"], 0.0);
    }
}
