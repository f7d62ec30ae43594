use std::collections::HashSet;

use glam::DVec2;

use crate::error::{IvError, Result};

#[derive(Debug, Clone, Copy)]
struct Triangle {
    v: [usize; 3],
    center: DVec2,
    radius_sq: f64,
}

impl Triangle {
    fn new(v: [usize; 3], pts: &[DVec2]) -> Self {
        let (a, b, c) = (pts[v[0]], pts[v[1]], pts[v[2]]);
        let d = 2.0 * (b - a).perp_dot(c - a);
        if d.abs() < 1e-18 {
            // Degenerate: any later point evicts it.
            return Self {
                v,
                center: a,
                radius_sq: f64::INFINITY,
            };
        }
        let ab = b - a;
        let ac = c - a;
        let ux = (ac.y * ab.length_squared() - ab.y * ac.length_squared()) / d;
        let uy = (ab.x * ac.length_squared() - ac.x * ab.length_squared()) / d;
        let offset = DVec2::new(ux, uy);
        Self {
            v,
            center: a + offset,
            radius_sq: offset.length_squared(),
        }
    }

    fn circumcircle_contains(&self, p: DVec2) -> bool {
        p.distance_squared(self.center) < self.radius_sq
    }

    fn has_edge(&self, a: usize, b: usize) -> bool {
        let has = |x| self.v.contains(&x);
        has(a) && has(b)
    }
}

/// Delaunay triangulation of the planar points `(xs[i], ys[i])` (Bowyer–Watson).
///
/// Returned triangles index into the input slices. Non-finite points and
/// exact duplicates are left out of the mesh. Coordinates are normalised
/// to the unit square first so voltage axes of different scale triangulate
/// the same way. Fails when fewer than three distinct points remain or all of
/// them are collinear.
pub fn delaunay(xs: &[f64], ys: &[f64]) -> Result<Vec<[usize; 3]>> {
    let n = xs.len().min(ys.len());

    let mut seen = HashSet::new();
    let usable: Vec<usize> = (0..n)
        .filter(|&i| xs[i].is_finite() && ys[i].is_finite())
        .filter(|&i| seen.insert((xs[i].to_bits(), ys[i].to_bits())))
        .collect();
    if usable.len() < 3 {
        return Err(IvError::Triangulation {
            points: n,
            reason: "fewer than three distinct finite points",
        });
    }

    let (mut min, mut max) = (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY));
    for &i in &usable {
        let p = DVec2::new(xs[i], ys[i]);
        min = min.min(p);
        max = max.max(p);
    }
    let span = max - min;
    if span.x <= 0.0 || span.y <= 0.0 {
        return Err(IvError::Triangulation {
            points: n,
            reason: "points are collinear",
        });
    }

    // Normalised points in input order, followed by the super-triangle.
    let mut pts: Vec<DVec2> = (0..n)
        .map(|i| (DVec2::new(xs[i], ys[i]) - min) / span)
        .collect();
    pts.push(DVec2::new(-10.0, -10.0));
    pts.push(DVec2::new(21.0, -10.0));
    pts.push(DVec2::new(-10.0, 21.0));
    let super_v = [n, n + 1, n + 2];

    let mut triangles = vec![Triangle::new(super_v, &pts)];
    for &i in &usable {
        let p = pts[i];
        let (bad, good): (Vec<Triangle>, Vec<Triangle>) = triangles
            .into_iter()
            .partition(|t| t.circumcircle_contains(p));
        triangles = good;

        let mut boundary: Vec<(usize, usize)> = Vec::new();
        for (ti, t) in bad.iter().enumerate() {
            for (a, b) in [(t.v[0], t.v[1]), (t.v[1], t.v[2]), (t.v[2], t.v[0])] {
                let shared = bad
                    .iter()
                    .enumerate()
                    .any(|(oi, o)| oi != ti && o.has_edge(a, b));
                if !shared {
                    boundary.push((a, b));
                }
            }
        }
        triangles.extend(
            boundary
                .into_iter()
                .map(|(a, b)| Triangle::new([a, b, i], &pts)),
        );
    }

    let out: Vec<[usize; 3]> = triangles
        .into_iter()
        .filter(|t| t.v.iter().all(|v| !super_v.contains(v)))
        .filter(|t| {
            let (a, b, c) = (pts[t.v[0]], pts[t.v[1]], pts[t.v[2]]);
            (b - a).perp_dot(c - a).abs() > 1e-12
        })
        .map(|t| t.v)
        .collect();

    if out.is_empty() {
        return Err(IvError::Triangulation {
            points: n,
            reason: "points are collinear",
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_square_gives_two_triangles() {
        let xs = [0.0, 1.0, 1.0, 0.0];
        let ys = [0.0, 0.0, 1.0, 1.0];
        let tris = delaunay(&xs, &ys).unwrap();
        assert_eq!(tris.len(), 2);
        for t in &tris {
            assert!(t.iter().all(|&v| v < 4));
        }
    }

    #[test]
    fn grid_covers_every_point() {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for gx in 0..5 {
            for gy in 0..4 {
                xs.push(gx as f64 * 0.5);
                ys.push(gy as f64 * 0.2 + 0.03 * gx as f64);
            }
        }
        let tris = delaunay(&xs, &ys).unwrap();
        // A triangulation of n points with h on the hull has 2n - h - 2 triangles.
        assert!(tris.len() >= xs.len() - 2);
        let used: HashSet<usize> = tris.iter().flatten().copied().collect();
        assert_eq!(used.len(), xs.len());
    }

    #[test]
    fn collinear_points_fail() {
        let err = delaunay(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0]).unwrap_err();
        assert!(matches!(err, IvError::Triangulation { .. }));
    }

    #[test]
    fn duplicates_and_nan_are_skipped() {
        let xs = [0.0, 1.0, 0.0, 0.0, f64::NAN];
        let ys = [0.0, 0.0, 1.0, 0.0, 5.0];
        let tris = delaunay(&xs, &ys).unwrap();
        assert_eq!(tris.len(), 1);
        assert!(!tris[0].contains(&3));
        assert!(!tris[0].contains(&4));
    }

    #[test]
    fn too_few_points_fail() {
        assert!(delaunay(&[0.0, 1.0], &[0.0, 1.0]).is_err());
    }
}
