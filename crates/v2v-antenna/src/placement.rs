//! Cell placement: position sampling, k-means macro centres, and the
//! uniform micro-cell layout inside a macro cell.

use v2v_core::{GeoBounds, GeoPoint};

/// Up to `cap` positions picked by uniform stride.  Small inputs are
/// returned whole.
pub fn sample_positions(points: &[GeoPoint], cap: usize) -> Vec<GeoPoint> {
    let cap = cap.max(1);
    let step = (points.len() / cap).max(1);
    points.iter().step_by(step).take(cap).copied().collect()
}

/// `k` cluster centres for `sample`.
///
/// Centres start on a `ceil(sqrt(k))` square lattice spanning the sample's
/// bounding box (the box centre when the lattice is 1x1) and are then moved
/// to the mean of their cluster `iterations` times.  A centre whose cluster
/// is empty stays put.  Returns an empty vector for an empty sample.
pub fn kmeans_centres(sample: &[GeoPoint], k: usize, iterations: u32) -> Vec<GeoPoint> {
    let Some(bounds) = GeoBounds::from_points(sample.iter().copied()) else {
        return Vec::new();
    };
    let k = k.max(1);
    let side = (k as f64).sqrt().ceil() as usize;

    let mut centres: Vec<GeoPoint> = (0..k)
        .map(|i| {
            if side <= 1 {
                return bounds.center();
            }
            let row = (i / side) as f64 / (side - 1) as f64;
            let col = (i % side) as f64 / (side - 1) as f64;
            GeoPoint::new(
                bounds.min.lat + (bounds.max.lat - bounds.min.lat) * row,
                bounds.min.lon + (bounds.max.lon - bounds.min.lon) * col,
            )
        })
        .collect();

    let mut sums = vec![(0.0_f64, 0.0_f64, 0_usize); k];
    for _ in 0..iterations {
        sums.iter_mut().for_each(|s| *s = (0.0, 0.0, 0));
        for &p in sample {
            let c = nearest(&centres, p);
            sums[c].0 += p.lat;
            sums[c].1 += p.lon;
            sums[c].2 += 1;
        }
        for (centre, &(lat, lon, n)) in centres.iter_mut().zip(&sums) {
            if n > 0 {
                *centre = GeoPoint::new(lat / n as f64, lon / n as f64);
            }
        }
    }
    centres
}

/// Radius shared by all macro cells: the sample's bounding-box diagonal
/// split across the cell lattice, inflated by `margin`, floored at
/// `min_radius_m`.
pub fn macro_radius_m(sample: &[GeoPoint], k: usize, margin: f64, min_radius_m: f64) -> f64 {
    let diagonal = GeoBounds::from_points(sample.iter().copied())
        .map(|b| b.diagonal_m())
        .unwrap_or(0.0);
    let radius = diagonal / (2.0 * (k.max(1) as f64).sqrt()) * margin;
    radius.max(min_radius_m)
}

/// Centres and common radius of `count` micro cells tiling the square of
/// half-side `macro_radius_m` around `centre`.
///
/// The square is cut into a `ceil(sqrt(count))` lattice of equal cells; the
/// first `count` lattice cells (row-major) are returned.  The radius is the
/// half-diagonal of one cell, so every point of a filled cell is within
/// radius of its centre.
pub fn micro_layout(centre: GeoPoint, macro_radius_m: f64, count: usize) -> (Vec<GeoPoint>, f64) {
    let per_row = (count.max(1) as f64).sqrt().ceil() as usize;
    let spacing = 2.0 * macro_radius_m / per_row as f64;
    let half = per_row as f64 / 2.0;

    let centres = (0..count)
        .map(|i| {
            let north = ((i / per_row) as f64 + 0.5 - half) * spacing;
            let east  = ((i % per_row) as f64 + 0.5 - half) * spacing;
            centre.offset_m(north, east)
        })
        .collect();
    (centres, spacing * std::f64::consts::SQRT_2 / 2.0)
}

/// Index of the centre nearest to `p`.  `centres` must be non-empty.
pub(crate) fn nearest(centres: &[GeoPoint], p: GeoPoint) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (i, c) in centres.iter().enumerate() {
        let d = p.distance_m(*c);
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    best
}
