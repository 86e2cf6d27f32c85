//! Candidate-pair enumeration and the mutual-range link test.
//!
//! Both scans return each linked pair once, as `(i, j)` snapshot indices
//! with `i < j`.

use v2v_antenna::{AntennaGrid, IdMap};
use v2v_core::{Transceiver, VehicleId};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Linked pairs plus the number of pairs distance-checked.
pub struct ScanOutput {
    pub links:   Vec<(usize, usize)>,
    pub checked: usize,
}

/// Check every unordered pair.
pub fn classic(snapshot: &[Transceiver]) -> ScanOutput {
    let n = snapshot.len();
    let row = |i: usize| {
        let a = &snapshot[i];
        ((i + 1)..n)
            .filter(move |&j| a.id != snapshot[j].id && a.links_with(&snapshot[j]))
            .map(move |j| (i, j))
    };

    #[cfg(feature = "parallel")]
    let links: Vec<(usize, usize)> = (0..n).into_par_iter().flat_map_iter(row).collect();
    #[cfg(not(feature = "parallel"))]
    let links: Vec<(usize, usize)> = (0..n).flat_map(row).collect();

    ScanOutput { links, checked: n * n.saturating_sub(1) / 2 }
}

/// Check only the pairs the grid reports as nearby.
///
/// The grid must already hold an assignment for `snapshot`.  Nearby sets
/// are symmetric, so each pair is checked from its lower index only.
pub fn indexed(snapshot: &[Transceiver], grid: &AntennaGrid) -> ScanOutput {
    let slot: IdMap<VehicleId, usize> =
        snapshot.iter().enumerate().map(|(i, t)| (t.id, i)).collect();

    let row = |i: usize| -> (Vec<(usize, usize)>, usize) {
        let a = &snapshot[i];
        let mut links = Vec::new();
        let mut checked = 0;
        for other in grid.nearby_vehicle_ids(a.id) {
            let Some(&j) = slot.get(&other) else { continue };
            if j <= i {
                continue;
            }
            checked += 1;
            if a.links_with(&snapshot[j]) {
                links.push((i, j));
            }
        }
        (links, checked)
    };

    #[cfg(feature = "parallel")]
    let rows: Vec<(Vec<(usize, usize)>, usize)> = (0..snapshot.len()).into_par_iter().map(row).collect();
    #[cfg(not(feature = "parallel"))]
    let rows: Vec<(Vec<(usize, usize)>, usize)> = (0..snapshot.len()).map(row).collect();

    let checked = rows.iter().map(|(_, c)| c).sum();
    let links = rows.into_iter().flat_map(|(l, _)| l).collect();
    ScanOutput { links, checked }
}
