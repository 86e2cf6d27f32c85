//! Unit tests for v2v-antenna.

#[cfg(test)]
mod helpers {
    use v2v_core::{GeoPoint, SimRng, Transceiver, VehicleId};

    pub const ORIGIN: GeoPoint = GeoPoint { lat: 48.8566, lon: 2.3522 };

    /// `n` vehicles scattered uniformly over a `span_m` square around
    /// [`ORIGIN`], all with `range_m`.
    pub fn scattered(n: u32, span_m: f64, range_m: f64, seed: u64) -> Vec<Transceiver> {
        let mut rng = SimRng::new(seed);
        (0..n)
            .map(|i| {
                let north = rng.gen_range(-span_m / 2.0..=span_m / 2.0);
                let east  = rng.gen_range(-span_m / 2.0..=span_m / 2.0);
                Transceiver::new(VehicleId(i), ORIGIN.offset_m(north, east), range_m)
            })
            .collect()
    }

    /// Every pair in link range appears in both nearby sets.
    pub fn assert_sound(grid: &crate::AntennaGrid, fleet: &[Transceiver]) {
        for a in fleet {
            let nearby = grid.nearby_vehicle_ids(a.id);
            for b in fleet {
                if a.id != b.id && a.links_with(b) {
                    assert!(
                        nearby.contains(&b.id),
                        "{} missing from nearby set of {} (d = {:.1} m)",
                        b.id, a.id, a.distance_m(b)
                    );
                }
            }
        }
    }
}

// ── Placement ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod placement {
    use v2v_core::GeoPoint;
    use crate::placement::{kmeans_centres, macro_radius_m, micro_layout, sample_positions};
    use crate::tests::helpers::ORIGIN;

    #[test]
    fn sample_is_capped_and_strided() {
        let pts: Vec<GeoPoint> = (0..2_500).map(|i| GeoPoint::new(i as f64 * 1e-5, 0.0)).collect();
        let s = sample_positions(&pts, 1_000);
        assert_eq!(s.len(), 1_000);
        assert_eq!(s[1], pts[2]);
        assert_eq!(sample_positions(&pts[..10], 1_000).len(), 10);
    }

    #[test]
    fn single_centre_is_finite() {
        let pts = [ORIGIN, ORIGIN.offset_m(100.0, 0.0), ORIGIN.offset_m(0.0, 100.0)];
        let c = kmeans_centres(&pts, 1, 3);
        assert_eq!(c.len(), 1);
        assert!(c[0].lat.is_finite() && c[0].lon.is_finite());
        // One cluster collapses onto the mean.
        let mean_lat = pts.iter().map(|p| p.lat).sum::<f64>() / 3.0;
        assert!((c[0].lat - mean_lat).abs() < 1e-9);
    }

    #[test]
    fn centres_follow_clusters() {
        let west = ORIGIN;
        let east = ORIGIN.offset_m(0.0, 10_000.0);
        let mut pts = Vec::new();
        for i in 0..50 {
            pts.push(west.offset_m(i as f64, 0.0));
            pts.push(east.offset_m(i as f64, 0.0));
        }
        let c = kmeans_centres(&pts, 2, 3);
        assert_eq!(c.len(), 2);
        assert!(c.iter().any(|p| p.distance_m(west) < 100.0));
        assert!(c.iter().any(|p| p.distance_m(east) < 100.0));
    }

    #[test]
    fn empty_sample_has_no_centres() {
        assert!(kmeans_centres(&[], 4, 3).is_empty());
    }

    #[test]
    fn radius_floor_applies() {
        assert_eq!(macro_radius_m(&[ORIGIN, ORIGIN], 4, 1.5, 250.0), 250.0);
        assert_eq!(macro_radius_m(&[], 4, 1.5, 250.0), 250.0);
    }

    #[test]
    fn micro_cells_tile_the_macro_square() {
        let (centres, r) = micro_layout(ORIGIN, 1_000.0, 4);
        assert_eq!(centres.len(), 4);
        // 2x2 lattice of 1000 m squares: half-diagonal ~707 m.
        assert!((r - 1_000.0 * std::f64::consts::SQRT_2 / 2.0).abs() < 1e-9);
        for c in &centres {
            let d = c.distance_m(ORIGIN);
            assert!((d - 707.1).abs() < 5.0, "centre {c} at {d:.1} m");
        }
    }
}

// ── Grid lifecycle ────────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use v2v_core::VehicleId;
    use crate::tests::helpers::scattered;
    use crate::{AntennaGrid, GridConfig};

    #[test]
    fn empty_fleet_does_not_initialise() {
        let mut grid = AntennaGrid::default();
        assert!(!grid.initialize(&[]));
        assert!(!grid.is_initialized());
        assert!(grid.nearby_vehicle_ids(VehicleId(0)).is_empty());
    }

    #[test]
    fn initialise_is_one_shot() {
        let fleet = scattered(200, 5_000.0, 300.0, 1);
        let mut grid = AntennaGrid::default();
        assert!(grid.initialize(&fleet));
        assert_eq!(grid.macros().len(), 10);
        assert_eq!(grid.micros().len(), 100);
        let first = grid.macros()[0].center;

        let moved = scattered(200, 5_000.0, 300.0, 2);
        assert!(!grid.initialize(&moved));
        assert_eq!(grid.macros()[0].center, first);
    }

    #[test]
    fn every_vehicle_assigned_exactly_once() {
        let fleet = scattered(300, 8_000.0, 300.0, 3);
        let mut grid = AntennaGrid::default();
        grid.initialize(&fleet);

        let mut seen: Vec<VehicleId> = grid.micros().iter().flat_map(|m| m.members.iter().copied()).collect();
        seen.extend(fleet.iter().filter(|t| grid.is_stray(t.id)).map(|t| t.id));
        seen.sort_unstable();
        let expected: Vec<VehicleId> = fleet.iter().map(|t| t.id).collect();
        assert_eq!(seen, expected);
        assert_eq!(grid.assigned_count(), 300);
        for t in &fleet {
            let micro = grid.micro_cell_of(t.id).unwrap();
            assert_eq!(grid.macro_cell_of(t.id), Some(grid.micros()[micro.index()].parent));
        }
    }

    #[test]
    fn neighbourhoods_are_symmetric_without_self() {
        let fleet = scattered(100, 20_000.0, 200.0, 4);
        let mut grid = AntennaGrid::new(GridConfig { nominal_range_m: 200.0, ..GridConfig::default() });
        grid.initialize(&fleet);
        for m in grid.micros() {
            assert!(!m.neighbors.contains(&m.id));
            for n in &m.neighbors {
                assert!(grid.micros()[n.index()].neighbors.contains(&m.id));
            }
        }
        for m in grid.macros() {
            assert!(!m.neighbors.contains(&m.id));
        }
    }

    #[test]
    fn forget_and_clear() {
        let fleet = scattered(50, 2_000.0, 300.0, 5);
        let mut grid = AntennaGrid::default();
        grid.initialize(&fleet);

        grid.forget(VehicleId(7));
        assert!(grid.micro_cell_of(VehicleId(7)).is_none());
        assert!(!grid.nearby_vehicle_ids(VehicleId(8)).contains(&VehicleId(7)));
        assert_eq!(grid.assigned_count(), 49);

        grid.clear();
        assert!(!grid.is_initialized());
        assert!(grid.micros().is_empty());
        assert!(grid.initialize(&fleet));
    }

    #[test]
    fn single_macro_cell() {
        let fleet = scattered(40, 1_000.0, 300.0, 6);
        let mut grid = AntennaGrid::new(GridConfig { macro_cells: 1, micro_per_macro: 1, ..GridConfig::default() });
        assert!(grid.initialize(&fleet));
        assert_eq!(grid.micros().len(), 1);
        assert!(grid.macros()[0].center.lat.is_finite());
    }
}

// ── Nearby queries & soundness ────────────────────────────────────────────────

#[cfg(test)]
mod nearby {
    use v2v_core::{Transceiver, VehicleId};
    use crate::tests::helpers::{assert_sound, scattered, ORIGIN};
    use crate::{AntennaGrid, GridConfig};

    #[test]
    fn nearby_excludes_self() {
        let fleet = scattered(100, 3_000.0, 500.0, 7);
        let mut grid = AntennaGrid::default();
        grid.initialize(&fleet);
        for t in &fleet {
            assert!(!grid.nearby_vehicle_ids(t.id).contains(&t.id));
        }
        assert!(grid.nearby_vehicle_ids(VehicleId(9_999)).is_empty());
    }

    #[test]
    fn sound_for_dense_and_sparse_fleets() {
        for (span, range, seed) in [(2_000.0, 500.0, 1), (30_000.0, 1_000.0, 2), (50_000.0, 150.0, 3)] {
            let fleet = scattered(400, span, range, seed);
            let mut grid = AntennaGrid::new(GridConfig { nominal_range_m: range, ..GridConfig::default() });
            grid.initialize(&fleet);
            assert_sound(&grid, &fleet);
        }
    }

    #[test]
    fn prunes_when_fleet_is_spread_out() {
        let fleet = scattered(400, 50_000.0, 100.0, 8);
        let mut grid = AntennaGrid::new(GridConfig { nominal_range_m: 100.0, ..GridConfig::default() });
        grid.initialize(&fleet);
        let total: usize = fleet.iter().map(|t| grid.nearby_vehicle_ids(t.id).len()).sum();
        assert!(total < fleet.len() * (fleet.len() - 1) / 2, "no pruning: {total} candidates");
    }

    #[test]
    fn strays_are_visible_from_everywhere() {
        let mut fleet = scattered(100, 2_000.0, 300.0, 9);
        let mut grid = AntennaGrid::default();
        grid.initialize(&fleet);

        // Drive one vehicle far beyond the laid-out area.
        fleet[0] = Transceiver::new(VehicleId(0), ORIGIN.offset_m(80_000.0, 0.0), 300.0);
        grid.assign(&fleet);
        assert!(grid.is_stray(VehicleId(0)));
        assert!(grid.stats().strays >= 1);

        for t in &fleet[1..] {
            assert!(grid.nearby_vehicle_ids(t.id).contains(&VehicleId(0)));
        }
        assert_eq!(grid.nearby_vehicle_ids(VehicleId(0)).len(), 99);
        assert_sound(&grid, &fleet);
    }

    #[test]
    fn larger_range_widens_neighbourhoods() {
        let fleet = scattered(300, 40_000.0, 100.0, 10);
        let mut grid = AntennaGrid::new(GridConfig { nominal_range_m: 100.0, ..GridConfig::default() });
        grid.initialize(&fleet);
        let before = grid.stats().mean_micro_neighbors;

        let wide: Vec<Transceiver> = fleet.iter().map(|t| Transceiver::new(t.id, t.position, 8_000.0)).collect();
        assert!(grid.ensure_link_range(8_000.0));
        assert!(!grid.ensure_link_range(8_000.0));
        assert_eq!(grid.link_range_m(), 8_000.0);
        assert!(grid.stats().mean_micro_neighbors > before);

        grid.assign(&wide);
        assert_sound(&grid, &wide);
    }

    #[test]
    fn initialise_covers_largest_range() {
        let mut fleet = scattered(100, 10_000.0, 200.0, 11);
        fleet[3].range_m = 4_000.0;
        let mut grid = AntennaGrid::new(GridConfig { nominal_range_m: 200.0, ..GridConfig::default() });
        grid.initialize(&fleet);
        assert_eq!(grid.link_range_m(), 4_000.0);
    }
}
