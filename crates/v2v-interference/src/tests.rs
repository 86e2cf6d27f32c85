//! Unit and property tests for v2v-interference.

#[cfg(test)]
mod helpers {
    use v2v_core::{GeoPoint, Transceiver, VehicleId};

    pub const ORIGIN: GeoPoint = GeoPoint { lat: 45.764, lon: 4.8357 };

    /// Transceiver `id` placed `east_m` metres east of [`ORIGIN`].
    pub fn at_east(id: u32, east_m: f64, range_m: f64) -> Transceiver {
        Transceiver::new(VehicleId(id), ORIGIN.offset_m(0.0, east_m), range_m)
    }

    pub fn ids(raw: &[u32]) -> Vec<VehicleId> {
        raw.iter().copied().map(VehicleId).collect()
    }
}

// ── Reference scenarios ───────────────────────────────────────────────────────

#[cfg(test)]
mod scenarios {
    use v2v_core::VehicleId;
    use crate::tests::helpers::{at_east, ids};
    use crate::InterferenceGraph;

    #[test]
    fn close_pair_links() {
        let mut g = InterferenceGraph::default();
        g.rebuild(&[at_east(0, 0.0, 500.0), at_east(1, 150.0, 500.0)]);
        assert!(g.direct_neighbors(VehicleId(0)).contains(&VehicleId(1)));
        assert_eq!(g.reachable_vehicles(VehicleId(0)).len(), 1);
        assert_eq!(g.reachable_vehicles(VehicleId(1)).len(), 1);
        assert!(g.can_communicate(VehicleId(0), VehicleId(1)));
    }

    #[test]
    fn distant_pair_does_not_link() {
        let mut g = InterferenceGraph::default();
        g.rebuild(&[at_east(0, 0.0, 10.0), at_east(1, 5_000.0, 10.0)]);
        assert!(g.direct_links().is_empty());
        assert!(!g.can_communicate(VehicleId(0), VehicleId(1)));
        assert!(!g.can_communicate(VehicleId(1), VehicleId(0)));
    }

    #[test]
    fn relay_makes_endpoints_reachable() {
        let mut g = InterferenceGraph::default();
        g.rebuild(&[at_east(0, 0.0, 250.0), at_east(1, 200.0, 250.0), at_east(2, 400.0, 250.0)]);
        assert_eq!(
            g.direct_links(),
            vec![(VehicleId(0), VehicleId(1)), (VehicleId(1), VehicleId(2))]
        );
        assert!(!g.direct_neighbors(VehicleId(0)).contains(&VehicleId(2)));
        assert!(g.reachable_vehicles(VehicleId(0)).contains(&VehicleId(2)));
        assert!(g.reachable_vehicles(VehicleId(2)).contains(&VehicleId(0)));
        assert_eq!(g.reachable_sorted(VehicleId(1)), ids(&[0, 2]));
    }

    #[test]
    fn asymmetric_range_needs_mutual_coverage() {
        let mut g = InterferenceGraph::default();
        g.rebuild(&[at_east(0, 0.0, 2_000.0), at_east(1, 150.0, 1.0)]);
        assert!(g.direct_links().is_empty());
        assert!(!g.can_communicate(VehicleId(0), VehicleId(1)));
    }

    #[test]
    fn single_vehicle() {
        let mut g = InterferenceGraph::default();
        g.rebuild(&[at_east(4, 0.0, 500.0)]);
        assert!(g.direct_neighbors(VehicleId(4)).is_empty());
        assert!(g.reachable_vehicles(VehicleId(4)).is_empty());
        assert_eq!(g.vehicle_count(), 1);
        assert_eq!(g.stats().isolated, 1);
    }

    #[test]
    fn boundary_distance_counts() {
        let a = at_east(0, 0.0, 0.0);
        let b = at_east(1, 300.0, 0.0);
        let d = a.distance_m(&b);
        let mut g = InterferenceGraph::default();
        g.rebuild(&[at_east(0, 0.0, d), at_east(1, 300.0, d)]);
        assert!(g.can_communicate(VehicleId(0), VehicleId(1)));
    }
}

// ── Graph properties ──────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use v2v_core::{SimRng, Transceiver, VehicleId};
    use crate::tests::helpers::{ORIGIN, at_east};
    use crate::{InterferenceGraph, ScanMode};

    fn random_fleet(n: u32, span_m: f64, seed: u64) -> Vec<Transceiver> {
        let mut rng = SimRng::new(seed);
        (0..n)
            .map(|i| {
                let p = ORIGIN.offset_m(rng.gen_range(0.0..span_m), rng.gen_range(0.0..span_m));
                Transceiver::new(VehicleId(i), p, rng.gen_range(50.0..600.0))
            })
            .collect()
    }

    #[test]
    fn symmetric_and_irreflexive() {
        let fleet = random_fleet(120, 3_000.0, 1);
        let mut g = InterferenceGraph::default();
        g.rebuild(&fleet);
        for a in &fleet {
            assert!(!g.reachable_vehicles(a.id).contains(&a.id));
            assert!(!g.direct_neighbors(a.id).contains(&a.id));
            assert!(!g.can_communicate(a.id, a.id));
            for b in &fleet {
                assert_eq!(g.can_communicate(a.id, b.id), g.can_communicate(b.id, a.id));
                assert_eq!(
                    g.direct_neighbors(a.id).contains(&b.id),
                    g.direct_neighbors(b.id).contains(&a.id)
                );
            }
        }
    }

    #[test]
    fn links_follow_mutual_range() {
        let fleet = random_fleet(80, 2_000.0, 2);
        let mut g = InterferenceGraph::default();
        g.rebuild(&fleet);
        for a in &fleet {
            for b in &fleet {
                if a.id == b.id {
                    continue;
                }
                let d = a.distance_m(b);
                let expected = d <= a.range_m.min(b.range_m);
                assert_eq!(g.direct_neighbors(a.id).contains(&b.id), expected);
            }
        }
    }

    #[test]
    fn closure_is_transitive() {
        let fleet = random_fleet(150, 4_000.0, 3);
        let mut g = InterferenceGraph::default();
        g.rebuild(&fleet);
        for &(a, b) in &g.direct_links() {
            for &c in g.direct_neighbors(b) {
                if c != a {
                    assert!(g.reachable_vehicles(a).contains(&c));
                    assert!(g.reachable_vehicles(c).contains(&a));
                }
            }
        }
        let stats = g.stats();
        assert_eq!(stats.components, g.components().len());
        assert_eq!(g.components().iter().map(Vec::len).sum::<usize>(), 150);
    }

    #[test]
    fn empty_input_twice() {
        let mut g = InterferenceGraph::default();
        for _ in 0..2 {
            let stats = g.rebuild(&[]);
            assert_eq!(stats.vehicles, 0);
            assert_eq!(g.vehicle_count(), 0);
            assert!(g.direct_links().is_empty());
            assert!(g.components().is_empty());
        }
    }

    #[test]
    fn unknown_ids_are_empty() {
        let mut g = InterferenceGraph::default();
        g.rebuild(&[at_east(0, 0.0, 500.0), at_east(1, 10.0, 500.0)]);
        assert!(g.direct_neighbors(VehicleId(42)).is_empty());
        assert!(g.reachable_vehicles(VehicleId(42)).is_empty());
        assert!(!g.can_communicate(VehicleId(0), VehicleId(42)));
    }

    #[test]
    fn rebuild_replaces_previous_graph() {
        let mut g = InterferenceGraph::default();
        g.rebuild(&[at_east(0, 0.0, 500.0), at_east(1, 10.0, 500.0)]);
        g.rebuild(&[at_east(0, 0.0, 500.0), at_east(2, 5_000.0, 500.0)]);
        assert!(!g.contains(VehicleId(1)));
        assert!(g.direct_links().is_empty());
    }

    #[test]
    fn forget_splits_relayed_component() {
        let mut g = InterferenceGraph::default();
        g.rebuild(&[at_east(0, 0.0, 250.0), at_east(1, 200.0, 250.0), at_east(2, 400.0, 250.0)]);
        g.forget(VehicleId(1));
        assert!(!g.can_communicate(VehicleId(0), VehicleId(2)));
        assert_eq!(g.vehicle_count(), 2);
        assert_eq!(g.components().len(), 2);
    }

    #[test]
    fn small_fleet_uses_classic_scan() {
        let mut g = InterferenceGraph::default();
        let stats = g.rebuild(&random_fleet(10, 1_000.0, 4));
        assert_eq!(stats.mode, ScanMode::Classic);
        assert_eq!(stats.pairs_checked, 45);
        assert!(!g.grid().is_initialized());

        let stats = g.rebuild(&random_fleet(200, 20_000.0, 5));
        assert_eq!(stats.mode, ScanMode::Indexed);
        assert!(g.grid().is_initialized());
        assert!(stats.pairs_checked < 200 * 199 / 2);
    }
}

// ── Neighbour republishing ────────────────────────────────────────────────────

#[cfg(test)]
mod publish {
    use std::sync::Arc;

    use v2v_core::{GeoPoint, RoadClass, VehicleId};
    use v2v_road::{RoadNetworkBuilder, RoadSegment};
    use v2v_vehicle::{VehicleFleet, VehicleParams};

    use crate::InterferenceGraph;

    #[test]
    fn neighbours_are_the_reachable_set() {
        // Four intersections 200 m apart on a straight road.
        let mut b = RoadNetworkBuilder::new();
        let nodes: Vec<_> = (0..4)
            .map(|i| b.add_node(GeoPoint::new(0.0, 0.0).offset_m(0.0, 200.0 * i as f64)))
            .collect();
        for w in nodes.windows(2) {
            b.add_road(w[0], w[1], RoadSegment::new(200.0, RoadClass::Primary));
        }
        let mut fleet = VehicleFleet::new(Arc::new(b.build()), 1);
        for &n in &nodes {
            fleet.spawn(VehicleParams::new(n, nodes[0]).range(250.0)).unwrap();
        }

        let mut g = InterferenceGraph::default();
        let stats = g.build(fleet.iter_mut());
        assert_eq!(stats.direct_links, 3);
        assert_eq!(stats.components, 1);

        let v0 = fleet.get(VehicleId(0)).unwrap();
        assert_eq!(v0.neighbors(), &[VehicleId(1), VehicleId(2), VehicleId(3)]);
        assert_eq!(g.direct_neighbors(VehicleId(0)).len(), 1);
    }
}

// ── Index soundness ───────────────────────────────────────────────────────────

#[cfg(test)]
mod soundness {
    use proptest::prelude::*;

    use v2v_antenna::GridConfig;
    use v2v_core::{Transceiver, VehicleId};

    use crate::tests::helpers::ORIGIN;
    use crate::{IndexConfig, InterferenceGraph, ScanMode};

    fn fleet_strategy() -> impl Strategy<Value = Vec<(f64, f64, f64)>> {
        prop::collection::vec(
            (-8_000.0..8_000.0_f64, -8_000.0..8_000.0_f64, 0.0..1_500.0_f64),
            2..160,
        )
    }

    fn to_snapshot(raw: &[(f64, f64, f64)]) -> Vec<Transceiver> {
        raw.iter()
            .enumerate()
            .map(|(i, &(n, e, r))| Transceiver::new(VehicleId(i as u32), ORIGIN.offset_m(n, e), r))
            .collect()
    }

    fn graph(mode: ScanMode, nominal_range_m: f64) -> InterferenceGraph {
        InterferenceGraph::new(IndexConfig {
            mode,
            min_fleet: 0,
            grid: GridConfig { nominal_range_m, ..GridConfig::default() },
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn indexed_matches_classic(raw in fleet_strategy(), nominal in 50.0..1_000.0_f64) {
            let snapshot = to_snapshot(&raw);
            let mut classic = graph(ScanMode::Classic, nominal);
            let mut indexed = graph(ScanMode::Indexed, nominal);
            classic.rebuild(&snapshot);
            let stats = indexed.rebuild(&snapshot);
            prop_assert_eq!(stats.mode, ScanMode::Indexed);
            prop_assert_eq!(classic.direct_links(), indexed.direct_links());
        }

        #[test]
        fn indexed_stays_sound_after_fleet_moves(
            before in fleet_strategy(),
            after in fleet_strategy(),
        ) {
            let mut indexed = graph(ScanMode::Indexed, 300.0);
            indexed.initialize_spatial_index(&to_snapshot(&before));

            // A different fleet, partly outside the laid-out area.
            let moved: Vec<(f64, f64, f64)> = after.iter().map(|&(n, e, r)| (n * 2.0, e * 2.0, r)).collect();
            let snapshot = to_snapshot(&moved);
            let mut classic = graph(ScanMode::Classic, 300.0);
            classic.rebuild(&snapshot);
            indexed.rebuild(&snapshot);
            prop_assert_eq!(classic.direct_links(), indexed.direct_links());
        }
    }
}
