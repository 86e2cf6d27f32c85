//! Unit tests for v2v-vehicle.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use v2v_core::{GeoPoint, NodeId, RoadClass};
    use v2v_road::{RoadNetwork, RoadNetworkBuilder, RoadSegment};

    /// Straight road `n0 - n1 - n2`, two 100 m primary segments, plus an
    /// isolated node `n3` and a node `n4` reachable only over a non-drivable
    /// path from `n2`.
    pub fn line_network() -> (Arc<RoadNetwork>, [NodeId; 5]) {
        let mut b = RoadNetworkBuilder::new();
        let n0 = b.add_node(GeoPoint::new(0.0, 0.0));
        let n1 = b.add_node(GeoPoint::new(0.0, 0.0009));
        let n2 = b.add_node(GeoPoint::new(0.0, 0.0018));
        let n3 = b.add_node(GeoPoint::new(1.0, 1.0));
        let n4 = b.add_node(GeoPoint::new(0.0009, 0.0018));
        b.add_road(n0, n1, RoadSegment::new(100.0, RoadClass::Primary));
        b.add_road(n1, n2, RoadSegment::new(100.0, RoadClass::Primary));
        b.add_road(n2, n4, RoadSegment::new(100.0, RoadClass::Other));
        (Arc::new(b.build()), [n0, n1, n2, n3, n4])
    }

    /// Single one-way road `a -> b`.
    pub fn oneway_network() -> (Arc<RoadNetwork>, NodeId, NodeId) {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 0.0009));
        b.add_road(a, c, RoadSegment::new(100.0, RoadClass::Secondary).oneway(true));
        (Arc::new(b.build()), a, c)
    }

    /// One-way road `a -> c` continuing as a two-way road `c - d`.
    pub fn oneway_then_twoway_network() -> (Arc<RoadNetwork>, [NodeId; 3]) {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 0.0009));
        let d = b.add_node(GeoPoint::new(0.0, 0.0018));
        b.add_road(a, c, RoadSegment::new(100.0, RoadClass::Secondary).oneway(true));
        b.add_road(c, d, RoadSegment::new(100.0, RoadClass::Secondary));
        (Arc::new(b.build()), [a, c, d])
    }

    /// 3x3 grid of tertiary roads, 100 m per side.
    pub fn grid_network() -> Arc<RoadNetwork> {
        let mut b = RoadNetworkBuilder::new();
        let mut ids = Vec::new();
        for r in 0..3 {
            for c in 0..3 {
                ids.push(b.add_node(GeoPoint::new(r as f64 * 0.0009, c as f64 * 0.0009)));
            }
        }
        for r in 0..3 {
            for c in 0..3 {
                let i = r * 3 + c;
                if c < 2 {
                    b.add_road(ids[i], ids[i + 1], RoadSegment::new(100.0, RoadClass::Tertiary));
                }
                if r < 2 {
                    b.add_road(ids[i], ids[i + 3], RoadSegment::new(100.0, RoadClass::Tertiary));
                }
            }
        }
        Arc::new(b.build())
    }
}

// ── Construction ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod construction {
    use v2v_core::{NodeId, VehicleId};
    use crate::tests::helpers::line_network;
    use crate::{Vehicle, VehicleError, VehicleParams};

    #[test]
    fn parked_at_start() {
        let (net, [n0, _, n2, _, _]) = line_network();
        let v = Vehicle::new(VehicleId(0), net.clone(), VehicleParams::new(n0, n2), 1).unwrap();
        assert_eq!(v.current_node(), n0);
        assert_eq!(v.origin(), n0);
        assert_eq!(v.destination(), n2);
        assert!(v.current_edge().is_none());
        assert_eq!(v.position(), net.node_pos[n0.index()]);
        assert!(v.neighbors().is_empty());
    }

    #[test]
    fn unknown_node_rejected() {
        let (net, [n0, ..]) = line_network();
        let err = Vehicle::new(VehicleId(0), net, VehicleParams::new(n0, NodeId(99)), 1).unwrap_err();
        assert!(matches!(err, VehicleError::NodeNotFound(NodeId(99))));
    }

    #[test]
    fn bad_parameters_rejected() {
        let (net, [n0, n1, ..]) = line_network();
        let negative = VehicleParams::new(n0, n1).speed(-1.0);
        assert!(matches!(
            Vehicle::new(VehicleId(0), net.clone(), negative, 1),
            Err(VehicleError::InvalidParameter { what: "speed", .. })
        ));
        let nan = VehicleParams::new(n0, n1).range(f64::NAN);
        assert!(matches!(
            Vehicle::new(VehicleId(0), net, nan, 1),
            Err(VehicleError::InvalidParameter { what: "transmission range", .. })
        ));
    }
}

// ── Motion ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod motion {
    use v2v_core::VehicleId;
    use crate::tests::helpers::{grid_network, line_network, oneway_network, oneway_then_twoway_network};
    use crate::{Vehicle, VehicleParams};

    #[test]
    fn partial_edge_progress() {
        let (net, [n0, n1, n2, _, _]) = line_network();
        let mut v = Vehicle::new(VehicleId(0), net.clone(), VehicleParams::new(n0, n2).speed(10.0), 1).unwrap();
        let out = v.update(1.0);
        assert_eq!(out.edges_completed, 0);
        assert!((out.advanced_m - 10.0).abs() < 1e-9);
        assert_eq!(v.next_node(), n1);
        assert!((v.progress_m() - 10.0).abs() < 1e-9);

        let p = v.position();
        let a = net.node_pos[n0.index()];
        let b = net.node_pos[n1.index()];
        assert!(p.lon > a.lon && p.lon < b.lon);
    }

    #[test]
    fn overshoot_carries_onto_next_edge() {
        let (net, [n0, n1, n2, _, _]) = line_network();
        let mut v = Vehicle::new(VehicleId(0), net, VehicleParams::new(n0, n2).speed(150.0), 1).unwrap();
        let out = v.update(1.0);
        assert_eq!(out.edges_completed, 1);
        assert_eq!(v.current_node(), n1);
        // Forward edge preferred over the U-turn.
        assert_eq!(v.next_node(), n2);
        assert!((v.progress_m() - 50.0).abs() < 1e-9);
        assert!((v.odometer_m() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn destination_reverses_intent() {
        let (net, [n0, n1, n2, _, _]) = line_network();
        let mut v = Vehicle::new(VehicleId(0), net, VehicleParams::new(n0, n2).speed(250.0), 1).unwrap();
        let out = v.update(1.0);
        assert_eq!(out.destinations_reached, 1);
        assert_eq!(out.edges_completed, 2);
        assert_eq!(v.origin(), n2);
        assert_eq!(v.destination(), n0);
        // Only the drivable way back is left at n2.
        assert_eq!(v.current_node(), n2);
        assert_eq!(v.next_node(), n1);
        assert!((v.progress_m() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn isolated_vehicle_reverses_instead_of_freezing() {
        let (net, [n0, _, _, n3, _]) = line_network();
        let mut v = Vehicle::new(VehicleId(0), net.clone(), VehicleParams::new(n3, n0), 1).unwrap();
        let out = v.update(1.0);
        assert!(out.stuck);
        assert_eq!(out.advanced_m, 0.0);
        assert_eq!(v.origin(), n0);
        assert_eq!(v.destination(), n3);
        assert_eq!(v.position(), net.node_pos[n3.index()]);
    }

    #[test]
    fn non_drivable_edges_are_never_taken() {
        let (net, [n0, _, _, _, n4]) = line_network();
        let mut v = Vehicle::new(VehicleId(0), net, VehicleParams::new(n4, n0), 1).unwrap();
        assert!(v.update(1.0).stuck);
        assert!(v.current_edge().is_none());
    }

    #[test]
    fn oneway_ignored_by_default() {
        let (net, a, c) = oneway_network();
        let mut v = Vehicle::new(VehicleId(0), net, VehicleParams::new(c, a), 1).unwrap();
        let out = v.update(1.0);
        assert!(!out.stuck);
        assert_eq!(v.next_node(), a);
    }

    #[test]
    fn oneway_enforced_on_request() {
        let (net, [a, c, d]) = oneway_then_twoway_network();
        // From `c` the only legal exit is `d`; `a` is against the tag.
        for seed in 0..20 {
            let mut v = Vehicle::new(VehicleId(0), net.clone(), VehicleParams::new(c, d).enforce_oneway(true), seed).unwrap();
            assert!(!v.update(1.0).stuck);
            assert_eq!(v.next_node(), d, "seed {seed}");
        }

        let mut w = Vehicle::new(VehicleId(1), net, VehicleParams::new(a, c).enforce_oneway(true), 1).unwrap();
        assert!(!w.update(1.0).stuck);
        assert_eq!(w.next_node(), c);
    }

    #[test]
    fn oneway_dead_end_falls_back_to_reverse_edge() {
        let (net, a, c) = oneway_network();
        let mut v = Vehicle::new(VehicleId(0), net, VehicleParams::new(c, a).enforce_oneway(true), 1).unwrap();
        let mut travelled = 0.0;
        for _ in 0..30 {
            let out = v.update(1.0);
            assert!(!out.stuck);
            travelled += out.advanced_m;
        }
        assert!((travelled - 300.0).abs() < 1e-6, "got {travelled}");
        assert!((v.odometer_m() - 300.0).abs() < 1e-6);
    }

    #[test]
    fn non_positive_dt_is_noop() {
        let (net, [n0, _, n2, _, _]) = line_network();
        let mut v = Vehicle::new(VehicleId(0), net, VehicleParams::new(n0, n2), 1).unwrap();
        assert_eq!(v.update(0.0).advanced_m, 0.0);
        assert_eq!(v.update(-1.0).advanced_m, 0.0);
        assert_eq!(v.update(f64::NAN).advanced_m, 0.0);
        assert!(v.current_edge().is_none());
    }

    #[test]
    fn same_seed_same_trajectory() {
        let net = grid_network();
        let start = v2v_core::NodeId(4);
        let dest = v2v_core::NodeId(0);
        let mut a = Vehicle::new(VehicleId(3), net.clone(), VehicleParams::new(start, dest).speed(37.0), 42).unwrap();
        let mut b = Vehicle::new(VehicleId(3), net, VehicleParams::new(start, dest).speed(37.0), 42).unwrap();
        for _ in 0..200 {
            a.update(0.5);
            b.update(0.5);
            assert_eq!(a.position(), b.position());
            assert_eq!(a.current_edge(), b.current_edge());
        }
    }

    #[test]
    fn stays_on_network() {
        let net = grid_network();
        let mut v = Vehicle::new(
            VehicleId(0), net.clone(),
            VehicleParams::new(v2v_core::NodeId(0), v2v_core::NodeId(8)).speed(23.0), 7,
        ).unwrap();
        for _ in 0..500 {
            v.update(1.0);
            assert!(v.progress_m() <= v.edge_length_m() + 1e-9);
            if let Some(e) = v.current_edge() {
                assert_eq!(net.edge_to[e.index()], v.next_node());
            }
        }
        assert!((v.odometer_m() - 500.0 * 23.0).abs() < 1e-6);
    }
}

// ── Collision avoidance & neighbours ──────────────────────────────────────────

#[cfg(test)]
mod collision {
    use v2v_core::VehicleId;
    use crate::tests::helpers::line_network;
    use crate::{Vehicle, VehicleParams};

    #[test]
    fn slows_per_close_neighbour_and_recovers() {
        let (net, [n0, _, n2, _, _]) = line_network();
        let mut v = Vehicle::new(VehicleId(0), net.clone(), VehicleParams::new(n0, n2).speed(10.0), 1).unwrap();
        let here = v.position();
        let far = net.node_pos[n2.index()];

        assert_eq!(v.avoid_collision([here, here, far], 0.8), 2);
        assert!((v.speed_mps() - 6.4).abs() < 1e-9);

        // Derived from cruise speed each call, never from the slowed speed.
        v.avoid_collision([here, here, far], 0.8);
        assert!((v.speed_mps() - 6.4).abs() < 1e-9);
        v.avoid_collision([here], 0.5);
        assert!((v.speed_mps() - 5.0).abs() < 1e-9);

        assert_eq!(v.avoid_collision([far], 0.8), 0);
        assert_eq!(v.speed_mps(), 10.0);
    }

    #[test]
    fn neighbor_list_is_normalised() {
        let (net, [n0, _, n2, _, _]) = line_network();
        let mut v = Vehicle::new(VehicleId(2), net, VehicleParams::new(n0, n2), 1).unwrap();
        v.set_neighbors(vec![VehicleId(5), VehicleId(2), VehicleId(1), VehicleId(5)]);
        assert_eq!(v.neighbors(), &[VehicleId(1), VehicleId(5)]);
        v.forget_neighbor(VehicleId(1));
        assert_eq!(v.neighbors(), &[VehicleId(5)]);
        v.clear_neighbors();
        assert!(v.neighbors().is_empty());
    }

    #[test]
    fn distance_is_symmetric() {
        let (net, [n0, _, n2, _, _]) = line_network();
        let a = Vehicle::new(VehicleId(0), net.clone(), VehicleParams::new(n0, n2), 1).unwrap();
        let b = Vehicle::new(VehicleId(1), net, VehicleParams::new(n2, n0), 1).unwrap();
        let d = a.calculate_distance(&b);
        assert!((d - b.calculate_distance(&a)).abs() < 1e-9);
        assert!(d > 150.0 && d < 250.0, "got {d}");
        assert_eq!(a.transceiver().range_m, 500.0);
    }
}

// ── Fleet & spawning ──────────────────────────────────────────────────────────

#[cfg(test)]
mod fleet {
    use v2v_core::{SimRng, VehicleId};
    use v2v_road::RoadNetworkBuilder;
    use crate::tests::helpers::line_network;
    use crate::{random_drivable_node, VehicleFleet, VehicleParams};

    #[test]
    fn ids_are_never_reused() {
        let (net, [n0, _, n2, _, _]) = line_network();
        let mut fleet = VehicleFleet::new(net, 9);
        let a = fleet.spawn(VehicleParams::new(n0, n2)).unwrap();
        let b = fleet.spawn(VehicleParams::new(n2, n0)).unwrap();
        assert_eq!((a, b), (VehicleId(0), VehicleId(1)));
        assert_eq!(fleet.len(), 2);

        assert!(fleet.retire(a).is_some());
        assert!(fleet.retire(a).is_none());
        assert!(!fleet.contains(a));
        assert_eq!(fleet.len(), 1);

        let c = fleet.spawn(VehicleParams::new(n0, n2)).unwrap();
        assert_eq!(c, VehicleId(2));
        assert_eq!(fleet.ids().collect::<Vec<_>>(), vec![b, c]);
        assert_eq!(fleet.transceivers().len(), 2);
    }

    #[test]
    fn failed_spawn_leaves_fleet_untouched() {
        let (net, [n0, ..]) = line_network();
        let mut fleet = VehicleFleet::new(net, 9);
        assert!(fleet.spawn(VehicleParams::new(n0, v2v_core::NodeId(77))).is_err());
        assert!(fleet.is_empty());
        assert_eq!(fleet.spawn(VehicleParams::new(n0, n0)).unwrap(), VehicleId(0));
    }

    #[test]
    fn spawn_points_have_drivable_edges() {
        let (net, [_, _, _, n3, n4]) = line_network();
        let mut rng = SimRng::new(5);
        for _ in 0..100 {
            let n = random_drivable_node(&net, &mut rng, 16).unwrap();
            assert_ne!(n, n3);
            assert_ne!(n, n4);
            assert!(net.drivable_out_degree(n) > 0);
        }
    }

    #[test]
    fn no_spawn_point_without_drivable_roads() {
        let empty = RoadNetworkBuilder::new().build();
        assert!(random_drivable_node(&empty, &mut SimRng::new(1), 10).is_none());

        let mut b = RoadNetworkBuilder::new();
        b.add_node(v2v_core::GeoPoint::new(0.0, 0.0));
        assert!(random_drivable_node(&b.build(), &mut SimRng::new(1), 10).is_none());
    }
}
