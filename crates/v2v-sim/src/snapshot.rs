//! Read-only views for renderers.

use v2v_core::{GeoPoint, Tick, VehicleId};
use v2v_interference::GraphStats;

use crate::EngineState;

/// Everything needed to draw one vehicle: where it is, its range circle,
/// and its links.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleView {
    pub id:        VehicleId,
    pub position:  GeoPoint,
    pub range_m:   f64,
    pub speed_mps: f64,
    /// Direct neighbours at the last rebuild, ascending.
    pub direct:    Vec<VehicleId>,
    /// Reachable vehicles at the last rebuild, ascending.
    pub reachable: Vec<VehicleId>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    pub tick:             Tick,
    pub sim_elapsed_secs: f64,
    pub state:            EngineState,
    pub vehicles:         Vec<VehicleView>,
    pub graph:            GraphStats,
}

impl Snapshot {
    pub fn vehicle(&self, id: VehicleId) -> Option<&VehicleView> {
        self.vehicles
            .binary_search_by_key(&id, |v| v.id)
            .ok()
            .map(|i| &self.vehicles[i])
    }
}
