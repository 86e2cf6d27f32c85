//! Radio snapshot of a vehicle, taken once per interference rebuild.

use crate::{GeoPoint, VehicleId};

/// Where a vehicle is and how far it can transmit, frozen for one rebuild.
///
/// Deriving a vehicle's position means interpolating along its current edge;
/// snapshotting once per rebuild keeps the O(n·k) pair scan free of that
/// work.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transceiver {
    pub id:       VehicleId,
    pub position: GeoPoint,
    pub range_m:  f64,
}

impl Transceiver {
    #[inline]
    pub fn new(id: VehicleId, position: GeoPoint, range_m: f64) -> Self {
        Self { id, position, range_m }
    }

    /// Great-circle distance to `other`, metres.
    #[inline]
    pub fn distance_m(&self, other: &Transceiver) -> f64 {
        self.position.distance_m(other.position)
    }

    /// Mutual coverage: both ranges must reach the other end.  A distance
    /// exactly equal to a range counts as covered.
    #[inline]
    pub fn links_with(&self, other: &Transceiver) -> bool {
        let d = self.distance_m(other);
        d <= self.range_m && d <= other.range_m
    }
}
