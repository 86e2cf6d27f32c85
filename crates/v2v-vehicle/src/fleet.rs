//! `VehicleFleet`: id-indexed arena owning every live vehicle.
//!
//! Vehicle ids are slot indices.  Slots of retired vehicles stay `None`
//! forever, so an id is never handed out twice within one fleet and stale
//! ids held elsewhere simply miss.

use std::sync::Arc;

use v2v_core::{Transceiver, VehicleId};
use v2v_road::RoadNetwork;

use crate::{Vehicle, VehicleError, VehicleParams, VehicleResult};

pub struct VehicleFleet {
    network: Arc<RoadNetwork>,
    seed:    u64,
    slots:   Vec<Option<Vehicle>>,
    live:    usize,
}

impl VehicleFleet {
    /// Empty fleet bound to `network`.  `seed` drives every vehicle's RNG.
    pub fn new(network: Arc<RoadNetwork>, seed: u64) -> Self {
        Self { network, seed, slots: Vec::new(), live: 0 }
    }

    #[inline]
    pub fn network(&self) -> &Arc<RoadNetwork> {
        &self.network
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Create a vehicle and return its freshly allocated id.
    pub fn spawn(&mut self, params: VehicleParams) -> VehicleResult<VehicleId> {
        let raw = u32::try_from(self.slots.len()).map_err(|_| VehicleError::IdsExhausted)?;
        let id = VehicleId(raw);
        if id == VehicleId::INVALID {
            return Err(VehicleError::IdsExhausted);
        }
        let vehicle = Vehicle::new(id, Arc::clone(&self.network), params, self.seed)?;
        self.slots.push(Some(vehicle));
        self.live += 1;
        Ok(id)
    }

    /// Remove a vehicle, returning it.  `None` if the id is unknown or
    /// already retired.
    pub fn retire(&mut self, id: VehicleId) -> Option<Vehicle> {
        let vehicle = self.slots.get_mut(id.index())?.take()?;
        self.live -= 1;
        Some(vehicle)
    }

    #[inline]
    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.slots.get(id.index())?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    #[inline]
    pub fn contains(&self, id: VehicleId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live vehicles.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live vehicles in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> + '_ {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Vehicle> + '_ {
        self.slots.iter_mut().flatten()
    }

    pub fn ids(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.iter().map(Vehicle::id)
    }

    /// Radio snapshot of every live vehicle.
    pub fn transceivers(&self) -> Vec<Transceiver> {
        self.iter().map(Vehicle::transceiver).collect()
    }
}
