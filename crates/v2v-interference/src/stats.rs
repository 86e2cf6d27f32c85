use crate::ScanMode;

/// Summary of one rebuild.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphStats {
    pub vehicles:          usize,
    /// Undirected direct links.
    pub direct_links:      usize,
    /// Unordered pairs that can reach each other over any path.
    pub reachable_pairs:   usize,
    pub components:        usize,
    pub largest_component: usize,
    /// Vehicles with no direct link.
    pub isolated:          usize,
    /// Scan actually used for this rebuild.
    pub mode:              ScanMode,
    /// Pairs whose distance was computed.
    pub pairs_checked:     usize,
    pub elapsed_us:        u64,
}

impl GraphStats {
    /// Mean number of direct neighbours per vehicle.
    pub fn mean_degree(&self) -> f64 {
        if self.vehicles == 0 {
            0.0
        } else {
            2.0 * self.direct_links as f64 / self.vehicles as f64
        }
    }

    /// Mean reachable-set size per vehicle.
    pub fn mean_reachable(&self) -> f64 {
        if self.vehicles == 0 {
            0.0
        } else {
            2.0 * self.reachable_pairs as f64 / self.vehicles as f64
        }
    }
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} vehicles, {} links ({:.2}/vehicle), {} components (largest {}), {} isolated, {} scan, {} pairs in {} µs",
            self.vehicles,
            self.direct_links,
            self.mean_degree(),
            self.components,
            self.largest_component,
            self.isolated,
            self.mode,
            self.pairs_checked,
            self.elapsed_us,
        )
    }
}
