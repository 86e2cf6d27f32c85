//! Grid layout parameters.

/// Layout of the antenna grid.
///
/// Out-of-range values are clamped by [`GridConfig::sanitized`] rather than
/// rejected; a grid always gets built.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    /// Number of macro cells (k in the k-means placement).
    pub macro_cells:           usize,
    /// Micro cells per macro cell, laid out on a `ceil(sqrt(n))` square grid.
    pub micro_per_macro:       usize,
    /// Centroid-relocation rounds.  Kept small: placement quality only
    /// affects speed, never correctness.
    pub kmeans_iterations:     u32,
    /// Positions sampled (by uniform stride) for the k-means.
    pub sample_cap:            usize,
    /// Inflation applied to the derived macro radius.
    pub macro_radius_margin:   f64,
    /// Two macro cells are neighbours when their centres are closer than
    /// `(r1 + r2) * macro_neighbor_margin`.
    pub macro_neighbor_margin: f64,
    /// Transmission range the micro neighbourhoods are first computed for.
    /// Grown automatically when a vehicle with a larger range shows up.
    pub nominal_range_m:       f64,
    /// Lower bound on the macro radius, so a fleet bunched on one spot does
    /// not produce zero-sized cells.
    pub min_macro_radius_m:    f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            macro_cells:           10,
            micro_per_macro:       10,
            kmeans_iterations:     3,
            sample_cap:            1_000,
            macro_radius_margin:   1.5,
            macro_neighbor_margin: 1.5,
            nominal_range_m:       1_000.0,
            min_macro_radius_m:    100.0,
        }
    }
}

impl GridConfig {
    /// Copy with every field forced into its usable range.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let positive = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };
        Self {
            macro_cells:           self.macro_cells.max(1),
            micro_per_macro:       self.micro_per_macro.max(1),
            kmeans_iterations:     self.kmeans_iterations,
            sample_cap:            self.sample_cap.max(1),
            macro_radius_margin:   positive(self.macro_radius_margin, defaults.macro_radius_margin),
            macro_neighbor_margin: positive(self.macro_neighbor_margin, defaults.macro_neighbor_margin),
            nominal_range_m:       if self.nominal_range_m.is_finite() && self.nominal_range_m >= 0.0 {
                self.nominal_range_m
            } else {
                defaults.nominal_range_m
            },
            min_macro_radius_m:    positive(self.min_macro_radius_m, defaults.min_macro_radius_m),
        }
    }
}
