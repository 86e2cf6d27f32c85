//! Scan-mode selection.

use v2v_antenna::GridConfig;

/// How candidate pairs are enumerated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScanMode {
    /// Indexed once the fleet reaches [`IndexConfig::min_fleet`], classic
    /// below it.
    #[default]
    Auto,
    /// Always check every pair.
    Classic,
    /// Always go through the antenna grid, whatever the fleet size.
    Indexed,
}

impl std::fmt::Display for ScanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ScanMode::Auto    => "auto",
            ScanMode::Classic => "classic",
            ScanMode::Indexed => "indexed",
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IndexConfig {
    pub mode:      ScanMode,
    /// Fleets smaller than this skip the index in `Auto` mode; below it the
    /// grid costs more than it saves.
    pub min_fleet: usize,
    pub grid:      GridConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { mode: ScanMode::Auto, min_fleet: 20, grid: GridConfig::default() }
    }
}
