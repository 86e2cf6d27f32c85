//! Demo configuration: an optional TOML file, overridden by CLI flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use v2v_interference::ScanMode;
use v2v_sim::EngineConfig;

/// Headless V2V connectivity simulation.
#[derive(Parser, Debug)]
#[command(name = "headless")]
#[command(about = "Run the V2V connectivity simulator without a GUI", long_about = None)]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of vehicles to spawn
    #[arg(short = 'n', long)]
    pub vehicles: Option<usize>,

    /// Number of ticks to run
    #[arg(short, long)]
    pub ticks: Option<u64>,

    /// Master seed
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Pair scan: auto, classic or indexed
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Simulated seconds per wall second
    #[arg(long)]
    pub speed: Option<f64>,

    /// Node CSV (`id,lat,lon`); requires --edges
    #[arg(long, requires = "edges")]
    pub nodes: Option<PathBuf>,

    /// Edge CSV (`from,to,length_m,highway,oneway`); requires --nodes
    #[arg(long, requires = "nodes")]
    pub edges: Option<PathBuf>,

    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub rows:       usize,
    pub cols:       usize,
    pub spacing_m:  f64,
    pub origin_lat: f64,
    pub origin_lon: f64,
    pub nodes_csv:  Option<String>,
    pub edges_csv:  Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rows:       30,
            cols:       30,
            spacing_m:  150.0,
            origin_lat: 48.8566,
            origin_lon: 2.3522,
            nodes_csv:  None,
            edges_csv:  None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub vehicles:             usize,
    pub min_speed_mps:        f64,
    pub max_speed_mps:        f64,
    pub min_range_m:          f64,
    pub max_range_m:          f64,
    pub collision_distance_m: f64,
    pub enforce_oneway:       bool,
    /// Random draws per spawn point before falling back to a scan.
    pub spawn_attempts:       u32,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            vehicles:             200,
            min_speed_mps:        8.0,
            max_speed_mps:        20.0,
            min_range_m:          150.0,
            max_range_m:          500.0,
            collision_distance_m: 5.0,
            enforce_oneway:       false,
            spawn_attempts:       32,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub ticks:             u64,
    /// Wall milliseconds the manual clock advances per tick.
    pub tick_ms:           u64,
    /// Log a progress line every this many ticks.
    pub report_every:      u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { ticks: 600, tick_ms: 100, report_every: 100 }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub engine:  EngineConfig,
    pub network: NetworkConfig,
    pub fleet:   FleetConfig,
    pub run:     RunConfig,
}

impl DemoConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// File values (or defaults), then CLI overrides.
    pub fn resolve(args: &Args) -> Result<Self> {
        let mut cfg = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(n) = args.vehicles {
            cfg.fleet.vehicles = n;
        }
        if let Some(t) = args.ticks {
            cfg.run.ticks = t;
        }
        if let Some(s) = args.seed {
            cfg.engine.seed = s;
        }
        if let Some(s) = args.speed {
            cfg.engine.speed_multiplier = s;
        }
        if let Some(m) = &args.mode {
            cfg.engine.index.mode = parse_mode(m)?;
        }
        if let (Some(n), Some(e)) = (&args.nodes, &args.edges) {
            cfg.network.nodes_csv = Some(n.display().to_string());
            cfg.network.edges_csv = Some(e.display().to_string());
        }
        cfg.run.tick_ms = cfg.run.tick_ms.max(1);
        cfg.fleet.validate()?;
        Ok(cfg)
    }
}

impl FleetConfig {
    /// Speeds, ranges and the collision distance must be finite and
    /// non-negative; they feed the spawn sampler directly.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("min_speed_mps", self.min_speed_mps),
            ("max_speed_mps", self.max_speed_mps),
            ("min_range_m", self.min_range_m),
            ("max_range_m", self.max_range_m),
            ("collision_distance_m", self.collision_distance_m),
        ];
        for (name, value) in fields {
            anyhow::ensure!(
                value.is_finite() && value >= 0.0,
                "fleet.{name} must be a finite, non-negative number (got {value})"
            );
        }
        Ok(())
    }
}

fn parse_mode(s: &str) -> Result<ScanMode> {
    match s.to_ascii_lowercase().as_str() {
        "auto"    => Ok(ScanMode::Auto),
        "classic" => Ok(ScanMode::Classic),
        "indexed" => Ok(ScanMode::Indexed),
        other     => anyhow::bail!("unknown scan mode {other:?} (expected auto, classic or indexed)"),
    }
}
