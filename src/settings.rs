//! Runtime configuration and the numeric constants shared across the crate.
//!
//! Settings are read from `config/default.toml` (or `config/local.toml`), then
//! overridden by `TMM_*` environment variables and command-line arguments, and
//! checked by `validate_config` before use.

use anyhow::{bail, ensure, Context, Result};
use clap::Parser;
use config::{Config, Environment, File};
use num_complex::Complex64;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use tracing::info;

use crate::material::OpticStack;
use crate::polarization::PolarizationMode;

/// Multiple of machine epsilon used as the tolerance of the forward-angle test.
pub const TOL: f64 = 100.0;
/// Machine epsilon for double precision.
pub const EPSILON: f64 = f64::EPSILON;
/// Largest imaginary part allowed in a layer phase thickness. Opaque layers are
/// clamped to this value to keep the transfer matrices finite.
pub const PHASE_IMAG_LIMIT: f64 = 100.0;
/// Angular distance from π/2 below which a single interface counts as grazing.
pub const GRAZING_TOLERANCE: f64 = 1e-6;
/// Decay rates and wavenumbers of an absorption profile below this are zeroed.
pub const ANALYTIC_RATE_FLOOR: f64 = 1e-30;


/// Runtime configuration for the application.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub polarization: PolarizationMode,
    /// Angle of incidence in degrees, measured in the incidence medium.
    pub angle: f64,
    pub wavelengths: Wavelengths,
    pub stack: OpticStack,
}

impl Settings {
    /// Launch angle in radians, as expected by the propagator.
    pub fn theta_0(&self) -> Complex64 {
        Complex64::new(self.angle.to_radians(), 0.0)
    }
}

/// Vacuum wavelengths to evaluate, either listed or as an evenly spaced range.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Wavelengths {
    List(Vec<f64>),
    /// `num` evenly spaced values from `start` to `stop` inclusive.
    Range { start: f64, stop: f64, num: usize },
}

impl Wavelengths {
    pub fn values(&self) -> Vec<f64> {
        match self {
            Wavelengths::List(values) => values.clone(),
            Wavelengths::Range { start, stop, num } => {
                ndarray::Array1::linspace(*start, *stop, *num).to_vec()
            }
        }
    }
}

/// Loads `config/default.toml` without environment or command-line overrides.
pub fn load_default_config() -> Result<Settings> {
    let root = retrieve_project_root()?;
    let default_config_file = root.join("config/default.toml");

    let settings = Config::builder()
        .add_source(File::from(default_config_file).required(true))
        .build()
        .context("loading configuration")?;

    let config: Settings = settings
        .try_deserialize()
        .context("deserializing configuration")?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads the configuration in layers: the file, then `TMM_*` environment
/// variables, then command-line arguments.
pub fn load_config() -> Result<Settings> {
    let root = retrieve_project_root()?;

    let default_config_file = root.join("config/default.toml");
    let local_config = root.join("config/local.toml");

    // local.toml takes precedence over the shipped defaults
    let config_file = if local_config.exists() {
        info!("using local configuration: {:?}", local_config);
        local_config
    } else {
        info!("using default configuration: {:?}", default_config_file);
        default_config_file
    };

    let settings = Config::builder()
        .add_source(File::from(config_file).required(true))
        .add_source(Environment::with_prefix("tmm"))
        .build()
        .context("loading configuration")?;

    let mut config: Settings = settings
        .try_deserialize()
        .context("deserializing configuration")?;

    let args = CliArgs::parse();

    if let Some(wavelengths) = args.w {
        config.wavelengths = Wavelengths::List(wavelengths);
    }
    if let Some(angle) = args.angle {
        config.angle = angle;
    }
    if let Some(polarization) = args.pol {
        config.polarization = polarization;
    }

    validate_config(&config)?;

    info!("{:#?}", config);

    Ok(config)
}

/// Retrieve the project root directory.
/// This function tries to find the project root directory in different ways:
/// 1. If the CARGO_MANIFEST_DIR environment variable is set, use it.
/// 2. If the TMM_ROOT_DIR environment variable is set, use it.
/// 3. If the "config" subdirectory is found in the executable directory or any of its parents, use it.
fn retrieve_project_root() -> Result<PathBuf> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        return Ok(PathBuf::from(manifest_dir));
    }
    if let Ok(path) = env::var("TMM_ROOT_DIR") {
        return Ok(PathBuf::from(path));
    }

    let exe_path = env::current_exe().context("locating the current executable")?;
    let mut current = exe_path.parent();
    while let Some(dir) = current {
        if dir.join("config").is_dir() {
            return Ok(dir.to_path_buf());
        }
        current = dir.parent();
    }
    bail!("could not find a project root containing a config directory")
}

fn validate_config(config: &Settings) -> Result<()> {
    ensure!(
        (0.0..90.0).contains(&config.angle),
        "Angle of incidence must be in [0, 90) degrees, got {}",
        config.angle
    );
    let wavelengths = config.wavelengths.values();
    ensure!(!wavelengths.is_empty(), "At least one wavelength is required");
    ensure!(
        wavelengths.iter().all(|lam| lam.is_finite() && *lam > 0.0),
        "Wavelengths must be greater than 0"
    );
    for (i, layer) in config.stack.layers.iter().enumerate() {
        ensure!(
            layer.thickness.is_finite() && layer.thickness >= 0.0,
            "Layer {} has invalid thickness {}",
            i + 1,
            layer.thickness
        );
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(version, about = "TMM - coherent transfer matrix optics of thin-film stacks")]
pub struct CliArgs {
    /// Vacuum wavelengths, in the same unit as the layer thicknesses, separated by spaces.
    #[arg(short, long, value_parser, num_args = 1.., value_delimiter = ' ')]
    w: Option<Vec<f64>>,

    /// Angle of incidence in degrees.
    #[arg(short, long)]
    angle: Option<f64>,

    /// Polarization: `s`, `p`, or `u` for unpolarized light.
    #[arg(short, long)]
    pol: Option<PolarizationMode>,
}
