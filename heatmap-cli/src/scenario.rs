use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use heatmap_core::{AMBIENT, Heatmap};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::ic::{IcType, apply_ic};

/// Everything needed to reproduce a run. Missing JSON fields fall back to
/// [`Scenario::default`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub rows: usize,
    pub cols: usize,
    pub diffusivity: f64,
    pub spacing: f64,

    pub ambient: f64,
    pub hot: f64,
    pub ic: IcType,
    pub seed: u64,

    pub steps: usize,
    /// Fixed timestep; when absent `safety * stability_limit` is used.
    pub dt: Option<f64>,
    pub safety: f64,
    pub report_every: usize,
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario {
            rows: 50,
            cols: 75,
            diffusivity: 1e-4,
            spacing: 1e-3,
            ambient: AMBIENT,
            hot: 373.15,
            ic: IcType::HotSpot,
            seed: 123,
            steps: 400,
            dt: None,
            safety: 0.5,
            report_every: 10,
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Scenario, Box<dyn std::error::Error>> {
        let reader = BufReader::new(File::open(path)?);
        let scenario = serde_json::from_reader(reader)?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.report_every == 0 {
            return Err("report_every must be >= 1".into());
        }
        if !(self.safety > 0.0 && self.safety <= 1.0) {
            return Err("safety must be in (0, 1]".into());
        }
        Ok(())
    }

    /// Builds the plate at ambient temperature and seeds the initial
    /// condition.
    pub fn build(&self) -> heatmap_core::Result<Heatmap> {
        let mut h = Heatmap::with_temperature(
            self.rows,
            self.cols,
            self.diffusivity,
            self.spacing,
            self.ambient,
        )?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        apply_ic(&mut rng, &mut h, self.ic, self.ambient, self.hot)?;
        Ok(h)
    }

    pub fn timestep(&self, limit: f64) -> f64 {
        self.dt.unwrap_or(self.safety * limit)
    }
}
