use std::fmt;
use std::ops::Range;

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// Default fill temperature: 20°C expressed in Kelvin.
pub const AMBIENT: f64 = 293.15;

// Largest substep count whose f64 form is exact.
const MAX_SUBSTEPS: u64 = 1 << 53;

/// Temperature field on a uniform rectangular mesh.
///
/// Cells are stored row-major; `(i, j)` is row `i`, column `j`. The field is
/// advanced with an explicit five-point stencil in which the diffusivity
/// enters linearly:
///
/// ```text
/// T'[i,j] = T[i,j] + c * dt * (d2T/dx2 + d2T/dy2)
/// ```
///
/// The scheme is accepted for `dt <= d^2 / (2c)`. Boundary cells are never
/// touched by stepping.
pub struct Heatmap {
    rows: usize,
    cols: usize,
    diffusivity: f64,
    spacing: f64,
    cells: Vec<f64>,
    // pre-step snapshot, reused across steps
    prev: Vec<f64>,
}

/// Outcome of [`Heatmap::advance`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepInfo {
    pub substeps: u64,
    pub dt: f64,
}

impl Heatmap {
    /// Creates a `rows x cols` grid filled with [`AMBIENT`].
    pub fn new(rows: usize, cols: usize, diffusivity: f64, spacing: f64) -> Result<Heatmap> {
        Self::build(rows, cols, diffusivity, spacing, AMBIENT)
    }

    /// Creates a grid filled with `temperature`, which must be a finite,
    /// non-negative Kelvin value.
    pub fn with_temperature(
        rows: usize,
        cols: usize,
        diffusivity: f64,
        spacing: f64,
        temperature: f64,
    ) -> Result<Heatmap> {
        check_temperature(temperature)?;
        Self::build(rows, cols, diffusivity, spacing, temperature)
    }

    fn build(
        rows: usize,
        cols: usize,
        diffusivity: f64,
        spacing: f64,
        fill: f64,
    ) -> Result<Heatmap> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimension { rows, cols });
        }
        let size = rows
            .checked_mul(cols)
            .ok_or(Error::CapacityOverflow { rows, cols })?;
        check_parameter("diffusivity", diffusivity)?;
        check_parameter("spacing", spacing)?;

        let mut cells = Vec::new();
        cells
            .try_reserve_exact(size)
            .map_err(|_| Error::CapacityOverflow { rows, cols })?;
        cells.resize(size, fill);

        debug!(rows, cols, diffusivity, spacing, fill, "heatmap created");

        Ok(Heatmap {
            rows,
            cols,
            diffusivity,
            spacing,
            cells,
            prev: Vec::new(),
        })
    }

    // ---- Accessors ----

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn diffusivity(&self) -> f64 {
        self.diffusivity
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Flat row-major view of the field.
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    pub fn get(&self, i: usize, j: usize) -> Result<f64> {
        let idx = self.index(i, j)?;
        Ok(self.cells[idx])
    }

    pub fn set(&mut self, i: usize, j: usize, temperature: f64) -> Result<()> {
        let idx = self.index(i, j)?;
        check_temperature(temperature)?;
        self.cells[idx] = temperature;
        Ok(())
    }

    /// Writes `temperature` into every cell of the `rows x cols` block.
    ///
    /// The whole block is validated before anything is written. An empty
    /// block is a no-op.
    pub fn set_region(
        &mut self,
        rows: Range<usize>,
        cols: Range<usize>,
        temperature: f64,
    ) -> Result<()> {
        if rows.is_empty() || cols.is_empty() {
            return Ok(());
        }
        if rows.end > self.rows || cols.end > self.cols {
            return Err(self.out_of_range(rows.end - 1, cols.end - 1));
        }
        check_temperature(temperature)?;

        for i in rows {
            let row = i * self.cols;
            self.cells[row + cols.start..row + cols.end].fill(temperature);
        }
        Ok(())
    }

    /// Independent deep copy of the grid.
    pub fn snapshot(&self) -> Heatmap {
        self.clone()
    }

    fn index(&self, i: usize, j: usize) -> Result<usize> {
        if i >= self.rows || j >= self.cols {
            return Err(self.out_of_range(i, j));
        }
        Ok(i * self.cols + j)
    }

    fn out_of_range(&self, i: usize, j: usize) -> Error {
        Error::IndexOutOfRange {
            i,
            j,
            rows: self.rows,
            cols: self.cols,
        }
    }

    // ---- Stepping ----

    /// Largest accepted timestep, `d^2 / (2c)`.
    pub fn stability_limit(&self) -> f64 {
        (self.spacing * self.spacing) / (2.0 * self.diffusivity)
    }

    /// Advances the interior by one explicit timestep.
    ///
    /// Fails without touching the field when `dt` is negative, NaN, or above
    /// [`stability_limit`](Self::stability_limit).
    pub fn step(&mut self, dt: f64) -> Result<()> {
        if dt.is_nan() || dt < 0.0 {
            return Err(Error::InvalidParameter { name: "dt", value: dt });
        }
        let limit = self.stability_limit();
        if dt > limit {
            return Err(Error::UnstableTimestep { dt, limit });
        }
        self.explicit_step(dt);
        Ok(())
    }

    /// Advances by `duration` using equal substeps no larger than
    /// `safety * stability_limit()`.
    ///
    /// `safety` must lie in `(0, 1]`. A zero duration runs no substeps; a
    /// duration needing more than 2^53 substeps is rejected.
    pub fn advance(&mut self, duration: f64, safety: f64) -> Result<StepInfo> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(Error::InvalidParameter {
                name: "duration",
                value: duration,
            });
        }
        if !(safety > 0.0 && safety <= 1.0) {
            return Err(Error::InvalidParameter {
                name: "safety",
                value: safety,
            });
        }
        if duration == 0.0 {
            return Ok(StepInfo { substeps: 0, dt: 0.0 });
        }

        let too_long = Error::InvalidParameter {
            name: "duration",
            value: duration,
        };
        let limit = self.stability_limit();
        let n = (duration / (safety * limit)).ceil();
        if !(n <= MAX_SUBSTEPS as f64) {
            return Err(too_long);
        }
        let mut k = (n as u64).max(1);
        // rounding in the division can land one ulp above the limit
        while duration / (k as f64) > limit {
            k = k
                .checked_add(1)
                .filter(|&k| k <= MAX_SUBSTEPS)
                .ok_or(too_long.clone())?;
        }
        let dt = duration / (k as f64);

        debug!(duration, safety, substeps = k, dt, "advancing");
        for _ in 0..k {
            self.explicit_step(dt);
        }

        Ok(StepInfo { substeps: k, dt })
    }

    // ---- Internal numeric routines ----

    fn explicit_step(&mut self, dt: f64) {
        let (rows, cols) = (self.rows, self.cols);
        if rows < 3 || cols < 3 {
            return;
        }

        self.prev.clear();
        self.prev.extend_from_slice(&self.cells);
        let prev = &self.prev;

        let d2 = self.spacing * self.spacing;
        let k = self.diffusivity * dt;

        // Interior rows only; each output row reads the frozen snapshot.
        self.cells[cols..(rows - 1) * cols]
            .par_chunks_mut(cols)
            .enumerate()
            .for_each(|(r, row)| {
                let at = (r + 1) * cols;
                for j in 1..cols - 1 {
                    let u = prev[at + j];
                    let ddx = (prev[at + cols + j] - 2.0 * u + prev[at - cols + j]) / d2;
                    let ddy = (prev[at + j + 1] - 2.0 * u + prev[at + j - 1]) / d2;
                    row[j] = u + k * (ddx + ddy);
                }
            });

        trace!(dt, "explicit step");
    }
}

impl Clone for Heatmap {
    fn clone(&self) -> Self {
        Heatmap {
            rows: self.rows,
            cols: self.cols,
            diffusivity: self.diffusivity,
            spacing: self.spacing,
            cells: self.cells.clone(),
            prev: Vec::new(),
        }
    }
}

impl fmt::Debug for Heatmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heatmap")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("diffusivity", &self.diffusivity)
            .field("spacing", &self.spacing)
            .field("cells", &self.cells)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Heatmap {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self.diffusivity == other.diffusivity
            && self.spacing == other.spacing
            && self.cells == other.cells
    }
}

fn check_temperature(t: f64) -> Result<()> {
    if !t.is_finite() || t < 0.0 {
        return Err(Error::InvalidTemperature(t));
    }
    Ok(())
}

fn check_parameter(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidParameter { name, value });
    }
    Ok(())
}
