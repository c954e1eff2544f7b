//! Textual export and diagnostics

use std::fmt::{self, Write};

use crate::heatmap::Heatmap;

impl Heatmap {
    /// Row-grouped bracketed form, e.g. `[[1, 2],\n [3, 4]]`.
    ///
    /// For inspection only; not meant to be parsed back.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// One CSV line: `diffusivity,cols,spacing,cell_0,...,cell_{N-1}`.
    ///
    /// Cells are in row-major order with no trailing comma. Numbers use the
    /// shortest representation that round-trips (`0.0001`, `293.15`).
    pub fn report(&self) -> String {
        let mut line = format!("{},{},{}", self.diffusivity(), self.cols(), self.spacing());
        for v in self.cells() {
            // writing into a String cannot fail
            let _ = write!(line, ",{v}");
        }
        line
    }

    /// Arithmetic mean of every cell.
    pub fn average(&self) -> f64 {
        // running mean: a uniform field returns its fill value exactly
        self.cells()
            .iter()
            .enumerate()
            .fold(0.0, |mean, (n, &v)| mean + (v - mean) / (n + 1) as f64)
    }

    /// Coldest and hottest cell, `(min, max)`.
    pub fn extrema(&self) -> (f64, f64) {
        self.cells()
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

impl fmt::Display for Heatmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cols = self.cols();
        f.write_str("[")?;
        for (i, row) in self.cells().chunks(cols).enumerate() {
            if i != 0 {
                f.write_str(",\n ")?;
            }
            f.write_str("[")?;
            for (j, v) in row.iter().enumerate() {
                if j != 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{v}")?;
            }
            f.write_str("]")?;
        }
        f.write_str("]")
    }
}
