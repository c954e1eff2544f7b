//! Heatmap errors

use thiserror::Error;

/// Heatmap result type
pub type Result<T> = std::result::Result<T, Error>;

/// Heatmap errors
///
/// Every variant is a caller contract violation or a numerical constraint;
/// none of them is transient.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("grid must have at least one element (rows = {rows}, cols = {cols})")]
    InvalidDimension { rows: usize, cols: usize },

    #[error("grid of {rows} x {cols} cells does not fit in memory")]
    CapacityOverflow { rows: usize, cols: usize },

    #[error("invalid temperature: {0}K")]
    InvalidTemperature(f64),

    #[error("index ({i}, {j}) out of range for {rows} x {cols} grid")]
    IndexOutOfRange {
        i: usize,
        j: usize,
        rows: usize,
        cols: usize,
    },

    #[error("time step dt = {dt} exceeds stability limit: dt <= {limit}")]
    UnstableTimestep { dt: f64, limit: f64 },

    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}
