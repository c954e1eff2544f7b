//! Explicit finite-difference heat diffusion on a uniform 2D mesh.
//!
//! A [`Heatmap`] owns a row-major temperature field (Kelvin) together with
//! the material diffusivity and node spacing. Interior nodes are advanced
//! with a five-point stencil, rows in parallel; the outer ring is a fixed
//! boundary that only direct writes can change.

mod error;
mod heatmap;
mod report;

pub use error::{Error, Result};
pub use heatmap::{AMBIENT, Heatmap, StepInfo};
