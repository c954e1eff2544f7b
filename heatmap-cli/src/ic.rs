use clap::ValueEnum;
use heatmap_core::Heatmap;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IcType {
    Uniform,
    HotSpot,
    Gradient,
    Sine,
    RandomSpots,
}

impl IcType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IcType::Uniform => "uniform",
            IcType::HotSpot => "hot-spot",
            IcType::Gradient => "gradient",
            IcType::Sine => "sine",
            IcType::RandomSpots => "random-spots",
        }
    }
}

/// Seed the interior of `h` between `ambient` and `hot`. The boundary ring is
/// left as constructed.
///
/// Grids without interior nodes are left untouched. Only `RandomSpots`
/// draws from `rng`.
pub fn apply_ic<R: Rng>(
    rng: &mut R,
    h: &mut Heatmap,
    ic: IcType,
    ambient: f64,
    hot: f64,
) -> heatmap_core::Result<()> {
    let (rows, cols) = (h.rows(), h.cols());
    if rows < 3 || cols < 3 {
        return Ok(());
    }
    let span = hot - ambient;

    match ic {
        IcType::Uniform => {
            h.set_region(1..rows - 1, 1..cols - 1, hot)?;
        }

        IcType::HotSpot => {
            // central 20% of the plate in each direction
            let band = |n: usize| {
                let last = (n - 1) as f64;
                let lo = (0.4 * last).ceil() as usize;
                let hi = ((0.6 * last).floor() as usize).max(lo);
                lo.max(1)..(hi + 1).min(n - 1)
            };
            h.set_region(band(rows), band(cols), hot)?;
        }

        IcType::Gradient => {
            let last = (cols - 1) as f64;
            fill_interior(h, |_, j| ambient + span * (j as f64 / last))?;
        }

        IcType::Sine => {
            let (ri, rj) = ((rows - 1) as f64, (cols - 1) as f64);
            fill_interior(h, |i, j| {
                let s = (std::f64::consts::PI * i as f64 / ri).sin()
                    * (std::f64::consts::PI * j as f64 / rj).sin();
                ambient + span * s
            })?;
        }

        IcType::RandomSpots => {
            let spots = rng.gen_range(1..=4);
            for _ in 0..spots {
                let i0 = rng.gen_range(1..rows - 1);
                let j0 = rng.gen_range(1..cols - 1);
                let h_len = rng.gen_range(1..=(rows / 4).max(1));
                let w_len = rng.gen_range(1..=(cols / 4).max(1));
                let t = ambient + span * rng.gen_range(0.5..=1.0);

                let i1 = (i0 + h_len).min(rows - 1);
                let j1 = (j0 + w_len).min(cols - 1);
                h.set_region(i0..i1, j0..j1, t)?;
            }
        }
    }

    Ok(())
}

fn fill_interior<F>(h: &mut Heatmap, f: F) -> heatmap_core::Result<()>
where
    F: Fn(usize, usize) -> f64,
{
    for i in 1..h.rows() - 1 {
        for j in 1..h.cols() - 1 {
            h.set(i, j, f(i, j))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatmap_core::AMBIENT;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const ALL: [IcType; 5] = [
        IcType::Uniform,
        IcType::HotSpot,
        IcType::Gradient,
        IcType::Sine,
        IcType::RandomSpots,
    ];

    fn seeded(ic: IcType, seed: u64) -> Heatmap {
        let mut h = Heatmap::new(16, 24, 1e-4, 1e-3).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        apply_ic(&mut rng, &mut h, ic, AMBIENT, 373.15).unwrap();
        h
    }

    #[test]
    fn boundary_stays_ambient() {
        for ic in ALL {
            let h = seeded(ic, 7);
            for i in 0..h.rows() {
                for j in 0..h.cols() {
                    if i == 0 || j == 0 || i == h.rows() - 1 || j == h.cols() - 1 {
                        assert_eq!(h.get(i, j).unwrap(), AMBIENT, "{}", ic.as_str());
                    }
                }
            }
        }
    }

    #[test]
    fn values_stay_between_ambient_and_hot() {
        for ic in ALL {
            let h = seeded(ic, 11);
            let (lo, hi) = h.extrema();
            assert!(lo >= AMBIENT - 1e-9, "{}", ic.as_str());
            assert!(hi <= 373.15 + 1e-9, "{}", ic.as_str());
            assert!(hi > AMBIENT, "{} left the plate cold", ic.as_str());
        }
    }

    #[test]
    fn hot_spot_is_central() {
        let h = seeded(IcType::HotSpot, 0);
        assert_eq!(h.get(8, 12).unwrap(), 373.15);
        assert_eq!(h.get(2, 2).unwrap(), AMBIENT);
    }

    #[test]
    fn gradient_increases_along_columns() {
        let h = seeded(IcType::Gradient, 0);
        for j in 2..h.cols() - 1 {
            assert!(h.get(5, j).unwrap() > h.get(5, j - 1).unwrap());
        }
    }

    #[test]
    fn random_spots_are_reproducible() {
        assert_eq!(seeded(IcType::RandomSpots, 42), seeded(IcType::RandomSpots, 42));
    }

    #[test]
    fn grids_without_interior_are_untouched() {
        let mut h = Heatmap::new(2, 9, 1e-4, 1e-3).unwrap();
        let before = h.snapshot();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        apply_ic(&mut rng, &mut h, IcType::Uniform, AMBIENT, 400.0).unwrap();
        assert_eq!(h, before);
    }
}
