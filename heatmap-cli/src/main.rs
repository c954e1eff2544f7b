mod ic;
mod scenario;

use clap::Parser;
use heatmap_core::{AMBIENT, Heatmap};
use ic::IcType;
use scenario::Scenario;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Output directory
    #[arg(long)]
    out: PathBuf,

    /// JSON scenario file; replaces the plate and stepping flags below
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Number of rows
    #[arg(long, default_value_t = 50)]
    rows: usize,

    /// Number of columns
    #[arg(long, default_value_t = 75)]
    cols: usize,

    /// Thermal diffusivity (m^2/s)
    #[arg(long, default_value_t = 1e-4)]
    diffusivity: f64,

    /// Node spacing (m)
    #[arg(long, default_value_t = 1e-3)]
    spacing: f64,

    /// Ambient and boundary temperature (K)
    #[arg(long, default_value_t = AMBIENT)]
    ambient: f64,

    /// Peak initial temperature (K)
    #[arg(long, default_value_t = 373.15)]
    hot: f64,

    /// Initial condition
    #[arg(long, value_enum, default_value_t = IcType::HotSpot)]
    ic: IcType,

    /// RNG seed for random initial conditions
    #[arg(long, default_value_t = 123)]
    seed: u64,

    /// Number of timesteps
    #[arg(long, default_value_t = 400)]
    steps: usize,

    /// Fixed timestep (s); defaults to safety * stability limit
    #[arg(long)]
    dt: Option<f64>,

    /// Fraction of the stability limit used when --dt is absent
    #[arg(long, default_value_t = 0.5)]
    safety: f64,

    /// Write a report line every N steps
    #[arg(long, default_value_t = 10)]
    report_every: usize,

    /// Print the final field to stdout
    #[arg(long)]
    render: bool,
}

impl Args {
    fn to_scenario(&self) -> Scenario {
        Scenario {
            rows: self.rows,
            cols: self.cols,
            diffusivity: self.diffusivity,
            spacing: self.spacing,
            ambient: self.ambient,
            hot: self.hot,
            ic: self.ic,
            seed: self.seed,
            steps: self.steps,
            dt: self.dt,
            safety: self.safety,
            report_every: self.report_every,
        }
    }
}

#[derive(Serialize)]
struct MetaRow {
    step: usize,
    time: f64,
    dt: f64,
    average: f64,
    min: f64,
    max: f64,
}

impl MetaRow {
    fn new(h: &Heatmap, step: usize, dt: f64) -> MetaRow {
        let (min, max) = h.extrema();
        MetaRow {
            step,
            time: step as f64 * dt,
            dt,
            average: h.average(),
            min,
            max,
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let args = Args::parse();

    let scenario = match &args.scenario {
        Some(path) => {
            info!(path = %path.display(), "loading scenario");
            Scenario::load(path)?
        }
        None => args.to_scenario(),
    };
    scenario.validate()?;

    let mut h = scenario.build()?;
    let limit = h.stability_limit();
    let dt = scenario.timestep(limit);
    if !(dt <= limit) {
        return Err(heatmap_core::Error::UnstableTimestep { dt, limit }.into());
    }

    info!(
        rows = scenario.rows,
        cols = scenario.cols,
        ic = scenario.ic.as_str(),
        steps = scenario.steps,
        dt,
        limit,
        "starting run"
    );

    fs::create_dir_all(&args.out)?;

    let mut scenario_file = BufWriter::new(File::create(args.out.join("scenario.json"))?);
    serde_json::to_writer_pretty(&mut scenario_file, &scenario)?;
    scenario_file.write_all(b"\n")?;
    scenario_file.flush()?;

    let mut report_writer = BufWriter::new(File::create(args.out.join("report.csv"))?);
    let mut meta_writer = BufWriter::new(File::create(args.out.join("meta.jsonl"))?);

    let mut record = |h: &Heatmap, step: usize| -> Result<(), Box<dyn std::error::Error>> {
        writeln!(report_writer, "{}", h.report())?;
        serde_json::to_writer(&mut meta_writer, &MetaRow::new(h, step, dt))?;
        meta_writer.write_all(b"\n")?;
        debug!(step, average = h.average(), "recorded");
        Ok(())
    };

    record(&h, 0)?;
    for step in 1..=scenario.steps {
        h.step(dt)?;
        if step % scenario.report_every == 0 || step == scenario.steps {
            record(&h, step)?;
        }
    }
    drop(record);

    report_writer.flush()?;
    meta_writer.flush()?;

    let (min, max) = h.extrema();
    info!(average = h.average(), min, max, "run complete");

    if args.render {
        println!("{h}");
    }
    println!("Wrote run to: {}", args.out.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_scenario() {
        let args = Args::try_parse_from([
            "heatmap-cli",
            "--out",
            "run",
            "--rows",
            "12",
            "--ic",
            "random-spots",
            "--dt",
            "0.002",
        ])
        .unwrap();
        let s = args.to_scenario();
        assert_eq!(s.rows, 12);
        assert_eq!(s.cols, 75);
        assert_eq!(s.ic, IcType::RandomSpots);
        assert_eq!(s.dt, Some(0.002));
        assert_eq!(s.ambient, AMBIENT);
    }

    #[test]
    fn default_flags_match_default_scenario() {
        let args = Args::try_parse_from(["heatmap-cli", "--out", "run"]).unwrap();
        assert_eq!(args.to_scenario(), Scenario::default());
    }

    #[test]
    fn meta_row_tracks_time() {
        let h = Heatmap::new(3, 3, 1e-4, 1e-3).unwrap();
        let row = MetaRow::new(&h, 4, 0.5);
        assert_eq!(row.time, 2.0);
        assert_eq!((row.min, row.max), (AMBIENT, AMBIENT));
    }
}
