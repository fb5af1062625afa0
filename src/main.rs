use std::{ fs, path::{ Path, PathBuf }, str::FromStr, time::Instant };
use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use ndarray as nd;
use ndarray_npy::NpzWriter;
use fdstep::{ config::RunConfig, simulation::{ Frame, Simulation } };

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the run file.
    #[arg(short, long)]
    toml: PathBuf,

    /// Number of time steps to take.
    #[arg(short, long, default_value_t = 500)]
    steps: usize,

    /// Record a frame every this many steps.
    #[arg(short, long, default_value_t = 10)]
    every: usize,

    /// Output `.npz` file.
    #[arg(short, long, default_value = "output/fdstep.npz")]
    output: PathBuf,

    /// Log level (off, error, warn, info, debug, trace).
    #[arg(short, long)]
    verbosity: Option<String>,
}

/// Frames recorded over a run.
#[derive(Default)]
struct Record {
    t: Vec<f64>,
    re: Vec<nd::ArrayD<f64>>,
    im: Vec<nd::ArrayD<f64>>,
    density: Vec<nd::ArrayD<f64>>,
}

impl Record {
    fn push(&mut self, t: f64, frame: Frame) {
        self.t.push(t);
        self.re.push(frame.re);
        if let Some(im) = frame.im { self.im.push(im); }
        if let Some(density) = frame.density { self.density.push(density); }
    }
}

fn stack(frames: &[nd::ArrayD<f64>]) -> anyhow::Result<nd::ArrayD<f64>> {
    let views: Vec<nd::ArrayViewD<f64>>
        = frames.iter().map(|a| a.view()).collect();
    Ok(nd::stack(nd::Axis(0), &views)?)
}

fn write_record(path: &Path, sim: &Simulation, record: &Record)
    -> anyhow::Result<()>
{
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut npz = NpzWriter::new(file);
    let coords = sim.coords();
    let names: &[&str] = if coords.len() == 1 { &["x"] } else { &["y", "x"] };
    for (name, c) in names.iter().zip(&coords) {
        npz.add_array(*name, c)?;
    }
    npz.add_array("t", &nd::Array1::from(record.t.clone()))?;
    npz.add_array("re", &stack(&record.re)?)?;
    if !record.im.is_empty() {
        npz.add_array("im", &stack(&record.im)?)?;
    }
    if !record.density.is_empty() {
        npz.add_array("density", &stack(&record.density)?)?;
    }
    npz.finish()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::builder()
        .format_timestamp_secs()
        .filter_level(LevelFilter::from_str(
            args.verbosity.as_deref().unwrap_or("warn")
        )?)
        .init();

    anyhow::ensure!(args.every > 0, "--every must be at least 1");

    let config = RunConfig::read(&args.toml)?;
    let mut sim: Simulation = config.build()?;
    log::info!(
        "running {} for {} steps (dt = {:.3e})",
        config.model(), args.steps, sim.dt(),
    );

    let start = Instant::now();
    let mut record = Record::default();
    record.push(sim.time(), sim.frame());
    for k in 1..=args.steps {
        if let Err(err) = sim.step() {
            log::error!("stopping early: {err}");
            break;
        }
        if k % args.every == 0 {
            record.push(sim.time(), sim.frame());
        }
    }
    log::info!(
        "took {} steps in {:.2?}; recorded {} frames",
        sim.steps(), start.elapsed(), record.t.len(),
    );

    write_record(&args.output, &sim, &record)?;
    println!("wrote {}", args.output.display());
    Ok(())
}
