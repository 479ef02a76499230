use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec4;
use stable_fluids::{
    dye_to_rgba8, DisplaySink, FluidSolver, Grid2, InputFrame, PointerTracker, SolverConfig,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, VirtualKeyCode};

/// Headless stable-fluids run driven by a scripted pointer.
#[derive(Parser, Debug)]
#[command(name = "stable-fluids", version, about)]
struct Args {
    /// YAML solver configuration; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value_t = 240)]
    frames: u64,

    /// Wall-clock timestep fed to every tick (clamped by the solver).
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Dedicated worker threads; overrides the config file.
    #[arg(short, long)]
    threads: Option<usize>,

    /// Write a PPM snapshot every N frames, 0 disables snapshots.
    #[arg(long, default_value_t = 30)]
    snapshot_every: u64,

    #[arg(short, long, default_value = "frames")]
    out_dir: PathBuf,
}

/// Writes each presented frame as a binary PPM, dye alpha dropped.
struct PpmSink {
    dir: PathBuf,
    index: usize,
    rgba: Vec<u8>,
}

impl PpmSink {
    fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating snapshot dir {}", dir.display()))?;
        Ok(Self {
            dir,
            index: 0,
            rgba: Vec::new(),
        })
    }
}

impl DisplaySink for PpmSink {
    type Error = anyhow::Error;

    fn present(&mut self, grid: Grid2, colors: &[Vec4]) -> Result<()> {
        dye_to_rgba8(grid, colors, &mut self.rgba);
        let path = self.dir.join(format!("dye_{:05}.ppm", self.index));
        let file =
            File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let mut out = BufWriter::new(file);
        write!(out, "P6\n{} {}\n255\n", grid.width(), grid.height())?;
        for pixel in self.rgba.chunks_exact(4) {
            out.write_all(&pixel[..3])?;
        }
        out.flush()?;
        log::info!("wrote snapshot {}", path.display());
        self.index += 1;
        Ok(())
    }
}

/// Circular drag around the window center with a right click every
/// `CLICK_PERIOD` frames and a single reset halfway through.
struct ScriptedPointer {
    center: (f64, f64),
    radius: f64,
    reset_frame: u64,
}

const CLICK_PERIOD: u64 = 60;
const ANGULAR_SPEED: f64 = 0.06;

impl ScriptedPointer {
    fn new(window_size: (f64, f64), frames: u64) -> Self {
        Self {
            center: (window_size.0 * 0.5, window_size.1 * 0.5),
            radius: window_size.0.min(window_size.1) * 0.3,
            reset_frame: frames / 2,
        }
    }

    fn drive(&self, tracker: &mut PointerTracker, frame: u64) {
        let angle = frame as f64 * ANGULAR_SPEED;
        tracker.cursor_moved(PhysicalPosition::new(
            self.center.0 + self.radius * angle.cos(),
            self.center.1 + self.radius * angle.sin(),
        ));
        if frame == 0 {
            tracker.mouse_input(ElementState::Pressed, MouseButton::Left);
        }
        let clicking = frame > 0 && frame % CLICK_PERIOD == 0;
        tracker.mouse_input(
            if clicking {
                ElementState::Pressed
            } else {
                ElementState::Released
            },
            MouseButton::Right,
        );
        if frame == self.reset_frame && frame > 0 {
            tracker.key_input(ElementState::Pressed, Some(VirtualKeyCode::R));
        }
    }
}

fn load_config(args: &Args) -> Result<SolverConfig> {
    let mut config = match &args.config {
        Some(path) => SolverConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SolverConfig::default(),
    };
    if args.threads.is_some() {
        config.backend.threads = args.threads;
    }
    config.validate().context("invalid solver configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    anyhow::ensure!(args.dt > 0.0, "--dt must be positive, got {}", args.dt);

    let config = load_config(&args)?;
    let ppc = f64::from(config.interaction.pixels_per_cell);
    let window_size = (config.width as f64 * ppc, config.height as f64 * ppc);
    let mut solver = FluidSolver::new(config).context("building fluid solver")?;
    let mut sink = if args.snapshot_every > 0 {
        Some(PpmSink::new(args.out_dir.clone())?)
    } else {
        None
    };

    let script = ScriptedPointer::new(window_size, args.frames);
    let mut tracker = PointerTracker::new();
    for frame in 0..args.frames {
        script.drive(&mut tracker, frame);
        let input: InputFrame = tracker.poll();
        if input.reset_requested {
            log::info!("scripted reset at frame {frame}");
        }
        solver.tick(args.dt, &input);

        let stats = solver.stats();
        log::debug!(
            "frame {frame}: max speed {:.3}, energy {:.5}, |div| {:.4}, dye {:.1}%",
            stats.max_speed,
            stats.kinetic_energy,
            stats.divergence_abs_sum,
            stats.dye_coverage * 100.0
        );
        if let Some(sink) = sink.as_mut() {
            if (frame + 1) % args.snapshot_every == 0 {
                solver.present(sink)?;
            }
        }
    }

    let stats = solver.stats();
    log::info!(
        "finished {} frames: max speed {:.3}, energy {:.5}, dye coverage {:.1}%",
        solver.frame(),
        stats.max_speed,
        stats.kinetic_energy,
        stats.dye_coverage * 100.0
    );
    Ok(())
}
