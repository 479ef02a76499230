use crate::advect::advect_into;
use crate::backend::{ComputeBackend, RayonBackend};
use crate::boundary::BoundaryPolicy;
use crate::config::SolverConfig;
use crate::diagnostics::{self, FrameStats};
use crate::diffuse::diffuse_velocity;
use crate::display::DisplaySink;
use crate::error::Result;
use crate::field::{Field2, FieldPair};
use crate::force::{apply_burst, apply_drag, inject_input};
use crate::grid::Grid2;
use crate::input::InputFrame;
use crate::projection::{divergence_into, project};
use glam::{Vec2, Vec4};

/// Stable-fluids integrator over a fixed W×H grid.
///
/// Every per-cell stage goes through the compute backend, which returns only
/// once the whole output buffer is written; swaps happen between stages.
#[derive(Debug)]
pub struct FluidSolver<B: ComputeBackend = RayonBackend> {
    config: SolverConfig,
    backend: B,
    velocity: FieldPair<Vec2>,
    velocity_source: Field2<Vec2>,
    pressure: FieldPair<f32>,
    divergence: Field2<f32>,
    dye: FieldPair<Vec4>,
    frame: u64,
}

impl FluidSolver<RayonBackend> {
    /// Builds the solver on a rayon backend. Fails if the configuration is
    /// invalid or the worker pool cannot be created. The configuration is
    /// checked before the pool is built, so a bad config spawns no threads.
    pub fn new(config: SolverConfig) -> Result<Self> {
        config.validate()?;
        let backend = RayonBackend::new(&config.backend)?;
        Self::with_backend(config, backend)
    }
}

impl<B: ComputeBackend> FluidSolver<B> {
    pub fn with_backend(config: SolverConfig, backend: B) -> Result<Self> {
        config.validate()?;
        let grid = config.grid();
        log::info!(
            "fluid solver {}x{}: viscosity {}, {} diffusion / {} pressure iterations",
            grid.width(),
            grid.height(),
            config.viscosity,
            config.diffusion_iterations,
            config.pressure_iterations
        );
        Ok(Self {
            config,
            backend,
            velocity: FieldPair::zeros(grid),
            velocity_source: Field2::zeros(grid),
            pressure: FieldPair::zeros(grid),
            divergence: Field2::zeros(grid),
            dye: FieldPair::zeros(grid),
            frame: 0,
        })
    }

    pub fn grid(&self) -> Grid2 {
        self.velocity.grid()
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Number of steps taken since construction.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn velocity(&self) -> &Field2<Vec2> {
        self.velocity.current()
    }

    /// Pressure from the most recent solve.
    pub fn pressure(&self) -> &Field2<f32> {
        self.pressure.current()
    }

    /// Divergence of the velocity entering the most recent projection.
    pub fn divergence(&self) -> &Field2<f32> {
        &self.divergence
    }

    pub fn dye(&self) -> &Field2<Vec4> {
        self.dye.current()
    }

    /// Drag gesture at a grid cell. Must not run concurrently with `step`.
    pub fn apply_drag(&mut self, center: (i32, i32), direction: Vec2) -> usize {
        apply_drag(
            self.velocity.current_mut(),
            self.dye.current_mut(),
            center,
            direction,
            &self.config.interaction,
        )
    }

    /// Click burst at a grid cell.
    pub fn apply_burst(&mut self, center: (i32, i32)) -> usize {
        apply_burst(
            self.velocity.current_mut(),
            self.dye.current_mut(),
            center,
            &self.config.interaction,
        )
    }

    /// One interactive frame: pointer forces, reset request, then `step`.
    /// A reset discards the forces injected in the same frame.
    pub fn tick(&mut self, dt: f32, input: &InputFrame) -> f32 {
        inject_input(
            self.velocity.current_mut(),
            self.dye.current_mut(),
            input,
            &self.config.interaction,
        );
        if input.reset_requested {
            self.reset();
        }
        self.step(dt)
    }

    /// Advances the fields by `dt`, clamped to `max_dt`. Returns the timestep
    /// actually used.
    pub fn step(&mut self, dt: f32) -> f32 {
        debug_assert!(dt > 0.0, "timestep must be positive, got {dt}");
        let dt = dt.min(self.config.max_dt);
        let backend = &self.backend;

        BoundaryPolicy::Velocity.apply(self.velocity.current_mut());
        {
            let (current, scratch) = self.velocity.split();
            advect_into(backend, scratch, current, current, dt);
        }
        self.velocity.swap();
        log::trace!("frame {}: velocity advected", self.frame);

        diffuse_velocity(
            backend,
            &mut self.velocity,
            &mut self.velocity_source,
            self.config.viscosity,
            dt,
            self.config.diffusion_iterations,
        );
        log::trace!("frame {}: velocity diffused", self.frame);

        project(
            backend,
            self.velocity.current_mut(),
            &mut self.pressure,
            &mut self.divergence,
            self.config.pressure_iterations,
        );
        log::trace!("frame {}: velocity projected", self.frame);

        BoundaryPolicy::Dye.apply(self.dye.current_mut());
        {
            let (current, scratch) = self.dye.split();
            advect_into(backend, scratch, current, self.velocity.current(), dt);
        }
        self.dye.swap();

        self.frame += 1;
        log::debug!("frame {} stepped with dt {dt:.4}", self.frame);
        dt
    }

    /// Zeroes every field, leaving the solver equivalent to a fresh one.
    pub fn reset(&mut self) {
        self.velocity.clear();
        self.velocity_source.fill(Vec2::ZERO);
        self.pressure.clear();
        self.divergence.fill(0.0);
        self.dye.clear();
        log::info!("fluid state reset at frame {}", self.frame);
    }

    pub fn stats(&self) -> FrameStats {
        let mut divergence = Field2::zeros(self.grid());
        divergence_into(&self.backend, &mut divergence, self.velocity.current());
        FrameStats {
            max_speed: diagnostics::max_speed(self.velocity.current()),
            kinetic_energy: diagnostics::kinetic_energy(self.velocity.current()),
            divergence_abs_sum: divergence.abs_sum(),
            dye_coverage: diagnostics::dye_coverage(self.dye.current()),
        }
    }

    /// Hands the current dye field to a display collaborator.
    pub fn present<S: DisplaySink>(&self, sink: &mut S) -> std::result::Result<(), S::Error> {
        sink.present(self.grid(), self.dye.current().as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SerialBackend;
    use crate::config::BackendConfig;
    use crate::error::SolverError;

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    fn serial_solver(width: usize, height: usize) -> FluidSolver<SerialBackend> {
        FluidSolver::with_backend(SolverConfig::with_size(width, height), SerialBackend)
            .expect("valid config")
    }

    fn dist_sq(x: usize, y: usize, center: (i32, i32)) -> i32 {
        let dx = x as i32 - center.0;
        let dy = y as i32 - center.1;
        dx * dx + dy * dy
    }

    #[test]
    fn drag_then_step_stays_local() {
        let mut solver = serial_solver(192, 192);
        let center = (96, 96);
        solver.apply_drag(center, Vec2::X);
        let used = solver.step(0.02);
        assert_close(used, 0.02, 1e-9);

        let grid = solver.grid();
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if dist_sq(x, y, center) > 64 * 64 {
                    assert_eq!(solver.velocity().get(x, y), Vec2::ZERO, "velocity at ({x},{y})");
                    assert_eq!(solver.dye().get(x, y).w, 0.0, "dye at ({x},{y})");
                }
            }
        }

        let v = solver.velocity().get(96, 96);
        assert!(v.x > 1.0, "expected rightward flow, got {v:?}");
        assert!(v.x > v.y.abs() * 10.0, "expected rightward bias, got {v:?}");

        for (x, y) in [(96, 96), (90, 96), (100, 100), (96, 88)] {
            assert_close(solver.dye().get(x, y).w, 1.0, 1e-5);
        }
    }

    #[test]
    fn step_clamps_large_timesteps() {
        let mut solver = serial_solver(8, 8);
        assert_close(solver.step(1.0), 0.05, 1e-9);
        assert_close(solver.step(0.01), 0.01, 1e-9);
        assert_eq!(solver.frame(), 2);
    }

    #[test]
    fn reset_matches_fresh_solver() {
        let mut solver = serial_solver(48, 40);
        solver.apply_drag((24, 20), Vec2::new(0.6, 0.8));
        solver.apply_burst((10, 10));
        for _ in 0..5 {
            solver.step(0.016);
        }
        assert!(solver.stats().max_speed > 0.0);
        solver.reset();

        let fresh = serial_solver(48, 40);
        assert_eq!(solver.velocity, fresh.velocity);
        assert_eq!(solver.velocity_source, fresh.velocity_source);
        assert_eq!(solver.pressure, fresh.pressure);
        assert_eq!(solver.divergence, fresh.divergence);
        assert_eq!(solver.dye, fresh.dye);
    }

    #[test]
    fn tick_reset_clears_previous_state() {
        let mut solver = serial_solver(64, 64);
        solver.apply_drag((32, 32), Vec2::Y);
        solver.step(0.02);
        let input = InputFrame {
            reset_requested: true,
            ..InputFrame::default()
        };
        solver.tick(0.02, &input);
        assert_eq!(solver.velocity(), &Field2::zeros(solver.grid()));
        assert_eq!(solver.dye(), &Field2::zeros(solver.grid()));
    }

    #[test]
    fn reset_in_same_frame_discards_pointer_forces() {
        let mut solver = serial_solver(64, 64);
        let input = InputFrame {
            cursor: Some((32.0, 31.0)),
            delta: (3.0, -1.0),
            primary_down: true,
            secondary_clicked: true,
            reset_requested: true,
        };
        solver.tick(0.02, &input);
        let fresh = serial_solver(64, 64);
        assert_eq!(solver.stats().max_speed, 0.0);
        assert_eq!(solver.velocity(), fresh.velocity());
        assert_eq!(solver.dye(), fresh.dye());
    }

    #[test]
    fn invalid_config_fails_before_building_pool() {
        let mut config = SolverConfig::with_size(16, 16);
        config.viscosity = -1.0;
        config.backend.threads = Some(2);
        let err = FluidSolver::new(config).unwrap_err();
        assert!(matches!(err, SolverError::InvalidParameter { name: "viscosity", .. }));
    }

    #[test]
    fn tick_applies_pointer_forces() {
        let mut solver = serial_solver(64, 64);
        let input = InputFrame {
            cursor: Some((32.0, 31.0)),
            delta: (3.0, -1.0),
            primary_down: true,
            ..InputFrame::default()
        };
        solver.tick(0.02, &input);
        assert!(solver.velocity().get(32, 32).x > 0.0);
        assert!(solver.stats().dye_coverage > 0.0);
    }

    #[test]
    fn projection_keeps_divergence_in_check() {
        let mut solver = serial_solver(128, 128);
        solver.apply_burst((64, 64));
        let before = {
            let mut div = Field2::zeros(solver.grid());
            divergence_into(&SerialBackend, &mut div, solver.velocity());
            div.abs_sum()
        };
        solver.step(0.02);
        assert!(solver.stats().divergence_abs_sum < before);
    }

    #[test]
    fn rayon_and_serial_agree_bit_for_bit() {
        let mut config = SolverConfig::with_size(96, 96);
        config.backend = BackendConfig {
            threads: Some(2),
            parallel_threshold: Some(1),
        };
        let mut parallel = FluidSolver::new(config.clone()).expect("rayon solver");
        let mut serial = FluidSolver::with_backend(config, SerialBackend).expect("serial solver");
        for solver_step in 0..3 {
            parallel.apply_drag((48, 48), Vec2::new(0.8, 0.6));
            serial.apply_drag((48, 48), Vec2::new(0.8, 0.6));
            parallel.step(0.02);
            serial.step(0.02);
            assert_eq!(parallel.velocity(), serial.velocity(), "step {solver_step}");
            assert_eq!(parallel.dye(), serial.dye(), "step {solver_step}");
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = FluidSolver::with_backend(SolverConfig::with_size(2, 2), SerialBackend)
            .unwrap_err();
        assert!(matches!(err, SolverError::InvalidGrid { .. }));
    }

    #[test]
    fn present_hands_over_dye() {
        struct Capture(Vec<Vec4>);
        impl DisplaySink for Capture {
            type Error = std::convert::Infallible;
            fn present(
                &mut self,
                grid: Grid2,
                colors: &[Vec4],
            ) -> std::result::Result<(), Self::Error> {
                assert_eq!(colors.len(), grid.size());
                self.0 = colors.to_vec();
                Ok(())
            }
        }
        let mut solver = serial_solver(16, 16);
        solver.apply_burst((8, 8));
        let mut sink = Capture(Vec::new());
        solver.present(&mut sink).expect("infallible");
        assert_eq!(sink.0.as_slice(), solver.dye().as_slice());
    }
}
