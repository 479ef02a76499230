mod advect;
mod backend;
mod boundary;
mod config;
mod diagnostics;
mod diffuse;
mod display;
mod error;
mod field;
mod force;
mod grid;
mod input;
mod jacobi;
mod projection;
mod solver;

pub use advect::advect_into;
pub use backend::{ComputeBackend, RayonBackend, SerialBackend};
pub use boundary::BoundaryPolicy;
pub use config::{BackendConfig, InteractionConfig, SolverConfig, MAX_TIMESTEP};
pub use diagnostics::{dye_coverage, kinetic_energy, max_speed, FrameStats};
pub use diffuse::diffuse_velocity;
pub use display::{dye_to_rgba8, DisplaySink};
pub use error::{Result, SolverError};
pub use field::{Field2, FieldPair, FieldValue};
pub use force::{apply_burst, apply_drag, drag_direction, inject_input, BURST_DYE, DRAG_DYE};
pub use grid::{Grid2, Neighbors, CELL_SIZE, HALF_CELL_SIZE, INV_CELL_SIZE};
pub use input::{InputFrame, PointerTracker};
pub use jacobi::{jacobi_iteration, JacobiParams};
pub use projection::{divergence_into, project, solve_pressure, subtract_pressure_gradient};
pub use solver::FluidSolver;
