use crate::backend::ComputeBackend;
use crate::boundary::BoundaryPolicy;
use crate::field::{Field2, FieldPair};
use crate::grid::HALF_CELL_SIZE;
use crate::jacobi::{jacobi_iteration, JacobiParams};
use glam::Vec2;

/// Central-difference divergence, `0.5h * ((vx_R - vx_L) + (vy_T - vy_B))`.
pub fn divergence_into<B: ComputeBackend>(
    backend: &B,
    out: &mut Field2<f32>,
    velocity: &Field2<Vec2>,
) {
    let grid = velocity.grid();
    backend.fill(out, |x, y| {
        let n = grid.neighbors(x, y);
        let left = velocity.get(n.left, y);
        let right = velocity.get(n.right, y);
        let down = velocity.get(x, n.down);
        let up = velocity.get(x, n.up);
        HALF_CELL_SIZE * ((right.x - left.x) + (up.y - down.y))
    });
}

/// Jacobi solve of the pressure Poisson equation from a zero initial guess.
/// Boundary conditions are left to the caller.
pub fn solve_pressure<B: ComputeBackend>(
    backend: &B,
    pressure: &mut FieldPair<f32>,
    divergence: &Field2<f32>,
    iterations: usize,
) {
    let params = JacobiParams::pressure();
    pressure.clear();
    for _ in 0..iterations {
        let (current, scratch) = pressure.split();
        jacobi_iteration(backend, scratch, current, divergence, params);
        pressure.swap();
    }
}

/// `velocity -= 0.5h * (pR - pL, pT - pB)`, pointwise and in place.
pub fn subtract_pressure_gradient<B: ComputeBackend>(
    backend: &B,
    velocity: &mut Field2<Vec2>,
    pressure: &Field2<f32>,
) {
    let grid = pressure.grid();
    backend.update(velocity, |x, y, value| {
        let n = grid.neighbors(x, y);
        let gradient = Vec2::new(
            pressure.get(n.right, y) - pressure.get(n.left, y),
            pressure.get(x, n.up) - pressure.get(x, n.down),
        );
        value - gradient * HALF_CELL_SIZE
    });
}

/// Divergence, pressure solve, pressure boundary, gradient subtraction.
pub fn project<B: ComputeBackend>(
    backend: &B,
    velocity: &mut Field2<Vec2>,
    pressure: &mut FieldPair<f32>,
    divergence: &mut Field2<f32>,
    iterations: usize,
) {
    divergence_into(backend, divergence, velocity);
    solve_pressure(backend, pressure, divergence, iterations);
    BoundaryPolicy::Pressure.apply(pressure.current_mut());
    subtract_pressure_gradient(backend, velocity, pressure.current());
}
