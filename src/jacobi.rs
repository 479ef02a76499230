use crate::backend::ComputeBackend;
use crate::field::{Field2, FieldValue};
use crate::grid::CELL_SIZE;

/// Coefficients of `x' = (xL + xR + xB + xT + alpha * b) * inv_beta`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JacobiParams {
    pub alpha: f32,
    pub inv_beta: f32,
}

impl JacobiParams {
    /// Implicit viscous diffusion over `dt`.
    pub fn viscous(viscosity: f32, dt: f32) -> Self {
        debug_assert!(viscosity > 0.0 && dt > 0.0);
        let alpha = CELL_SIZE * CELL_SIZE / (viscosity * dt);
        Self {
            alpha,
            inv_beta: 1.0 / (alpha + 4.0),
        }
    }

    /// Pressure Poisson equation driven by the divergence.
    pub fn pressure() -> Self {
        Self {
            alpha: -CELL_SIZE * CELL_SIZE,
            inv_beta: 0.25,
        }
    }
}

/// One relaxation sweep from `x` into `out`. Neighbors come from `x` only, so
/// `out` must be a different buffer.
pub fn jacobi_iteration<T, B>(
    backend: &B,
    out: &mut Field2<T>,
    x: &Field2<T>,
    b: &Field2<T>,
    params: JacobiParams,
) where
    T: FieldValue,
    B: ComputeBackend,
{
    x.assert_same_grid(b);
    let grid = x.grid();
    let JacobiParams { alpha, inv_beta } = params;
    backend.fill(out, |cx, cy| {
        let n = grid.neighbors(cx, cy);
        let left = x.get(n.left, cy);
        let right = x.get(n.right, cy);
        let down = x.get(cx, n.down);
        let up = x.get(cx, n.up);
        (left + right + down + up + b.get(cx, cy) * alpha) * inv_beta
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SerialBackend;
    use crate::grid::Grid2;

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    #[test]
    fn viscous_coefficients() {
        let params = JacobiParams::viscous(1.0, 0.05);
        assert_close(params.alpha, (1.0 / 1024.0) / 0.05, 1e-7);
        assert_close(params.inv_beta, 1.0 / (params.alpha + 4.0), 1e-7);
    }

    #[test]
    fn iteration_spreads_a_spike_to_direct_neighbors_only() {
        let grid = Grid2::new(7, 7);
        let x = Field2::from_fn(grid, |cx, cy| if (cx, cy) == (3, 3) { 4.0 } else { 0.0 });
        let b = Field2::<f32>::zeros(grid);
        let mut out = Field2::zeros(grid);
        let params = JacobiParams {
            alpha: 0.0,
            inv_beta: 0.25,
        };
        jacobi_iteration(&SerialBackend, &mut out, &x, &b, params);
        assert_close(out.get(3, 3), 0.0, 1e-6);
        assert_close(out.get(2, 3), 1.0, 1e-6);
        assert_close(out.get(3, 4), 1.0, 1e-6);
        assert_close(out.get(2, 2), 0.0, 1e-6);
        assert_close(out.get(5, 3), 0.0, 1e-6);
    }

    #[test]
    fn edges_read_themselves_as_missing_neighbor() {
        let grid = Grid2::new(3, 3);
        let x = Field2::new(grid, 1.0_f32);
        let b = Field2::zeros(grid);
        let mut out = Field2::zeros(grid);
        jacobi_iteration(&SerialBackend, &mut out, &x, &b, JacobiParams::pressure());
        for value in out.iter() {
            assert_close(*value, 1.0, 1e-6);
        }
    }
}
