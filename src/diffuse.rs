use crate::backend::ComputeBackend;
use crate::field::{Field2, FieldPair};
use crate::jacobi::{jacobi_iteration, JacobiParams};
use glam::Vec2;

/// Viscous diffusion by fixed-count Jacobi relaxation.
///
/// `source` receives a copy of the pre-diffusion velocity and stays the
/// constant right-hand side for every sweep. The pair is swapped after each
/// sweep, so `velocity.current()` holds the result.
pub fn diffuse_velocity<B: ComputeBackend>(
    backend: &B,
    velocity: &mut FieldPair<Vec2>,
    source: &mut Field2<Vec2>,
    viscosity: f32,
    dt: f32,
    iterations: usize,
) {
    let params = JacobiParams::viscous(viscosity, dt);
    source.copy_from(velocity.current());
    for _ in 0..iterations {
        let (current, scratch) = velocity.split();
        jacobi_iteration(backend, scratch, current, source, params);
        velocity.swap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SerialBackend;
    use crate::grid::Grid2;
    use proptest::prelude::*;

    fn pair_from(field: Field2<Vec2>) -> FieldPair<Vec2> {
        let mut pair = FieldPair::zeros(field.grid());
        pair.current_mut().copy_from(&field);
        pair
    }

    #[test]
    fn spike_is_smoothed() {
        let grid = Grid2::new(9, 9);
        let spike = Field2::from_fn(grid, |x, y| {
            if (x, y) == (4, 4) {
                Vec2::new(8.0, 0.0)
            } else {
                Vec2::ZERO
            }
        });
        let mut velocity = pair_from(spike);
        let mut source = Field2::zeros(grid);
        diffuse_velocity(&SerialBackend, &mut velocity, &mut source, 1.0, 0.02, 8);
        let center = velocity.current().get(4, 4).x;
        let neighbor = velocity.current().get(5, 4).x;
        assert!(center < 8.0, "center should decay, got {center}");
        assert!(neighbor > 0.0, "neighbor should gain, got {neighbor}");
        assert!(center > neighbor);
        assert_eq!(source.get(4, 4), Vec2::new(8.0, 0.0));
    }

    #[test]
    fn support_grows_one_cell_per_sweep() {
        let grid = Grid2::new(21, 21);
        let spike = Field2::from_fn(grid, |x, y| {
            if (x, y) == (10, 10) {
                Vec2::ONE
            } else {
                Vec2::ZERO
            }
        });
        let mut velocity = pair_from(spike);
        let mut source = Field2::zeros(grid);
        diffuse_velocity(&SerialBackend, &mut velocity, &mut source, 1.0, 0.05, 3);
        assert_ne!(velocity.current().get(13, 10), Vec2::ZERO);
        assert_eq!(velocity.current().get(14, 10), Vec2::ZERO);
    }

    proptest! {
        #[test]
        fn uniform_field_is_a_fixed_point(
            vx in -20.0f32..20.0,
            vy in -20.0f32..20.0,
            viscosity in 0.01f32..10.0,
            dt in 0.001f32..0.05,
        ) {
            let grid = Grid2::new(6, 5);
            let value = Vec2::new(vx, vy);
            let mut velocity = pair_from(Field2::new(grid, value));
            let mut source = Field2::zeros(grid);
            diffuse_velocity(&SerialBackend, &mut velocity, &mut source, viscosity, dt, 1);
            let tol = 1e-4 * (1.0 + value.abs().max_element());
            for out in velocity.current().iter() {
                prop_assert!((*out - value).abs().max_element() <= tol, "{out:?} vs {value:?}");
            }
        }
    }
}
