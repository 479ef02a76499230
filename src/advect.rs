use crate::backend::ComputeBackend;
use crate::field::{Field2, FieldValue};
use crate::grid::INV_CELL_SIZE;
use glam::Vec2;

/// Semi-Lagrangian transport of `field` through `velocity` into `out`.
///
/// Each cell traces back to `(x, y) - dt / h * velocity(x, y)` and takes the
/// bilinear blend of the four surrounding cells, clamped to the grid.
pub fn advect_into<T, B>(
    backend: &B,
    out: &mut Field2<T>,
    field: &Field2<T>,
    velocity: &Field2<Vec2>,
    dt: f32,
) where
    T: FieldValue,
    B: ComputeBackend,
{
    assert_eq!(field.grid(), velocity.grid(), "advection grid mismatch");
    let grid = field.grid();
    let max_x = (grid.width() - 1) as f32;
    let max_y = (grid.height() - 1) as f32;
    let scale = dt * INV_CELL_SIZE;
    backend.fill(out, |x, y| {
        let pos = Vec2::new(x as f32, y as f32) - velocity.get(x, y) * scale;
        let x0 = pos.x.floor().clamp(0.0, max_x);
        let y0 = pos.y.floor().clamp(0.0, max_y);
        let x1 = (x0 + 1.0).min(max_x);
        let y1 = (y0 + 1.0).min(max_y);
        let tx = (pos.x - x0).clamp(0.0, 1.0);
        let ty = (pos.y - y0).clamp(0.0, 1.0);
        let (x0, y0, x1, y1) = (x0 as usize, y0 as usize, x1 as usize, y1 as usize);
        let v00 = field.get(x0, y0);
        let v10 = field.get(x1, y0);
        let v01 = field.get(x0, y1);
        let v11 = field.get(x1, y1);
        v00.lerp(v10, tx).lerp(v01.lerp(v11, tx), ty)
    });
}
