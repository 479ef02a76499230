use crate::config::InteractionConfig;
use crate::field::Field2;
use crate::grid::Grid2;
use crate::input::InputFrame;
use glam::{Vec2, Vec4};
use std::ops::Range;

pub const DRAG_DYE: Vec4 = Vec4::ONE;
pub const BURST_DYE: Vec4 = Vec4::new(0.0, 1.0, 0.0, 1.0);

/// Half-open window `[c - reach, c + reach)` around `center`, clamped to the grid.
fn window(grid: Grid2, center: (i32, i32), reach: i32) -> (Range<usize>, Range<usize>) {
    let (x0, y0) = grid.clamp_coord(center.0 - reach, center.1 - reach);
    let (x1, y1) = grid.clamp_coord(center.0 + reach, center.1 + reach);
    (x0..x1, y0..y1)
}

fn sqr_dist(x: usize, y: usize, center: (i32, i32)) -> f32 {
    let dx = (x as i32 - center.0) as f32;
    let dy = (y as i32 - center.1) as f32;
    dx * dx + dy * dy
}

/// Pointer delta (device space, y down) to a unit drag direction (grid space,
/// y up). Deltas with either component below `min_delta` are rejected.
pub fn drag_direction(delta: (f64, f64), min_delta: f32) -> Option<Vec2> {
    let direction = Vec2::new(delta.0 as f32, -(delta.1 as f32));
    if direction.x.abs() < min_delta || direction.y.abs() < min_delta {
        return None;
    }
    direction.try_normalize()
}

/// Writes `direction` scaled by a three-tier falloff into every cell of the
/// drag disk and paints it with full-opacity dye. Returns the cells touched.
pub fn apply_drag(
    velocity: &mut Field2<Vec2>,
    dye: &mut Field2<Vec4>,
    center: (i32, i32),
    direction: Vec2,
    config: &InteractionConfig,
) -> usize {
    let grid = velocity.grid();
    if !grid.contains(center.0, center.1) {
        return 0;
    }
    let radius_sq = config.drag_radius_sq;
    let inner_sq = radius_sq * config.drag_inner_fraction;
    let mid_sq = radius_sq * config.drag_mid_fraction;
    let (xs, ys) = window(grid, center, config.reach);
    let mut touched = 0;
    for y in ys {
        for x in xs.clone() {
            let d2 = sqr_dist(x, y, center);
            if d2 > radius_sq {
                continue;
            }
            let strength = if d2 < inner_sq {
                config.drag_inner_strength
            } else if d2 < mid_sq {
                config.drag_mid_strength
            } else {
                config.drag_outer_strength
            };
            velocity.set(x, y, direction * strength);
            dye.set(x, y, DRAG_DYE);
            touched += 1;
        }
    }
    touched
}

/// Radial outward burst around `center`; the outer ring is tinted green.
/// The center cell has no outward direction and is left alone.
pub fn apply_burst(
    velocity: &mut Field2<Vec2>,
    dye: &mut Field2<Vec4>,
    center: (i32, i32),
    config: &InteractionConfig,
) -> usize {
    let grid = velocity.grid();
    if !grid.contains(center.0, center.1) {
        return 0;
    }
    let radius_sq = config.burst_radius_sq;
    let ring_sq = radius_sq * config.burst_ring_fraction;
    let (xs, ys) = window(grid, center, config.reach);
    let mut touched = 0;
    for y in ys {
        for x in xs.clone() {
            if x as i32 == center.0 && y as i32 == center.1 {
                continue;
            }
            let d2 = sqr_dist(x, y, center);
            if d2 > radius_sq {
                continue;
            }
            let offset = Vec2::new((x as i32 - center.0) as f32, (y as i32 - center.1) as f32);
            velocity.set(x, y, offset.normalize() * config.burst_strength);
            if d2 >= ring_sq {
                dye.set(x, y, BURST_DYE);
            }
            touched += 1;
        }
    }
    touched
}

/// Applies the drag and click gestures carried by one input poll.
pub fn inject_input(
    velocity: &mut Field2<Vec2>,
    dye: &mut Field2<Vec4>,
    input: &InputFrame,
    config: &InteractionConfig,
) {
    let Some((px, py)) = input.cursor else {
        return;
    };
    let grid = velocity.grid();
    let Some(center) = grid.pixel_to_cell(px, py, config.pixels_per_cell) else {
        return;
    };
    if input.primary_down {
        if let Some(direction) = drag_direction(input.delta, config.min_pointer_delta) {
            let touched = apply_drag(velocity, dye, center, direction, config);
            log::trace!("drag at {center:?} dir {direction:?} touched {touched} cells");
        }
    }
    if input.secondary_clicked {
        let touched = apply_burst(velocity, dye, center, config);
        log::debug!("burst at {center:?} touched {touched} cells");
    }
}
