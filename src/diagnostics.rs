use crate::field::Field2;
use glam::{Vec2, Vec4};

/// Summary numbers for one simulated frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    pub max_speed: f32,
    /// Mean of `0.5 * |v|^2` over all cells.
    pub kinetic_energy: f32,
    pub divergence_abs_sum: f32,
    /// Fraction of cells whose dye alpha exceeds 1%.
    pub dye_coverage: f32,
}

pub fn max_speed(velocity: &Field2<Vec2>) -> f32 {
    velocity.iter().map(|v| v.length()).fold(0.0_f32, f32::max)
}

pub fn kinetic_energy(velocity: &Field2<Vec2>) -> f32 {
    let count = velocity.grid().size();
    if count == 0 {
        return 0.0;
    }
    let sum: f32 = velocity.iter().map(|v| v.length_squared()).sum();
    0.5 * sum / count as f32
}

pub fn dye_coverage(dye: &Field2<Vec4>) -> f32 {
    let count = dye.grid().size();
    if count == 0 {
        return 0.0;
    }
    let covered = dye.iter().filter(|c| c.w > 0.01).count();
    covered as f32 / count as f32
}
