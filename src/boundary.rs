use crate::field::{Field2, FieldValue};

/// Perimeter rule per field kind. Each border cell becomes its single inward
/// neighbor times [`BoundaryPolicy::scale`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Reflective wall, `border = -interior`.
    Velocity,
    /// Zero-gradient wall, `border = interior`.
    Pressure,
    /// Absorbing wall, `border = 0`.
    Dye,
}

impl BoundaryPolicy {
    pub fn scale(self) -> f32 {
        match self {
            BoundaryPolicy::Velocity => -1.0,
            BoundaryPolicy::Pressure => 1.0,
            BoundaryPolicy::Dye => 0.0,
        }
    }

    /// Rows first, then columns; corners keep the column pass value.
    pub fn apply<T: FieldValue>(self, field: &mut Field2<T>) {
        let grid = field.grid();
        let w = grid.width();
        let h = grid.height();
        if w < 2 || h < 2 {
            return;
        }
        let scale = self.scale();
        for x in 0..w {
            let bottom = field.get(x, 1) * scale;
            let top = field.get(x, h - 2) * scale;
            field.set(x, 0, bottom);
            field.set(x, h - 1, top);
        }
        for y in 0..h {
            let left = field.get(1, y) * scale;
            let right = field.get(w - 2, y) * scale;
            field.set(0, y, left);
            field.set(w - 1, y, right);
        }
    }
}
