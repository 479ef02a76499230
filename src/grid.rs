/// Cell spacing `h` shared by every finite-difference stage.
pub const CELL_SIZE: f32 = 1.0 / 32.0;
pub const INV_CELL_SIZE: f32 = 1.0 / CELL_SIZE;
pub const HALF_CELL_SIZE: f32 = 0.5 * CELL_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid2 {
    width: usize,
    height: usize,
}

/// Clamped four-neighborhood of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbors {
    pub left: usize,
    pub right: usize,
    pub down: usize,
    pub up: usize,
}

impl Grid2 {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0, "width must be > 0");
        assert!(height > 0, "height must be > 0");
        Self { width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> usize {
        self.width * self.height
    }

    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        x + y * self.width
    }

    pub fn coord(&self, idx: usize) -> (usize, usize) {
        (idx % self.width, idx / self.width)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn clamp_coord(&self, x: i32, y: i32) -> (usize, usize) {
        let max_x = (self.width - 1) as i32;
        let max_y = (self.height - 1) as i32;
        let cx = x.clamp(0, max_x) as usize;
        let cy = y.clamp(0, max_y) as usize;
        (cx, cy)
    }

    /// Stencil indices for `(x, y)`; edge cells see themselves in place of the
    /// missing neighbor.
    pub fn neighbors(&self, x: usize, y: usize) -> Neighbors {
        let (left, down) = self.clamp_coord(x as i32 - 1, y as i32 - 1);
        let (right, up) = self.clamp_coord(x as i32 + 1, y as i32 + 1);
        Neighbors {
            left,
            right,
            down,
            up,
        }
    }

    /// Maps a device pixel position (origin top-left) to a cell (origin
    /// bottom-left). Returns `None` when the pointer is off the grid.
    pub fn pixel_to_cell(&self, px: f64, py: f64, pixels_per_cell: f32) -> Option<(i32, i32)> {
        let scale = f64::from(pixels_per_cell.max(f32::MIN_POSITIVE));
        let x = (px / scale).floor() as i32;
        let row = (py / scale).floor() as i32;
        let y = self.height as i32 - row - 1;
        self.contains(x, y).then_some((x, y))
    }
}
