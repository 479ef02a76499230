use crate::grid::Grid2;
use glam::Vec4;

/// Receives one frame of display-ready dye colors, row-major with row 0 at
/// the bottom of the domain.
pub trait DisplaySink {
    type Error;

    fn present(&mut self, grid: Grid2, colors: &[Vec4]) -> Result<(), Self::Error>;
}

/// Packs dye into RGBA8, clamping each channel to `[0, 1]`. Rows are flipped
/// so the output starts with the top of the domain, the usual image order.
pub fn dye_to_rgba8(grid: Grid2, colors: &[Vec4], out: &mut Vec<u8>) {
    assert_eq!(colors.len(), grid.size(), "dye buffer does not match grid");
    let width = grid.width();
    let height = grid.height();
    out.resize(width * height * 4, 0);
    for y in 0..height {
        let src_row = &colors[y * width..(y + 1) * width];
        let dst_y = height - 1 - y;
        for (x, color) in src_row.iter().enumerate() {
            let idx = (dst_y * width + x) * 4;
            let c = color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
            out[idx] = c.x as u8;
            out[idx + 1] = c.y as u8;
            out[idx + 2] = c.z as u8;
            out[idx + 3] = c.w as u8;
        }
    }
}
