//! Common test fixtures for render tests.
//!
//! The reference scenario is a 4x4 gradient with
//! `color(x, y) = (x*255/4, y*255/4, 255 - x*255/4, 255)`.

use raster_common::Rgba;

/// Side length of the reference gradient.
pub const GRADIENT_SIDE: u32 = 4;

/// Expected colors of the reference gradient, row-major.
pub const GRADIENT_4X4: [[Rgba; 4]; 4] = {
    const fn px(x: u32, y: u32) -> Rgba {
        let r = (x * 255 / 4) as u8;
        let g = (y * 255 / 4) as u8;
        Rgba::new(r, g, 255 - r, 255)
    }
    [
        [px(0, 0), px(1, 0), px(2, 0), px(3, 0)],
        [px(0, 1), px(1, 1), px(2, 1), px(3, 1)],
        [px(0, 2), px(1, 2), px(2, 2), px(3, 2)],
        [px(0, 3), px(1, 3), px(2, 3), px(3, 3)],
    ]
};

/// Spot checks for the reference gradient.
pub mod gradient {
    use raster_common::Rgba;

    pub const TOP_LEFT: Rgba = Rgba::new(0, 0, 255, 255);
    pub const BOTTOM_RIGHT: Rgba = Rgba::new(191, 191, 64, 255);
}

/// Worker counts exercised by the determinism tests. The last one exceeds
/// the height of every image they render.
pub const WORKER_COUNTS: [usize; 4] = [1, 2, 3, 64];
