//! Pixel-space rectangles.

use serde::{Deserialize, Serialize};

/// A half-open pixel rectangle `[min_x, max_x) x [min_y, max_y)`.
///
/// Mirrors the rectangle a raster image reports for its drawable area. The
/// origin need not be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    /// Create bounds from corner coordinates.
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Zero-origin bounds of the given size.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(
            0,
            0,
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        )
    }

    /// Horizontal extent. Negative when the rectangle is inverted.
    pub fn width(&self) -> i64 {
        self.max_x as i64 - self.min_x as i64
    }

    /// Vertical extent. Negative when the rectangle is inverted.
    pub fn height(&self) -> i64 {
        self.max_y as i64 - self.min_y as i64
    }

    /// True when max < min on either axis.
    pub fn is_inverted(&self) -> bool {
        self.width() < 0 || self.height() < 0
    }

    /// True when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Number of pixels covered (0 for empty or inverted rectangles).
    pub fn area(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.width() as u64 * self.height() as u64
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Row-major index of `(x, y)`, or `None` when outside.
    pub fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        if !self.contains(x, y) {
            return None;
        }
        let col = (x as i64 - self.min_x as i64) as usize;
        let row = (y as i64 - self.min_y as i64) as usize;
        Some(row * self.width() as usize + col)
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_size() {
        let b = Bounds::from_size(4, 3);
        assert_eq!(b.width(), 4);
        assert_eq!(b.height(), 3);
        assert_eq!(b.area(), 12);
        assert!(!b.is_empty());
    }

    #[test]
    fn test_offset_origin() {
        let b = Bounds::new(10, -5, 14, -2);
        assert_eq!(b.width(), 4);
        assert_eq!(b.height(), 3);
        assert!(b.contains(10, -5));
        assert!(b.contains(13, -3));
        assert!(!b.contains(14, -3));
        assert!(!b.contains(10, -2));
        assert_eq!(b.index_of(10, -5), Some(0));
        assert_eq!(b.index_of(11, -4), Some(5));
        assert_eq!(b.index_of(9, -4), None);
    }

    #[test]
    fn test_empty_and_inverted() {
        let zero_w = Bounds::new(0, 0, 0, 10);
        assert!(zero_w.is_empty());
        assert!(!zero_w.is_inverted());
        assert_eq!(zero_w.area(), 0);

        let inverted = Bounds::new(5, 5, 2, 8);
        assert!(inverted.is_empty());
        assert!(inverted.is_inverted());
        assert_eq!(inverted.area(), 0);
    }

    #[test]
    fn test_extents_do_not_overflow() {
        let b = Bounds::new(i32::MIN, 0, i32::MAX, 1);
        assert_eq!(b.width(), u32::MAX as i64);
    }

    #[test]
    fn test_display() {
        assert_eq!(Bounds::new(0, 1, 2, 3).to_string(), "(0,1)-(2,3)");
    }
}
