//! Pixel rectangles and tile spans.

/// Axis-aligned rectangle in pixels, in either map or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl PixelRect {
    /// Rectangle at `x`, `y`.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the last column.
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// One past the last row.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// No area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// True when the two rectangles share at least one pixel.
    pub fn intersects(&self, other: &PixelRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// The shared area, or `None` when the rectangles do not overlap.
    pub fn intersection(&self, other: &PixelRect) -> Option<PixelRect> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        Some(PixelRect::new(
            x,
            y,
            self.right().min(other.right()) - x,
            self.bottom().min(other.bottom()) - y,
        ))
    }

    /// The same rectangle moved by `dx`, `dy`.
    pub fn translate(&self, dx: i32, dy: i32) -> PixelRect {
        PixelRect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Half-open range of tile coordinates, `x0..x1` by `y0..y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpan {
    /// First column.
    pub x0: usize,
    /// First row.
    pub y0: usize,
    /// One past the last column.
    pub x1: usize,
    /// One past the last row.
    pub y1: usize,
}

impl TileSpan {
    /// No tiles.
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Tile coordinates, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.y0..self.y1).flat_map(move |y| (self.x0..self.x1).map(move |x| (x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = PixelRect::new(0, 0, 32, 32);
        let b = PixelRect::new(32, 0, 32, 32);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&PixelRect::new(31, 31, 5, 5)));
    }

    #[test]
    fn empty_rect_never_intersects() {
        let a = PixelRect::new(0, 0, 0, 10);
        assert!(!a.intersects(&PixelRect::new(0, 0, 100, 100)));
    }

    #[test]
    fn intersection_is_the_overlap() {
        let a = PixelRect::new(-10, 20, 100, 40);
        let b = PixelRect::new(0, 0, 64, 48);
        assert_eq!(a.intersection(&b), Some(PixelRect::new(0, 20, 64, 28)));
        assert_eq!(b.intersection(&a), a.intersection(&b));
        assert_eq!(a.intersection(&PixelRect::new(90, 20, 5, 5)), None);
    }

    #[test]
    fn span_iterates_row_major() {
        let span = TileSpan {
            x0: 1,
            y0: 0,
            x1: 3,
            y1: 2,
        };
        let tiles: Vec<_> = span.tiles().collect();
        assert_eq!(tiles, vec![(1, 0), (2, 0), (1, 1), (2, 1)]);
    }
}
