//! Viewport clipping and dirty-tile computation.

use crate::geom::{PixelRect, TileSpan};

/// The part of `rect` (map pixels) inside the viewport, if any.
pub fn clip_to_viewport(rect: &PixelRect, viewport: &PixelRect) -> Option<PixelRect> {
    rect.intersection(viewport)
}

/// Tiles touched by `rect`, clamped to a `map_w` x `map_h` tile grid.
///
/// The far edge is rounded up, so a rectangle ending part-way into a tile
/// still covers that whole tile. `None` when nothing on the map is touched.
pub fn tile_span(
    rect: &PixelRect,
    tile_w: i32,
    tile_h: i32,
    map_w: usize,
    map_h: usize,
) -> Option<TileSpan> {
    if rect.is_empty() || tile_w <= 0 || tile_h <= 0 {
        return None;
    }

    let x0 = rect.x.div_euclid(tile_w);
    let y0 = rect.y.div_euclid(tile_h);
    let mut x1 = rect.right().div_euclid(tile_w);
    let mut y1 = rect.bottom().div_euclid(tile_h);
    if rect.right().rem_euclid(tile_w) > 0 {
        x1 += 1;
    }
    if rect.bottom().rem_euclid(tile_h) > 0 {
        y1 += 1;
    }

    let clamp = |v: i32, max: usize| v.clamp(0, max as i32) as usize;
    let span = TileSpan {
        x0: clamp(x0, map_w),
        y0: clamp(y0, map_h),
        x1: clamp(x1, map_w),
        y1: clamp(y1, map_h),
    };
    (!span.is_empty()).then_some(span)
}

/// Plane offsets (`x + y * map_w`) of every tile covered by any span,
/// ascending and without repeats.
pub fn dirty_tiles<I>(spans: I, map_w: usize) -> Vec<usize>
where
    I: IntoIterator<Item = TileSpan>,
{
    let mut tiles: Vec<usize> = spans
        .into_iter()
        .flat_map(|span| {
            span.tiles()
                .map(|(x, y)| x + y * map_w)
                .collect::<Vec<_>>()
        })
        .collect();
    tiles.sort_unstable();
    tiles.dedup();
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_far_edge_expands_to_full_tile() {
        let span = tile_span(&PixelRect::new(0, 0, 33, 32), 32, 32, 10, 10).expect("span");
        assert_eq!((span.x0, span.x1, span.y0, span.y1), (0, 2, 0, 1));
    }

    #[test]
    fn unaligned_start_rounds_down() {
        let span = tile_span(&PixelRect::new(40, 70, 10, 10), 32, 32, 10, 10).expect("span");
        assert_eq!((span.x0, span.x1, span.y0, span.y1), (1, 2, 2, 3));
    }

    #[test]
    fn clamps_to_map() {
        let span = tile_span(&PixelRect::new(-50, -50, 500, 500), 32, 32, 2, 3).expect("span");
        assert_eq!((span.x0, span.x1, span.y0, span.y1), (0, 2, 0, 3));
        assert!(tile_span(&PixelRect::new(200, 0, 10, 10), 32, 32, 2, 2).is_none());
    }

    #[test]
    fn overlapping_spans_are_deduplicated() {
        let a = tile_span(&PixelRect::new(0, 0, 64, 32), 32, 32, 4, 4).expect("a");
        let b = tile_span(&PixelRect::new(32, 0, 64, 64), 32, 32, 4, 4).expect("b");
        assert_eq!(dirty_tiles([a, b], 4), vec![0, 1, 2, 5, 6]);
    }

    #[test]
    fn clipping_keeps_only_the_onscreen_part() {
        let viewport = PixelRect::new(0, 0, 640, 480);
        assert_eq!(
            clip_to_viewport(&PixelRect::new(600, 400, 100, 100), &viewport),
            Some(PixelRect::new(600, 400, 40, 80))
        );
        assert_eq!(clip_to_viewport(&PixelRect::new(640, 0, 32, 32), &viewport), None);
    }
}
