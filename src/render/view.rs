//! The damage-tracked map view.

use crate::config::RenderSettings;
use crate::error::{ObjectError, ViewError};
use crate::geom::PixelRect;
use crate::graphics::Graphics;
use crate::map::{Map, NO_TILE, NULL_TAG};
use crate::module::abi::ImageHandle;
use crate::object::{ObjectId, ObjectImage, ObjectRegistry, Reference};
use crate::render::cull;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// A queued sprite draw. Owns its copy of the object's image until drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RenderNode {
    object: ObjectId,
    image: ObjectImage,
}

/// What one render pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    /// Dirty rectangles that survived culling.
    pub rects: usize,
    /// Dirty rectangles dropped as off-screen.
    pub culled: usize,
    /// Tile blits issued.
    pub tiles: usize,
    /// Sprite blits issued.
    pub sprites: usize,
}

/// Damage-tracked view over a map.
///
/// Holds a FIFO of dirty rectangles in map pixels and one sprite queue per
/// tag. Both are empty after every [`MapView::render_map`].
#[derive(Debug)]
pub struct MapView {
    map: Map,
    settings: RenderSettings,
    x_offset: i32,
    y_offset: i32,
    dirty: VecDeque<PixelRect>,
    queues: Vec<Vec<RenderNode>>,
}

impl MapView {
    /// Build a view over `map` with the whole map marked dirty.
    ///
    /// Fails with [`ViewError::NoTags`] if no layer is tagged.
    pub fn new(map: Map, settings: RenderSettings) -> Result<Self, ViewError> {
        let tags = map.max_tag();
        if tags == NULL_TAG {
            return Err(ViewError::NoTags);
        }

        let mut view = Self {
            map,
            settings,
            x_offset: 0,
            y_offset: 0,
            dirty: VecDeque::new(),
            queues: (0..tags).map(|_| Vec::new()).collect(),
        };
        let (w, h) = view.pixel_extent();
        view.mark_dirty_rect(0, 0, w, h)?;

        debug!(
            width = view.map.width(),
            height = view.map.height(),
            layers = view.map.num_layers(),
            tags,
            "map view created"
        );
        Ok(view)
    }

    /// The map being viewed.
    pub fn map(&self) -> &Map {
        &self.map
    }

    /// Give the map back.
    pub fn into_map(self) -> Map {
        self.map
    }

    /// Screen and tile settings.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Viewport's top-left corner in map pixels.
    pub fn offset(&self) -> (i32, i32) {
        (self.x_offset, self.y_offset)
    }

    /// The screen's footprint in map pixels.
    pub fn viewport(&self) -> PixelRect {
        PixelRect::new(
            self.x_offset,
            self.y_offset,
            self.settings.screen_width,
            self.settings.screen_height,
        )
    }

    /// Map size in pixels.
    pub fn pixel_extent(&self) -> (i32, i32) {
        (
            self.map.pixel_width(self.settings.tile_width),
            self.map.pixel_height(self.settings.tile_height),
        )
    }

    /// Number of sprite queues, i.e. the highest tag on the map.
    pub fn num_queues(&self) -> usize {
        self.queues.len()
    }

    /// Sprites waiting in the queue for `tag`.
    pub fn queued(&self, tag: u16) -> usize {
        self.queue_index(tag)
            .map(|i| self.queues[i].len())
            .unwrap_or(0)
    }

    /// Rectangles waiting for the next render.
    pub fn dirty_len(&self) -> usize {
        self.dirty.len()
    }

    /// Pending dirty rectangles, oldest first.
    pub fn dirty_rects(&self) -> impl Iterator<Item = &PixelRect> + '_ {
        self.dirty.iter()
    }

    /// Queue a map-pixel rectangle for redraw.
    pub fn mark_dirty_rect(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<(), ViewError> {
        if width <= 0 || height <= 0 {
            return Err(ViewError::InvalidRect { width, height });
        }
        self.dirty.push_back(PixelRect::new(x, y, width, height));
        Ok(())
    }

    fn mark_rect(&mut self, r: PixelRect) -> Result<(), ViewError> {
        self.mark_dirty_rect(r.x, r.y, r.width, r.height)
    }

    fn queue_index(&self, tag: u16) -> Option<usize> {
        if tag == NULL_TAG || tag as usize > self.queues.len() {
            None
        } else {
            Some(tag as usize - 1)
        }
    }

    /// Queue a copy of an object's image on `tag`, after every node with the
    /// same or a smaller depth key.
    pub fn add_object_image(
        &mut self,
        object: ObjectId,
        tag: u16,
        image: ObjectImage,
    ) -> Result<(), ViewError> {
        if tag == NULL_TAG {
            return Err(ViewError::NullTag);
        }
        let index = self.queue_index(tag).ok_or(ViewError::TagOutOfRange {
            tag,
            max: self.queues.len() as u16,
        })?;
        if image.filename.is_empty() {
            return Err(ViewError::MissingFilename);
        }
        if image.width == 0 || image.height == 0 {
            return Err(ViewError::EmptyImage);
        }

        let queue = &mut self.queues[index];
        let key = image.depth_key();
        let pos = queue.partition_point(|n| n.image.depth_key() <= key);
        queue.insert(pos, RenderNode { object, image });
        Ok(())
    }

    /// Redraw everything the dirty queue covers.
    ///
    /// Rectangles are clipped to the viewport and dropped when nothing is
    /// left. Each surviving one is passed to the backend as an update hint and pulls in the tagged
    /// objects it touches. Layers are then painted bottom to top: the
    /// layer's non-transparent dirty tiles, then the sprite queue of the
    /// layer's tag. Leaves the dirty queue and every sprite queue empty.
    pub fn render_map(&mut self, objects: &mut ObjectRegistry, gfx: &mut Graphics) -> RenderStats {
        let mut stats = RenderStats::default();
        if self.dirty.is_empty() {
            return stats;
        }

        let rects: Vec<PixelRect> = self.dirty.drain(..).collect();
        let viewport = self.viewport();
        let mut live = Vec::with_capacity(rects.len());

        for rect in rects {
            let Some(rect) = cull::clip_to_viewport(&rect, &viewport) else {
                stats.culled += 1;
                continue;
            };
            let screen = rect.translate(-self.x_offset, -self.y_offset);
            if let Err(e) = gfx.add_update_rectangle(screen) {
                warn!(error = %e, "update hint dropped");
            }
            self.enqueue_touching(objects, &rect);
            live.push(rect);
        }
        stats.rects = live.len();

        let map_w = self.map.width() as usize;
        let map_h = self.map.height() as usize;
        let (tw, th) = (self.settings.tile_width, self.settings.tile_height);
        let tiles = cull::dirty_tiles(
            live.iter()
                .filter_map(|r| cull::tile_span(r, tw, th, map_w, map_h)),
            map_w,
        );

        let tileset = if tiles.is_empty() {
            None
        } else {
            let image = gfx.load_image(&self.settings.tileset);
            if image.is_none() {
                warn!(tileset = %self.settings.tileset, "tileset unavailable, skipping tile passes");
            }
            image
        };

        for layer in 0..self.map.num_layers() {
            if let Some(image) = tileset {
                stats.tiles += self.draw_layer_tiles(layer, &tiles, image, gfx);
            }
            let tag = self.map.layer_tag(layer).unwrap_or(NULL_TAG);
            if tag != NULL_TAG {
                stats.sprites += self.drain_queue(tag, objects, gfx);
            }
        }

        // Tags between 1 and the max that no layer carries.
        for tag in 1..=self.queues.len() as u16 {
            let leftover = self.take_queue(tag);
            if !leftover.is_empty() {
                debug!(tag, count = leftover.len(), "dropping sprites for tag without a layer");
            }
            for node in leftover {
                objects.clear_dirty(node.object);
            }
        }

        debug!(
            rects = stats.rects,
            culled = stats.culled,
            tiles = stats.tiles,
            sprites = stats.sprites,
            "render pass"
        );
        stats
    }

    fn enqueue_touching(&mut self, objects: &mut ObjectRegistry, rect: &PixelRect) {
        let touching: Vec<ObjectId> = objects
            .iter()
            .filter(|(_, o)| {
                o.tag() != NULL_TAG && !o.is_dirty() && o.image().map_rect().intersects(rect)
            })
            .map(|(id, _)| id)
            .collect();

        for id in touching {
            if let Err(e) = objects.set_dirty(id, self) {
                warn!(error = %e, "object skipped this frame");
            }
        }
    }

    fn draw_layer_tiles(
        &self,
        layer: usize,
        tiles: &[usize],
        image: ImageHandle,
        gfx: &mut Graphics,
    ) -> usize {
        let Some(plane) = self.map.layer(layer).map(|l| l.values()) else {
            return 0;
        };
        let map_w = self.map.width() as usize;
        let (tw, th) = (self.settings.tile_width, self.settings.tile_height);
        let mut drawn = 0;

        for &off in tiles {
            let value = plane[off];
            if value == NO_TILE {
                continue;
            }
            let (x, y) = ((off % map_w) as i32, (off / map_w) as i32);
            let (src_x, src_y) = self.tile_source(value);
            let dst = PixelRect::new(x * tw - self.x_offset, y * th - self.y_offset, tw, th);
            match gfx.draw_image_direct(image, src_x, src_y, dst) {
                Ok(()) => drawn += 1,
                Err(e) => debug!(layer, x, y, error = %e, "tile not drawn"),
            }
        }
        drawn
    }

    /// Position of tile `value` inside the tileset image.
    fn tile_source(&self, value: u16) -> (i32, i32) {
        let (tw, th) = (self.settings.tile_width, self.settings.tile_height);
        match self.settings.tileset_columns {
            Some(cols) => (
                (value % cols) as i32 * tw,
                (value / cols) as i32 * th,
            ),
            None => (value as i32 * tw, 0),
        }
    }

    fn take_queue(&mut self, tag: u16) -> Vec<RenderNode> {
        match self.queue_index(tag) {
            Some(i) => std::mem::take(&mut self.queues[i]),
            None => Vec::new(),
        }
    }

    fn drain_queue(&mut self, tag: u16, objects: &mut ObjectRegistry, gfx: &mut Graphics) -> usize {
        let mut drawn = 0;
        for node in self.take_queue(tag) {
            let img = &node.image;
            let dst = PixelRect::new(
                img.map_x - self.x_offset,
                img.map_y - self.y_offset,
                img.width as i32,
                img.height as i32,
            );
            match gfx.draw_image(&img.filename, img.image_x as i32, img.image_y as i32, dst) {
                Ok(()) => drawn += 1,
                Err(e) => warn!(tag, error = %e, "sprite not drawn"),
            }
            if !objects.clear_dirty(node.object) {
                warn!(tag, filename = %img.filename, "render node lost its parent object");
            }
        }
        drawn
    }

    /// Scroll the viewport by `(dx, dy)` pixels and redraw what came into view.
    ///
    /// The backend shifts the existing screen contents; only the newly
    /// exposed strips on the leading edges are marked dirty.
    pub fn scroll_map(
        &mut self,
        dx: i32,
        dy: i32,
        objects: &mut ObjectRegistry,
        gfx: &mut Graphics,
    ) -> RenderStats {
        if dx == 0 && dy == 0 {
            return self.render_map(objects, gfx);
        }

        self.x_offset += dx;
        self.y_offset += dy;
        let (nx, ny) = (self.x_offset, self.y_offset);
        let (sw, sh) = (self.settings.screen_width, self.settings.screen_height);

        let mut strips = Vec::with_capacity(2);
        let sx = dx.abs().min(sw);
        if dx < 0 {
            strips.push(PixelRect::new(nx, ny, sx, sh));
        } else if dx > 0 {
            strips.push(PixelRect::new(nx + sw - sx, ny, sx, sh));
        }
        let sy = dy.abs().min(sh);
        if dy < 0 {
            strips.push(PixelRect::new(nx, ny, sw, sy));
        } else if dy > 0 {
            strips.push(PixelRect::new(nx, ny + sh - sy, sw, sy));
        }

        if let Err(e) = gfx.scroll_screen(-dx, -dy) {
            warn!(dx, dy, error = %e, "screen scroll failed, redrawing viewport");
            strips = vec![self.viewport()];
        }
        for strip in strips {
            if let Err(e) = self.mark_rect(strip) {
                debug!(error = %e, "empty scroll strip");
            }
        }
        self.render_map(objects, gfx)
    }

    /// Jump the viewport to `(x, y)` and mark the whole screen dirty.
    pub fn set_offset(&mut self, x: i32, y: i32) {
        self.x_offset = x;
        self.y_offset = y;
        let vp = self.viewport();
        if let Err(e) = self.mark_rect(vp) {
            debug!(error = %e, "viewport has no area");
        }
    }

    /// Centre the viewport on an object, clamped to the map edges.
    pub fn focus_on_object(&mut self, objects: &ObjectRegistry, id: ObjectId) -> Result<(), ObjectError> {
        let img = objects.get(id).ok_or(ObjectError::NotFound)?.image();
        let (map_w, map_h) = self.pixel_extent();
        let (sw, sh) = (self.settings.screen_width, self.settings.screen_height);

        let x = (img.map_x + img.width as i32 / 2 - sw / 2).min(map_w - sw).max(0);
        let y = (img.map_y + img.height as i32 / 2 - sh / 2).min(map_h - sh).max(0);
        self.set_offset(x, y);
        Ok(())
    }

    /// Move an object and mark both its old and new footprint dirty.
    pub fn position_object(
        &mut self,
        objects: &mut ObjectRegistry,
        id: ObjectId,
        x: i32,
        y: i32,
        reference: Reference,
    ) -> Result<(), ObjectError> {
        let old = objects.get(id).ok_or(ObjectError::NotFound)?.image().map_rect();
        objects.set_coordinates(id, x, y, reference)?;
        let new = objects.get(id).ok_or(ObjectError::NotFound)?.image().map_rect();

        for r in [old, new] {
            if !r.is_empty() {
                self.mark_rect(r)?;
            }
        }
        Ok(())
    }

    /// Shift an object by `(dx, dy)` map pixels.
    pub fn move_object(
        &mut self,
        objects: &mut ObjectRegistry,
        id: ObjectId,
        dx: i32,
        dy: i32,
    ) -> Result<(), ObjectError> {
        let img = objects.get(id).ok_or(ObjectError::NotFound)?.image();
        let (x, y) = (img.map_x + dx, img.map_y + dy);
        self.position_object(objects, id, x, y, Reference::TopLeft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::{CallLog, GfxCall, RecordingGraphics};

    fn settings() -> RenderSettings {
        RenderSettings {
            screen_width: 64,
            screen_height: 64,
            ..RenderSettings::default()
        }
    }

    fn tagged_map(w: u16, h: u16) -> Map {
        let mut map = Map::new(w, h, 0, 0).expect("map");
        map.set_layer_tag(0, 1).expect("tag");
        map
    }

    fn gfx() -> (Graphics, CallLog) {
        let (backend, log) = RecordingGraphics::new();
        (Graphics::new(Box::new(backend)), log)
    }

    fn sprite(name: &str, y: i32, height: u16) -> ObjectImage {
        ObjectImage {
            filename: name.into(),
            map_x: 0,
            map_y: y,
            width: 16,
            height,
            ..Default::default()
        }
    }

    #[test]
    fn untagged_map_is_rejected() {
        let map = Map::new(2, 2, 1, 0).expect("map");
        assert_eq!(MapView::new(map, settings()).unwrap_err(), ViewError::NoTags);
    }

    #[test]
    fn construction_marks_whole_map() {
        let view = MapView::new(tagged_map(3, 2), settings()).expect("view");
        assert_eq!(view.num_queues(), 1);
        let rects: Vec<_> = view.dirty_rects().copied().collect();
        assert_eq!(rects, vec![PixelRect::new(0, 0, 96, 64)]);
    }

    #[test]
    fn invalid_rect_leaves_queue_unchanged() {
        let mut view = MapView::new(tagged_map(2, 2), settings()).expect("view");
        let before = view.dirty_len();
        assert_eq!(
            view.mark_dirty_rect(0, 0, 0, 5),
            Err(ViewError::InvalidRect { width: 0, height: 5 })
        );
        assert!(view.mark_dirty_rect(0, 0, 5, -1).is_err());
        assert_eq!(view.dirty_len(), before);
    }

    #[test]
    fn equal_keys_keep_insertion_order() {
        let mut view = MapView::new(tagged_map(2, 2), settings()).expect("view");
        let mut reg = ObjectRegistry::new();
        let a = reg.add("a", "s").expect("add");
        let b = reg.add("b", "s").expect("add");
        let c = reg.add("c", "s").expect("add");

        view.add_object_image(a, 1, sprite("a.png", 10, 10)).expect("a");
        view.add_object_image(b, 1, sprite("b.png", 0, 5)).expect("b");
        view.add_object_image(c, 1, sprite("c.png", 15, 5)).expect("c");

        let order: Vec<_> = view.queues[0].iter().map(|n| n.object).collect();
        assert_eq!(order, vec![b, a, c]);
    }

    #[test]
    fn enqueue_validates_image() {
        let mut view = MapView::new(tagged_map(2, 2), settings()).expect("view");
        let mut reg = ObjectRegistry::new();
        let id = reg.add("a", "s").expect("add");

        assert_eq!(view.add_object_image(id, 0, sprite("a.png", 0, 4)), Err(ViewError::NullTag));
        assert_eq!(
            view.add_object_image(id, 2, sprite("a.png", 0, 4)),
            Err(ViewError::TagOutOfRange { tag: 2, max: 1 })
        );
        assert_eq!(view.add_object_image(id, 1, sprite("", 0, 4)), Err(ViewError::MissingFilename));
        assert_eq!(view.add_object_image(id, 1, sprite("a.png", 0, 0)), Err(ViewError::EmptyImage));
        assert_eq!(view.queued(1), 0);
    }

    #[test]
    fn render_empties_both_queues() {
        let mut view = MapView::new(tagged_map(2, 2), settings()).expect("view");
        let mut reg = ObjectRegistry::new();
        let (mut g, _log) = gfx();
        let id = reg.add("a", "s").expect("add");
        view.add_object_image(id, 1, sprite("a.png", 0, 4)).expect("enqueue");

        view.render_map(&mut reg, &mut g);
        assert_eq!(view.dirty_len(), 0);
        assert_eq!(view.queued(1), 0);
    }

    #[test]
    fn empty_queue_renders_nothing() {
        let mut view = MapView::new(tagged_map(2, 2), settings()).expect("view");
        let mut reg = ObjectRegistry::new();
        let (mut g, log) = gfx();
        view.render_map(&mut reg, &mut g);
        log.clear();

        assert_eq!(view.render_map(&mut reg, &mut g), RenderStats::default());
        assert!(log.calls().is_empty());
    }

    #[test]
    fn offscreen_rects_are_culled() {
        let mut map = tagged_map(10, 10);
        map.set_tile_value(0, 9, 9, 3).expect("value");
        let mut view = MapView::new(map, settings()).expect("view");
        let mut reg = ObjectRegistry::new();
        let (mut g, log) = gfx();
        view.render_map(&mut reg, &mut g);
        log.clear();

        view.mark_dirty_rect(288, 288, 32, 32).expect("mark");
        let stats = view.render_map(&mut reg, &mut g);
        assert_eq!(stats.culled, 1);
        assert_eq!(stats.tiles, 0);
        assert_eq!(log.count(|c| matches!(c, GfxCall::UpdateRect { .. })), 0);
    }

    #[test]
    fn only_onscreen_tiles_are_blitted() {
        let mut map = tagged_map(100, 100);
        for y in 0..100 {
            for x in 0..100 {
                map.set_tile_value(0, x, y, 1).expect("value");
            }
        }
        let mut view = MapView::new(map, RenderSettings::default()).expect("view");
        let mut reg = ObjectRegistry::new();
        let (mut g, log) = gfx();

        let stats = view.render_map(&mut reg, &mut g);
        assert_eq!(stats.tiles, 20 * 15);
        assert_eq!(
            log.calls()
                .into_iter()
                .filter(|c| matches!(c, GfxCall::UpdateRect { .. }))
                .collect::<Vec<_>>(),
            vec![GfxCall::UpdateRect {
                x: 0,
                y: 0,
                width: 640,
                height: 480
            }]
        );
    }

    #[test]
    fn wide_map_still_sends_an_update_hint() {
        let mut view = MapView::new(tagged_map(2100, 1), settings()).expect("view");
        let mut reg = ObjectRegistry::new();
        let (mut g, log) = gfx();

        let stats = view.render_map(&mut reg, &mut g);
        assert_eq!(stats.rects, 1);
        assert!(log.calls().contains(&GfxCall::UpdateRect {
            x: 0,
            y: 0,
            width: 64,
            height: 32
        }));
    }

    #[test]
    fn tile_sources_follow_tileset_layout() {
        let mut map = tagged_map(2, 1);
        map.set_tile_value(0, 0, 0, 5).expect("value");
        let mut s = settings();
        s.tileset_columns = Some(4);
        let mut view = MapView::new(map, s).expect("view");
        let mut reg = ObjectRegistry::new();
        let (mut g, log) = gfx();

        view.render_map(&mut reg, &mut g);
        let draws = log.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!((draws[0].1.src_x, draws[0].1.src_y), (32, 32));
    }

    #[test]
    fn missing_tileset_still_draws_sprites() {
        let mut map = tagged_map(2, 2);
        map.set_tile_value(0, 0, 0, 1).expect("value");
        let mut view = MapView::new(map, settings()).expect("view");
        let mut reg = ObjectRegistry::new();
        let (backend, log) = RecordingGraphics::new();
        let mut g = Graphics::new(Box::new(backend.with_missing("tiles.png")));

        let id = reg.add("a", "s").expect("add");
        reg.set_image(id, sprite("a.png", 0, 8)).expect("image");
        reg.set_tag(id, 1).expect("tag");

        let stats = view.render_map(&mut reg, &mut g);
        assert_eq!(stats.tiles, 0);
        assert_eq!(stats.sprites, 1);
        assert_eq!(log.draws()[0].0, "a.png");
    }

    #[test]
    fn deleted_object_does_not_break_the_pass() {
        let mut view = MapView::new(tagged_map(2, 2), settings()).expect("view");
        let mut reg = ObjectRegistry::new();
        let (mut g, _log) = gfx();
        let id = reg.add("a", "s").expect("add");
        reg.set_image(id, sprite("a.png", 0, 8)).expect("image");
        reg.set_tag(id, 1).expect("tag");
        assert_eq!(reg.set_dirty(id, &mut view), Ok(true));
        assert!(reg.delete("a"));

        let stats = view.render_map(&mut reg, &mut g);
        assert_eq!(stats.sprites, 1);
        assert_eq!(view.queued(1), 0);
    }

    #[test]
    fn scroll_marks_leading_strips() {
        let mut view = MapView::new(tagged_map(10, 10), settings()).expect("view");
        let mut reg = ObjectRegistry::new();
        let (mut g, log) = gfx();
        view.render_map(&mut reg, &mut g);
        log.clear();

        view.scroll_map(8, 0, &mut reg, &mut g);
        assert_eq!(view.offset(), (8, 0));
        assert!(log.calls().contains(&GfxCall::ScrollScreen { dx: -8, dy: 0 }));
        assert!(log.calls().contains(&GfxCall::UpdateRect {
            x: 56,
            y: 0,
            width: 8,
            height: 64
        }));

        log.clear();
        view.scroll_map(0, -8, &mut reg, &mut g);
        assert!(log.calls().contains(&GfxCall::UpdateRect {
            x: 0,
            y: 0,
            width: 64,
            height: 8
        }));
    }

    #[test]
    fn focus_clamps_to_map_edges() {
        let mut view = MapView::new(tagged_map(10, 10), settings()).expect("view");
        let mut reg = ObjectRegistry::new();
        let id = reg.add("a", "s").expect("add");
        let mut img = sprite("a.png", 300, 16);
        img.map_x = 300;
        reg.set_image(id, img).expect("image");

        view.focus_on_object(&reg, id).expect("focus");
        assert_eq!(view.offset(), (256, 256));
    }

    #[test]
    fn moving_marks_old_and_new_footprints() {
        let mut view = MapView::new(tagged_map(4, 4), settings()).expect("view");
        let mut reg = ObjectRegistry::new();
        let (mut g, _log) = gfx();
        view.render_map(&mut reg, &mut g);

        let id = reg.add("a", "s").expect("add");
        reg.set_image(id, sprite("a.png", 0, 16)).expect("image");
        view.move_object(&mut reg, id, 4, 2).expect("move");

        let rects: Vec<_> = view.dirty_rects().copied().collect();
        assert_eq!(
            rects,
            vec![PixelRect::new(0, 0, 16, 16), PixelRect::new(4, 2, 16, 16)]
        );
    }
}
