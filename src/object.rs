//! Named, scriptable sprite objects.

use crate::error::ObjectError;
use crate::geom::PixelRect;
use crate::map::NULL_TAG;
use crate::render::view::MapView;
use tracing::debug;

/// Number of name buckets.
pub const HASH_VALS: usize = 256;

/// Sum of the name's bytes, folded into a bucket index.
pub fn ascii_hash(name: &str) -> usize {
    name.bytes()
        .fold(0usize, |acc, b| acc.wrapping_add(b as usize))
        % HASH_VALS
}

/// Stable handle to a registered object.
///
/// Handles go stale when their object is deleted; a stale handle never
/// resolves to a later object that reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

/// Where an object's sprite comes from and where it sits on the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectImage {
    /// Source image file.
    pub filename: String,
    /// Left of the sprite inside the source image.
    pub image_x: i16,
    /// Top of the sprite inside the source image.
    pub image_y: i16,
    /// Left of the sprite in map pixels.
    pub map_x: i32,
    /// Top of the sprite in map pixels.
    pub map_y: i32,
    /// Sprite width in pixels.
    pub width: u16,
    /// Sprite height in pixels.
    pub height: u16,
}

impl ObjectImage {
    /// The sprite's footprint in map pixels.
    pub fn map_rect(&self) -> PixelRect {
        PixelRect::new(
            self.map_x,
            self.map_y,
            self.width as i32,
            self.height as i32,
        )
    }

    /// Paint-order key: sprites whose bottom edge is lower draw later.
    #[inline]
    pub fn depth_key(&self) -> i32 {
        self.map_y + self.height as i32
    }
}

/// Which corner of the sprite a coordinate refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reference {
    /// `y` names the sprite's top row.
    #[default]
    TopLeft,
    /// `y` names the sprite's bottom row.
    BottomLeft,
}

/// A placeable sprite owned by a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    name: String,
    script: String,
    tag: u16,
    image: ObjectImage,
    is_dirty: bool,
}

impl Object {
    /// Unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Script file that owns the object.
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Sprite queue tag; 0 is never drawn.
    pub fn tag(&self) -> u16 {
        self.tag
    }

    /// The sprite.
    pub fn image(&self) -> &ObjectImage {
        &self.image
    }

    /// True while the object's image is waiting in a render queue.
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }
}

#[derive(Debug)]
struct Entry {
    object: Object,
    next: Option<u32>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Name-keyed store of objects.
///
/// Objects live in an arena; each name bucket is a singly linked chain of
/// arena indices.
#[derive(Debug)]
pub struct ObjectRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    buckets: Vec<Option<u32>>,
    len: usize,
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            buckets: vec![None; HASH_VALS],
            len: 0,
        }
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.len
    }

    /// No live objects.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Register a new object with no image and tag 0.
    pub fn add(&mut self, name: &str, script: &str) -> Result<ObjectId, ObjectError> {
        if name.is_empty() {
            return Err(ObjectError::EmptyName);
        }
        if script.is_empty() {
            return Err(ObjectError::EmptyScript);
        }
        if self.find(name).is_some() {
            return Err(ObjectError::Duplicate(name.to_owned()));
        }

        let bucket = ascii_hash(name);
        let entry = Entry {
            object: Object {
                name: name.to_owned(),
                script: script.to_owned(),
                tag: NULL_TAG,
                image: ObjectImage::default(),
                is_dirty: false,
            },
            next: self.buckets[bucket],
        };

        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize].entry = Some(entry);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                (self.slots.len() - 1) as u32
            }
        };
        self.buckets[bucket] = Some(index);
        self.len += 1;

        debug!(object = name, bucket, "object added");
        Ok(ObjectId {
            index,
            generation: self.slots[index as usize].generation,
        })
    }

    /// Handle of the object called `name`.
    pub fn find(&self, name: &str) -> Option<ObjectId> {
        let mut cursor = self.buckets[ascii_hash(name)];
        while let Some(index) = cursor {
            let slot = &self.slots[index as usize];
            let entry = slot.entry.as_ref()?;
            if entry.object.name == name {
                return Some(ObjectId {
                    index,
                    generation: slot.generation,
                });
            }
            cursor = entry.next;
        }
        None
    }

    /// The object behind `id`, unless it was deleted.
    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.entry.as_ref())
            .map(|e| &e.object)
    }

    /// The object called `name`.
    pub fn get_by_name(&self, name: &str) -> Option<&Object> {
        self.find(name).and_then(|id| self.get(id))
    }

    fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.entry.as_mut())
            .map(|e| &mut e.object)
    }

    fn object_mut(&mut self, id: ObjectId) -> Result<&mut Object, ObjectError> {
        self.get_mut(id).ok_or(ObjectError::NotFound)
    }

    /// Every live object, in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Object)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.entry.as_ref().map(|e| {
                (
                    ObjectId {
                        index: i as u32,
                        generation: slot.generation,
                    },
                    &e.object,
                )
            })
        })
    }

    /// Replace the object's sprite.
    pub fn set_image(&mut self, id: ObjectId, image: ObjectImage) -> Result<(), ObjectError> {
        self.object_mut(id)?.image = image;
        Ok(())
    }

    /// Set the object's sprite queue tag.
    pub fn set_tag(&mut self, id: ObjectId, tag: u16) -> Result<(), ObjectError> {
        self.object_mut(id)?.tag = tag;
        Ok(())
    }

    /// Move the sprite's anchor in map pixels.
    ///
    /// With [`Reference::BottomLeft`], `y` is the sprite's last row, so the
    /// stored top is `y - (height - 1)`; a `y` that would put the top above
    /// row 0 is rejected and the object is left as it was.
    pub fn set_coordinates(
        &mut self,
        id: ObjectId,
        x: i32,
        y: i32,
        reference: Reference,
    ) -> Result<(), ObjectError> {
        let obj = self.object_mut(id)?;
        let top = match reference {
            Reference::TopLeft => y,
            Reference::BottomLeft => {
                let lift = (obj.image.height as i32 - 1).max(0);
                if y < lift {
                    return Err(ObjectError::BadCoordinates {
                        name: obj.name.clone(),
                        y,
                        height: obj.image.height,
                    });
                }
                y - lift
            }
        };
        obj.image.map_x = x;
        obj.image.map_y = top;
        Ok(())
    }

    /// Queue the object's image for drawing in `view`.
    ///
    /// `Ok(false)` when nothing was queued: the object is already waiting
    /// to be drawn, or it is untagged. The sprite must lie inside the map.
    pub fn set_dirty(&mut self, id: ObjectId, view: &mut MapView) -> Result<bool, ObjectError> {
        let (map_w, map_h) = view.pixel_extent();
        let obj = self.get(id).ok_or(ObjectError::NotFound)?;
        if obj.is_dirty {
            return Ok(false);
        }

        let r = obj.image.map_rect();
        if r.x < 0 || r.y < 0 || r.right() > map_w || r.bottom() > map_h {
            return Err(ObjectError::OutOfBounds {
                name: obj.name.clone(),
            });
        }
        if obj.tag == NULL_TAG {
            return Ok(false);
        }

        view.add_object_image(id, obj.tag, obj.image.clone())?;
        self.object_mut(id)?.is_dirty = true;
        Ok(true)
    }

    /// Clears the dirty flag once the object's image has been drawn.
    /// False if the object no longer exists.
    pub(crate) fn clear_dirty(&mut self, id: ObjectId) -> bool {
        match self.get_mut(id) {
            Some(obj) => {
                obj.is_dirty = false;
                true
            }
            None => false,
        }
    }

    /// Remove the object called `name`.
    pub fn delete(&mut self, name: &str) -> bool {
        let bucket = ascii_hash(name);
        let mut prev: Option<u32> = None;
        let mut cursor = self.buckets[bucket];

        while let Some(index) = cursor {
            let (matches, next) = match self.slots[index as usize].entry.as_ref() {
                Some(e) => (e.object.name == name, e.next),
                None => return false,
            };
            if matches {
                match prev {
                    Some(p) => {
                        if let Some(e) = self.slots[p as usize].entry.as_mut() {
                            e.next = next;
                        }
                    }
                    None => self.buckets[bucket] = next,
                }
                self.release(index);
                debug!(object = name, "object deleted");
                return true;
            }
            prev = cursor;
            cursor = next;
        }
        false
    }

    /// Remove every object.
    pub fn clear(&mut self) {
        for index in 0..self.slots.len() as u32 {
            if self.slots[index as usize].entry.is_some() {
                self.release(index);
            }
        }
        self.buckets.iter_mut().for_each(|b| *b = None);
    }

    fn release(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.len -= 1;
    }
}
