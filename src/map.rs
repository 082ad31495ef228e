//! The layered tile map.

use crate::error::MapError;

/// A tile value of zero is transparent.
pub const NO_TILE: u16 = 0;
/// Layers with this tag never get sprites drawn over them.
pub const NULL_TAG: u16 = 0;

/// Cardinal direction, used for zone blocking checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Top edge.
    North,
    /// Right edge.
    East,
    /// Bottom edge.
    South,
    /// Left edge.
    West,
}

/// Bitmask of properties attached to a zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ZoneProps(pub u16);

impl ZoneProps {
    /// Cannot be entered across the north edge.
    pub const BLOCK_NORTH: u16 = 1 << 0;
    /// Cannot be entered across the east edge.
    pub const BLOCK_EAST: u16 = 1 << 1;
    /// Cannot be entered across the south edge.
    pub const BLOCK_SOUTH: u16 = 1 << 2;
    /// Cannot be entered across the west edge.
    pub const BLOCK_WEST: u16 = 1 << 3;

    /// Raw bits.
    #[inline]
    pub fn bits(self) -> u16 {
        self.0
    }

    /// Whether entering the zone from `from` is blocked.
    pub fn blocks(self, from: Direction) -> bool {
        let bit = match from {
            Direction::North => Self::BLOCK_NORTH,
            Direction::East => Self::BLOCK_EAST,
            Direction::South => Self::BLOCK_SOUTH,
            Direction::West => Self::BLOCK_WEST,
        };
        self.0 & bit != 0
    }
}

/// One full-map grid: tile values, zone indices and the layer's tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    tag: u16,
    values: Vec<u16>,
    zones: Vec<u16>,
}

impl Layer {
    fn blank(tiles: usize) -> Self {
        Self {
            tag: NULL_TAG,
            values: vec![NO_TILE; tiles],
            zones: vec![0; tiles],
        }
    }

    /// Tag binding this layer to a sprite queue; 0 for none.
    #[inline]
    pub fn tag(&self) -> u16 {
        self.tag
    }

    /// Tile values, row-major (`x + y * width`).
    #[inline]
    pub fn values(&self) -> &[u16] {
        &self.values
    }

    /// Zone indices, row-major (`x + y * width`).
    #[inline]
    pub fn zones(&self) -> &[u16] {
        &self.zones
    }
}

/// In-memory layered tile map.
///
/// All planes are stored row-major and indexed with `x + y * width`; the
/// loader, the writer and the renderer share this convention through
/// [`Map::offset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    width: u16,
    height: u16,
    layers: Vec<Layer>,
    zone_props: Vec<ZoneProps>,
}

impl Map {
    /// Allocate a blank map. Every tile is transparent, every tag is 0.
    pub fn new(
        width: u16,
        height: u16,
        max_layer_index: u16,
        max_zone_index: u16,
    ) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::InvalidDimensions { width, height });
        }
        let tiles = width as usize * height as usize;
        let num_layers = max_layer_index as usize + 1;
        let num_zones = max_zone_index as usize + 1;

        Ok(Self {
            width,
            height,
            layers: (0..num_layers).map(|_| Layer::blank(tiles)).collect(),
            zone_props: vec![ZoneProps::default(); num_zones],
        })
    }

    /// Width in tiles.
    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in tiles.
    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of layers, at least 1.
    #[inline]
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Index of the top layer.
    #[inline]
    pub fn max_layer_index(&self) -> u16 {
        (self.layers.len() - 1) as u16
    }

    /// Number of zones, at least 1.
    #[inline]
    pub fn num_zones(&self) -> usize {
        self.zone_props.len()
    }

    /// Highest zone index.
    #[inline]
    pub fn max_zone_index(&self) -> u16 {
        (self.zone_props.len() - 1) as u16
    }

    /// Width in pixels for the given tile width.
    pub fn pixel_width(&self, tile_width: i32) -> i32 {
        self.width as i32 * tile_width
    }

    /// Height in pixels for the given tile height.
    pub fn pixel_height(&self, tile_height: i32) -> i32 {
        self.height as i32 * tile_height
    }

    /// Layers, bottom first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// One layer, if it exists.
    pub fn layer(&self, layer: usize) -> Option<&Layer> {
        self.layers.get(layer)
    }

    /// Plane offset of tile `(x, y)`, or `None` outside the map.
    #[inline]
    pub fn offset(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width as usize && y < self.height as usize {
            Some(x + y * self.width as usize)
        } else {
            None
        }
    }

    /// Tag of `layer`.
    pub fn layer_tag(&self, layer: usize) -> Option<u16> {
        self.layers.get(layer).map(|l| l.tag)
    }

    /// Set the tag of `layer`.
    pub fn set_layer_tag(&mut self, layer: usize, tag: u16) -> Result<(), MapError> {
        let l = self.layers.get_mut(layer).ok_or(MapError::IndexOutOfRange {
            what: "layer",
            index: layer,
        })?;
        l.tag = tag;
        Ok(())
    }

    /// Highest tag on any layer; 0 if no layer is tagged.
    pub fn max_tag(&self) -> u16 {
        self.layers.iter().map(|l| l.tag).max().unwrap_or(NULL_TAG)
    }

    /// Tile value at `(x, y)` on `layer`.
    pub fn tile_value(&self, layer: usize, x: usize, y: usize) -> Option<u16> {
        let off = self.offset(x, y)?;
        self.layers.get(layer).map(|l| l.values[off])
    }

    /// Set the tile value at `(x, y)` on `layer`.
    pub fn set_tile_value(
        &mut self,
        layer: usize,
        x: usize,
        y: usize,
        value: u16,
    ) -> Result<(), MapError> {
        let off = self.tile_offset_checked(x, y)?;
        self.layer_mut(layer)?.values[off] = value;
        Ok(())
    }

    /// Zone index at `(x, y)` on `layer`.
    pub fn tile_zone(&self, layer: usize, x: usize, y: usize) -> Option<u16> {
        let off = self.offset(x, y)?;
        self.layers.get(layer).map(|l| l.zones[off])
    }

    /// Set the zone index at `(x, y)` on `layer`.
    pub fn set_tile_zone(
        &mut self,
        layer: usize,
        x: usize,
        y: usize,
        zone: u16,
    ) -> Result<(), MapError> {
        let off = self.tile_offset_checked(x, y)?;
        self.layer_mut(layer)?.zones[off] = zone;
        Ok(())
    }

    /// Property bits of `zone`.
    pub fn zone_properties(&self, zone: usize) -> Option<ZoneProps> {
        self.zone_props.get(zone).copied()
    }

    /// Set the property bits of `zone`.
    pub fn set_zone_properties(&mut self, zone: usize, props: ZoneProps) -> Result<(), MapError> {
        let slot = self.zone_props.get_mut(zone).ok_or(MapError::IndexOutOfRange {
            what: "zone",
            index: zone,
        })?;
        *slot = props;
        Ok(())
    }

    /// Properties of the zone under tile `(x, y)` on `layer`.
    pub fn zone_at(&self, layer: usize, x: usize, y: usize) -> Option<ZoneProps> {
        let zone = self.tile_zone(layer, x, y)?;
        self.zone_properties(zone as usize)
    }

    /// Replace a whole value plane. Used by the loader.
    pub(crate) fn set_value_plane(&mut self, layer: usize, plane: Vec<u16>) -> Result<(), MapError> {
        self.check_plane_len(plane.len())?;
        self.layer_mut(layer)?.values = plane;
        Ok(())
    }

    /// Replace a whole zone plane. Used by the loader.
    pub(crate) fn set_zone_plane(&mut self, layer: usize, plane: Vec<u16>) -> Result<(), MapError> {
        self.check_plane_len(plane.len())?;
        self.layer_mut(layer)?.zones = plane;
        Ok(())
    }

    fn check_plane_len(&self, len: usize) -> Result<(), MapError> {
        let tiles = self.width as usize * self.height as usize;
        if len != tiles {
            return Err(MapError::IndexOutOfRange {
                what: "plane length",
                index: len,
            });
        }
        Ok(())
    }

    fn tile_offset_checked(&self, x: usize, y: usize) -> Result<usize, MapError> {
        self.offset(x, y).ok_or(MapError::IndexOutOfRange {
            what: "tile",
            index: x.max(y),
        })
    }

    fn layer_mut(&mut self, layer: usize) -> Result<&mut Layer, MapError> {
        self.layers.get_mut(layer).ok_or(MapError::IndexOutOfRange {
            what: "layer",
            index: layer,
        })
    }
}
