// src/loader/cmft_loader.rs
//! Decoding CMFT map files.

use crate::error::MapError;
use crate::loader::chunk::{eof_in, scan_chunks, ChunkLoc, ChunkTable, Required};
use crate::map::{Map, ZoneProps};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// The only map format version this loader reads.
pub const MAP_VERSION: u16 = 1;

/// Load a CMFT map file from disk.
pub fn load_map<P: AsRef<Path>>(path: P) -> Result<Map, MapError> {
    let p = path.as_ref();
    let file = File::open(p).map_err(|source| MapError::Open {
        path: p.to_path_buf(),
        source,
    })?;
    let map = load_map_from_reader(&mut BufReader::new(file))?;
    debug!(
        path = %p.display(),
        width = map.width(),
        height = map.height(),
        layers = map.num_layers(),
        "loaded map"
    );
    Ok(map)
}

/// Load a CMFT map from any seekable stream.
///
/// The stream is scanned once for chunk positions, then each required
/// chunk is decoded in a fixed order: version, dimensions, tags, value
/// planes, zone planes, zone properties.
pub fn load_map_from_reader<R: Read + Seek>(r: &mut R) -> Result<Map, MapError> {
    let chunks = scan_chunks(r)?;
    chunks.check_complete()?;

    let version = read_version(r, &chunks)?;
    if version != MAP_VERSION {
        return Err(MapError::UnsupportedVersion {
            found: version,
            expected: MAP_VERSION,
        });
    }

    let dims = read_dimensions(r, &chunks)?;
    check_chunk_lengths(&chunks, &dims)?;
    let mut map = Map::new(
        dims.width,
        dims.height,
        dims.max_layer_index,
        dims.max_zone_index,
    )?;

    read_tags(r, &chunks, &mut map)?;
    read_planes(r, &chunks, Required::Values, &mut map)?;
    read_planes(r, &chunks, Required::Zones, &mut map)?;
    read_zone_properties(r, &chunks, &mut map)?;

    Ok(map)
}

struct Dimensions {
    width: u16,
    height: u16,
    max_layer_index: u16,
    max_zone_index: u16,
}

/// Rejects plane chunks too short for the declared dimensions before
/// anything is allocated from them.
fn check_chunk_lengths(chunks: &ChunkTable, dims: &Dimensions) -> Result<(), MapError> {
    let layers = u64::from(dims.max_layer_index) + 1;
    let zones = u64::from(dims.max_zone_index) + 1;
    let plane = u64::from(dims.width)
        .checked_mul(u64::from(dims.height))
        .and_then(|tiles| tiles.checked_mul(layers))
        .and_then(|words| words.checked_mul(2));

    for (which, needed) in [
        (Required::Tags, Some(layers * 2)),
        (Required::Values, plane),
        (Required::Zones, plane),
        (Required::Properties, Some(zones * 2)),
    ] {
        let ChunkLoc { len, .. } = chunks.require(which)?;
        let needed = needed.unwrap_or(u64::MAX);
        if u64::from(len) < needed {
            return Err(MapError::ChunkTooShort {
                chunk: which.name(),
                declared: len,
                needed,
            });
        }
    }
    Ok(())
}

fn read_version<R: Read + Seek>(r: &mut R, chunks: &ChunkTable) -> Result<u16, MapError> {
    let words = read_words(r, chunks, Required::Version, 1)?;
    Ok(words[0])
}

fn read_dimensions<R: Read + Seek>(
    r: &mut R,
    chunks: &ChunkTable,
) -> Result<Dimensions, MapError> {
    let words = read_words(r, chunks, Required::Dimensions, 4)?;
    Ok(Dimensions {
        width: words[0],
        height: words[1],
        max_layer_index: words[2],
        max_zone_index: words[3],
    })
}

fn read_tags<R: Read + Seek>(
    r: &mut R,
    chunks: &ChunkTable,
    map: &mut Map,
) -> Result<(), MapError> {
    let tags = read_words(r, chunks, Required::Tags, map.num_layers())?;
    for (layer, tag) in tags.into_iter().enumerate() {
        map.set_layer_tag(layer, tag)?;
    }
    Ok(())
}

/// Reads one plane per layer, each `width * height` words, rows outermost.
fn read_planes<R: Read + Seek>(
    r: &mut R,
    chunks: &ChunkTable,
    which: Required,
    map: &mut Map,
) -> Result<(), MapError> {
    let tiles = map.width() as usize * map.height() as usize;
    let layers = map.num_layers();
    let words = read_words(r, chunks, which, tiles * layers)?;

    for (layer, plane) in words.chunks_exact(tiles).enumerate() {
        match which {
            Required::Values => map.set_value_plane(layer, plane.to_vec())?,
            _ => map.set_zone_plane(layer, plane.to_vec())?,
        }
    }
    Ok(())
}

fn read_zone_properties<R: Read + Seek>(
    r: &mut R,
    chunks: &ChunkTable,
    map: &mut Map,
) -> Result<(), MapError> {
    let props = read_words(r, chunks, Required::Properties, map.num_zones())?;
    for (zone, bits) in props.into_iter().enumerate() {
        map.set_zone_properties(zone, ZoneProps(bits))?;
    }
    Ok(())
}

/// Seeks to `which` and reads `count` big-endian 16-bit words from it.
fn read_words<R: Read + Seek>(
    r: &mut R,
    chunks: &ChunkTable,
    which: Required,
    count: usize,
) -> Result<Vec<u16>, MapError> {
    let ChunkLoc { offset, len } = chunks.require(which)?;
    let needed = count as u64 * 2;
    if (len as u64) < needed {
        return Err(MapError::ChunkTooShort {
            chunk: which.name(),
            declared: len,
            needed,
        });
    }

    r.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; needed as usize];
    r.read_exact(&mut buf).map_err(|e| eof_in(e, which.name()))?;

    Ok(buf
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect())
}
