// src/loader/cmft_writer.rs
//! Encoding maps as CMFT files.

use crate::loader::chunk::{ChunkId, CMFT, DIMS, FORM, PROP, TAGS, VALS, VERS, ZONE};
use crate::loader::cmft_loader::MAP_VERSION;
use crate::map::Map;
use std::io::{self, Write};

/// Serialise a map in the CMFT layout the loader reads.
///
/// Chunks are written in canonical order (VERS, DIMS, TAGS, VALS, ZONE,
/// PROP) with planes stored row by row.
pub fn encode_map(map: &Map) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&CMFT);

    put_chunk(&mut body, VERS, &[MAP_VERSION]);
    put_chunk(
        &mut body,
        DIMS,
        &[
            map.width(),
            map.height(),
            map.max_layer_index(),
            map.max_zone_index(),
        ],
    );

    let tags: Vec<u16> = map.layers().iter().map(|l| l.tag()).collect();
    put_chunk(&mut body, TAGS, &tags);

    let values: Vec<u16> = map
        .layers()
        .iter()
        .flat_map(|l| l.values().iter().copied())
        .collect();
    put_chunk(&mut body, VALS, &values);

    let zones: Vec<u16> = map
        .layers()
        .iter()
        .flat_map(|l| l.zones().iter().copied())
        .collect();
    put_chunk(&mut body, ZONE, &zones);

    let props: Vec<u16> = (0..map.num_zones())
        .filter_map(|z| map.zone_properties(z))
        .map(|p| p.bits())
        .collect();
    put_chunk(&mut body, PROP, &props);

    let mut out = Vec::with_capacity(body.len() + 8);
    out.extend_from_slice(&FORM);
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend(body);
    out
}

/// Write a map to any sink.
pub fn write_map<W: Write>(map: &Map, w: &mut W) -> io::Result<()> {
    w.write_all(&encode_map(map))
}

fn put_chunk(out: &mut Vec<u8>, id: ChunkId, words: &[u16]) {
    out.extend_from_slice(&id);
    out.extend_from_slice(&((words.len() * 2) as u32).to_be_bytes());
    for w in words {
        out.extend_from_slice(&w.to_be_bytes());
    }
}
