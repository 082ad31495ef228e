// src/loader/chunk.rs
//! IFF chunk ids and the forward chunk scan.

use crate::error::MapError;
use std::io::{self, Read, Seek, SeekFrom};
use tracing::{debug, warn};

/// A four-byte IFF chunk identifier.
pub type ChunkId = [u8; 4];

/// IFF container id.
pub const FORM: ChunkId = *b"FORM";
/// Form type of a map file.
pub const CMFT: ChunkId = *b"CMFT";
/// Format version.
pub const VERS: ChunkId = *b"VERS";
/// Width, height, max layer and max zone index.
pub const DIMS: ChunkId = *b"DIMS";
/// One tag per layer.
pub const TAGS: ChunkId = *b"TAGS";
/// Tile value planes.
pub const VALS: ChunkId = *b"VALS";
/// Zone index planes.
pub const ZONE: ChunkId = *b"ZONE";
/// Zone property bits.
pub const PROP: ChunkId = *b"PROP";

/// Bytes taken by a chunk id plus its length field.
pub const CHUNK_HEADER_LEN: u64 = 8;

/// The body chunks the loader needs, in decode order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Required {
    /// `VERS`
    Version,
    /// `DIMS`
    Dimensions,
    /// `TAGS`
    Tags,
    /// `VALS`
    Values,
    /// `ZONE`
    Zones,
    /// `PROP`
    Properties,
}

impl Required {
    /// Every required chunk, in decode order.
    pub const ALL: [Required; 6] = [
        Required::Version,
        Required::Dimensions,
        Required::Tags,
        Required::Values,
        Required::Zones,
        Required::Properties,
    ];

    /// The chunk's four-byte id.
    pub fn id(self) -> ChunkId {
        match self {
            Required::Version => VERS,
            Required::Dimensions => DIMS,
            Required::Tags => TAGS,
            Required::Values => VALS,
            Required::Zones => ZONE,
            Required::Properties => PROP,
        }
    }

    /// The id as text, for errors and logs.
    pub fn name(self) -> &'static str {
        match self {
            Required::Version => "VERS",
            Required::Dimensions => "DIMS",
            Required::Tags => "TAGS",
            Required::Values => "VALS",
            Required::Zones => "ZONE",
            Required::Properties => "PROP",
        }
    }

    fn from_id(id: &ChunkId) -> Option<Required> {
        Required::ALL.into_iter().find(|r| r.id() == *id)
    }
}

/// Where a chunk's payload starts and how long it claims to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLoc {
    /// Stream offset just past the chunk's length field.
    pub offset: u64,
    /// Declared payload length.
    pub len: u32,
}

/// Result of the forward scan: one slot per required chunk.
#[derive(Debug, Default, Clone)]
pub struct ChunkTable {
    slots: [Option<ChunkLoc>; 6],
}

impl ChunkTable {
    /// Where `which` was found, if it was.
    pub fn get(&self, which: Required) -> Option<ChunkLoc> {
        self.slots[which as usize]
    }

    /// The location of `which`, or [`MapError::MissingChunk`].
    pub fn require(&self, which: Required) -> Result<ChunkLoc, MapError> {
        self.get(which).ok_or(MapError::MissingChunk(which.name()))
    }

    /// Fails on the first required chunk that was never seen.
    pub fn check_complete(&self) -> Result<(), MapError> {
        for which in Required::ALL {
            self.require(which)?;
        }
        Ok(())
    }

    fn record(&mut self, which: Required, loc: ChunkLoc) {
        self.slots[which as usize] = Some(loc);
    }
}

/// Scan a `FORM ... CMFT` stream from the start, recording the payload
/// offset of every recognised chunk and seeking past everything else.
pub fn scan_chunks<R: Read + Seek>(r: &mut R) -> Result<ChunkTable, MapError> {
    r.seek(SeekFrom::Start(0))?;

    expect_magic(r, FORM, "FORM")?;
    let form_len = read_u32_be(r).map_err(|e| eof_in(e, "FORM"))?;
    expect_magic(r, CMFT, "CMFT")?;

    let mut table = ChunkTable::default();
    loop {
        let mut id = [0u8; 4];
        if !read_id(r, &mut id)? {
            break;
        }
        let len = read_u32_be(r).map_err(|e| {
            eof_in(e, Required::from_id(&id).map(Required::name).unwrap_or("body"))
        })?;
        let offset = r.stream_position()?;

        match Required::from_id(&id) {
            Some(which) => {
                debug!(chunk = which.name(), offset, len, "found map chunk");
                table.record(which, ChunkLoc { offset, len });
            }
            None => debug!(
                chunk = %String::from_utf8_lossy(&id),
                offset,
                len,
                "skipping unknown chunk"
            ),
        }

        r.seek(SeekFrom::Current(len as i64))?;
    }

    let end = r.stream_position()?;
    let expected = form_len as u64 + CHUNK_HEADER_LEN;
    if end != expected {
        warn!(expected, end, "map FORM length does not match scanned body");
    }

    Ok(table)
}

/// Reads a chunk id. `Ok(false)` at a clean (or truncated) end of stream.
fn read_id<R: Read>(r: &mut R, id: &mut ChunkId) -> Result<bool, MapError> {
    let mut filled = 0;
    while filled < id.len() {
        match r.read(&mut id[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled == id.len())
}

fn expect_magic<R: Read>(r: &mut R, expected: ChunkId, name: &'static str) -> Result<(), MapError> {
    let mut found = [0u8; 4];
    r.read_exact(&mut found).map_err(|e| eof_in(e, name))?;
    if found != expected {
        return Err(MapError::BadMagic {
            expected: name,
            found,
        });
    }
    Ok(())
}

pub(crate) fn read_u32_be<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

/// Maps a short read to [`MapError::UnexpectedEof`] for `chunk`.
pub(crate) fn eof_in(err: io::Error, chunk: &'static str) -> MapError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        MapError::UnexpectedEof { chunk }
    } else {
        MapError::Read(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = id.to_vec();
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn form(body: &[u8]) -> Vec<u8> {
        let mut out = b"FORM".to_vec();
        out.extend_from_slice(&((body.len() + 4) as u32).to_be_bytes());
        out.extend_from_slice(b"CMFT");
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn records_offsets_past_length_field() {
        let mut body = chunk(b"VERS", &[0, 1]);
        body.extend(chunk(b"DIMS", &[0; 8]));
        let bytes = form(&body);

        let table = scan_chunks(&mut Cursor::new(bytes)).expect("scan");
        // FORM(4) + len(4) + CMFT(4) + VERS(4) + len(4)
        assert_eq!(table.get(Required::Version), Some(ChunkLoc { offset: 20, len: 2 }));
        assert_eq!(table.get(Required::Dimensions), Some(ChunkLoc { offset: 30, len: 8 }));
        assert!(table.get(Required::Tags).is_none());
    }

    #[test]
    fn unknown_chunks_are_skipped() {
        let mut body = chunk(b"JUNK", &[0xAA; 7]);
        body.extend(chunk(b"VERS", &[0, 1]));
        let table = scan_chunks(&mut Cursor::new(form(&body))).expect("scan");
        assert_eq!(table.get(Required::Version).map(|l| l.len), Some(2));
    }

    #[test]
    fn incomplete_table_names_first_missing_chunk() {
        let body = chunk(b"VERS", &[0, 1]);
        let table = scan_chunks(&mut Cursor::new(form(&body))).expect("scan");
        assert!(matches!(
            table.check_complete(),
            Err(MapError::MissingChunk("DIMS"))
        ));
    }

    #[test]
    fn rejects_wrong_form_type() {
        let mut bytes = form(&[]);
        bytes[8..12].copy_from_slice(b"ILBM");
        let err = scan_chunks(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, MapError::BadMagic { expected: "CMFT", .. }));
    }

    #[test]
    fn rejects_missing_form_header() {
        let err = scan_chunks(&mut Cursor::new(b"RIFF\0\0\0\x04CMFT".to_vec())).unwrap_err();
        assert!(matches!(err, MapError::BadMagic { expected: "FORM", .. }));
    }

    #[test]
    fn truncated_length_field_is_eof() {
        let mut bytes = form(&[]);
        bytes.extend_from_slice(b"VERS\0\0");
        let err = scan_chunks(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, MapError::UnexpectedEof { chunk: "VERS" }));
    }
}
