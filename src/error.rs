//! Error types, one per subsystem.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Error type for the chunked map loader and the map data model.
///
/// Every variant produced by the loader means the asset is unusable; callers
/// are expected to treat them as fatal for the scene being entered.
#[derive(Debug)]
pub enum MapError {
    /// The map file could not be opened
    Open {
        /// File that was asked for.
        path: PathBuf,
        /// Why opening failed.
        source: io::Error,
    },
    /// A read or seek inside the map stream failed
    Read(io::Error),
    /// A magic identifier (FORM / CMFT) was not where it should be
    BadMagic {
        /// Identifier the format requires.
        expected: &'static str,
        /// Bytes actually read.
        found: [u8; 4],
    },
    /// One of the required chunks never appeared in the body
    MissingChunk(&'static str),
    /// The VERS chunk names a version this loader does not read
    UnsupportedVersion {
        /// Version stored in the file.
        found: u16,
        /// Version this loader reads.
        expected: u16,
    },
    /// A chunk declares fewer bytes than its decoder needs
    ChunkTooShort {
        /// Chunk identifier.
        chunk: &'static str,
        /// Length from the chunk header.
        declared: u32,
        /// Bytes the dimensions call for.
        needed: u64,
    },
    /// The stream ended in the middle of a chunk
    UnexpectedEof {
        /// Chunk being read when the data ran out.
        chunk: &'static str,
    },
    /// Width or height of zero
    InvalidDimensions {
        /// Requested width in tiles.
        width: u16,
        /// Requested height in tiles.
        height: u16,
    },
    /// A layer, zone or tile coordinate outside the map
    IndexOutOfRange {
        /// Kind of index: layer, zone or tile.
        what: &'static str,
        /// The offending index.
        index: usize,
    },
}

impl From<io::Error> for MapError {
    fn from(err: io::Error) -> Self {
        MapError::Read(err)
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Open { path, source } => {
                write!(f, "cannot open map file {}: {}", path.display(), source)
            }
            MapError::Read(e) => write!(f, "I/O error while reading map: {}", e),
            MapError::BadMagic { expected, found } => write!(
                f,
                "expected magic '{}', found '{}'",
                expected,
                String::from_utf8_lossy(found)
            ),
            MapError::MissingChunk(id) => write!(f, "required chunk {} is missing", id),
            MapError::UnsupportedVersion { found, expected } => write!(
                f,
                "map version {} is not supported (expected {})",
                found, expected
            ),
            MapError::ChunkTooShort {
                chunk,
                declared,
                needed,
            } => write!(
                f,
                "chunk {} declares {} bytes but {} are needed",
                chunk, declared, needed
            ),
            MapError::UnexpectedEof { chunk } => {
                write!(f, "unexpected end of file inside chunk {}", chunk)
            }
            MapError::InvalidDimensions { width, height } => {
                write!(f, "invalid map dimensions {}x{}", width, height)
            }
            MapError::IndexOutOfRange { what, index } => {
                write!(f, "{} index {} is out of range", what, index)
            }
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Open { source, .. } => Some(source),
            MapError::Read(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors raised by the map view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// Every layer of the map has tag 0, so no sprite could ever be drawn
    NoTags,
    /// A dirty rectangle with a non-positive width or height
    InvalidRect {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },
    /// Tag 0 never has a render queue
    NullTag,
    /// Tag above the highest tag the view was built with
    TagOutOfRange {
        /// Tag asked for.
        tag: u16,
        /// Highest tag the view has a queue for.
        max: u16,
    },
    /// An object image without a source filename
    MissingFilename,
    /// An object image with zero width or height
    EmptyImage,
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::NoTags => write!(f, "no tags in map; nothing can render a sprite"),
            ViewError::InvalidRect { width, height } => {
                write!(f, "dirty rectangle has invalid size {}x{}", width, height)
            }
            ViewError::NullTag => write!(f, "tried to render to tag 0"),
            ViewError::TagOutOfRange { tag, max } => {
                write!(f, "tag {} is above the highest map tag {}", tag, max)
            }
            ViewError::MissingFilename => write!(f, "object image has no filename"),
            ViewError::EmptyImage => write!(f, "object image has zero width or height"),
        }
    }
}

impl std::error::Error for ViewError {}

/// Errors raised by the object registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectError {
    /// Object names must be non-empty
    EmptyName,
    /// Script filenames must be non-empty
    EmptyScript,
    /// An object with this name already exists
    Duplicate(String),
    /// The id does not refer to a live object
    NotFound,
    /// Bottom-left anchoring would move the sprite above the map
    BadCoordinates {
        /// Object name.
        name: String,
        /// Requested bottom row.
        y: i32,
        /// Sprite height.
        height: u16,
    },
    /// The sprite does not fit inside the map's pixel extents
    OutOfBounds {
        /// Object name.
        name: String,
    },
    /// The map view refused the object's image
    Rejected(ViewError),
}

impl From<ViewError> for ObjectError {
    fn from(err: ViewError) -> Self {
        ObjectError::Rejected(err)
    }
}

impl fmt::Display for ObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectError::EmptyName => write!(f, "object name is empty"),
            ObjectError::EmptyScript => write!(f, "script filename is empty"),
            ObjectError::Duplicate(name) => write!(f, "duplicate object '{}'", name),
            ObjectError::NotFound => write!(f, "no such object"),
            ObjectError::BadCoordinates { name, y, height } => write!(
                f,
                "object '{}' cannot be anchored at y={} with height {}",
                name, y, height
            ),
            ObjectError::OutOfBounds { name } => write!(f, "object '{}' is out of bounds", name),
            ObjectError::Rejected(e) => write!(f, "map view rejected object image: {}", e),
        }
    }
}

impl std::error::Error for ObjectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ObjectError::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

/// Errors raised while binding or using backend modules.
#[derive(Debug)]
pub enum ModuleError {
    /// The slot already holds a bound module
    AlreadyLoaded(&'static str),
    /// The slot holds nothing
    NotLoaded(&'static str),
    /// The library file could not be opened
    Open {
        /// Library path tried.
        path: PathBuf,
        /// Loader's message.
        reason: String,
    },
    /// A required entry point is not exported
    MissingSymbol {
        /// Library that lacks the symbol.
        path: PathBuf,
        /// First entry point that did not resolve.
        symbol: &'static str,
    },
    /// The module's `init` returned false
    InitFailed(&'static str),
    /// The graphics module refused the requested screen mode
    ScreenFailed {
        /// Requested width in pixels.
        width: u16,
        /// Requested height in pixels.
        height: u16,
        /// Requested bits per pixel.
        depth: u8,
    },
}

impl fmt::Display for ModuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleError::AlreadyLoaded(kind) => write!(f, "{} module already loaded", kind),
            ModuleError::NotLoaded(kind) => write!(f, "{} module not loaded", kind),
            ModuleError::Open { path, reason } => {
                write!(f, "cannot open module {}: {}", path.display(), reason)
            }
            ModuleError::MissingSymbol { path, symbol } => write!(
                f,
                "module {} does not export '{}'",
                path.display(),
                symbol
            ),
            ModuleError::InitFailed(kind) => write!(f, "{} module failed to initialise", kind),
            ModuleError::ScreenFailed {
                width,
                height,
                depth,
            } => write!(f, "could not open a {}x{}x{} screen", width, height, depth),
        }
    }
}

impl std::error::Error for ModuleError {}

/// Errors raised by the graphics facade on a single draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// The backend could not load the named image
    ImageUnavailable(String),
    /// A coordinate or size does not fit the backend's 16-bit ABI
    OutOfRange {
        /// The value that did not fit.
        value: i32,
    },
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::ImageUnavailable(name) => write!(f, "cannot load image '{}'", name),
            GraphicsError::OutOfRange { value } => {
                write!(f, "value {} does not fit in the backend's range", value)
            }
        }
    }
}

impl std::error::Error for GraphicsError {}

/// Errors raised while reading engine configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// File I/O error
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// JSON parse error
    Json {
        /// Config file path, `None` for inline text.
        path: Option<PathBuf>,
        /// Underlying error.
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read config {}: {}", path.display(), source)
            }
            ConfigError::Json {
                path: Some(path),
                source,
            } => write!(f, "cannot parse config {}: {}", path.display(), source),
            ConfigError::Json { path: None, source } => {
                write!(f, "cannot parse config: {}", source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Json { source, .. } => Some(source),
        }
    }
}
