#![warn(missing_docs)]

//! Chunked binary tile maps, a dirty-rectangle map renderer and swappable
//! graphics/event backend modules.
//!
//! A map is loaded once from a `FORM`/`CMFT` file ([`load_map`]), wrapped in
//! a [`MapView`], and redrawn each frame through whatever [`Graphics`]
//! backend the [`ModuleSet`] has bound. Only areas marked dirty are redrawn.

pub mod config;
pub mod engine;
pub mod error;
pub mod geom;
pub mod graphics;
pub mod map;
pub mod object;

pub mod loader {
    //! Reading and writing CMFT map files.
    pub mod chunk;
    pub mod cmft_loader;
    pub mod cmft_writer;
}

pub mod render {
    //! Damage tracking and painting.
    pub mod cull;
    pub mod view;
}

pub mod module {
    //! Backend contracts and how backends are found and bound.
    pub mod abi;
    pub mod library;
    pub mod set;
}

pub mod backend {
    //! Backends that live in the executable.
    pub mod macroquad_gfx;
    pub mod null;
    pub mod recording;
}

pub use config::{EngineConfig, RenderSettings};
pub use engine::{Engine, Frame};
pub use error::{ConfigError, GraphicsError, MapError, ModuleError, ObjectError, ViewError};
pub use geom::{PixelRect, TileSpan};
pub use graphics::Graphics;
pub use loader::cmft_loader::{load_map, load_map_from_reader, MAP_VERSION};
pub use loader::cmft_writer::{encode_map, write_map};
pub use map::{Direction, Layer, Map, ZoneProps, NO_TILE, NULL_TAG};
pub use module::abi::{Blit, EventBackend, GraphicsBackend, ImageHandle, ReleaseHandle, Rgb};
pub use module::library::{DylibLoader, Library, LibraryLoader, StaticLibrary, StaticLoader};
pub use module::set::{ModuleKind, ModuleSet};
pub use object::{Object, ObjectId, ObjectImage, ObjectRegistry, Reference};
pub use render::view::{MapView, RenderStats};
