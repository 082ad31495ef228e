// src/module/abi.rs
//! The backend contract: traits, symbol names and symbol-bound backends.

use crate::error::ModuleError;
use crate::module::library::Library;
use std::ffi::{c_char, c_void, CString};
use std::path::Path;

/// Opaque image data owned by a graphics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub usize);

/// Source position and destination rectangle of one image blit, in the
/// backend's 16-bit coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blit {
    /// Left edge inside the source image.
    pub src_x: i16,
    /// Top edge inside the source image.
    pub src_y: i16,
    /// Left edge on screen.
    pub dst_x: i16,
    /// Top edge on screen.
    pub dst_y: i16,
    /// Blit width in pixels.
    pub width: u16,
    /// Blit height in pixels.
    pub height: u16,
}

/// 8-bit RGB colour for filled rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

/// Callback an event backend invokes to hand an event back for release.
pub type ReleaseHandle = extern "C" fn(*mut c_void);

/// What every graphics backend provides.
///
/// The renderer never talks to a backend directly; it goes through
/// [`crate::Graphics`], which owns one of these.
pub trait GraphicsBackend {
    /// Called once when the module is bound. `false` refuses the binding.
    fn init(&mut self) -> bool;
    /// Called once when the module is closed.
    fn term(&mut self);
    /// Opens the screen surface.
    fn init_screen(&mut self, width: u16, height: u16, depth: u8) -> bool;
    /// Fills a screen rectangle.
    fn draw_rect(&mut self, x: i16, y: i16, width: u16, height: u16, colour: Rgb);
    /// Loads image data from `filename`, or `None` if it cannot be read.
    fn load_image_data(&mut self, filename: &str) -> Option<ImageHandle>;
    /// Releases data returned by [`GraphicsBackend::load_image_data`].
    fn free_image_data(&mut self, image: ImageHandle);
    /// Copies part of an image onto the screen.
    fn draw_image(&mut self, image: ImageHandle, blit: Blit);
    /// Presents everything drawn since the last update.
    fn update_screen(&mut self);
    /// Shifts the screen contents by `dx`, `dy` pixels.
    fn scroll_screen(&mut self, dx: i16, dy: i16);

    /// Screen-space damage hint for the next update. Optional.
    fn add_update_rectangle(&mut self, _x: i16, _y: i16, _width: u16, _height: u16) {}
}

/// What every event backend provides.
pub trait EventBackend {
    /// Called once when the module is bound. `false` refuses the binding.
    fn init(&mut self) -> bool;
    /// Called once when the module is closed.
    fn term(&mut self);
    /// Polls pending input, once per frame.
    fn process_events(&mut self);
    /// Installs the callback used to release handled events.
    fn register_release_handle(&mut self, handle: ReleaseHandle);
}

/// Entry points a graphics module must export.
pub const GRAPHICS_SYMBOLS: [&str; 9] = [
    "init",
    "term",
    "init_screen_internal",
    "draw_rect_internal",
    "load_image_data",
    "free_image_data",
    "draw_image_internal",
    "update_screen_internal",
    "scroll_screen_internal",
];

/// Graphics entry point bound when exported, ignored otherwise.
pub const GRAPHICS_OPTIONAL_SYMBOL: &str = "add_update_rectangle_internal";

/// Entry points an event module must export.
pub const EVENT_SYMBOLS: [&str; 4] = [
    "init",
    "term",
    "process_events_internal",
    "register_release_handle",
];

type InitFn = unsafe extern "C" fn() -> bool;
type TermFn = unsafe extern "C" fn();
type InitScreenFn = unsafe extern "C" fn(u16, u16, u8) -> bool;
type DrawRectFn = unsafe extern "C" fn(i16, i16, u16, u16, u8, u8, u8);
type LoadImageFn = unsafe extern "C" fn(*const c_char) -> *mut c_void;
type FreeImageFn = unsafe extern "C" fn(*mut c_void);
type DrawImageFn = unsafe extern "C" fn(*mut c_void, i16, i16, i16, i16, u16, u16);
type UpdateScreenFn = unsafe extern "C" fn();
type ScrollScreenFn = unsafe extern "C" fn(i16, i16);
type UpdateRectFn = unsafe extern "C" fn(i16, i16, u16, u16);
type ProcessEventsFn = unsafe extern "C" fn();
type RegisterReleaseFn = unsafe extern "C" fn(ReleaseHandle);

/// Reinterprets a resolved symbol address as a function pointer.
///
/// # Safety
/// `F` must be a function pointer type matching the exported symbol.
unsafe fn cast<F: Copy>(addr: *const ()) -> F {
    debug_assert_eq!(std::mem::size_of::<F>(), std::mem::size_of::<*const ()>());
    std::mem::transmute_copy(&addr)
}

/// # Safety
/// See [`cast`].
unsafe fn require<F: Copy>(
    lib: &dyn Library,
    path: &Path,
    symbol: &'static str,
) -> Result<F, ModuleError> {
    match lib.symbol(symbol) {
        Some(addr) if !addr.is_null() => Ok(cast(addr)),
        _ => Err(ModuleError::MissingSymbol {
            path: path.to_path_buf(),
            symbol,
        }),
    }
}

/// # Safety
/// See [`cast`].
unsafe fn optional<F: Copy>(lib: &dyn Library, symbol: &str) -> Option<F> {
    lib.symbol(symbol)
        .filter(|addr| !addr.is_null())
        .map(|addr| cast(addr))
}

#[derive(Clone, Copy)]
struct GraphicsSymbols {
    init: InitFn,
    term: TermFn,
    init_screen: InitScreenFn,
    draw_rect: DrawRectFn,
    load_image_data: LoadImageFn,
    free_image_data: FreeImageFn,
    draw_image: DrawImageFn,
    update_screen: UpdateScreenFn,
    scroll_screen: ScrollScreenFn,
    add_update_rectangle: Option<UpdateRectFn>,
}

impl GraphicsSymbols {
    /// Resolves every required entry point, or none.
    fn resolve(lib: &dyn Library, path: &Path) -> Result<Self, ModuleError> {
        let [
            init,
            term,
            init_screen,
            draw_rect,
            load_image_data,
            free_image_data,
            draw_image,
            update_screen,
            scroll_screen,
        ] = GRAPHICS_SYMBOLS;
        // SAFETY: GRAPHICS_SYMBOLS is the graphics module ABI; each type
        // alias spells out the exported C signature.
        unsafe {
            Ok(Self {
                init: require(lib, path, init)?,
                term: require(lib, path, term)?,
                init_screen: require(lib, path, init_screen)?,
                draw_rect: require(lib, path, draw_rect)?,
                load_image_data: require(lib, path, load_image_data)?,
                free_image_data: require(lib, path, free_image_data)?,
                draw_image: require(lib, path, draw_image)?,
                update_screen: require(lib, path, update_screen)?,
                scroll_screen: require(lib, path, scroll_screen)?,
                add_update_rectangle: optional(lib, GRAPHICS_OPTIONAL_SYMBOL),
            })
        }
    }
}

#[derive(Clone, Copy)]
struct EventSymbols {
    init: InitFn,
    term: TermFn,
    process_events: ProcessEventsFn,
    register_release_handle: RegisterReleaseFn,
}

impl EventSymbols {
    fn resolve(lib: &dyn Library, path: &Path) -> Result<Self, ModuleError> {
        let [init, term, process_events, register_release_handle] = EVENT_SYMBOLS;
        // SAFETY: as for GraphicsSymbols, with EVENT_SYMBOLS.
        unsafe {
            Ok(Self {
                init: require(lib, path, init)?,
                term: require(lib, path, term)?,
                process_events: require(lib, path, process_events)?,
                register_release_handle: require(lib, path, register_release_handle)?,
            })
        }
    }
}

/// A graphics module reached through resolved symbols.
///
/// Holds the library open for as long as the symbols may be called.
pub struct DylibGraphics {
    symbols: GraphicsSymbols,
    _library: Box<dyn Library>,
}

impl DylibGraphics {
    /// Resolves every graphics entry point in `library`, or fails with the
    /// first one missing.
    pub fn bind(library: Box<dyn Library>, path: &Path) -> Result<Self, ModuleError> {
        let symbols = GraphicsSymbols::resolve(library.as_ref(), path)?;
        Ok(Self {
            symbols,
            _library: library,
        })
    }
}

// SAFETY (all calls below): the symbols were resolved against `_library`,
// which outlives them, and match the module ABI types.
impl GraphicsBackend for DylibGraphics {
    fn init(&mut self) -> bool {
        unsafe { (self.symbols.init)() }
    }

    fn term(&mut self) {
        unsafe { (self.symbols.term)() }
    }

    fn init_screen(&mut self, width: u16, height: u16, depth: u8) -> bool {
        unsafe { (self.symbols.init_screen)(width, height, depth) }
    }

    fn draw_rect(&mut self, x: i16, y: i16, width: u16, height: u16, colour: Rgb) {
        unsafe { (self.symbols.draw_rect)(x, y, width, height, colour.r, colour.g, colour.b) }
    }

    fn load_image_data(&mut self, filename: &str) -> Option<ImageHandle> {
        let name = CString::new(filename).ok()?;
        let data = unsafe { (self.symbols.load_image_data)(name.as_ptr()) };
        if data.is_null() {
            None
        } else {
            Some(ImageHandle(data as usize))
        }
    }

    fn free_image_data(&mut self, image: ImageHandle) {
        unsafe { (self.symbols.free_image_data)(image.0 as *mut c_void) }
    }

    fn draw_image(&mut self, image: ImageHandle, blit: Blit) {
        unsafe {
            (self.symbols.draw_image)(
                image.0 as *mut c_void,
                blit.src_x,
                blit.src_y,
                blit.dst_x,
                blit.dst_y,
                blit.width,
                blit.height,
            )
        }
    }

    fn update_screen(&mut self) {
        unsafe { (self.symbols.update_screen)() }
    }

    fn scroll_screen(&mut self, dx: i16, dy: i16) {
        unsafe { (self.symbols.scroll_screen)(dx, dy) }
    }

    fn add_update_rectangle(&mut self, x: i16, y: i16, width: u16, height: u16) {
        if let Some(f) = self.symbols.add_update_rectangle {
            unsafe { f(x, y, width, height) }
        }
    }
}

/// An event module reached through resolved symbols.
pub struct DylibEvents {
    symbols: EventSymbols,
    _library: Box<dyn Library>,
}

impl DylibEvents {
    /// Resolves every event entry point in `library`, or fails with the
    /// first one missing.
    pub fn bind(library: Box<dyn Library>, path: &Path) -> Result<Self, ModuleError> {
        let symbols = EventSymbols::resolve(library.as_ref(), path)?;
        Ok(Self {
            symbols,
            _library: library,
        })
    }
}

impl EventBackend for DylibEvents {
    fn init(&mut self) -> bool {
        unsafe { (self.symbols.init)() }
    }

    fn term(&mut self) {
        unsafe { (self.symbols.term)() }
    }

    fn process_events(&mut self) {
        unsafe { (self.symbols.process_events)() }
    }

    fn register_release_handle(&mut self, handle: ReleaseHandle) {
        unsafe { (self.symbols.register_release_handle)(handle) }
    }
}
