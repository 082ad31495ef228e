// src/backend/null.rs
//! Backends that do nothing.

use crate::module::abi::{Blit, EventBackend, GraphicsBackend, ImageHandle, ReleaseHandle, Rgb};

/// Graphics backend that accepts everything and draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullGraphics;

impl GraphicsBackend for NullGraphics {
    fn init(&mut self) -> bool {
        true
    }
    fn term(&mut self) {}
    fn init_screen(&mut self, _width: u16, _height: u16, _depth: u8) -> bool {
        true
    }
    fn draw_rect(&mut self, _x: i16, _y: i16, _width: u16, _height: u16, _colour: Rgb) {}
    fn load_image_data(&mut self, _filename: &str) -> Option<ImageHandle> {
        Some(ImageHandle(1))
    }
    fn free_image_data(&mut self, _image: ImageHandle) {}
    fn draw_image(&mut self, _image: ImageHandle, _blit: Blit) {}
    fn update_screen(&mut self) {}
    fn scroll_screen(&mut self, _dx: i16, _dy: i16) {}
}

/// Event backend with no event source.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEvents {
    release: Option<ReleaseHandle>,
}

impl NullEvents {
    /// Whether a release handle has been registered.
    pub fn has_release_handle(&self) -> bool {
        self.release.is_some()
    }
}

impl EventBackend for NullEvents {
    fn init(&mut self) -> bool {
        true
    }
    fn term(&mut self) {
        self.release = None;
    }
    fn process_events(&mut self) {}
    fn register_release_handle(&mut self, handle: ReleaseHandle) {
        self.release = Some(handle);
    }
}
