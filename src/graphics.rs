//! Image table and coordinate checks in front of a graphics backend.

use crate::error::{GraphicsError, ModuleError};
use crate::geom::PixelRect;
use crate::module::abi::{Blit, GraphicsBackend, ImageHandle, Rgb};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Front end over a bound graphics backend.
///
/// Converts the renderer's `i32` pixel geometry to the backend's 16-bit ABI
/// and keeps one loaded image per filename.
pub struct Graphics {
    backend: Box<dyn GraphicsBackend>,
    images: HashMap<String, ImageHandle>,
}

impl Graphics {
    /// Wrap an initialised backend.
    pub fn new(backend: Box<dyn GraphicsBackend>) -> Self {
        Self {
            backend,
            images: HashMap::new(),
        }
    }

    /// Open the screen, failing if the backend refuses the mode.
    pub fn init_screen(&mut self, width: u16, height: u16, depth: u8) -> Result<(), ModuleError> {
        if self.backend.init_screen(width, height, depth) {
            debug!(width, height, depth, "screen initialised");
            Ok(())
        } else {
            Err(ModuleError::ScreenFailed {
                width,
                height,
                depth,
            })
        }
    }

    /// Handle for `filename`, loading it on first use.
    pub fn load_image(&mut self, filename: &str) -> Option<ImageHandle> {
        if let Some(&handle) = self.images.get(filename) {
            return Some(handle);
        }
        match self.backend.load_image_data(filename) {
            Some(handle) => {
                debug!(filename, ?handle, "image loaded");
                self.images.insert(filename.to_owned(), handle);
                Some(handle)
            }
            None => {
                warn!(filename, "backend could not load image");
                None
            }
        }
    }

    /// Handle for an already loaded image.
    pub fn find_image(&self, filename: &str) -> Option<ImageHandle> {
        self.images.get(filename).copied()
    }

    /// Release the image loaded for `filename`. `false` if none was.
    pub fn free_image(&mut self, filename: &str) -> bool {
        match self.images.remove(filename) {
            Some(handle) => {
                self.backend.free_image_data(handle);
                true
            }
            None => false,
        }
    }

    /// Free every cached image.
    pub fn clear_images(&mut self) {
        for (_, handle) in self.images.drain() {
            self.backend.free_image_data(handle);
        }
    }

    /// Fill a screen rectangle.
    pub fn draw_rect(&mut self, rect: PixelRect, colour: Rgb) -> Result<(), GraphicsError> {
        let (x, y, w, h) = screen_rect(rect)?;
        self.backend.draw_rect(x, y, w, h, colour);
        Ok(())
    }

    /// Blit part of the image `filename` (loading it if needed) into `dst`.
    pub fn draw_image(
        &mut self,
        filename: &str,
        src_x: i32,
        src_y: i32,
        dst: PixelRect,
    ) -> Result<(), GraphicsError> {
        let image = self
            .load_image(filename)
            .ok_or_else(|| GraphicsError::ImageUnavailable(filename.to_owned()))?;
        self.draw_image_direct(image, src_x, src_y, dst)
    }

    /// Blit from an already loaded image.
    pub fn draw_image_direct(
        &mut self,
        image: ImageHandle,
        src_x: i32,
        src_y: i32,
        dst: PixelRect,
    ) -> Result<(), GraphicsError> {
        let (dst_x, dst_y, width, height) = screen_rect(dst)?;
        let blit = Blit {
            src_x: to_i16(src_x)?,
            src_y: to_i16(src_y)?,
            dst_x,
            dst_y,
            width,
            height,
        };
        self.backend.draw_image(image, blit);
        Ok(())
    }

    /// Pass a screen-space damage rectangle on to the backend.
    pub fn add_update_rectangle(&mut self, rect: PixelRect) -> Result<(), GraphicsError> {
        let (x, y, w, h) = screen_rect(rect)?;
        self.backend.add_update_rectangle(x, y, w, h);
        Ok(())
    }

    /// Shift the screen contents.
    pub fn scroll_screen(&mut self, dx: i32, dy: i32) -> Result<(), GraphicsError> {
        self.backend.scroll_screen(to_i16(dx)?, to_i16(dy)?);
        Ok(())
    }

    /// Present the frame.
    pub fn update_screen(&mut self) {
        self.backend.update_screen();
    }

    /// Free images and terminate the backend.
    pub(crate) fn shutdown(&mut self) {
        self.clear_images();
        self.backend.term();
    }
}

fn to_i16(value: i32) -> Result<i16, GraphicsError> {
    i16::try_from(value).map_err(|_| GraphicsError::OutOfRange { value })
}

fn to_u16(value: i32) -> Result<u16, GraphicsError> {
    u16::try_from(value).map_err(|_| GraphicsError::OutOfRange { value })
}

fn screen_rect(rect: PixelRect) -> Result<(i16, i16, u16, u16), GraphicsError> {
    Ok((
        to_i16(rect.x)?,
        to_i16(rect.y)?,
        to_u16(rect.width)?,
        to_u16(rect.height)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::{GfxCall, RecordingGraphics};

    #[test]
    fn images_are_loaded_once() {
        let (backend, log) = RecordingGraphics::new();
        let mut gfx = Graphics::new(Box::new(backend));
        let a = gfx.load_image("hero.png").expect("load");
        let b = gfx.load_image("hero.png").expect("load");
        assert_eq!(a, b);
        assert_eq!(log.count(|c| matches!(c, GfxCall::LoadImage(_))), 1);
    }

    #[test]
    fn unavailable_image_is_an_error() {
        let (backend, _log) = RecordingGraphics::new();
        let mut gfx = Graphics::new(Box::new(backend.with_missing("nope.png")));
        let err = gfx
            .draw_image("nope.png", 0, 0, PixelRect::new(0, 0, 4, 4))
            .unwrap_err();
        assert_eq!(err, GraphicsError::ImageUnavailable("nope.png".into()));
    }

    #[test]
    fn coordinates_outside_i16_are_rejected() {
        let (backend, log) = RecordingGraphics::new();
        let mut gfx = Graphics::new(Box::new(backend));
        let err = gfx
            .draw_rect(PixelRect::new(40_000, 0, 1, 1), Rgb { r: 0, g: 0, b: 0 })
            .unwrap_err();
        assert_eq!(err, GraphicsError::OutOfRange { value: 40_000 });
        assert!(gfx.draw_rect(PixelRect::new(0, 0, -1, 1), Rgb { r: 0, g: 0, b: 0 }).is_err());
        assert_eq!(log.count(|c| matches!(c, GfxCall::DrawRect { .. })), 0);
    }

    #[test]
    fn shutdown_frees_images_then_terminates() {
        let (backend, log) = RecordingGraphics::new();
        let mut gfx = Graphics::new(Box::new(backend));
        gfx.load_image("a.png");
        gfx.shutdown();
        let calls = log.calls();
        let n = calls.len();
        assert!(matches!(calls[n - 2], GfxCall::FreeImage(_)));
        assert_eq!(calls[n - 1], GfxCall::Term);
        assert!(gfx.find_image("a.png").is_none());
    }
}
