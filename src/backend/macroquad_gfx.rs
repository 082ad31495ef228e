// src/backend/macroquad_gfx.rs
//! A graphics backend drawing with macroquad.

use crate::module::abi::{Blit, GraphicsBackend, ImageHandle, Rgb};
use macroquad::prelude::*;
use std::path::PathBuf;
use tracing::{debug, warn};

/// In-process graphics backend drawing through macroquad.
///
/// The map is composed into an off-screen target that persists between
/// frames, so only dirty areas need redrawing. `update_screen` copies it to
/// the window; the caller still awaits `next_frame()`.
pub struct MacroquadGraphics {
    asset_root: PathBuf,
    size: Vec2,
    front: Option<RenderTarget>,
    back: Option<RenderTarget>,
    images: Vec<Option<Texture2D>>,
}

impl MacroquadGraphics {
    /// Image filenames are resolved against `asset_root`.
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
            size: Vec2::ZERO,
            front: None,
            back: None,
            images: Vec::new(),
        }
    }

    fn target_camera(&self, target: &RenderTarget) -> Camera2D {
        let mut cam = Camera2D::from_display_rect(Rect::new(0.0, 0.0, self.size.x, self.size.y));
        cam.render_target = Some(target.clone());
        cam
    }

    fn draw_to_front(&self) -> bool {
        match &self.front {
            Some(front) => {
                set_camera(&self.target_camera(front));
                true
            }
            None => false,
        }
    }

    fn texture(&self, image: ImageHandle) -> Option<&Texture2D> {
        image
            .0
            .checked_sub(1)
            .and_then(|i| self.images.get(i))
            .and_then(|t| t.as_ref())
    }
}

fn new_target(w: u16, h: u16) -> RenderTarget {
    let rt = render_target(w as u32, h as u32);
    rt.texture.set_filter(FilterMode::Nearest);
    rt
}

impl GraphicsBackend for MacroquadGraphics {
    fn init(&mut self) -> bool {
        true
    }

    fn term(&mut self) {
        self.images.clear();
        self.front = None;
        self.back = None;
        set_default_camera();
    }

    fn init_screen(&mut self, width: u16, height: u16, depth: u8) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        debug!(width, height, depth, "opening macroquad screen");
        request_new_screen_size(width as f32, height as f32);
        self.size = vec2(width as f32, height as f32);
        self.front = Some(new_target(width, height));
        self.back = Some(new_target(width, height));
        if self.draw_to_front() {
            clear_background(BLACK);
        }
        true
    }

    fn draw_rect(&mut self, x: i16, y: i16, width: u16, height: u16, colour: Rgb) {
        if self.draw_to_front() {
            draw_rectangle(
                x as f32,
                y as f32,
                width as f32,
                height as f32,
                Color::from_rgba(colour.r, colour.g, colour.b, 255),
            );
        }
    }

    fn load_image_data(&mut self, filename: &str) -> Option<ImageHandle> {
        let path = self.asset_root.join(filename);
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read image");
                return None;
            }
        };
        let image = match Image::from_file_with_format(&bytes, None) {
            Ok(img) => img,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot decode image");
                return None;
            }
        };
        let tex = Texture2D::from_image(&image);
        tex.set_filter(FilterMode::Nearest);
        self.images.push(Some(tex));
        Some(ImageHandle(self.images.len()))
    }

    fn free_image_data(&mut self, image: ImageHandle) {
        if let Some(slot) = image.0.checked_sub(1).and_then(|i| self.images.get_mut(i)) {
            *slot = None;
        }
    }

    fn draw_image(&mut self, image: ImageHandle, blit: Blit) {
        let Some(tex) = self.texture(image).cloned() else {
            return;
        };
        if !self.draw_to_front() {
            return;
        }
        draw_texture_ex(
            &tex,
            blit.dst_x as f32,
            blit.dst_y as f32,
            WHITE,
            DrawTextureParams {
                source: Some(Rect::new(
                    blit.src_x as f32,
                    blit.src_y as f32,
                    blit.width as f32,
                    blit.height as f32,
                )),
                ..Default::default()
            },
        );
    }

    fn update_screen(&mut self) {
        let Some(front) = &self.front else {
            return;
        };
        set_default_camera();
        clear_background(BLACK);
        draw_texture_ex(
            &front.texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(self.size),
                flip_y: true,
                ..Default::default()
            },
        );
    }

    fn scroll_screen(&mut self, dx: i16, dy: i16) {
        let (Some(front), Some(back)) = (self.front.take(), self.back.take()) else {
            return;
        };
        set_camera(&self.target_camera(&back));
        clear_background(BLACK);
        draw_texture_ex(
            &front.texture,
            dx as f32,
            dy as f32,
            WHITE,
            DrawTextureParams {
                dest_size: Some(self.size),
                flip_y: true,
                ..Default::default()
            },
        );
        self.front = Some(back);
        self.back = Some(front);
    }
}
