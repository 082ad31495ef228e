// src/backend/recording.rs
//! In-memory graphics backend that records calls.

use crate::module::abi::{Blit, GraphicsBackend, ImageHandle, Rgb};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// One call a [`RecordingGraphics`] received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GfxCall {
    /// `init`
    Init,
    /// `term`
    Term,
    /// `init_screen`
    InitScreen {
        /// Pixels.
        width: u16,
        /// Pixels.
        height: u16,
        /// Bits per pixel.
        depth: u8,
    },
    /// `draw_rect`
    DrawRect {
        /// Left edge.
        x: i16,
        /// Top edge.
        y: i16,
        /// Pixels.
        width: u16,
        /// Pixels.
        height: u16,
        /// Fill colour.
        colour: Rgb,
    },
    /// `load_image_data` with the filename asked for
    LoadImage(String),
    /// `free_image_data`
    FreeImage(ImageHandle),
    /// `draw_image`
    DrawImage {
        /// Image drawn from.
        image: ImageHandle,
        /// Source and destination.
        blit: Blit,
    },
    /// `update_screen`
    UpdateScreen,
    /// `scroll_screen`
    ScrollScreen {
        /// Horizontal shift.
        dx: i16,
        /// Vertical shift.
        dy: i16,
    },
    /// `add_update_rectangle`
    UpdateRect {
        /// Left edge on screen.
        x: i16,
        /// Top edge on screen.
        y: i16,
        /// Pixels.
        width: u16,
        /// Pixels.
        height: u16,
    },
}

#[derive(Debug, Default)]
struct LogInner {
    calls: Vec<GfxCall>,
    names: HashMap<ImageHandle, String>,
}

/// Shared view of everything a [`RecordingGraphics`] has been asked to do.
///
/// Cloning is cheap; every clone sees the same log.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<LogInner>>);

impl CallLog {
    /// Every call so far, oldest first.
    pub fn calls(&self) -> Vec<GfxCall> {
        self.0.borrow().calls.clone()
    }

    /// Forget every recorded call.
    pub fn clear(&self) {
        self.0.borrow_mut().calls.clear();
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&GfxCall) -> bool) -> usize {
        self.0.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    /// Every blit, in call order, with the filename it came from.
    pub fn draws(&self) -> Vec<(String, Blit)> {
        let inner = self.0.borrow();
        inner
            .calls
            .iter()
            .filter_map(|c| match c {
                GfxCall::DrawImage { image, blit } => {
                    let name = inner.names.get(image).cloned().unwrap_or_default();
                    Some((name, *blit))
                }
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: GfxCall) {
        self.0.borrow_mut().calls.push(call);
    }
}

/// A graphics backend that draws nothing and remembers every call.
///
/// Used by the test suite and by headless tools that want to see what a
/// frame would have drawn.
#[derive(Debug, Default)]
pub struct RecordingGraphics {
    log: CallLog,
    next_image: usize,
    missing: HashSet<String>,
}

impl RecordingGraphics {
    /// A fresh backend plus a handle on its log.
    pub fn new() -> (Self, CallLog) {
        let backend = Self::default();
        let log = backend.log.clone();
        (backend, log)
    }

    /// Make `load_image_data` fail for `filename`.
    pub fn with_missing(mut self, filename: &str) -> Self {
        self.missing.insert(filename.to_owned());
        self
    }
}

impl GraphicsBackend for RecordingGraphics {
    fn init(&mut self) -> bool {
        self.log.push(GfxCall::Init);
        true
    }

    fn term(&mut self) {
        self.log.push(GfxCall::Term);
    }

    fn init_screen(&mut self, width: u16, height: u16, depth: u8) -> bool {
        self.log.push(GfxCall::InitScreen {
            width,
            height,
            depth,
        });
        true
    }

    fn draw_rect(&mut self, x: i16, y: i16, width: u16, height: u16, colour: Rgb) {
        self.log.push(GfxCall::DrawRect {
            x,
            y,
            width,
            height,
            colour,
        });
    }

    fn load_image_data(&mut self, filename: &str) -> Option<ImageHandle> {
        self.log.push(GfxCall::LoadImage(filename.to_owned()));
        if self.missing.contains(filename) {
            return None;
        }
        self.next_image += 1;
        let handle = ImageHandle(self.next_image);
        self.log
            .0
            .borrow_mut()
            .names
            .insert(handle, filename.to_owned());
        Some(handle)
    }

    fn free_image_data(&mut self, image: ImageHandle) {
        self.log.push(GfxCall::FreeImage(image));
    }

    fn draw_image(&mut self, image: ImageHandle, blit: Blit) {
        self.log.push(GfxCall::DrawImage { image, blit });
    }

    fn update_screen(&mut self) {
        self.log.push(GfxCall::UpdateScreen);
    }

    fn scroll_screen(&mut self, dx: i16, dy: i16) {
        self.log.push(GfxCall::ScrollScreen { dx, dy });
    }

    fn add_update_rectangle(&mut self, x: i16, y: i16, width: u16, height: u16) {
        self.log.push(GfxCall::UpdateRect {
            x,
            y,
            width,
            height,
        });
    }
}
