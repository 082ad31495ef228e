//! The per-frame engine context.

use crate::config::{EngineConfig, RenderSettings};
use crate::error::ModuleError;
use crate::module::set::{ModuleKind, ModuleSet};
use crate::object::ObjectRegistry;
use crate::render::view::{MapView, RenderStats};
use std::time::Duration;
use tracing::{debug, info};

/// Outcome of one [`Engine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// The frame ran; call `step` again.
    Continue,
    /// A quit was requested during an earlier frame. Nothing ran.
    Quit,
}

/// Everything the per-frame code needs, passed around explicitly.
pub struct Engine {
    config: EngineConfig,
    modules: ModuleSet,
    objects: ObjectRegistry,
    quit_requested: bool,
    frames: u64,
    last_stats: RenderStats,
}

impl Engine {
    /// An engine whose modules are shared objects under `config.module_path`.
    pub fn new(config: EngineConfig) -> Self {
        let modules = ModuleSet::with_dylibs(config.module_path.clone());
        Self::with_modules(config, modules)
    }

    /// An engine over an already prepared module set.
    pub fn with_modules(config: EngineConfig, modules: ModuleSet) -> Self {
        Self {
            config,
            modules,
            objects: ObjectRegistry::new(),
            quit_requested: false,
            frames: 0,
            last_stats: RenderStats::default(),
        }
    }

    /// Load the configured modules into any still-empty slot, then open the
    /// screen.
    pub fn start(&mut self) -> Result<(), ModuleError> {
        if !self.modules.is_loaded(ModuleKind::Graphics) {
            self.modules.load_graphics(&self.config.gfx_module)?;
        }
        if !self.modules.is_loaded(ModuleKind::Event) {
            self.modules.load_events(&self.config.event_module)?;
        }
        let (w, h, d) = (
            self.config.screen_width,
            self.config.screen_height,
            self.config.screen_depth,
        );
        self.modules.require_graphics()?.init_screen(w, h, d)?;
        info!(width = w, height = h, depth = d, "engine started");
        Ok(())
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Render settings for building a [`MapView`].
    pub fn render_settings(&self) -> RenderSettings {
        self.config.render_settings()
    }

    /// Registered objects.
    pub fn objects(&self) -> &ObjectRegistry {
        &self.objects
    }

    /// Registered objects, mutably.
    pub fn objects_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.objects
    }

    /// Bound backend modules.
    pub fn modules(&self) -> &ModuleSet {
        &self.modules
    }

    /// Bound backend modules, mutably.
    pub fn modules_mut(&mut self) -> &mut ModuleSet {
        &mut self.modules
    }

    /// Frames run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// What the most recent frame drew.
    pub fn last_stats(&self) -> RenderStats {
        self.last_stats
    }

    /// Ask the loop to stop. The current frame still finishes; the next
    /// [`Engine::step`] returns [`Frame::Quit`].
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    /// Whether [`Engine::request_quit`] has been called.
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Run one frame: poll events, run `update`, render, present.
    pub fn step<F>(&mut self, view: &mut MapView, mut update: F) -> Result<Frame, ModuleError>
    where
        F: FnMut(&mut Engine, &mut MapView),
    {
        if self.quit_requested {
            info!(frames = self.frames, "quit");
            return Ok(Frame::Quit);
        }

        if let Some(events) = self.modules.events_mut() {
            events.process_events();
        }

        update(self, view);

        let gfx = self.modules.require_graphics()?;
        self.last_stats = view.render_map(&mut self.objects, gfx);
        gfx.update_screen();
        self.frames += 1;

        if self.config.frame_delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(self.config.frame_delay_ms));
        }
        Ok(Frame::Continue)
    }

    /// Scroll `view` by `(dx, dy)` pixels through the bound graphics module.
    pub fn scroll(&mut self, view: &mut MapView, dx: i32, dy: i32) -> Result<RenderStats, ModuleError> {
        let gfx = self.modules.require_graphics()?;
        Ok(view.scroll_map(dx, dy, &mut self.objects, gfx))
    }

    /// Drop every object and close modules, last loaded first.
    pub fn shutdown(&mut self) {
        debug!(objects = self.objects.len(), "shutting down");
        self.objects.clear();
        self.modules.close_all();
    }
}
