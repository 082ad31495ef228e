// src/module/set.rs
//! The graphics and event slots.

use crate::error::ModuleError;
use crate::graphics::Graphics;
use crate::module::abi::{DylibEvents, DylibGraphics, EventBackend, GraphicsBackend};
use crate::module::library::{DylibLoader, LibraryLoader};
use std::env::consts::DLL_SUFFIX;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The two backend slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// Drawing.
    Graphics,
    /// Input.
    Event,
}

impl ModuleKind {
    /// Name used in errors and logs.
    pub fn name(self) -> &'static str {
        match self {
            ModuleKind::Graphics => "graphics",
            ModuleKind::Event => "event",
        }
    }
}

/// Owns the bound graphics and event backends.
///
/// A slot is either empty or holds a fully resolved, initialised backend.
/// Loading into a bound slot fails and leaves the slot alone. Backends are
/// terminated in reverse load order when closed or dropped.
pub struct ModuleSet {
    root: PathBuf,
    loader: Box<dyn LibraryLoader>,
    graphics: Option<Graphics>,
    events: Option<Box<dyn EventBackend>>,
    load_order: Vec<ModuleKind>,
}

impl ModuleSet {
    /// An empty set that opens modules from `root` with `loader`.
    pub fn new(root: impl Into<PathBuf>, loader: Box<dyn LibraryLoader>) -> Self {
        Self {
            root: root.into(),
            loader,
            graphics: None,
            events: None,
            load_order: Vec::new(),
        }
    }

    /// A set that opens real shared objects from `root`.
    pub fn with_dylibs(root: impl Into<PathBuf>) -> Self {
        Self::new(root, Box::new(DylibLoader))
    }

    /// Module search directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<name><platform suffix>`
    pub fn module_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}{}", name, DLL_SUFFIX))
    }

    /// Open the graphics module `name`, resolve its entry points and
    /// initialise it.
    pub fn load_graphics(&mut self, name: &str) -> Result<(), ModuleError> {
        self.ensure_free(ModuleKind::Graphics)?;
        let path = self.module_path(name);
        debug!(path = %path.display(), "opening graphics module");
        let library = self.loader.open(&path)?;
        let backend = DylibGraphics::bind(library, &path)?;
        self.bind_graphics(Box::new(backend))
    }

    /// Open the event module `name`, resolve its entry points and
    /// initialise it.
    pub fn load_events(&mut self, name: &str) -> Result<(), ModuleError> {
        self.ensure_free(ModuleKind::Event)?;
        let path = self.module_path(name);
        debug!(path = %path.display(), "opening event module");
        let library = self.loader.open(&path)?;
        let backend = DylibEvents::bind(library, &path)?;
        self.bind_events(Box::new(backend))
    }

    /// Bind an in-process graphics backend.
    pub fn bind_graphics(&mut self, mut backend: Box<dyn GraphicsBackend>) -> Result<(), ModuleError> {
        self.ensure_free(ModuleKind::Graphics)?;
        if !backend.init() {
            return Err(ModuleError::InitFailed(ModuleKind::Graphics.name()));
        }
        self.graphics = Some(Graphics::new(backend));
        self.load_order.push(ModuleKind::Graphics);
        info!("graphics module bound");
        Ok(())
    }

    /// Bind an in-process event backend.
    pub fn bind_events(&mut self, mut backend: Box<dyn EventBackend>) -> Result<(), ModuleError> {
        self.ensure_free(ModuleKind::Event)?;
        if !backend.init() {
            return Err(ModuleError::InitFailed(ModuleKind::Event.name()));
        }
        self.events = Some(backend);
        self.load_order.push(ModuleKind::Event);
        info!("event module bound");
        Ok(())
    }

    /// Whether the `kind` slot is bound.
    pub fn is_loaded(&self, kind: ModuleKind) -> bool {
        match kind {
            ModuleKind::Graphics => self.graphics.is_some(),
            ModuleKind::Event => self.events.is_some(),
        }
    }

    /// The bound graphics module.
    pub fn graphics(&self) -> Option<&Graphics> {
        self.graphics.as_ref()
    }

    /// The bound graphics module, mutably.
    pub fn graphics_mut(&mut self) -> Option<&mut Graphics> {
        self.graphics.as_mut()
    }

    /// The bound graphics module, or [`ModuleError::NotLoaded`].
    pub fn require_graphics(&mut self) -> Result<&mut Graphics, ModuleError> {
        self.graphics
            .as_mut()
            .ok_or(ModuleError::NotLoaded(ModuleKind::Graphics.name()))
    }

    /// The bound event module.
    pub fn events_mut(&mut self) -> Option<&mut (dyn EventBackend + 'static)> {
        self.events.as_deref_mut()
    }

    /// Terminate and unbind one slot. Returns false if it was already empty.
    pub fn close(&mut self, kind: ModuleKind) -> bool {
        let closed = match kind {
            ModuleKind::Graphics => match self.graphics.take() {
                Some(mut gfx) => {
                    gfx.shutdown();
                    true
                }
                None => false,
            },
            ModuleKind::Event => match self.events.take() {
                Some(mut events) => {
                    events.term();
                    true
                }
                None => false,
            },
        };
        if closed {
            self.load_order.retain(|k| *k != kind);
            info!(module = kind.name(), "module closed");
        }
        closed
    }

    /// Close every bound slot, most recently loaded first.
    pub fn close_all(&mut self) {
        while let Some(kind) = self.load_order.last().copied() {
            self.close(kind);
        }
    }

    fn ensure_free(&self, kind: ModuleKind) -> Result<(), ModuleError> {
        if self.is_loaded(kind) {
            Err(ModuleError::AlreadyLoaded(kind.name()))
        } else {
            Ok(())
        }
    }
}

impl Drop for ModuleSet {
    fn drop(&mut self) {
        self.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::null::NullEvents;
    use crate::backend::recording::{GfxCall, RecordingGraphics};
    use crate::module::library::{StaticLibrary, StaticLoader};

    #[test]
    fn module_path_appends_platform_suffix() {
        let set = ModuleSet::new("mods", Box::new(StaticLoader::new()));
        let p = set.module_path("gfx-dummy");
        assert_eq!(p, Path::new("mods").join(format!("gfx-dummy{}", DLL_SUFFIX)));
    }

    #[test]
    fn second_bind_fails_and_keeps_first() {
        let mut set = ModuleSet::new("mods", Box::new(StaticLoader::new()));
        let (first, log) = RecordingGraphics::new();
        set.bind_graphics(Box::new(first)).expect("bind");

        let (second, second_log) = RecordingGraphics::new();
        let err = set.bind_graphics(Box::new(second)).unwrap_err();
        assert!(matches!(err, ModuleError::AlreadyLoaded("graphics")));
        assert!(second_log.calls().is_empty());

        set.require_graphics().expect("bound").update_screen();
        assert_eq!(log.calls(), vec![GfxCall::Init, GfxCall::UpdateScreen]);
    }

    #[test]
    fn close_is_idempotent() {
        let mut set = ModuleSet::new("mods", Box::new(StaticLoader::new()));
        let (gfx, log) = RecordingGraphics::new();
        set.bind_graphics(Box::new(gfx)).expect("bind");
        assert!(set.close(ModuleKind::Graphics));
        assert!(!set.close(ModuleKind::Graphics));
        assert_eq!(log.count(|c| *c == GfxCall::Term), 1);
        assert!(set.graphics().is_none());
    }

    #[test]
    fn missing_static_module_leaves_slot_empty() {
        let mut set = ModuleSet::new(
            "mods",
            Box::new(StaticLoader::new().with("other", StaticLibrary::new())),
        );
        assert!(matches!(
            set.load_graphics("gfx-dummy"),
            Err(ModuleError::Open { .. })
        ));
        assert!(!set.is_loaded(ModuleKind::Graphics));
        assert!(matches!(
            set.require_graphics(),
            Err(ModuleError::NotLoaded("graphics"))
        ));
    }

    #[test]
    fn drop_closes_everything() {
        let (gfx, log) = RecordingGraphics::new();
        {
            let mut set = ModuleSet::new("mods", Box::new(StaticLoader::new()));
            set.bind_graphics(Box::new(gfx)).expect("bind");
            set.bind_events(Box::new(NullEvents::default())).expect("bind");
        }
        assert_eq!(log.calls().last(), Some(&GfxCall::Term));
    }
}
