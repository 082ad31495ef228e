// src/module/library.rs
//! Opening module libraries, from disk or from in-process tables.

use crate::error::ModuleError;
use std::collections::HashMap;
use std::env::consts::DLL_SUFFIX;
use std::path::Path;

/// An opened module library.
///
/// Dropping it closes the library; nothing resolved from it may be called
/// afterwards.
pub trait Library {
    /// Address of an exported symbol, if present.
    fn symbol(&self, name: &str) -> Option<*const ()>;
}

/// Platform-neutral way of opening module libraries.
pub trait LibraryLoader {
    /// Open the library at `path`.
    fn open(&self, path: &Path) -> Result<Box<dyn Library>, ModuleError>;
}

/// Opens real shared objects with `libloading`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DylibLoader;

struct Dylib(libloading::Library);

impl Library for Dylib {
    fn symbol(&self, name: &str) -> Option<*const ()> {
        // SAFETY: the address is only ever reinterpreted as the function
        // type the module ABI names for `name`.
        unsafe {
            self.0
                .get::<unsafe extern "C" fn()>(name.as_bytes())
                .ok()
                .map(|sym| *sym as *const ())
        }
    }
}

impl LibraryLoader for DylibLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn Library>, ModuleError> {
        // SAFETY: loading a module runs its initialisers; modules are trusted
        // engine components found under the configured module path.
        let lib = unsafe { libloading::Library::new(path) }.map_err(|e| ModuleError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Box::new(Dylib(lib)))
    }
}

/// A module linked into the executable, described by its symbol table.
#[derive(Debug, Default, Clone)]
pub struct StaticLibrary {
    symbols: HashMap<String, *const ()>,
}

impl StaticLibrary {
    /// An empty symbol table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Export `addr` under `name`.
    pub fn with(mut self, name: &str, addr: *const ()) -> Self {
        self.symbols.insert(name.to_owned(), addr);
        self
    }
}

impl Library for StaticLibrary {
    fn symbol(&self, name: &str) -> Option<*const ()> {
        self.symbols.get(name).copied()
    }
}

/// Serves [`StaticLibrary`] tables by module name instead of touching the
/// filesystem. The lookup key is the file name with the platform suffix
/// removed, so it sees the same paths [`DylibLoader`] would.
#[derive(Debug, Default, Clone)]
pub struct StaticLoader {
    libraries: HashMap<String, StaticLibrary>,
}

impl StaticLoader {
    /// A loader with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `library` for module `name`.
    pub fn register(&mut self, name: &str, library: StaticLibrary) {
        self.libraries.insert(name.to_owned(), library);
    }

    /// Builder form of [`StaticLoader::register`].
    pub fn with(mut self, name: &str, library: StaticLibrary) -> Self {
        self.register(name, library);
        self
    }
}

impl LibraryLoader for StaticLoader {
    fn open(&self, path: &Path) -> Result<Box<dyn Library>, ModuleError> {
        let name = module_name(path);
        match self.libraries.get(&name) {
            Some(lib) => Ok(Box::new(lib.clone())),
            None => Err(ModuleError::Open {
                path: path.to_path_buf(),
                reason: format!("no static module named '{}'", name),
            }),
        }
    }
}

/// File name of `path` without the platform library suffix.
fn module_name(path: &Path) -> String {
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    match file.strip_suffix(DLL_SUFFIX) {
        Some(stem) => stem.to_owned(),
        None => file,
    }
}
