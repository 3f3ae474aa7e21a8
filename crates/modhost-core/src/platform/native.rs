//! Native module loader using libloading.
//!
//! Search directories registered with [`NativeLoader::augment_search_path`]
//! are probed in registration order before the file name is handed to the
//! operating system's default search. On Windows the directory is also
//! registered with `AddDllDirectory` so the module's own DLL dependencies
//! resolve from it.

use std::path::{Path, PathBuf};

use libloading::Library;

use super::{PlatformLoader, SymbolVisibility};
use crate::error::{ModuleError, Result};
use crate::naming::NamingConvention;
use crate::self_dir::is_search_candidate;

/// A module mapped by [`NativeLoader`].
///
/// Dropping the handle releases the loader's reference to the module.
#[derive(Debug)]
pub struct ModuleHandle {
    /// Kept alive to keep the module mapped
    _library: Library,

    /// Path handed to the operating system
    path: PathBuf,
}

impl ModuleHandle {
    /// The path the module was opened with. A bare file name means the
    /// operating system's default search located it.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Loader for native modules (.so, .dylib, .dll).
#[derive(Debug, Default)]
pub struct NativeLoader {
    /// Registered search directories, in registration order
    search_paths: Vec<PathBuf>,
}

impl NativeLoader {
    /// Create a loader with no extra search directories.
    pub fn new() -> Self {
        Self {
            search_paths: Vec::new(),
        }
    }

    /// Get all registered search directories.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Path to hand to the operating system for `file_name`.
    fn locate(&self, file_name: &str) -> PathBuf {
        self.search_paths
            .iter()
            .map(|dir| dir.join(file_name))
            .find(|candidate| candidate.is_file())
            .unwrap_or_else(|| PathBuf::from(file_name))
    }
}

impl PlatformLoader for NativeLoader {
    type Handle = ModuleHandle;

    fn naming(&self) -> NamingConvention {
        NamingConvention::native()
    }

    fn augment_search_path(&mut self, dir: &Path) -> Result<()> {
        if !is_search_candidate(dir) {
            return Err(ModuleError::SearchPath {
                path: dir.to_path_buf(),
                reason: "not an absolute path to an existing directory".to_string(),
            });
        }

        if self.search_paths.iter().any(|known| known == dir) {
            return Ok(());
        }

        #[cfg(windows)]
        register_dll_directory(dir)?;

        tracing::debug!("Added module search directory: {}", dir.display());
        self.search_paths.push(dir.to_path_buf());
        Ok(())
    }

    fn load(&mut self, file_name: &str, visibility: SymbolVisibility) -> Result<ModuleHandle> {
        let path = self.locate(file_name);

        let library = open(&path, visibility).map_err(|reason| ModuleError::LoadFailed {
            file_name: file_name.to_string(),
            reason,
        })?;

        Ok(ModuleHandle {
            _library: library,
            path,
        })
    }
}

#[cfg(unix)]
fn open(path: &Path, visibility: SymbolVisibility) -> std::result::Result<Library, String> {
    use libloading::os::unix::{Library as UnixLibrary, RTLD_GLOBAL, RTLD_LOCAL, RTLD_NOW};

    let scope = match visibility {
        SymbolVisibility::Global => RTLD_GLOBAL,
        SymbolVisibility::Local => RTLD_LOCAL,
    };

    // SAFETY: loading runs the module's initializers. Declared modules are
    // part of the host build and trusted like the host itself.
    unsafe { UnixLibrary::open(Some(path), RTLD_NOW | scope) }
        .map(Library::from)
        .map_err(|e| e.to_string())
}

#[cfg(windows)]
fn open(path: &Path, _visibility: SymbolVisibility) -> std::result::Result<Library, String> {
    use libloading::os::windows::{
        Library as WindowsLibrary, LOAD_LIBRARY_SEARCH_DEFAULT_DIRS,
        LOAD_LIBRARY_SEARCH_DLL_LOAD_DIR,
    };

    // Windows binds imports per module at load time; there is no global
    // namespace to opt into, so every visibility maps to the same call.
    let mut flags = LOAD_LIBRARY_SEARCH_DEFAULT_DIRS;
    if path.is_absolute() {
        flags |= LOAD_LIBRARY_SEARCH_DLL_LOAD_DIR;
    }

    // SAFETY: see the unix variant.
    unsafe { WindowsLibrary::load_with_flags(path, flags) }
        .map(Library::from)
        .map_err(|e| e.to_string())
}

#[cfg(not(any(unix, windows)))]
fn open(_path: &Path, _visibility: SymbolVisibility) -> std::result::Result<Library, String> {
    Err(ModuleError::UnsupportedPlatform.to_string())
}

#[cfg(windows)]
fn register_dll_directory(dir: &Path) -> Result<()> {
    use std::os::windows::ffi::OsStrExt;

    use windows::core::PCWSTR;
    use windows::Win32::System::LibraryLoader::AddDllDirectory;

    let wide: Vec<u16> = dir
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    // SAFETY: `wide` is NUL-terminated and outlives the call.
    let cookie = unsafe { AddDllDirectory(PCWSTR(wide.as_ptr())) };
    if cookie.is_null() {
        return Err(ModuleError::SearchPath {
            path: dir.to_path_buf(),
            reason: windows::core::Error::from_win32().to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_creation() {
        let loader = NativeLoader::new();
        assert!(loader.search_paths().is_empty());
        assert_eq!(loader.naming(), NamingConvention::native());
    }

    #[test]
    fn test_augment_search_path() {
        let dir = tempfile::tempdir().unwrap();
        let dir = std::fs::canonicalize(dir.path()).unwrap();
        let mut loader = NativeLoader::new();

        loader.augment_search_path(&dir).unwrap();
        loader.augment_search_path(&dir).unwrap();
        assert_eq!(loader.search_paths(), [dir]);
    }

    #[test]
    fn test_augment_rejects_missing_directory() {
        let mut loader = NativeLoader::new();
        let result = loader.augment_search_path(Path::new("/nonexistent/modhost/modules"));
        assert!(matches!(result, Err(ModuleError::SearchPath { .. })));
        assert!(loader.search_paths().is_empty());
    }

    #[test]
    fn test_locate_prefers_search_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dir = std::fs::canonicalize(dir.path()).unwrap();
        let file_name = NamingConvention::native().file_name("located");
        std::fs::write(dir.join(&file_name), b"").unwrap();

        let mut loader = NativeLoader::new();
        assert_eq!(loader.locate(&file_name), PathBuf::from(&file_name));

        loader.augment_search_path(&dir).unwrap();
        assert_eq!(loader.locate(&file_name), dir.join(&file_name));
    }

    #[test]
    fn test_load_missing_module_fails() {
        let mut loader = NativeLoader::new();
        let file_name = NamingConvention::native().file_name("modhost_definitely_missing");

        match loader.load(&file_name, SymbolVisibility::Global) {
            Err(ModuleError::LoadFailed { file_name: failed, reason }) => {
                assert_eq!(failed, file_name);
                assert!(!reason.is_empty());
            }
            other => panic!("expected LoadFailed, got {:?}", other),
        }
    }
}
