//! Platform dynamic loading.
//!
//! [`PlatformLoader`] is the seam between the module loader and the
//! operating system. [`NativeLoader`] is the libloading-backed implementation
//! for the compilation target; tests substitute scripted loaders.

pub mod native;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::naming::NamingConvention;

pub use native::{ModuleHandle, NativeLoader};

/// Which later loads can resolve the symbols exported by a module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolVisibility {
    /// Exports join the process-wide namespace, so modules loaded afterwards
    /// can bind to them (`RTLD_GLOBAL`).
    #[default]
    Global,
    /// Exports are only reachable through the module's own handle
    /// (`RTLD_LOCAL`).
    Local,
}

/// Operating system facility that maps module files into the process.
pub trait PlatformLoader {
    /// Evidence of a successful load. Dropping it may unload the module.
    type Handle;

    /// File naming used to turn base names into file names.
    fn naming(&self) -> NamingConvention;

    /// Add `dir` to the locations consulted for bare file names.
    ///
    /// Additions are process-wide and permanent.
    fn augment_search_path(&mut self, dir: &Path) -> Result<()>;

    /// Load `file_name`, binding all symbols immediately.
    fn load(&mut self, file_name: &str, visibility: SymbolVisibility) -> Result<Self::Handle>;
}
