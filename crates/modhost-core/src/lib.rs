//! Startup module loading for modhost hosts.
//!
//! A host declares, at build time, the shared modules it wants mapped into
//! the process before any application logic runs. Loading a module runs its
//! initializers, which register codecs, backends or task handlers with the
//! host's registries.
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     let report = modhost_core::initialize_modules();
//!     for failed in report.failed() {
//!         eprintln!("{} unavailable", failed.name);
//!     }
//!     // application logic
//! }
//! ```
//!
//! The module list comes from the `MODHOST_MODULES` variable at build time,
//! e.g. `MODHOST_MODULES="video_codec;onnx_backend" cargo build`.
//!
//! ## Behaviour
//!
//! - The directory containing this code's module image is added to the
//!   loader search locations, so modules installed next to the executable
//!   (or next to the library embedding this crate) are found from any
//!   working directory.
//! - File names follow the platform convention: `video_codec.dll`,
//!   `libvideo_codec.dylib`, `libvideo_codec.so`.
//! - Modules are bound immediately with global symbol visibility, so later
//!   modules can resolve symbols exported by earlier ones.
//! - A module that fails to load is logged and skipped; loading never
//!   aborts the process.

pub mod config;
pub mod declaration;
pub mod error;
pub mod loader;
mod names;
pub mod naming;
pub mod observer;
pub mod platform;
pub mod report;
pub mod self_dir;

pub use declaration::ModuleDeclaration;
pub use error::{ModuleError, Result};
pub use loader::{
    initialize_modules, startup_report, LoadSession, LoadedModules, ModuleLoader, Retention,
    SearchDirectory,
};
pub use naming::{NamingConvention, PlatformFamily};
pub use observer::{LoadEvent, LoadObserver, RecordingObserver, TracingObserver};
pub use platform::{ModuleHandle, NativeLoader, PlatformLoader, SymbolVisibility};
pub use report::{LoadReport, LoadStatus, ModuleOutcome};
pub use self_dir::resolve_self_directory;
