//! Startup module loading.
//!
//! [`ModuleLoader`] walks a [`ModuleDeclaration`] in order and asks a
//! [`PlatformLoader`] to map each module. Individual failures are reported,
//! never propagated: a host with a missing optional module still starts, it
//! just lacks the capabilities that module would have registered.
//!
//! A loader runs once: [`ModuleLoader::load_all`] consumes it. The
//! process-wide entry point is [`initialize_modules`].

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use chrono::Utc;
use parking_lot::Mutex;

use crate::declaration::ModuleDeclaration;
use crate::observer::{LoadObserver, TracingObserver};
use crate::platform::{NativeLoader, PlatformLoader, SymbolVisibility};
use crate::report::{LoadReport, LoadStatus, ModuleOutcome};
use crate::self_dir::resolve_self_directory;

/// Serializes loader runs across the process.
static LOAD_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Report of the process-wide startup load.
static STARTUP_REPORT: OnceLock<LoadReport> = OnceLock::new();

/// Load the built-in module list into the process.
///
/// Call this first thing in `main`. Only the first call loads anything;
/// concurrent callers wait for it and every caller gets the same report.
/// Loaded modules stay resident for the rest of the process.
pub fn initialize_modules() -> &'static LoadReport {
    STARTUP_REPORT.get_or_init(|| {
        ModuleLoader::native(ModuleDeclaration::builtin())
            .load_all()
            .report
    })
}

/// The startup report, if [`initialize_modules`] has completed.
pub fn startup_report() -> Option<&'static LoadReport> {
    STARTUP_REPORT.get()
}

/// What happens to module handles after a successful load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Retention {
    /// Handles are leaked; modules stay mapped until the process exits.
    #[default]
    Leak,
    /// Handles are kept in [`LoadedModules`] and released when it is
    /// unloaded or dropped.
    Retain,
}

/// Where the extra search directory comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchDirectory {
    /// The directory of the module image containing this crate.
    #[default]
    Resolve,
    /// A caller-chosen directory.
    Fixed(PathBuf),
    /// Rely on the platform loader's default search only.
    Disabled,
}

/// Loads a declared module list through a platform loader.
pub struct ModuleLoader<L: PlatformLoader> {
    platform: L,
    declaration: ModuleDeclaration,
    visibility: SymbolVisibility,
    retention: Retention,
    search_directory: SearchDirectory,
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl ModuleLoader<NativeLoader> {
    /// Loader for the compilation target's native modules.
    pub fn native(declaration: ModuleDeclaration) -> Self {
        Self::new(NativeLoader::new(), declaration)
    }
}

impl<L: PlatformLoader> ModuleLoader<L> {
    /// Create a loader with global visibility, leaked handles and the
    /// resolved self directory as search location.
    pub fn new(platform: L, declaration: ModuleDeclaration) -> Self {
        Self {
            platform,
            declaration,
            visibility: SymbolVisibility::default(),
            retention: Retention::default(),
            search_directory: SearchDirectory::default(),
            observers: vec![Arc::new(TracingObserver) as Arc<dyn LoadObserver>],
        }
    }

    pub fn with_visibility(mut self, visibility: SymbolVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_search_directory(mut self, search_directory: SearchDirectory) -> Self {
        self.search_directory = search_directory;
        self
    }

    /// Register an additional observer. The tracing observer stays active.
    pub fn with_observer(mut self, observer: Arc<dyn LoadObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn declaration(&self) -> &ModuleDeclaration {
        &self.declaration
    }

    /// Attempt every declared module once, in declaration order.
    ///
    /// Never fails: each outcome lands in the returned report.
    pub fn load_all(self) -> LoadSession<L::Handle> {
        let Self {
            mut platform,
            declaration,
            visibility,
            retention,
            search_directory,
            observers,
        } = self;

        let mut report = LoadReport::default();
        let mut modules = LoadedModules::new();

        if declaration.is_empty() {
            return LoadSession { report, modules };
        }

        let _guard = LOAD_LOCK.lock();

        report.search_directory = register_search_directory(&mut platform, search_directory);
        notify(&observers, |o| {
            o.search_directory(report.search_directory.as_deref())
        });

        let naming = platform.naming();
        for name in &declaration {
            let file_name = naming.file_name(name);
            notify(&observers, |o| o.attempt(&file_name));

            let attempted_at = Utc::now();
            let status = match platform.load(&file_name, visibility) {
                Ok(handle) => {
                    notify(&observers, |o| o.loaded(&file_name));
                    modules.push(name.clone(), handle);
                    LoadStatus::Loaded
                }
                Err(e) => {
                    let reason = e.reason();
                    notify(&observers, |o| o.failed(&file_name, &reason));
                    LoadStatus::Failed { reason }
                }
            };

            report.push(ModuleOutcome {
                name: name.clone(),
                file_name,
                status,
                attempted_at,
            });
        }

        tracing::info!(
            loaded = report.loaded().count(),
            failed = report.failed().count(),
            "Module initialization complete"
        );

        if retention == Retention::Leak {
            modules = modules.leak();
        }

        LoadSession { report, modules }
    }
}

fn notify(observers: &[Arc<dyn LoadObserver>], event: impl Fn(&dyn LoadObserver)) {
    for observer in observers {
        event(observer.as_ref());
    }
}

fn register_search_directory<L: PlatformLoader>(
    platform: &mut L,
    search_directory: SearchDirectory,
) -> Option<PathBuf> {
    let dir = match search_directory {
        SearchDirectory::Resolve => resolve_self_directory(),
        SearchDirectory::Fixed(dir) => Some(dir),
        SearchDirectory::Disabled => None,
    }?;

    match platform.augment_search_path(&dir) {
        Ok(()) => Some(dir),
        Err(e) => {
            tracing::warn!("Module search directory not registered: {}", e);
            None
        }
    }
}

/// Result of [`ModuleLoader::load_all`].
#[derive(Debug)]
pub struct LoadSession<H> {
    pub report: LoadReport,

    /// Retained handles; empty under [`Retention::Leak`]
    pub modules: LoadedModules<H>,
}

/// Handles of modules loaded under [`Retention::Retain`].
///
/// Modules are released in reverse load order when this is unloaded or
/// dropped, so a module goes away before the modules it may depend on.
#[derive(Debug)]
pub struct LoadedModules<H> {
    modules: Vec<(String, H)>,
}

impl<H> LoadedModules<H> {
    fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    fn push(&mut self, name: String, handle: H) {
        self.modules.push((name, handle));
    }

    /// Forget every handle so the modules are never unloaded.
    fn leak(mut self) -> Self {
        for (_, handle) in self.modules.drain(..) {
            std::mem::forget(handle);
        }
        self
    }

    /// Names of the retained modules, in load order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&H> {
        self.modules
            .iter()
            .find(|(loaded, _)| loaded == name)
            .map(|(_, handle)| handle)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Release every retained module, last loaded first.
    pub fn unload(self) {
        drop(self);
    }
}

impl<H> Drop for LoadedModules<H> {
    fn drop(&mut self) {
        while let Some((name, handle)) = self.modules.pop() {
            tracing::debug!("Unloading module `{}`", name);
            drop(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leak_empties_handles() {
        let mut modules = LoadedModules::new();
        modules.push("a".to_string(), String::from("handle"));
        let modules = modules.leak();
        assert!(modules.is_empty());
    }

    #[test]
    fn test_get_by_name() {
        let mut modules = LoadedModules::new();
        modules.push("a".to_string(), 1);
        modules.push("b".to_string(), 2);
        assert_eq!(modules.get("b"), Some(&2));
        assert_eq!(modules.names().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn test_initialize_modules_is_idempotent() {
        let first = initialize_modules();
        let second = initialize_modules();
        assert!(std::ptr::eq(first, second));
        assert!(startup_report().is_some());
        assert_eq!(first.len(), ModuleDeclaration::builtin().len());
    }
}
