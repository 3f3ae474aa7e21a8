//! Build-time configuration and crate-wide constants.
//!
//! The declared module list is the only configuration surface of the loader.
//! It is injected at compile time by `build.rs`; nothing is read at runtime.

pub use crate::names::LIST_SEPARATORS;

/// Environment variable names used by the build script.
pub mod env_vars {
    pub use crate::names::{DECLARED_VAR as DECLARED, MODULES_VAR as MODULES};
}

/// The validated module list compiled into this build, `;` separated.
pub const DECLARED_MODULES: &str = env!("MODHOST_DECLARED_MODULES");

/// Module path buffer sizes (UTF-16 units) for the Windows resolver.
pub mod path_buffer {
    /// First attempt, matching the classic `MAX_PATH`.
    pub const INITIAL: usize = 260;
    /// Upper bound for the doubling retry; the longest extended-length path.
    pub const MAX: usize = 32_768;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_modules_come_from_build_script_variable() {
        // `env!` needs a literal; it must name the variable build.rs emits.
        assert_eq!(env_vars::DECLARED, "MODHOST_DECLARED_MODULES");
        assert_eq!(env_vars::MODULES, "MODHOST_MODULES");
        assert!(crate::names::split_list(DECLARED_MODULES)
            .all(|name| crate::names::check_name(name).is_ok()));
    }
}
