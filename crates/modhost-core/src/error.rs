//! Error types for module loading.

use std::path::PathBuf;

/// Result type for module operations.
pub type Result<T> = std::result::Result<T, ModuleError>;

/// Module error types.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// A declared name is not a bare module base name.
    #[error("Invalid module name `{name}`: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// The platform loader rejected the module file.
    #[error("Failed to load library `{file_name}`: {reason}")]
    LoadFailed { file_name: String, reason: String },

    /// A directory could not be added to the loader's search locations.
    #[error("Failed to register search directory {path:?}: {reason}")]
    SearchPath { path: PathBuf, reason: String },

    /// Native modules cannot be loaded on this target.
    #[error("Unsupported platform for native modules")]
    UnsupportedPlatform,
}

impl ModuleError {
    /// The underlying cause, without the file name prefix.
    pub fn reason(&self) -> String {
        match self {
            ModuleError::InvalidName { reason, .. } => (*reason).to_string(),
            ModuleError::LoadFailed { reason, .. } | ModuleError::SearchPath { reason, .. } => {
                reason.clone()
            }
            ModuleError::UnsupportedPlatform => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_failed_message() {
        let err = ModuleError::LoadFailed {
            file_name: "libonnx_backend.so".to_string(),
            reason: "cannot open shared object file".to_string(),
        };
        assert!(err.to_string().contains("libonnx_backend.so"));
        assert_eq!(err.reason(), "cannot open shared object file");
    }

    #[test]
    fn test_invalid_name_reason() {
        let err = ModuleError::InvalidName {
            name: "a/b".to_string(),
            reason: "name contains a path separator",
        };
        assert!(err.to_string().contains("`a/b`"));
        assert_eq!(err.reason(), "name contains a path separator");
    }
}
