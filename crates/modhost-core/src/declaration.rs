//! The ordered list of modules the host loads at startup.

use serde::Serialize;

use crate::config::DECLARED_MODULES;
use crate::error::{ModuleError, Result};
use crate::names;

/// Ordered module base names. Declaration order is load order.
///
/// A name appears at most once; later duplicates are dropped when the
/// declaration is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ModuleDeclaration {
    names: Vec<String>,
}

impl ModuleDeclaration {
    /// Build a declaration from base names, validating each one.
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut declared: Vec<String> = Vec::new();

        for name in entries {
            let name = name.into();
            names::check_name(&name).map_err(|reason| ModuleError::InvalidName {
                name: name.clone(),
                reason,
            })?;

            if declared.contains(&name) {
                tracing::warn!(module = %name, "Ignoring duplicate module declaration");
                continue;
            }
            declared.push(name);
        }

        Ok(Self { names: declared })
    }

    /// Parse a `;` or `,` separated list.
    pub fn parse(list: &str) -> Result<Self> {
        Self::new(names::split_list(list))
    }

    /// The list compiled in from `MODHOST_MODULES`.
    pub fn builtin() -> Self {
        // build.rs already rejected invalid names
        match Self::parse(DECLARED_MODULES) {
            Ok(declaration) => declaration,
            Err(e) => {
                tracing::error!("Built-in module list is invalid: {}", e);
                Self::default()
            }
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<'a> IntoIterator for &'a ModuleDeclaration {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_order() {
        let decl = ModuleDeclaration::new(["video_codec", "onnx_backend", "task_runner"]).unwrap();
        assert_eq!(decl.names(), ["video_codec", "onnx_backend", "task_runner"]);
    }

    #[test]
    fn test_duplicates_keep_first() {
        let decl = ModuleDeclaration::new(["b", "a", "b", "c", "a"]).unwrap();
        assert_eq!(decl.names(), ["b", "a", "c"]);
    }

    #[test]
    fn test_parse_cmake_list() {
        let decl = ModuleDeclaration::parse(" video_codec; onnx_backend ;;").unwrap();
        assert_eq!(decl.names(), ["video_codec", "onnx_backend"]);

        let decl = ModuleDeclaration::parse("a,b;c").unwrap();
        assert_eq!(decl.len(), 3);
    }

    #[test]
    fn test_parse_empty() {
        assert!(ModuleDeclaration::parse("").unwrap().is_empty());
        assert!(ModuleDeclaration::parse(" ; , ").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_paths_and_extensions() {
        let rejected = [
            "plugins/codec",
            "..\\codec",
            "libcodec.so",
            "codec.dll",
            "codec.dylib",
            "libm.so.6",
            "two words",
            "",
        ];
        for bad in rejected {
            let result = ModuleDeclaration::new([bad]);
            assert!(
                matches!(result, Err(ModuleError::InvalidName { .. })),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_builtin_is_valid() {
        let builtin = ModuleDeclaration::builtin();
        for name in &builtin {
            assert!(names::check_name(name).is_ok());
        }
    }
}
