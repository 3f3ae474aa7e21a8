//! Module name rules and build variable names shared by the build script
//! and the library.
//!
//! This file is compiled twice (once as `build.rs`'s `names` module) so it
//! must not reference anything else in the crate.

/// Set by the packaging build: `;`/`,` separated module base names.
pub const MODULES_VAR: &str = "MODHOST_MODULES";

/// Emitted by `build.rs` with the validated, de-duplicated list.
pub const DECLARED_VAR: &str = "MODHOST_DECLARED_MODULES";

/// Separators accepted between entries of a declared module list.
///
/// `;` is what CMake list variables expand to.
pub const LIST_SEPARATORS: &[char] = &[';', ','];

/// File extensions a base name must not carry.
const LIBRARY_SUFFIXES: &[&str] = &[".so", ".dylib", ".dll"];

/// Splits a declared list into trimmed, non-empty entries.
pub fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(LIST_SEPARATORS)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
}

/// Checks that `name` is a bare module base name.
pub fn check_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("name is empty");
    }
    if name.contains(['/', '\\']) {
        return Err("name contains a path separator");
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("name contains whitespace or control characters");
    }
    let lower = name.to_ascii_lowercase();
    if LIBRARY_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix)) || lower.contains(".so.") {
        return Err("name carries a library file extension");
    }
    Ok(())
}
