//! Platform file naming for module base names.

use serde::Serialize;

/// Platform families with distinct shared library naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformFamily {
    /// Windows-like targets.
    Windows,
    /// macOS, iOS and the other Apple targets.
    Apple,
    /// Every other POSIX-like target.
    Posix,
}

impl PlatformFamily {
    /// The family of the compilation target.
    pub const fn current() -> Self {
        if cfg!(windows) {
            PlatformFamily::Windows
        } else if cfg!(target_vendor = "apple") {
            PlatformFamily::Apple
        } else {
            PlatformFamily::Posix
        }
    }

    /// Naming convention used by this family.
    pub const fn naming(self) -> NamingConvention {
        match self {
            PlatformFamily::Windows => NamingConvention::WINDOWS,
            PlatformFamily::Apple => NamingConvention::APPLE,
            PlatformFamily::Posix => NamingConvention::POSIX,
        }
    }
}

/// `(prefix, suffix)` pair mapping a base name to a library file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NamingConvention {
    pub prefix: &'static str,
    pub suffix: &'static str,
}

impl NamingConvention {
    pub const WINDOWS: Self = Self {
        prefix: "",
        suffix: ".dll",
    };

    pub const APPLE: Self = Self {
        prefix: "lib",
        suffix: ".dylib",
    };

    pub const POSIX: Self = Self {
        prefix: "lib",
        suffix: ".so",
    };

    /// Convention of the compilation target.
    pub const fn native() -> Self {
        PlatformFamily::current().naming()
    }

    /// Compose `prefix + base_name + suffix`.
    pub fn file_name(&self, base_name: &str) -> String {
        format!("{}{}{}", self.prefix, base_name, self.suffix)
    }
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self::native()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_table() {
        assert_eq!(
            PlatformFamily::Windows.naming().file_name("video_codec"),
            "video_codec.dll"
        );
        assert_eq!(
            PlatformFamily::Apple.naming().file_name("video_codec"),
            "libvideo_codec.dylib"
        );
        assert_eq!(
            PlatformFamily::Posix.naming().file_name("video_codec"),
            "libvideo_codec.so"
        );
    }

    #[test]
    fn test_native_matches_std_consts() {
        let native = NamingConvention::native();
        assert_eq!(native.prefix, std::env::consts::DLL_PREFIX);
        assert_eq!(native.suffix, std::env::consts::DLL_SUFFIX);
    }

    #[test]
    fn test_current_family() {
        #[cfg(windows)]
        assert_eq!(PlatformFamily::current(), PlatformFamily::Windows);

        #[cfg(target_os = "macos")]
        assert_eq!(PlatformFamily::current(), PlatformFamily::Apple);

        #[cfg(target_os = "linux")]
        assert_eq!(PlatformFamily::current(), PlatformFamily::Posix);
    }
}
