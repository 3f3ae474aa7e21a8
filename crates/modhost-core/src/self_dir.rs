//! Locating the directory of the running module image.
//!
//! The lookup is anchored to the image that contains this code, which is the
//! main executable when the crate is linked statically and the shared library
//! when the crate is embedded in one. Modules installed next to that image can
//! then be found regardless of the process working directory.

use std::path::{Path, PathBuf};

/// Absolute directory containing the module image that holds this code.
///
/// Returns `None` when the operating system cannot report the image path.
/// Never panics; a missing directory only degrades module discovery.
pub fn resolve_self_directory() -> Option<PathBuf> {
    let image = imp::module_image_path()
        .and_then(absolute)
        .or_else(|| {
            tracing::debug!("Module image path unavailable, using the current executable");
            std::env::current_exe().ok().and_then(absolute)
        });

    let Some(image) = image else {
        tracing::warn!("Could not determine the path of the running module image");
        return None;
    };

    match image.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => Some(dir.to_path_buf()),
        _ => {
            tracing::warn!("Module image {:?} has no parent directory", image);
            None
        }
    }
}

/// Canonical form of an image path that exists on disk.
fn absolute(path: PathBuf) -> Option<PathBuf> {
    match std::fs::canonicalize(&path) {
        Ok(resolved) => Some(resolved),
        Err(e) => {
            tracing::debug!("Module image {:?} not found: {}", path, e);
            None
        }
    }
}

/// Whether `dir` looks like a usable search location.
pub(crate) fn is_search_candidate(dir: &Path) -> bool {
    dir.is_absolute() && dir.is_dir()
}

#[cfg(unix)]
mod imp {
    use std::ffi::{CStr, OsStr};
    use std::os::unix::ffi::OsStrExt;
    use std::path::PathBuf;

    pub(super) fn module_image_path() -> Option<PathBuf> {
        let anchor = module_image_path as *const libc::c_void;

        // For the main program glibc reports argv[0], which the parent
        // process chooses freely. The kernel's record of the executable is
        // authoritative there.
        if in_main_program(anchor as usize) {
            return std::env::current_exe().ok();
        }

        // SAFETY: all-zero is a valid `Dl_info` (null pointers).
        let mut info: libc::Dl_info = unsafe { std::mem::zeroed() };

        // SAFETY: `anchor` is a code address inside this image and `info` is a
        // valid out-pointer for the duration of the call.
        let found = unsafe { libc::dladdr(anchor, &mut info) };
        if found == 0 || info.dli_fname.is_null() {
            return None;
        }

        // SAFETY: dladdr succeeded, so `dli_fname` is a NUL-terminated string
        // owned by the dynamic loader for as long as the image stays mapped.
        let name = unsafe { CStr::from_ptr(info.dli_fname) };
        let bytes = name.to_bytes();
        if !bytes.contains(&b'/') {
            return None;
        }

        Some(PathBuf::from(OsStr::from_bytes(bytes)))
    }

    /// Whether `addr` lies in a loaded segment of the main program.
    #[cfg(any(target_os = "linux", target_os = "android"))]
    pub(super) fn in_main_program(addr: usize) -> bool {
        struct Lookup {
            addr: usize,
            found: bool,
        }

        unsafe extern "C" fn first_object(
            info: *mut libc::dl_phdr_info,
            _size: usize,
            data: *mut libc::c_void,
        ) -> libc::c_int {
            let lookup = &mut *(data as *mut Lookup);
            let info = &*info;
            if !info.dlpi_phdr.is_null() {
                let headers =
                    std::slice::from_raw_parts(info.dlpi_phdr, info.dlpi_phnum as usize);
                let base = info.dlpi_addr as usize;
                lookup.found = headers.iter().any(|header| {
                    let start = base.wrapping_add(header.p_vaddr as usize);
                    let end = start.wrapping_add(header.p_memsz as usize);
                    header.p_type == libc::PT_LOAD && (start..end).contains(&lookup.addr)
                });
            }
            // The main program is always reported first.
            1
        }

        let mut lookup = Lookup { addr, found: false };
        // SAFETY: the callback only reads the headers the loader passes in
        // and writes through `data`, which points at `lookup` for the whole
        // call.
        unsafe {
            libc::dl_iterate_phdr(
                Some(first_object),
                &mut lookup as *mut Lookup as *mut libc::c_void,
            );
        }
        lookup.found
    }

    /// dyld reports the executable path it was launched with, not argv[0].
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    pub(super) fn in_main_program(_addr: usize) -> bool {
        false
    }
}

#[cfg(windows)]
mod imp {
    use std::ffi::OsString;
    use std::os::windows::ffi::OsStringExt;
    use std::path::PathBuf;

    use windows::core::PCWSTR;
    use windows::Win32::Foundation::HMODULE;
    use windows::Win32::System::LibraryLoader::{
        GetModuleFileNameW, GetModuleHandleExW, GET_MODULE_HANDLE_EX_FLAG_FROM_ADDRESS,
        GET_MODULE_HANDLE_EX_FLAG_UNCHANGED_REFCOUNT,
    };

    use crate::config::path_buffer;

    pub(super) fn module_image_path() -> Option<PathBuf> {
        let anchor = module_image_path as *const u16;
        let mut module = HMODULE::default();

        // SAFETY: with FROM_ADDRESS the name argument is interpreted as an
        // address inside the module; UNCHANGED_REFCOUNT leaves no reference
        // to release.
        let lookup = unsafe {
            GetModuleHandleExW(
                GET_MODULE_HANDLE_EX_FLAG_FROM_ADDRESS
                    | GET_MODULE_HANDLE_EX_FLAG_UNCHANGED_REFCOUNT,
                PCWSTR(anchor),
                &mut module,
            )
        };
        if let Err(e) = lookup {
            tracing::debug!("GetModuleHandleExW failed: {}", e);
            return None;
        }

        let mut capacity = path_buffer::INITIAL;
        while capacity <= path_buffer::MAX {
            let mut buffer = vec![0u16; capacity];
            // SAFETY: `module` was returned above and `buffer` is writable.
            let len = unsafe { GetModuleFileNameW(module, &mut buffer) } as usize;
            if len == 0 {
                return None;
            }
            // A full buffer means the path was truncated.
            if len < buffer.len() {
                buffer.truncate(len);
                return Some(PathBuf::from(OsString::from_wide(&buffer)));
            }
            capacity *= 2;
        }

        tracing::debug!("Module path longer than {} UTF-16 units", path_buffer::MAX);
        None
    }
}

#[cfg(not(any(unix, windows)))]
mod imp {
    use std::path::PathBuf;

    pub(super) fn module_image_path() -> Option<PathBuf> {
        None
    }
}
