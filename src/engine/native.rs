//! Shared library binding for the tls-client engine.
//!
//! The library exports a C ABI over UTF-8, NUL-terminated strings:
//!
//! ```text
//! char* request(char* payload);
//! void  freeMemory(char* id);
//! char* destroySession(char* payload);
//! char* destroyAll(void);
//! ```
//!
//! Returned strings stay owned by the library until `freeMemory` is called
//! with the `id` found inside them, so they are copied out before release.

use std::ffi::{CStr, CString};
use std::fs;
use std::os::raw::c_char;
use std::path::{Path, PathBuf};

use libloading::Library;

use crate::engine::Engine;
use crate::error::{Error, Result};

type RequestFn = unsafe extern "C" fn(*const c_char) -> *mut c_char;
type FreeMemoryFn = unsafe extern "C" fn(*const c_char);
type DestroySessionFn = unsafe extern "C" fn(*const c_char) -> *mut c_char;
type DestroyAllFn = unsafe extern "C" fn() -> *mut c_char;

/// File name prefix of the engine library.
pub const LIBRARY_PREFIX: &str = "tls-client";

/// Engine backed by a loaded shared library.
pub struct NativeEngine {
    request: RequestFn,
    free_memory: FreeMemoryFn,
    destroy_session: DestroySessionFn,
    destroy_all: DestroyAllFn,
    path: PathBuf,
    // Keeps the function pointers above valid; must outlive them.
    _library: Library,
}

impl NativeEngine {
    /// Load the library at `path` and bind its entry points.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::library_not_found(path.display().to_string()));
        }

        // SAFETY: loading runs the library's initializers. The tls-client
        // library has no initializer side effects beyond its Go runtime.
        let library = unsafe { Library::new(path) }.map_err(|e| Error::LibraryLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        // SAFETY: signatures match the exported C ABI listed in the module docs.
        let engine = unsafe {
            Self {
                request: symbol::<RequestFn>(&library, "request")?,
                free_memory: symbol::<FreeMemoryFn>(&library, "freeMemory")?,
                destroy_session: symbol::<DestroySessionFn>(&library, "destroySession")?,
                destroy_all: symbol::<DestroyAllFn>(&library, "destroyAll")?,
                path: path.to_path_buf(),
                _library: library,
            }
        };

        tracing::debug!("Loaded tls-client engine from {}", path.display());
        Ok(engine)
    }

    /// Locate a `tls-client*` library in `dir` and load it.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load(find_library(dir)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for NativeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeEngine").field("path", &self.path).finish()
    }
}

impl Engine for NativeEngine {
    fn request(&self, payload: &str) -> Result<String> {
        let input = to_c_string(payload)?;
        // SAFETY: `input` outlives the call; the reply is copied before release.
        unsafe { take_reply((self.request)(input.as_ptr()), "request") }
    }

    fn free_memory(&self, id: &str) -> Result<()> {
        let input = to_c_string(id)?;
        // SAFETY: `input` outlives the call.
        unsafe { (self.free_memory)(input.as_ptr()) };
        Ok(())
    }

    fn destroy_session(&self, payload: &str) -> Result<String> {
        let input = to_c_string(payload)?;
        // SAFETY: as in `request`.
        unsafe { take_reply((self.destroy_session)(input.as_ptr()), "destroySession") }
    }

    fn destroy_all(&self) -> Result<String> {
        // SAFETY: no arguments; the reply is copied before release.
        unsafe { take_reply((self.destroy_all)(), "destroyAll") }
    }
}

unsafe fn symbol<T: Copy>(library: &Library, name: &'static str) -> Result<T> {
    let bytes = format!("{}\0", name);
    library
        .get::<T>(bytes.as_bytes())
        .map(|sym| *sym)
        .map_err(|e| Error::MissingSymbol {
            symbol: name,
            message: e.to_string(),
        })
}

fn to_c_string(value: &str) -> Result<CString> {
    CString::new(value).map_err(|e| Error::engine(format!("payload contains NUL byte: {}", e)))
}

unsafe fn take_reply(ptr: *mut c_char, entry_point: &str) -> Result<String> {
    if ptr.is_null() {
        return Err(Error::engine(format!("{} returned a null pointer", entry_point)));
    }
    Ok(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}

/// Shared library extension for the host platform.
pub fn library_extension() -> Result<&'static str> {
    if cfg!(target_os = "windows") {
        Ok(".dll")
    } else if cfg!(target_os = "macos") {
        Ok(".dylib")
    } else if cfg!(target_os = "linux") {
        Ok(".so")
    } else {
        Err(Error::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }
}

/// Find the first `tls-client*<ext>` file in `dir`, in name order.
pub fn find_library(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let extension = library_extension()?;

    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(LIBRARY_PREFIX) && name.ends_with(extension))
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    candidates.into_iter().next().ok_or_else(|| {
        Error::library_not_found(format!(
            "expected file with pattern {}*{} in {}",
            LIBRARY_PREFIX,
            extension,
            dir.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_find_library_matches_prefix_and_extension() {
        let dir = TempDir::new("tls-bridge").unwrap();
        let ext = library_extension().unwrap();
        fs::write(dir.path().join("readme.txt"), b"").unwrap();
        fs::write(dir.path().join(format!("other{}", ext)), b"").unwrap();
        let expected = dir.path().join(format!("tls-client-linux-amd64-1.7.2{}", ext));
        fs::write(&expected, b"").unwrap();

        assert_eq!(find_library(dir.path()).unwrap(), expected);
    }

    #[test]
    fn test_find_library_reports_missing_file() {
        let dir = TempDir::new("tls-bridge").unwrap();
        let err = find_library(dir.path()).unwrap_err();
        assert!(matches!(err, Error::LibraryNotFound(_)));
        assert!(err.to_string().contains("tls-client*"));
    }

    #[test]
    fn test_load_rejects_missing_path() {
        let err = NativeEngine::load("/nonexistent/tls-client.so").unwrap_err();
        assert!(matches!(err, Error::LibraryNotFound(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_load_rejects_non_library_file() {
        let dir = TempDir::new("tls-bridge").unwrap();
        let fake = dir.path().join("tls-client.so");
        fs::write(&fake, b"not a shared object").unwrap();

        let err = NativeEngine::load(&fake).unwrap_err();
        assert!(matches!(err, Error::LibraryLoad { .. }));
    }
}
