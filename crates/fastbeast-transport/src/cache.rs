//! Thread-local request-target → mapped-file table. Strictly additive: a
//! mapping created for a target lives until the owning thread exits.

use std::collections::HashMap;
use std::ffi::c_void;
use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// A read-only shared mapping of one file. The mapped address is stable for
/// the life of the value even as the value itself moves; dropping unmaps.
pub struct MappedFile {
    addr: *mut c_void,
    len: usize,
}

impl MappedFile {
    fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let meta = file.metadata()?;
        if !meta.is_file() {
            return Err(io::Error::from(io::ErrorKind::InvalidInput));
        }
        let len = meta.len() as usize;
        if len == 0 {
            // The kernel rejects zero-length maps; an empty file is a live
            // handle over the empty slice with no mapping behind it.
            return Ok(Self {
                addr: std::ptr::null_mut(),
                len: 0,
            });
        }
        let addr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { addr, len })
    }

    pub fn bytes(&self) -> &[u8] {
        if self.len == 0 {
            return &[];
        }
        // Invariant: addr is non-null exactly when len > 0 and the mapping
        // is live, and the region is immutable for the process lifetime.
        unsafe { std::slice::from_raw_parts(self.addr as *const u8, self.len) }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for MappedFile {
    fn drop(&mut self) {
        if !self.addr.is_null() {
            unsafe {
                libc::munmap(self.addr, self.len);
            }
        }
    }
}

pub struct FileCache {
    root: PathBuf,
    files: HashMap<String, Rc<MappedFile>>,
}

impl FileCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: HashMap::new(),
        }
    }

    /// Returns the mapping for `target`, opening and mapping the file on
    /// first request. Open or map failure is a miss and is not cached, so a
    /// file that appears later is picked up.
    pub fn get(&mut self, target: &str) -> Option<Rc<MappedFile>> {
        if let Some(file) = self.files.get(target) {
            return Some(file.clone());
        }
        let relative = target.strip_prefix('/').unwrap_or(target);
        let path = self.root.join(relative);
        let mapped = MappedFile::open(&path).ok()?;
        let handle = Rc::new(mapped);
        self.files.insert(target.to_owned(), handle.clone());
        Some(handle)
    }

    /// Number of distinct targets mapped so far.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
