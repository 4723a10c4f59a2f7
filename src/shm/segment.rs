/*!
 * Shared Memory Segment
 * Owned handle to a named, mapped POSIX shared memory segment
 */

use super::types::ShmError;
use crate::core::types::Size;
use log::{debug, warn};
use nix::fcntl::OFlag;
use nix::sys::mman::{mmap, munmap, shm_open, shm_unlink, MapFlags, ProtFlags};
use nix::sys::stat::Mode;
use nix::unistd::ftruncate;
use std::num::NonZeroUsize;
use std::os::fd::OwnedFd;
use std::ptr::NonNull;

/// A named shared memory segment mapped into this process.
///
/// Every participant holds an independent handle (its own descriptor and
/// mapping) to the same logical memory. Dropping the handle unmaps and closes
/// this process's view only; the name stays in the global namespace until
/// [`SharedSegment::unlink`] removes it.
#[derive(Debug)]
pub struct SharedSegment {
    name: String,
    ptr: NonNull<std::ffi::c_void>,
    len: Size,
    // Held so the descriptor lives as long as the mapping; closed on drop.
    _fd: OwnedFd,
}

impl SharedSegment {
    /// Create a new named segment of `len` bytes and map it read-write.
    ///
    /// Fails with `ResourceCreateFailed` if the name already exists
    /// (`O_EXCL`) or the namespace rejects it. Freshly created segments are
    /// zero-filled by the kernel.
    pub fn create(name: &str, len: Size) -> Result<Self, ShmError> {
        let fd = shm_open(
            name,
            OFlag::O_CREAT | OFlag::O_EXCL | OFlag::O_RDWR,
            Mode::S_IRUSR | Mode::S_IWUSR,
        )
        .map_err(|e| ShmError::ResourceCreateFailed {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        let segment = Self::map(name, fd, len, true)?;
        debug!("Created shared segment '{}' ({} bytes)", name, len);
        Ok(segment)
    }

    /// Open an existing named segment of known size and map it read-write.
    pub fn open(name: &str, len: Size) -> Result<Self, ShmError> {
        let fd = shm_open(name, OFlag::O_RDWR, Mode::empty()).map_err(|e| {
            ShmError::ResourceOpenFailed {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })?;

        let segment = Self::map(name, fd, len, false)?;
        debug!("Opened shared segment '{}' ({} bytes)", name, len);
        Ok(segment)
    }

    fn map(name: &str, fd: OwnedFd, len: Size, truncate: bool) -> Result<Self, ShmError> {
        let nz_len = NonZeroUsize::new(len)
            .ok_or_else(|| ShmError::InvalidSize("size must be greater than 0".to_string()))?;

        if truncate {
            ftruncate(&fd, len as i64).map_err(|e| ShmError::MapFailed {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        }

        // SAFETY: fd is a valid shared memory descriptor sized to len; the
        // mapping is released in Drop.
        let ptr = unsafe {
            mmap(
                None,
                nz_len,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                &fd,
                0,
            )
        }
        .map_err(|e| ShmError::MapFailed {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            name: name.to_string(),
            ptr,
            len,
            _fd: fd,
        })
    }

    /// Remove `name` from the global shared memory namespace.
    ///
    /// Not reference-counted: removal affects only future opens, never
    /// existing mappings. Handles held by other participants stay valid.
    pub fn unlink(name: &str) -> Result<(), ShmError> {
        shm_unlink(name).map_err(|e| ShmError::UnlinkFailed {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        debug!("Unlinked shared segment '{}'", name);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> Size {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr().cast()
    }

    /// Base of the mapping for writing.
    ///
    /// Writes from different participants must target disjoint ranges; the
    /// partition scheme guarantees that for array data, and the barrier layout
    /// does for coordination slots.
    pub fn as_mut_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr().cast()
    }
}

impl Drop for SharedSegment {
    fn drop(&mut self) {
        // SAFETY: ptr/len describe the mapping established in map().
        if let Err(e) = unsafe { munmap(self.ptr, self.len) } {
            warn!("Failed to unmap shared segment '{}': {}", self.name, e);
        }
        // _fd closed by OwnedFd
    }
}

// SAFETY: the mapping is plain shared memory; the handle carries no
// thread-local state, and the kernel refcounts the descriptor.
unsafe impl Send for SharedSegment {}
unsafe impl Sync for SharedSegment {}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_name(tag: &str) -> String {
        format!("/shmpi-seg-{}-{}", tag, std::process::id())
    }

    #[test]
    fn test_create_open_roundtrip() {
        let name = test_name("rt");
        let created = SharedSegment::create(&name, 4096).unwrap();
        assert_eq!(created.len(), 4096);
        assert_eq!(created.name(), name);

        unsafe {
            *created.as_mut_ptr() = 42;
            *created.as_mut_ptr().add(4095) = 99;
        }

        let opened = SharedSegment::open(&name, 4096).unwrap();
        unsafe {
            assert_eq!(*opened.as_ptr(), 42);
            assert_eq!(*opened.as_ptr().add(4095), 99);
        }

        SharedSegment::unlink(&name).unwrap();
    }

    #[test]
    fn test_create_zero_size_fails() {
        let name = test_name("zero");
        let result = SharedSegment::create(&name, 0);
        assert!(matches!(result, Err(ShmError::InvalidSize(_))));
        // shm_open succeeded before the size check
        let _ = SharedSegment::unlink(&name);
    }

    #[test]
    fn test_create_is_zero_filled() {
        let name = test_name("zf");
        let segment = SharedSegment::create(&name, 1024).unwrap();
        let bytes = unsafe { std::slice::from_raw_parts(segment.as_ptr(), 1024) };
        assert!(bytes.iter().all(|b| *b == 0));
        SharedSegment::unlink(&name).unwrap();
    }

    #[test]
    fn test_open_missing_fails() {
        let result = SharedSegment::open("/shmpi-seg-missing", 4096);
        assert!(matches!(result, Err(ShmError::ResourceOpenFailed { .. })));
    }

    #[test]
    fn test_error_message_carries_name_and_reason() {
        let err = SharedSegment::open("/shmpi-seg-missing", 4096).unwrap_err();
        assert!(err.to_string().contains("/shmpi-seg-missing"));
        assert!(
            matches!(err, ShmError::ResourceOpenFailed { ref reason, .. } if !reason.is_empty())
        );
    }

    #[test]
    fn test_exclusive_create() {
        let name = test_name("excl");
        let _first = SharedSegment::create(&name, 512).unwrap();
        let second = SharedSegment::create(&name, 512);
        assert!(matches!(second, Err(ShmError::ResourceCreateFailed { .. })));
        SharedSegment::unlink(&name).unwrap();
    }

    #[test]
    fn test_unlink_preserves_existing_mappings() {
        let name = test_name("ul");
        let creator = SharedSegment::create(&name, 256).unwrap();
        let holder = SharedSegment::open(&name, 256).unwrap();

        SharedSegment::unlink(&name).unwrap();

        // Future opens fail, existing mappings still alias the same bytes
        assert!(SharedSegment::open(&name, 256).is_err());
        unsafe {
            *creator.as_mut_ptr().add(7) = 0xAB;
            assert_eq!(*holder.as_ptr().add(7), 0xAB);
        }
    }
}
