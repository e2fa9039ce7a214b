use core::ptr::{self, NonNull};
use std::io;

use zeroize::Zeroize;

use super::{check_length, ffi, SecretMemory};

/// A secret memory region on Unix-based systems.
///
/// The region lives inside an anonymous private mapping of whole pages,
/// at least twice as long as the region. It starts at a random shift into
/// the mapping, so its address is not page aligned. The mapping is locked into RAM with `mlock` and excluded from core dumps with
/// `madvise`. Both protections are best effort: a process with a small
/// `RLIMIT_MEMLOCK` still gets a usable region, and a warning is logged.
///
/// On drop the whole mapping is zeroized before it is unlocked and unmapped.
pub struct UnixSecretMemory {
    mmap: NonNull<u8>,
    len: usize,
    shift: usize,
    mapped_len: usize,
    locked: bool,
}

// SAFETY: the mapping is owned exclusively by this value and is
// only reachable through `&self`/`&mut self`.
unsafe impl Send for UnixSecretMemory {}
unsafe impl Sync for UnixSecretMemory {}

impl SecretMemory for UnixSecretMemory {
    fn with_length(len: usize) -> io::Result<Self> {
        check_length(len)?;

        let mapped_len = super::mapped_len_for(len);
        let shift = super::placement_shift(len, mapped_len);
        let mmap = ffi::unix::mmap_anonymous(mapped_len)?.cast::<u8>();

        let locked = match ffi::unix::mlock(mmap, mapped_len) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, len = mapped_len, "unable to lock obfuscation buffer");
                false
            }
        };

        if let Err(err) = ffi::unix::exclude_from_dump(mmap, mapped_len) {
            tracing::warn!(error = %err, len = mapped_len, "unable to exclude obfuscation buffer from core dumps");
        }

        tracing::debug!(len, mapped_len, locked, "mapped secret memory region");
        Ok(Self {
            mmap,
            len,
            shift,
            mapped_len,
            locked,
        })
    }
}

impl AsRef<[u8]> for UnixSecretMemory {
    fn as_ref(&self) -> &[u8] {
        // `shift + len` never exceeds the mapping.
        let start = unsafe { self.mmap.as_ptr().add(self.shift) };
        let slice_ptr = ptr::slice_from_raw_parts(start, self.len);
        unsafe { &(*slice_ptr) }
    }
}

impl AsMut<[u8]> for UnixSecretMemory {
    fn as_mut(&mut self) -> &mut [u8] {
        let start = unsafe { self.mmap.as_ptr().add(self.shift) };
        let slice_ptr = ptr::slice_from_raw_parts_mut(start, self.len);
        unsafe { &mut (*slice_ptr) }
    }
}

impl Drop for UnixSecretMemory {
    fn drop(&mut self) {
        let mem_slice = ptr::slice_from_raw_parts_mut(self.mmap.as_ptr(), self.mapped_len);
        Zeroize::zeroize(unsafe { &mut (*mem_slice) });

        // May fail (unchecked)
        let _ = ffi::unix::include_in_dump(self.mmap, self.mapped_len);
        if self.locked {
            let _ = ffi::unix::munlock(self.mmap, self.mapped_len);
        }

        if let Err(err) = ffi::unix::munmap(self.mmap, self.mapped_len) {
            tracing::warn!(error = %err, "unable to unmap secret memory region");
        } else {
            tracing::trace!(mapped_len = self.mapped_len, "released secret memory region");
        }
    }
}
