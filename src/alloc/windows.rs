use core::ptr::{self, NonNull};
use std::io;

use zeroize::Zeroize;

use super::{check_length, ffi, SecretMemory};

/// A secret memory region on Windows systems.
///
/// The region lives inside an allocation committed with `VirtualAlloc`,
/// rounded up to whole pages and at least twice as long as the region. It
/// starts at a random shift into the allocation. The allocation is locked
/// with `VirtualLock` when the working set allows it. A failed lock is
/// logged and the region is still handed out.
///
/// On drop the whole region is zeroized before it is unlocked and released.
pub struct WindowsSecretMemory {
    virt_alloc: NonNull<u8>,
    len: usize,
    shift: usize,
    mapped_len: usize,
    locked: bool,
}

// SAFETY: the allocation is owned exclusively by this value and is
// only reachable through `&self`/`&mut self`.
unsafe impl Send for WindowsSecretMemory {}
unsafe impl Sync for WindowsSecretMemory {}

impl SecretMemory for WindowsSecretMemory {
    fn with_length(len: usize) -> io::Result<Self> {
        check_length(len)?;

        let mapped_len = super::mapped_len_for(len);
        let shift = super::placement_shift(len, mapped_len);
        let virt_alloc = ffi::windows::virtual_alloc(mapped_len)?.cast::<u8>();

        let locked = match ffi::windows::virtual_lock(virt_alloc, mapped_len) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, len = mapped_len, "unable to lock obfuscation buffer");
                false
            }
        };

        tracing::debug!(len, mapped_len, locked, "committed secret memory region");
        Ok(Self {
            virt_alloc,
            len,
            shift,
            mapped_len,
            locked,
        })
    }
}

impl AsRef<[u8]> for WindowsSecretMemory {
    fn as_ref(&self) -> &[u8] {
        // `shift + len` never exceeds the mapping.
        let start = unsafe { self.virt_alloc.as_ptr().add(self.shift) };
        let slice_ptr = ptr::slice_from_raw_parts(start, self.len);
        unsafe { &(*slice_ptr) }
    }
}

impl AsMut<[u8]> for WindowsSecretMemory {
    fn as_mut(&mut self) -> &mut [u8] {
        let start = unsafe { self.virt_alloc.as_ptr().add(self.shift) };
        let slice_ptr = ptr::slice_from_raw_parts_mut(start, self.len);
        unsafe { &mut (*slice_ptr) }
    }
}

impl Drop for WindowsSecretMemory {
    fn drop(&mut self) {
        let mem_slice = ptr::slice_from_raw_parts_mut(self.virt_alloc.as_ptr(), self.mapped_len);
        Zeroize::zeroize(unsafe { &mut (*mem_slice) });

        if self.locked {
            let _ = ffi::windows::virtual_unlock(self.virt_alloc, self.mapped_len);
        }

        if let Err(err) = ffi::windows::virtual_free(self.virt_alloc) {
            tracing::warn!(error = %err, "unable to release secret memory region");
        } else {
            tracing::trace!(mapped_len = self.mapped_len, "released secret memory region");
        }
    }
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_secret_memory() {
        let mut secret_mem =
            WindowsSecretMemory::with_length(1024).expect("Failed to allocate memory");

        let data = secret_mem.as_mut();
        data[0] = 42;

        assert_eq!(secret_mem.as_ref().len(), 1024);
        assert_eq!(secret_mem.as_ref()[0], 42);
    }

    #[test]
    fn test_windows_secret_memory_rejects_zero_length() {
        assert!(WindowsSecretMemory::with_length(0).is_err());
    }
}
