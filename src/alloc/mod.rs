mod ffi;

#[cfg(target_family = "unix")]
pub mod unix;
#[cfg(target_family = "windows")]
pub mod windows;

use std::io;

use rand::Rng;

/// The secret memory implementation of the target platform.
#[cfg(target_family = "unix")]
pub type PlatformMemory = self::unix::UnixSecretMemory;
/// The secret memory implementation of the target platform.
#[cfg(target_family = "windows")]
pub type PlatformMemory = self::windows::WindowsSecretMemory;

/// Trait representing a writable region of secret memory.
///
/// Implementors should keep the region out of swap and core dumps where the
/// platform allows it, and must wipe the contents before giving the region
/// back to the operating system.
pub trait SecretMemory: AsRef<[u8]> + AsMut<[u8]> + Sized {
    /// Allocates a new memory region with the specified length.
    ///
    /// # Arguments
    /// * `len` - Length of the usable region in bytes, must be non-zero.
    ///
    /// # Returns
    /// The memory region if successful, or an `io::Error`.
    fn with_length(len: usize) -> io::Result<Self>;

    /// Provides a byte slice view of the secret memory.
    /// This function is a convenience wrapper around the `AsRef` implementation.
    #[inline]
    fn as_bytes(&self) -> &[u8] {
        self.as_ref()
    }

    /// Provides a mutable byte slice view of the secret memory.
    /// This function is a convenience wrapper around the `AsMut` implementation.
    #[inline]
    fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.as_mut()
    }

    /// Address of the first usable byte.
    ///
    /// Stable for the whole lifetime of the region, moving the owning
    /// value does not move the memory.
    #[inline]
    fn address(&self) -> usize {
        self.as_bytes().as_ptr() as usize
    }
}

/// Length of the mapping backing a usable region of `len` bytes.
///
/// The mapping keeps at least `len` bytes of slack so the region can
/// start at a shifted, non page-aligned position.
fn mapped_len_for(len: usize) -> usize {
    ffi::page_aligned_len(len * 2)
}

/// Picks where a region of `len` bytes starts inside a mapping of
/// `mapped_len` bytes.
fn placement_shift(len: usize, mapped_len: usize) -> usize {
    rand::thread_rng().gen_range(0..=mapped_len - len)
}

/// Rejects lengths that cannot describe a valid allocation.
fn check_length(len: usize) -> io::Result<()> {
    if len > 0 && len <= isize::MAX as usize {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "length out of bounds",
        ))
    }
}
