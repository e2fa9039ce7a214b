use core::ptr::{self, NonNull};
use std::io;

/// Maps a private, anonymous, read-write memory region into the
/// process's address space.
///
/// Wraps the `mmap` system call.
///
/// # Arguments
///
/// * `len` - The length of the memory region, expected to be page aligned.
///
/// # Returns
///
/// * A result containing a non-null pointer to the memory region on success,
///   or an I/O error on failure.
pub fn mmap_anonymous(len: usize) -> io::Result<NonNull<[u8]>> {
    let prot = libc::PROT_READ | libc::PROT_WRITE;
    let flags = libc::MAP_PRIVATE | libc::MAP_ANON;

    let mmap = unsafe { libc::mmap(ptr::null_mut(), len, prot, flags, -1, 0) };
    if mmap == libc::MAP_FAILED {
        return Err(io::Error::last_os_error());
    }

    let ptr = unsafe { NonNull::new_unchecked(mmap as *mut u8) };
    Ok(NonNull::slice_from_raw_parts(ptr, len))
}

/// Excludes a memory region from core dumps.
///
/// Wraps the `madvise` system call with `MADV_DONTDUMP` on Linux and Android,
/// `MADV_NOCORE` on FreeBSD and DragonFly. Other Unix systems have no such
/// advice and the call does nothing.
pub fn exclude_from_dump(ptr: NonNull<u8>, len: usize) -> io::Result<()> {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        self::madvise(ptr, len, libc::MADV_DONTDUMP)
    }
    #[cfg(any(target_os = "freebsd", target_os = "dragonfly"))]
    {
        self::madvise(ptr, len, libc::MADV_NOCORE)
    }
    #[cfg(not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "freebsd",
        target_os = "dragonfly"
    )))]
    {
        let _ = (ptr, len);
        Ok(())
    }
}

/// Reverts [`exclude_from_dump`] on a memory region.
pub fn include_in_dump(ptr: NonNull<u8>, len: usize) -> io::Result<()> {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        self::madvise(ptr, len, libc::MADV_DODUMP)
    }
    #[cfg(any(target_os = "freebsd", target_os = "dragonfly"))]
    {
        self::madvise(ptr, len, libc::MADV_CORE)
    }
    #[cfg(not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "freebsd",
        target_os = "dragonfly"
    )))]
    {
        let _ = (ptr, len);
        Ok(())
    }
}

/// Locks a memory region, preventing it from being paged out to swap.
///
/// Wraps the `mlock` system call.
///
/// # Arguments
///
/// * `ptr` - A non-null pointer to the memory region.
/// * `len` - The length of the memory region.
pub fn mlock(ptr: NonNull<u8>, len: usize) -> io::Result<()> {
    match unsafe { libc::mlock(ptr.as_ptr() as _, len) } {
        -1 => Err(io::Error::last_os_error()),
        _ => Ok(()),
    }
}

/// Unlocks a memory region, allowing it to be paged out to swap.
///
/// Wraps the `munlock` system call.
pub fn munlock(ptr: NonNull<u8>, len: usize) -> io::Result<()> {
    match unsafe { libc::munlock(ptr.as_ptr() as _, len) } {
        -1 => Err(io::Error::last_os_error()),
        _ => Ok(()),
    }
}

/// Unmaps a memory region within the process's address space.
///
/// Wraps the `munmap` system call.
pub fn munmap(ptr: NonNull<u8>, len: usize) -> io::Result<()> {
    match unsafe { libc::munmap(ptr.as_ptr() as _, len) } {
        -1 => Err(io::Error::last_os_error()),
        _ => Ok(()),
    }
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "dragonfly"
))]
#[inline]
fn madvise(ptr: NonNull<u8>, len: usize, advice: i32) -> io::Result<()> {
    match unsafe { libc::madvise(ptr.as_ptr() as _, len, advice) } {
        -1 => Err(io::Error::last_os_error()),
        _ => Ok(()),
    }
}

/// Retrieves the system's page size.
///
/// Wraps the `sysconf` system call on Unix-like systems
/// and `vm_page_size` on macOS.
#[inline]
pub(super) fn page_size() -> usize {
    #[cfg(target_os = "macos")]
    unsafe {
        libc::vm_page_size as usize
    }
    #[cfg(not(target_os = "macos"))]
    unsafe {
        libc::sysconf(libc::_SC_PAGESIZE) as usize
    }
}
