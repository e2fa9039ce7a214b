use std::sync::OnceLock;

#[cfg(target_family = "unix")]
pub mod unix;
#[cfg(target_family = "windows")]
pub mod windows;

/// Retrieves the system's page size.
///
/// The value is queried from the operating system on the first call
/// and cached for every subsequent one.
///
/// # Platform-specific behavior
/// - **Unix-based systems:** `libc::sysconf(_SC_PAGESIZE)`, or
///   `libc::vm_page_size` on macOS.
/// - **Windows:** the `dwPageSize` field of `GetSystemInfo`.
pub fn page_size() -> usize {
    static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

    #[cfg(target_family = "unix")]
    {
        *PAGE_SIZE.get_or_init(self::unix::page_size)
    }
    #[cfg(target_family = "windows")]
    {
        *PAGE_SIZE.get_or_init(self::windows::page_size)
    }
}

/// Rounds `len` up to a whole number of pages.
///
/// Locking and protection act on entire pages, so every region
/// handed out by this crate spans at least one full page.
pub fn page_aligned_len(len: usize) -> usize {
    let page_size = self::page_size();
    let pages = (len + page_size - 1) / page_size;
    pages.max(1) * page_size
}
