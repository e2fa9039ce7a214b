use core::{any, fmt, marker::PhantomData, mem};

use rand::Rng;
use zeroize::Zeroizing;

use crate::{
    alloc::{PlatformMemory, SecretMemory},
    compare::Comparison,
    error::{Error, Result},
    mask, Plain,
};

/// Default ratio between the buffer size and the size of the stored value.
pub const DEFAULT_PADDING_FACTOR: usize = 100;

/// A container that keeps a single value obfuscated in memory.
///
/// The value's bytes are XOR-masked and placed at an offset inside a buffer
/// `K` times larger than the value. Every other byte of the buffer is random
/// filler, rewritten on each [`set`](Self::set). The offset is derived from
/// the address of the buffer, which lives in its own page-locked region, so
/// moving the cell does not invalidate the stored value.
///
/// # Memory overhead
/// The buffer is placed at a random shift inside a dedicated mapping of whole
/// pages, at least twice the buffer length. With the default padding factor a
/// `u32` cell has a 400 byte buffer but maps and locks a full page. `K` only
/// changes the footprint once `2 * size_of::<T>() * K` exceeds a page.
///
/// The obfuscation is not encryption: it only keeps the value from showing
/// up verbatim in a memory dump.
///
/// ```
/// use obfuscated_mem::ObfuscatedCell;
///
/// let mut cell = ObfuscatedCell::<u32>::new(0)?;
/// cell.set(123);
/// assert_eq!(cell.get(), 123);
///
/// let mut seen = None;
/// cell.greater_than(100, |v| seen = Some(v));
/// assert_eq!(seen, Some(123));
/// # Ok::<(), obfuscated_mem::Error>(())
/// ```
///
/// A padding factor that leaves no room for the offset is rejected at
/// compile time:
///
/// ```compile_fail
/// use obfuscated_mem::ObfuscatedCell;
///
/// let _ = ObfuscatedCell::<u8, 2>::new(0);
/// ```
///
/// So are zero-sized values:
///
/// ```compile_fail
/// use obfuscated_mem::ObfuscatedCell;
///
/// let _ = ObfuscatedCell::<()>::new(());
/// ```
pub struct ObfuscatedCell<T, const K: usize = { DEFAULT_PADDING_FACTOR }> {
    buffer: PlatformMemory,
    _phant: PhantomData<T>,
}

impl<T: Plain, const K: usize> ObfuscatedCell<T, K> {
    /// The padding factor of this cell type.
    pub const PADDING_FACTOR: usize = K;

    const VALUE_LEN: usize = mem::size_of::<T>();
    const BUFFER_LEN: usize = Self::VALUE_LEN * K;

    const LAYOUT_CHECK: () = {
        assert!(Self::VALUE_LEN > 0, "zero-sized values cannot be obfuscated");
        assert!(
            K >= 2 && Self::VALUE_LEN * (K - 1) >= 2,
            "padding factor leaves no room for the value offset"
        );
    };

    /// Creates a new cell holding `initial`.
    ///
    /// # Errors
    /// Returns [`Error::AllocationFailed`] if the backing buffer cannot be mapped.
    pub fn new(initial: T) -> Result<Self> {
        #[allow(clippy::let_unit_value)]
        let () = Self::LAYOUT_CHECK;

        let buffer = PlatformMemory::with_length(Self::BUFFER_LEN).map_err(|source| {
            Error::AllocationFailed {
                len: Self::BUFFER_LEN,
                source,
            }
        })?;

        let mut cell = Self {
            buffer,
            _phant: PhantomData,
        };
        cell.set(initial);

        tracing::debug!(
            value_type = any::type_name::<T>(),
            buffer_len = Self::BUFFER_LEN,
            "created obfuscated cell"
        );
        Ok(cell)
    }

    /// Length in bytes of the obfuscation buffer.
    #[inline]
    pub const fn buffer_len() -> usize {
        Self::BUFFER_LEN
    }

    /// Position of the value window inside the buffer.
    #[inline]
    pub fn offset(&self) -> usize {
        mask::offset_for(self.buffer.address(), Self::VALUE_LEN, Self::BUFFER_LEN)
    }

    /// Replaces the stored value, rewriting the whole buffer.
    pub fn set(&mut self, val: T) {
        let offset = self.offset();
        let mut rng = rand::thread_rng();

        mask::encode(
            self.buffer.as_bytes_mut(),
            offset,
            bytemuck::bytes_of(&val),
            || rng.gen_range(0..Self::BUFFER_LEN) as u8,
        );
    }

    /// Decodes the stored value.
    ///
    /// The unmasked bytes only live in a scratch buffer that is
    /// zeroized once the value is assembled.
    pub fn get(&self) -> T {
        let mut plain = Zeroizing::new(vec![0u8; Self::VALUE_LEN]);
        mask::decode(self.buffer.as_bytes(), self.offset(), plain.as_mut_slice());

        // The window always holds the bytes of a valid `T` written by `set`.
        bytemuck::checked::pod_read_unaligned(plain.as_slice())
    }

    /// Stores `val` and returns the previous value.
    pub fn replace(&mut self, val: T) -> T {
        let previous = self.get();
        self.set(val);
        previous
    }

    /// Decodes the value, applies `f` and stores the result.
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(T) -> T,
    {
        let value = self.get();
        self.set(f(value));
    }

    /// Creates a new cell holding the same value.
    ///
    /// The clone has its own buffer, hence its own offset and filler.
    ///
    /// # Errors
    /// Returns [`Error::AllocationFailed`] if the backing buffer cannot be mapped.
    pub fn try_clone(&self) -> Result<Self> {
        Self::new(self.get())
    }

    /// Decodes the value once and tests it against `predicate`.
    pub fn compare<P>(&self, predicate: P) -> Comparison<T>
    where
        P: FnOnce(&T) -> bool,
    {
        Comparison::from_predicate(self.get(), predicate)
    }

    #[inline]
    fn branch<P, M, N>(&self, predicate: P, on_match: M, on_mismatch: N)
    where
        P: FnOnce(&T) -> bool,
        M: FnOnce(T),
        N: FnOnce(T),
    {
        self.compare(predicate).branch(on_match, on_mismatch)
    }
}

impl<T: Plain + PartialEq, const K: usize> ObfuscatedCell<T, K> {
    /// Calls `on_match` with the stored value if it equals `rhs`.
    pub fn equals<M: FnOnce(T)>(&self, rhs: T, on_match: M) {
        self.equals_or_else(rhs, on_match, |_| {})
    }

    /// Calls `on_match` if the stored value equals `rhs`, `on_mismatch` otherwise.
    pub fn equals_or_else<M, N>(&self, rhs: T, on_match: M, on_mismatch: N)
    where
        M: FnOnce(T),
        N: FnOnce(T),
    {
        self.branch(|v| *v == rhs, on_match, on_mismatch)
    }

    /// Calls `on_match` with the stored value if it differs from `rhs`.
    pub fn not_equals<M: FnOnce(T)>(&self, rhs: T, on_match: M) {
        self.not_equals_or_else(rhs, on_match, |_| {})
    }

    /// Calls `on_match` if the stored value differs from `rhs`, `on_mismatch` otherwise.
    pub fn not_equals_or_else<M, N>(&self, rhs: T, on_match: M, on_mismatch: N)
    where
        M: FnOnce(T),
        N: FnOnce(T),
    {
        self.branch(|v| *v != rhs, on_match, on_mismatch)
    }
}

impl<T: Plain + PartialOrd, const K: usize> ObfuscatedCell<T, K> {
    /// Calls `on_match` with the stored value if it is greater than `rhs`.
    pub fn greater_than<M: FnOnce(T)>(&self, rhs: T, on_match: M) {
        self.greater_than_or_else(rhs, on_match, |_| {})
    }

    /// Calls `on_match` if the stored value is greater than `rhs`,
    /// `on_mismatch` otherwise.
    pub fn greater_than_or_else<M, N>(&self, rhs: T, on_match: M, on_mismatch: N)
    where
        M: FnOnce(T),
        N: FnOnce(T),
    {
        self.branch(|v| *v > rhs, on_match, on_mismatch)
    }

    /// Calls `on_match` with the stored value if it is greater than or equal to `rhs`.
    pub fn greater_or_equal<M: FnOnce(T)>(&self, rhs: T, on_match: M) {
        self.greater_or_equal_or_else(rhs, on_match, |_| {})
    }

    /// Calls `on_match` if the stored value is greater than or equal to `rhs`,
    /// `on_mismatch` otherwise.
    pub fn greater_or_equal_or_else<M, N>(&self, rhs: T, on_match: M, on_mismatch: N)
    where
        M: FnOnce(T),
        N: FnOnce(T),
    {
        self.branch(|v| *v >= rhs, on_match, on_mismatch)
    }

    /// Calls `on_match` with the stored value if it is less than `rhs`.
    pub fn less_than<M: FnOnce(T)>(&self, rhs: T, on_match: M) {
        self.less_than_or_else(rhs, on_match, |_| {})
    }

    /// Calls `on_match` if the stored value is less than `rhs`,
    /// `on_mismatch` otherwise.
    pub fn less_than_or_else<M, N>(&self, rhs: T, on_match: M, on_mismatch: N)
    where
        M: FnOnce(T),
        N: FnOnce(T),
    {
        self.branch(|v| *v < rhs, on_match, on_mismatch)
    }

    /// Calls `on_match` with the stored value if it is less than or equal to `rhs`.
    pub fn less_or_equal<M: FnOnce(T)>(&self, rhs: T, on_match: M) {
        self.less_or_equal_or_else(rhs, on_match, |_| {})
    }

    /// Calls `on_match` if the stored value is less than or equal to `rhs`,
    /// `on_mismatch` otherwise.
    pub fn less_or_equal_or_else<M, N>(&self, rhs: T, on_match: M, on_mismatch: N)
    where
        M: FnOnce(T),
        N: FnOnce(T),
    {
        self.branch(|v| *v <= rhs, on_match, on_mismatch)
    }
}

impl<T: Plain, const K: usize> fmt::Debug for ObfuscatedCell<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObfuscatedCell")
            .field("type", &any::type_name::<T>())
            .field("buffer_len", &Self::BUFFER_LEN)
            .finish_non_exhaustive()
    }
}
