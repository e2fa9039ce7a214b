//! Placement and masking of a value's bytes inside a padded buffer.
//!
//! A buffer of `buffer_len` bytes holds the `value_len` bytes of a value
//! starting at `offset`. Every byte of that window is XORed with a key that
//! depends on its position, every other byte is filler.

/// Modulus of the XOR key.
const KEY_MODULUS: usize = 0xff;

/// Number of distinct offsets available to a value of `value_len` bytes
/// in a buffer of `buffer_len` bytes.
///
/// Callers guarantee `buffer_len > value_len + 1`.
#[inline]
pub(crate) const fn offset_modulus(value_len: usize, buffer_len: usize) -> usize {
    buffer_len - 1 - value_len
}

/// Derives the value window offset from a storage address.
///
/// The window `[offset, offset + value_len)` always lies inside the buffer.
#[inline]
pub(crate) fn offset_for(address: usize, value_len: usize, buffer_len: usize) -> usize {
    address % offset_modulus(value_len, buffer_len)
}

/// XOR key of the buffer byte at `index` for a window placed at `offset`.
#[inline]
pub(crate) fn key_at(offset: usize, index: usize) -> u8 {
    ((offset + index) % KEY_MODULUS) as u8
}

/// Rewrites the whole `buffer`, masking `value` into the window at `offset`
/// and drawing every other byte from `filler`.
pub(crate) fn encode<F>(buffer: &mut [u8], offset: usize, value: &[u8], mut filler: F)
where
    F: FnMut() -> u8,
{
    debug_assert!(offset + value.len() <= buffer.len());

    let window = offset..offset + value.len();
    for (i, byte) in buffer.iter_mut().enumerate() {
        *byte = if window.contains(&i) {
            value[i - offset] ^ self::key_at(offset, i)
        } else {
            filler()
        };
    }
}

/// Unmasks the window at `offset` of `buffer` into `out`.
///
/// `out.len()` is the value length.
pub(crate) fn decode(buffer: &[u8], offset: usize, out: &mut [u8]) {
    debug_assert!(offset + out.len() <= buffer.len());

    for (i, byte) in out.iter_mut().enumerate() {
        *byte = buffer[offset + i] ^ self::key_at(offset, i + offset);
    }
}
