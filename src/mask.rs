//! Payload masking.
//!
//! RFC 6455 requires every client-to-server frame to XOR its payload with a
//! repeating 4-byte key. The operation is an involution: applying the same
//! key twice restores the original bytes, so masking and unmasking share a
//! single implementation.

/// XOR `buf` in place with the repeating 4-byte `key`.
#[inline]
pub fn apply_mask(buf: &mut [u8], key: [u8; 4]) {
    apply_mask_aligned(buf, key);
}

/// Byte-at-a-time masking. Correct for any slice; used for the unaligned
/// edges of the buffer.
#[inline]
fn apply_mask_bytewise(buf: &mut [u8], key: [u8; 4]) {
    for (i, byte) in buf.iter_mut().enumerate() {
        *byte ^= key[i & 3];
    }
}

/// Masking over 4-byte words for the aligned middle of the buffer.
///
/// The key is rotated by the length of the unaligned prefix so that the
/// word-wide XOR continues the byte sequence where the prefix left off.
#[inline]
fn apply_mask_aligned(buf: &mut [u8], key: [u8; 4]) {
    let key_u32 = u32::from_ne_bytes(key);

    let (prefix, words, suffix) = unsafe { buf.align_to_mut::<u32>() };
    apply_mask_bytewise(prefix, key);

    let shift = prefix.len() & 3;
    let key_u32 = if shift > 0 {
        if cfg!(target_endian = "big") {
            key_u32.rotate_left(8 * shift as u32)
        } else {
            key_u32.rotate_right(8 * shift as u32)
        }
    } else {
        key_u32
    };

    for word in words.iter_mut() {
        *word ^= key_u32;
    }
    apply_mask_bytewise(suffix, key_u32.to_ne_bytes());
}
