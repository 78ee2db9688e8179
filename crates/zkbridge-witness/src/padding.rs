//! SHA-256 message padding for the fixed-capacity transaction buffer.

use zkbridge_core::constants::{MAX_PADDED_TX_BYTES, MAX_SHA_BLOCKS, SHA256_BLOCK_BYTES};

use crate::WitnessError;

/// Bytes SHA-256 padding adds at minimum: the `0x80` byte and the 64-bit length.
const MIN_PADDING_BYTES: usize = 9;

/// The largest message that still pads into [`MAX_SHA_BLOCKS`] blocks.
pub const MAX_MESSAGE_BYTES: usize = MAX_PADDED_TX_BYTES.saturating_sub(MIN_PADDING_BYTES);

/// Number of 64-byte blocks the padded form of an `len`-byte message occupies.
#[must_use]
pub const fn block_count(len: usize) -> usize {
    len.saturating_add(MIN_PADDING_BYTES)
        .div_ceil(SHA256_BLOCK_BYTES)
}

/// Standard SHA-256 padding: `message ‖ 0x80 ‖ 0x00* ‖ bitlen_BE64`, a whole number of
/// 64-byte blocks.
///
/// # Errors
/// Returns [`WitnessError::TransactionTooLarge`] if the bit length overflows 64 bits.
pub fn sha256_pad(message: &[u8]) -> Result<Vec<u8>, WitnessError> {
    let too_large = || WitnessError::TransactionTooLarge {
        len: message.len(),
        max: MAX_MESSAGE_BYTES,
    };
    let bit_len = u64::try_from(message.len())
        .ok()
        .and_then(|len| len.checked_mul(8))
        .ok_or_else(too_large)?;
    let padded_len = block_count(message.len())
        .checked_mul(SHA256_BLOCK_BYTES)
        .ok_or_else(too_large)?;

    let mut padded = Vec::with_capacity(padded_len);
    padded.extend_from_slice(message);
    padded.push(0x80);
    padded.resize(padded_len.saturating_sub(8), 0);
    padded.extend_from_slice(&bit_len.to_be_bytes());
    Ok(padded)
}

/// Pad `message` and zero-extend it to [`MAX_SHA_BLOCKS`] blocks.
///
/// Returns the buffer and the number of blocks holding the real padded message. The
/// size check runs before any padding.
///
/// # Errors
/// Returns [`WitnessError::TransactionTooLarge`] if the message needs more blocks than
/// the buffer holds.
pub fn pad_to_capacity(message: &[u8]) -> Result<(Vec<u8>, usize), WitnessError> {
    if message.len() > MAX_MESSAGE_BYTES {
        return Err(WitnessError::TransactionTooLarge {
            len: message.len(),
            max: MAX_MESSAGE_BYTES,
        });
    }
    let mut buffer = sha256_pad(message)?;
    let blocks = block_count(message.len());
    buffer.resize(MAX_PADDED_TX_BYTES, 0);
    debug_assert!(blocks <= MAX_SHA_BLOCKS);
    Ok((buffer, blocks))
}

#[cfg(test)]
mod tests {
    use sha2::digest::generic_array::GenericArray;
    use sha2::{Digest as _, Sha256};

    use super::*;

    const IV: [u32; 8] = [
        0x6a09_e667,
        0xbb67_ae85,
        0x3c6e_f372,
        0xa54f_f53a,
        0x510e_527f,
        0x9b05_688c,
        0x1f83_d9ab,
        0x5be0_cd19,
    ];

    fn compress_blocks(padded: &[u8], blocks: usize) -> [u8; 32] {
        let mut state = IV;
        let chunks: Vec<_> = padded
            .chunks(SHA256_BLOCK_BYTES)
            .take(blocks)
            .map(GenericArray::clone_from_slice)
            .collect();
        sha2::compress256(&mut state, &chunks);
        let mut out = [0_u8; 32];
        for (dst, word) in out.chunks_mut(4).zip(state) {
            dst.copy_from_slice(&word.to_be_bytes());
        }
        out
    }

    #[test]
    fn padded_length_is_smallest_block_multiple() {
        for len in [0_usize, 1, 55, 56, 63, 64, 119, 120, 1000] {
            let padded = sha256_pad(&vec![0xAB; len]).expect("small message");
            let bits = len * 8;
            let padded_bits = padded.len() * 8;
            assert_eq!(padded_bits % 512, 0, "len {len}");
            assert!(padded_bits >= bits + 65, "len {len}");
            assert!(padded_bits - 512 < bits + 65, "len {len}");
            assert_eq!(
                padded[padded.len() - 8..],
                u64::try_from(bits).expect("fits").to_be_bytes(),
                "len {len}"
            );
            assert_eq!(padded[len], 0x80);
        }
    }

    #[test]
    fn boundary_lengths() {
        assert_eq!(block_count(55), 1);
        assert_eq!(block_count(56), 2);
        assert_eq!(block_count(MAX_MESSAGE_BYTES), MAX_SHA_BLOCKS);
        assert_eq!(block_count(MAX_MESSAGE_BYTES + 1), MAX_SHA_BLOCKS + 1);
    }

    #[test]
    fn compressing_real_blocks_reproduces_sha256() {
        let message: Vec<u8> = (0..200_u8).collect();
        let (buffer, blocks) = pad_to_capacity(&message).expect("fits");
        assert_eq!(buffer.len(), MAX_PADDED_TX_BYTES);
        assert_eq!(blocks, 4);
        assert!(buffer[blocks * SHA256_BLOCK_BYTES..].iter().all(|b| *b == 0));

        let expected: [u8; 32] = Sha256::digest(&message).into();
        assert_eq!(compress_blocks(&buffer, blocks), expected);
    }

    #[test]
    fn oversized_message_is_rejected_before_padding() {
        let message = vec![0_u8; MAX_MESSAGE_BYTES + 1];
        assert_eq!(
            pad_to_capacity(&message),
            Err(WitnessError::TransactionTooLarge {
                len: MAX_MESSAGE_BYTES + 1,
                max: MAX_MESSAGE_BYTES,
            })
        );
        let (_, blocks) = pad_to_capacity(&message[1..]).expect("largest message fits");
        assert_eq!(blocks, MAX_SHA_BLOCKS);
    }
}
