//! The ChaCha20 stream cipher keystream generator, exposed as a
//! counter-mode primitive ([RFC 7539]).
//!
//! The cipher state is sixteen 32-bit words: four constants, eight key
//! words, one 32-bit block counter, and three nonce words. There is no
//! authentication here; callers needing integrity must layer a MAC on top.
//!
//! Two concurrent encryptions may share a key but must never share the
//! same nonce and counter values.
//!
//! [RFC 7539]: https://www.rfc-editor.org/rfc/rfc7539

/// Length of a ChaCha20 key in bytes.
pub const KEY_LEN: usize = 32;
/// Length of the counter block in bytes: a 4-byte little-endian block
/// counter followed by a 12-byte nonce.
pub const COUNTER_LEN: usize = 16;
/// Length of one keystream block in bytes.
pub const BLOCK_LEN: usize = 64;

/// `"expand 32-byte k"`, the block-function constants.
const SIGMA: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

/// The ChaCha20 quarter round on four state words.
#[inline(always)]
fn quarter_round(state: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    state[a] = state[a].wrapping_add(state[b]);
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(16);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(12);

    state[a] = state[a].wrapping_add(state[b]);
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(8);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(7);
}

/// Computes one 64-byte keystream block from the initial state.
fn block(input: &[u32; 16]) -> [u8; BLOCK_LEN] {
    let mut state = *input;

    // 20 rounds: ten double rounds of four column and four diagonal
    // quarter rounds each.
    for _ in 0..10 {
        quarter_round(&mut state, 0, 4, 8, 12);
        quarter_round(&mut state, 1, 5, 9, 13);
        quarter_round(&mut state, 2, 6, 10, 14);
        quarter_round(&mut state, 3, 7, 11, 15);
        quarter_round(&mut state, 0, 5, 10, 15);
        quarter_round(&mut state, 1, 6, 11, 12);
        quarter_round(&mut state, 2, 7, 8, 13);
        quarter_round(&mut state, 3, 4, 9, 14);
    }

    let mut out = [0u8; BLOCK_LEN];
    for (i, (word, initial)) in state.iter().zip(input.iter()).enumerate() {
        let sum = word.wrapping_add(*initial);
        out[4 * i..4 * i + 4].copy_from_slice(&sum.to_le_bytes());
    }
    out
}

/// Assembles the initial cipher state from key and counter block.
fn initial_state(key: &[u8; KEY_LEN], counter: &[u8; COUNTER_LEN]) -> [u32; 16] {
    let mut state = [0u32; 16];
    state[..4].copy_from_slice(&SIGMA);
    for i in 0..8 {
        state[4 + i] =
            u32::from_le_bytes(key[4 * i..4 * i + 4].try_into().expect("4 bytes"));
    }
    for i in 0..4 {
        state[12 + i] = u32::from_le_bytes(
            counter[4 * i..4 * i + 4].try_into().expect("4 bytes"),
        );
    }
    state
}

/// XORs `data` in place with the ChaCha20 keystream.
///
/// `counter` packs the initial 32-bit block counter (little-endian) in its
/// first four bytes and the 96-bit nonce in the remaining twelve. The
/// block counter increments by one per 64-byte block; a trailing partial
/// block consumes only as many keystream bytes as remain.
pub fn xor_stream(
    key: &[u8; KEY_LEN],
    counter: &[u8; COUNTER_LEN],
    data: &mut [u8],
) {
    let mut state = initial_state(key, counter);
    for chunk in data.chunks_mut(BLOCK_LEN) {
        let keystream = block(&state);
        for (byte, pad) in chunk.iter_mut().zip(keystream.iter()) {
            *byte ^= pad;
        }
        state[12] = state[12].wrapping_add(1);
    }
}

/// Writes `len` keystream bytes by encrypting zeroes.
#[must_use]
pub fn keystream(
    key: &[u8; KEY_LEN],
    counter: &[u8; COUNTER_LEN],
    len: usize,
) -> alloc::vec::Vec<u8> {
    let mut out = alloc::vec![0u8; len];
    xor_stream(key, counter, &mut out);
    out
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use hex_literal::hex;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn rfc7539_zero_key_first_block() {
        let key = [0u8; KEY_LEN];
        let counter = [0u8; COUNTER_LEN];
        let mut data = [0u8; BLOCK_LEN];
        xor_stream(&key, &counter, &mut data);

        let expected = hex!(
            "76b8e0ada0f13d90405d6ae55386bd28"
            "bdd219b8a08ded1aa836efcc8b770dc7"
            "da41597c5157488d7724e03fb8d84a37"
            "6a43b8f41518a11cc387b669b2ee6586"
        );
        assert_eq!(data, expected);
    }

    #[test]
    fn rfc7539_block_function_test_vector() {
        // RFC 7539 §2.3.2: key 00..1f, nonce 00 00 00 09 00 00 00 4a 00
        // 00 00 00, block counter 1.
        let key: [u8; KEY_LEN] = core::array::from_fn(|i| i as u8);
        let mut counter = [0u8; COUNTER_LEN];
        counter[0] = 1;
        counter[4..].copy_from_slice(&hex!("000000090000004a00000000"));

        let keystream = keystream(&key, &counter, BLOCK_LEN);
        let expected = hex!(
            "10f1e7e4d13b5915500fdd1fa32071c4"
            "c7d1f4c733c068030422aa9ac3d46c4e"
            "d2826446079faa0914c2d705d98b02a2"
            "b5129cd1de164eb9cbd083e8a2503c4e"
        );
        assert_eq!(keystream, expected);
    }

    #[test]
    fn counter_advances_per_block() {
        let key = [7u8; KEY_LEN];
        let counter = [0u8; COUNTER_LEN];
        let two_blocks = keystream(&key, &counter, 2 * BLOCK_LEN);

        let mut second_counter = [0u8; COUNTER_LEN];
        second_counter[0] = 1;
        let second_block = keystream(&key, &second_counter, BLOCK_LEN);
        assert_eq!(&two_blocks[BLOCK_LEN..], &second_block[..]);
    }

    proptest! {
        #[test]
        fn xor_roundtrips(key: [u8; 32], nonce: [u8; 12], data: Vec<u8>) {
            let mut counter = [0u8; COUNTER_LEN];
            counter[4..].copy_from_slice(&nonce);

            let mut encrypted = data.clone();
            xor_stream(&key, &counter, &mut encrypted);
            let mut decrypted = encrypted;
            xor_stream(&key, &counter, &mut decrypted);
            prop_assert_eq!(decrypted, data);
        }

        #[test]
        fn partial_block_is_keystream_prefix(len in 0usize..200) {
            let key = [3u8; KEY_LEN];
            let counter = [0u8; COUNTER_LEN];
            let full = keystream(&key, &counter, 256);
            let partial = keystream(&key, &counter, len);
            prop_assert_eq!(&full[..len], &partial[..]);
        }
    }
}
