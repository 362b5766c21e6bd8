use crate::{
    salsa::{salsa20_8, STATE_WORDS},
    try_alloc, Error,
};
use crypto_common::erase::{Erase, EraseOnDrop};

pub fn unpack_le(bytes: &[u8], words: &mut [u32]) {
    debug_assert_eq!(bytes.len(), words.len() * 4, "length mismatch in unpack");
    for (w, c) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *w = u32::from_le_bytes([c[0], c[1], c[2], c[3]]);
    }
}

pub fn pack_le(words: &[u32], bytes: &mut [u8]) {
    debug_assert_eq!(bytes.len(), words.len() * 4, "length mismatch in pack");
    for (c, w) in bytes.chunks_exact_mut(4).zip(words.iter()) {
        c.copy_from_slice(&w.to_le_bytes());
    }
}

/// scryptBlockMix over a block of `2r` sub-blocks of 16 words each.
///
/// Even-indexed results land in the first half of `output`, odd-indexed ones
/// in the second half.
pub fn block_mix(input: &[u32], output: &mut [u32]) {
    debug_assert_eq!(input.len(), output.len());
    debug_assert_eq!(input.len() % (2 * STATE_WORDS), 0);
    let half = input.len() / 2;
    let mut x = [0; STATE_WORDS];
    x.copy_from_slice(&input[input.len() - STATE_WORDS..]);
    for (i, chunk) in input.chunks_exact(STATE_WORDS).enumerate() {
        for (x_i, &b_i) in x.iter_mut().zip(chunk) {
            *x_i ^= b_i;
        }
        salsa20_8(&mut x);
        let pos = if i % 2 == 0 {
            (i / 2) * STATE_WORDS
        } else {
            (i / 2) * STATE_WORDS + half
        };
        output[pos..pos + STATE_WORDS].copy_from_slice(&x);
    }
    x.erase();
}

struct ScratchTable {
    words: Vec<u32>,
    block_words: usize,
}

impl ScratchTable {
    fn allocate(n: usize, block_words: usize) -> Result<Self, Error> {
        let len = n
            .checked_mul(block_words)
            .ok_or(Error::ResourceExhausted { bytes: usize::MAX })?;
        Ok(Self {
            words: try_alloc(len)?,
            block_words,
        })
    }

    fn block(&self, j: usize) -> &[u32] {
        &self.words[j * self.block_words..(j + 1) * self.block_words]
    }
}

impl Drop for ScratchTable {
    fn drop(&mut self) {
        self.words.erase();
    }
}

impl EraseOnDrop for ScratchTable {}

/// scryptROMix, in place on one lane. `n` must be a power of two.
#[allow(clippy::many_single_char_names)]
pub fn ro_mix(b: &mut [u8], n: usize) -> Result<(), Error> {
    // low 64 bits of the last sub-block, little-endian
    #[allow(clippy::cast_possible_truncation)]
    fn integerify(x: &[u32], n: usize) -> usize {
        let mask = (n - 1) as u64;
        let k = x.len() - STATE_WORDS;
        let t = u64::from(x[k]) | (u64::from(x[k + 1]) << 32);
        (t & mask) as usize
    }
    debug_assert!(n.is_power_of_two());
    let len = b.len() / 4;
    let mut v = ScratchTable::allocate(n, len)?;
    let mut x = try_alloc::<u32>(len)?;
    let mut t = try_alloc::<u32>(len)?;
    unpack_le(b, &mut x);
    for chunk in v.words.chunks_exact_mut(len) {
        chunk.copy_from_slice(&x);
        block_mix(chunk, &mut x);
    }
    for _ in 0..n {
        let j = integerify(&x, n);
        xor(&x, v.block(j), &mut t);
        block_mix(&t, &mut x);
    }
    pack_le(&x, b);
    x.erase();
    t.erase();
    Ok(())
}

fn xor(x: &[u32], y: &[u32], output: &mut [u32]) {
    for ((out, &x_i), &y_i) in output.iter_mut().zip(x.iter()).zip(y.iter()) {
        *out = x_i ^ y_i;
    }
}
