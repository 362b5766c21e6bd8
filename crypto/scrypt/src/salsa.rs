use crypto_common::erase::Erase;

pub const STATE_WORDS: usize = 16;
// double rounds
const ROUNDS: usize = 4;

/// Salsa20/8 core, in place.
#[inline(always)]
pub fn salsa20_8(block: &mut [u32; STATE_WORDS]) {
    let mut x = *block;
    run_rounds(&mut x);
    for (b, m) in block.iter_mut().zip(x.iter()) {
        *b = b.wrapping_add(*m);
    }
    x.erase();
}

#[inline]
const fn quarter_round(a: usize, b: usize, c: usize, d: usize, state: &mut [u32; STATE_WORDS]) {
    state[b] ^= state[a].wrapping_add(state[d]).rotate_left(7);
    state[c] ^= state[b].wrapping_add(state[a]).rotate_left(9);
    state[d] ^= state[c].wrapping_add(state[b]).rotate_left(13);
    state[a] ^= state[d].wrapping_add(state[c]).rotate_left(18);
}

#[inline(always)]
fn run_rounds(x: &mut [u32; STATE_WORDS]) {
    for _ in 0..ROUNDS {
        // columns
        quarter_round(0, 4, 8, 12, x);
        quarter_round(5, 9, 13, 1, x);
        quarter_round(10, 14, 2, 6, x);
        quarter_round(15, 3, 7, 11, x);
        // rows
        quarter_round(0, 1, 2, 3, x);
        quarter_round(5, 6, 7, 4, x);
        quarter_round(10, 11, 8, 9, x);
        quarter_round(15, 12, 13, 14, x);
    }
}
