use crate::{prf::Prf, Error};
use crypto_common::erase::{Erase, EraseOnDrop};

#[inline]
pub fn pbkdf2<M: Prf>(
    password: &[u8],
    salt: &[u8],
    rounds: u32,
    res: &mut [u8],
) -> Result<(), Error> {
    check_output_len::<M>(res.len())?;
    Pbkdf2::<M>::new(password, salt, rounds)?.fill(res)
}

/// `(2^32 - 1) * hLen`, the most bytes one PBKDF2 output can hold.
#[must_use]
pub fn max_output_len<M: Prf>() -> u64 {
    u64::from(u32::MAX) * M::output_size() as u64
}

pub(crate) fn check_output_len<M: Prf>(len: usize) -> Result<(), Error> {
    if len as u64 > max_output_len::<M>() {
        return Err(Error::InvalidArgument("output length"));
    }
    Ok(())
}

/// Consecutive [`Pbkdf2::fill`] calls return consecutive slices of
/// `T_1 || T_2 || ...`.
pub struct Pbkdf2<M: Prf> {
    prf: M,
    salt: Vec<u8>,
    rounds: u32,
    // index of the last block computed, 0 before the first one
    index: u32,
    block: Vec<u8>,
    pos: usize,
}

impl<M: Prf> core::fmt::Debug for Pbkdf2<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pbkdf2")
            .field("rounds", &self.rounds)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl<M: Prf> Pbkdf2<M> {
    pub fn new(password: &[u8], salt: &[u8], rounds: u32) -> Result<Self, Error> {
        if rounds == 0 {
            return Err(Error::InvalidArgument("pbkdf2 rounds"));
        }
        Ok(Self {
            prf: M::new_from_slice(password)?,
            salt: salt.to_vec(),
            rounds,
            index: 0,
            block: Vec::with_capacity(M::output_size()),
            pos: 0,
        })
    }

    #[must_use]
    pub fn position(&self) -> u64 {
        u64::from(self.index.saturating_sub(1)) * M::output_size() as u64 + self.pos as u64
    }

    pub fn fill(&mut self, out: &mut [u8]) -> Result<(), Error> {
        let mut written = 0;
        while written < out.len() {
            if self.pos == self.block.len() {
                self.next_block()?;
            }
            let n = (self.block.len() - self.pos).min(out.len() - written);
            out[written..written + n].copy_from_slice(&self.block[self.pos..self.pos + n]);
            self.pos += n;
            written += n;
        }
        Ok(())
    }

    fn next_block(&mut self) -> Result<(), Error> {
        let i = self
            .index
            .checked_add(1)
            .ok_or(Error::InvalidArgument("output length"))?;
        self.block.erase();
        self.block.resize(M::output_size(), 0);
        inner(i, &mut self.block, &self.prf, &self.salt, self.rounds);
        self.index = i;
        self.pos = 0;
        Ok(())
    }
}

impl<M: Prf> Drop for Pbkdf2<M> {
    fn drop(&mut self) {
        self.block.erase();
        self.salt.erase();
    }
}

impl<M: Prf> EraseOnDrop for Pbkdf2<M> {}

#[inline(always)]
fn inner<M: Prf>(i: u32, chunk: &mut [u8], prf: &M, salt: &[u8], rounds: u32) {
    chunk.erase();
    let mut u = {
        let mut prf = prf.clone();
        prf.update(salt);
        prf.update(&i.to_be_bytes());
        let u = prf.finalize_fixed();
        xor(chunk, u.as_ref());
        u
    };
    for _ in 1..rounds {
        let mut prf = prf.clone();
        prf.update(u.as_ref());
        u = prf.finalize_fixed();
        xor(chunk, u.as_ref());
    }
}

#[inline(always)]
fn xor(res: &mut [u8], u: &[u8]) {
    debug_assert!(u.len() >= res.len(), "length mismatch in xor");
    res.iter_mut().zip(u.iter()).for_each(|(a, b)| *a ^= b);
}
