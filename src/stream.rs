use crate::{
    config::{Config, Salt},
    error::Error,
};
use crypto_common::erase::Erase;
use log::trace;
use rand_core::{CryptoRng, RngCore};
use scrypt::{max_output_len, try_alloc, HmacSha256, Lanes, Params, Pbkdf2, Prf};

/// A source of derived key bytes that can be read in pieces.
pub trait DeriveBytes {
    /// Fills `out` with the next `out.len()` bytes of the stream.
    ///
    /// An empty `out` is an error, not a no-op.
    fn fill_bytes(&mut self, out: &mut [u8]) -> Result<(), Error>;

    /// Discards any buffered state; the next read starts from byte zero.
    fn reset(&mut self);

    fn get_bytes(&mut self, n: usize) -> Result<Vec<u8>, Error> {
        if n == 0 {
            return Err(Error::InvalidLength);
        }
        let mut out = try_alloc::<u8>(n)?;
        self.fill_bytes(&mut out)?;
        Ok(out)
    }
}

/// The scrypt output for one password, salt and parameter set, read as a
/// stream.
///
/// The expensive part of scrypt runs on the first read after construction or
/// [`reset`](DeriveBytes::reset). Later reads only run the final PBKDF2 stage
/// for the bytes they need. Reads are always served in whole PRF blocks, the
/// unread tail of the last block is cached here for the next call.
///
/// Changing the salt or any cost parameter goes through one of the `with_*`
/// methods, which consume the stream and return one that starts over.
pub struct DerivedKeyStream<M: Prf = HmacSha256> {
    password: Vec<u8>,
    salt: Vec<u8>,
    params: Params,
    lanes: Lanes,
    keystream: Option<Pbkdf2<M>>,
    leftover: Vec<u8>,
    cursor: usize,
    served: u64,
}

impl<M: Prf> std::fmt::Debug for DerivedKeyStream<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKeyStream")
            .field("salt", &crate::util::hex(&self.salt))
            .field("params", &self.params)
            .field("lanes", &self.lanes)
            .field("served", &self.served)
            .field("cached", &(self.leftover.len() - self.cursor))
            .finish_non_exhaustive()
    }
}

impl DerivedKeyStream {
    /// Uses the operating system RNG if the config asks for a random salt.
    pub fn new(config: &Config) -> Result<Self, Error> {
        Self::new_with_rng(config, &mut rand_core::OsRng)
    }
}

impl<M: Prf> DerivedKeyStream<M> {
    pub fn new_with_rng<R: RngCore + CryptoRng>(
        config: &Config,
        rng: &mut R,
    ) -> Result<Self, Error> {
        let salt = match config.salt_source() {
            Salt::Bytes(salt) => salt.clone(),
            Salt::Random(len) => {
                let mut salt = try_alloc::<u8>(*len)?;
                rng.try_fill_bytes(&mut salt)?;
                salt
            }
        };
        let mut stream = Self::from_parts(config.password(), &salt, config.scrypt_params());
        stream.lanes = config.lane_mode();
        Ok(stream)
    }

    #[must_use]
    pub fn from_parts(password: &[u8], salt: &[u8], params: Params) -> Self {
        Self {
            password: password.to_vec(),
            salt: salt.to_vec(),
            params,
            lanes: Lanes::Sequential,
            keystream: None,
            leftover: Vec::with_capacity(M::output_size()),
            cursor: 0,
            served: 0,
        }
    }

    #[must_use]
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    #[must_use]
    pub const fn params(&self) -> Params {
        self.params
    }

    #[must_use]
    pub const fn cost(&self) -> u64 {
        self.params.n()
    }

    #[must_use]
    pub const fn block_size(&self) -> u32 {
        self.params.r()
    }

    #[must_use]
    pub const fn parallelization(&self) -> u32 {
        self.params.p()
    }

    #[must_use]
    pub const fn lanes(&self) -> Lanes {
        self.lanes
    }

    /// Swaps both the salt and the cost parameters, keeping the password.
    #[must_use]
    pub fn reconfigure(mut self, salt: &[u8], params: Params) -> Self {
        self.salt.erase();
        self.salt.extend_from_slice(salt);
        self.params = params;
        self.reconfigured()
    }

    /// Returns a stream over `salt` with the same password and parameters.
    #[must_use]
    pub fn with_salt(self, salt: &[u8]) -> Self {
        let params = self.params;
        self.reconfigure(salt, params)
    }

    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self.reconfigured()
    }

    pub fn with_cost(self, n: u64) -> Result<Self, Error> {
        let params = Params::from_cost(n, self.params.r(), self.params.p())?;
        Ok(self.with_params(params))
    }

    pub fn with_block_size(self, r: u32) -> Result<Self, Error> {
        let params = Params::new(self.params.log_n(), r, self.params.p())?;
        Ok(self.with_params(params))
    }

    pub fn with_parallelization(self, p: u32) -> Result<Self, Error> {
        let params = Params::new(self.params.log_n(), self.params.r(), p)?;
        Ok(self.with_params(params))
    }

    /// Lane scheduling does not change the output, so buffered state is kept.
    #[must_use]
    pub const fn with_lanes(mut self, lanes: Lanes) -> Self {
        self.lanes = lanes;
        self
    }

    fn reconfigured(mut self) -> Self {
        self.reset();
        self
    }

    /// Where the stream would be after serving `len` more bytes, if that is
    /// still inside one PBKDF2 output.
    fn end_of_request(&self, len: usize) -> Result<u64, Error> {
        if len == 0 {
            return Err(Error::InvalidLength);
        }
        match u64::try_from(len).ok().and_then(|n| self.served.checked_add(n)) {
            Some(end) if end <= max_output_len::<M>() => Ok(end),
            _ => Err(scrypt::Error::InvalidArgument("output length").into()),
        }
    }

    fn cached(&self) -> &[u8] {
        &self.leftover[self.cursor..]
    }

    fn refill(&mut self, out: &mut [u8]) -> Result<(), Error> {
        let mut keystream = match self.keystream.take() {
            Some(keystream) => keystream,
            None => {
                trace!("no keystream yet, running scrypt");
                scrypt::keystream(&self.password, &self.salt, &self.params, self.lanes)?
            }
        };
        let res = self.read_blocks(&mut keystream, out);
        self.keystream = Some(keystream);
        res
    }

    /// Reads whole blocks from the keystream, caching whatever `out` has no
    /// room for. Replaces the previous cache, which must have been used up.
    fn read_blocks(&mut self, keystream: &mut Pbkdf2<M>, out: &mut [u8]) -> Result<(), Error> {
        let block = M::output_size();
        let whole = out.len() - out.len() % block;
        keystream.fill(&mut out[..whole])?;
        self.leftover.erase();
        self.cursor = 0;
        if whole < out.len() {
            self.leftover.resize(block, 0);
            keystream.fill(&mut self.leftover)?;
            let rest = out.len() - whole;
            out[whole..].copy_from_slice(&self.leftover[..rest]);
            self.cursor = rest;
            trace!("caching {} bytes", block - rest);
        }
        Ok(())
    }
}

impl<M: Prf> DeriveBytes for DerivedKeyStream<M> {
    fn fill_bytes(&mut self, out: &mut [u8]) -> Result<(), Error> {
        let end = self.end_of_request(out.len())?;
        let from_cache = self.cached().len().min(out.len());
        let (head, tail) = out.split_at_mut(from_cache);
        head.copy_from_slice(&self.cached()[..from_cache]);
        if tail.is_empty() {
            self.cursor += from_cache;
        } else {
            // the cache is only marked as consumed once the rest was derived
            self.refill(tail)?;
        }
        self.served = end;
        Ok(())
    }

    fn get_bytes(&mut self, n: usize) -> Result<Vec<u8>, Error> {
        self.end_of_request(n)?;
        let mut out = try_alloc::<u8>(n)?;
        self.fill_bytes(&mut out)?;
        Ok(out)
    }

    fn reset(&mut self) {
        trace!("resetting derived key stream");
        self.keystream = None;
        self.leftover.erase();
        self.cursor = 0;
        self.served = 0;
    }
}

impl<M: Prf> Drop for DerivedKeyStream<M> {
    fn drop(&mut self) {
        self.password.erase();
        self.leftover.erase();
    }
}
