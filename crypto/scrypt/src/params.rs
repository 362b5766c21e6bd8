use crate::Error;

/// Validated scrypt cost parameters, with `N = 2^log_n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub(crate) log_n: u8,
    pub(crate) r: u32,
    pub(crate) p: u32,
}

impl Params {
    pub const RECOMMENDED_LOG_N: u8 = 14;
    pub const RECOMMENDED_R: u32 = 8;
    pub const RECOMMENDED_P: u32 = 1;

    /// Checks the RFC 7914 bounds and that every buffer the derivation needs
    /// is addressable:
    ///
    /// - `1 <= log_n < 16 * r`, i.e. `1 < N < 2^(128 * r / 8)`
    /// - `r >= 1`
    /// - `1 <= p <= ((2^32 - 1) * 32) / (128 * r)`
    pub fn new(log_n: u8, r: u32, p: u32) -> Result<Self, Error> {
        if log_n == 0 {
            return Err(Error::InvalidArgument("cost"));
        }
        if r == 0 {
            return Err(Error::InvalidArgument("block size"));
        }
        if p == 0 {
            return Err(Error::InvalidArgument("parallelization"));
        }
        if u64::from(log_n) >= u64::from(r) * 16 {
            return Err(Error::InvalidArgument("cost"));
        }
        let expand_len = u128::from(p) * 128 * u128::from(r);
        if expand_len > u128::from(u32::MAX) * 32 {
            return Err(Error::InvalidArgument("parallelization"));
        }
        if u32::from(log_n) >= usize::BITS {
            return Err(Error::ResourceExhausted { bytes: usize::MAX });
        }
        let r128 = (r as usize)
            .checked_mul(128)
            .ok_or(Error::ResourceExhausted { bytes: usize::MAX })?;
        r128.checked_mul(p as usize)
            .ok_or(Error::ResourceExhausted { bytes: usize::MAX })?;
        r128.checked_mul(1 << log_n)
            .ok_or(Error::ResourceExhausted { bytes: usize::MAX })?;
        Ok(Self { log_n, r, p })
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn from_cost(n: u64, r: u32, p: u32) -> Result<Self, Error> {
        if n <= 1 || !n.is_power_of_two() {
            return Err(Error::InvalidArgument("cost"));
        }
        Self::new(n.trailing_zeros() as u8, r, p)
    }

    #[must_use]
    pub const fn recommended() -> Self {
        Self {
            log_n: Self::RECOMMENDED_LOG_N,
            r: Self::RECOMMENDED_R,
            p: Self::RECOMMENDED_P,
        }
    }

    #[must_use]
    pub const fn log_n(&self) -> u8 {
        self.log_n
    }

    #[must_use]
    pub const fn n(&self) -> u64 {
        1 << self.log_n
    }

    #[must_use]
    pub const fn r(&self) -> u32 {
        self.r
    }

    #[must_use]
    pub const fn p(&self) -> u32 {
        self.p
    }

    #[must_use]
    pub const fn block_len(&self) -> usize {
        self.r as usize * 128
    }

    #[must_use]
    pub const fn expand_len(&self) -> usize {
        self.p as usize * self.block_len()
    }

    // per lane
    #[must_use]
    pub const fn memory_cost(&self) -> usize {
        (1 << self.log_n) * self.block_len()
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::recommended()
    }
}
