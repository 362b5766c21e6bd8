use crate::Error;
use hmac::{
    digest::{KeyInit, Output, OutputSizeUser},
    Mac,
};

pub type HmacSha256 = hmac::Hmac<sha2::Sha256>;

// keyed once per password, then cloned for every PRF call
pub trait Prf: Clone {
    type Output: AsRef<[u8]>;

    fn new_from_slice(key: &[u8]) -> Result<Self, Error>;

    fn update(&mut self, input: &[u8]);

    #[must_use]
    fn finalize_fixed(self) -> Self::Output;

    fn output_size() -> usize;
}

impl<M: Mac + KeyInit + Clone> Prf for M {
    type Output = Output<M>;

    #[inline]
    fn new_from_slice(key: &[u8]) -> Result<Self, Error> {
        <M as KeyInit>::new_from_slice(key).map_err(|_| Error::InvalidArgument("prf key length"))
    }

    #[inline]
    fn update(&mut self, input: &[u8]) {
        Mac::update(self, input);
    }

    #[inline]
    fn finalize_fixed(self) -> Self::Output {
        Mac::finalize(self).into_bytes()
    }

    #[inline]
    fn output_size() -> usize {
        <M as OutputSizeUser>::output_size()
    }
}
