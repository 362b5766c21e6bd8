#![deny(
    dead_code,
    deprecated,
    future_incompatible,
    missing_copy_implementations,
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unused,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::inline_always
)]

mod error;
mod lanes;
mod params;
pub mod pbkdf2;
mod prf;
mod romix;
mod salsa;
pub use error::Error;
pub use lanes::Lanes;
pub use params::Params;
pub use pbkdf2::{max_output_len, Pbkdf2};
pub use prf::{HmacSha256, Prf};
pub use romix::{block_mix, pack_le, ro_mix, unpack_le};
pub use salsa::salsa20_8;

use crypto_common::{constant_time::ConstantTimeEq, erase::Erase};
use log::debug;
use pbkdf2::{check_output_len, pbkdf2};

pub fn scrypt(
    password: &[u8],
    salt: &[u8],
    params: &Params,
    output: &mut [u8],
) -> Result<(), Error> {
    scrypt_with::<HmacSha256>(password, salt, params, Lanes::Sequential, output)
}

pub fn scrypt_with<M: Prf>(
    password: &[u8],
    salt: &[u8],
    params: &Params,
    lanes: Lanes,
    output: &mut [u8],
) -> Result<(), Error> {
    if output.is_empty() {
        return Err(Error::InvalidArgument("output length"));
    }
    check_output_len::<M>(output.len())?;
    keystream::<M>(password, salt, params, lanes)?.fill(output)
}

/// Runs the expensive part of scrypt (PBKDF2 expand and ROMix over every lane)
/// and returns the final PBKDF2 stage as an open-ended keystream.
///
/// The first `k` bytes read from it are exactly `scrypt(.., dkLen = k)`.
pub fn keystream<M: Prf>(
    password: &[u8],
    salt: &[u8],
    params: &Params,
    lanes: Lanes,
) -> Result<Pbkdf2<M>, Error> {
    debug!(
        "deriving: N = {}, r = {}, p = {}, {:?} lanes, {} bytes per lane",
        params.n(),
        params.r(),
        params.p(),
        lanes,
        params.memory_cost()
    );
    let mut b = try_alloc::<u8>(params.expand_len())?;
    let stream = pbkdf2::<M>(password, salt, 1, &mut b)
        .and_then(|()| lanes.mix(&mut b, params))
        .and_then(|()| Pbkdf2::new(password, &b, 1));
    b.erase();
    stream
}

pub fn verify(
    password: &[u8],
    salt: &[u8],
    params: &Params,
    expected: &[u8],
) -> Result<bool, Error> {
    let mut actual = try_alloc::<u8>(expected.len())?;
    let res = scrypt(password, salt, params, &mut actual)
        .map(|()| bool::from(actual[..].ct_eq(expected)));
    actual.erase();
    res
}

pub fn try_alloc<T: Copy + Default>(len: usize) -> Result<Vec<T>, Error> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| Error::ResourceExhausted {
        bytes: len.saturating_mul(core::mem::size_of::<T>()),
    })?;
    v.resize(len, T::default());
    Ok(v)
}
