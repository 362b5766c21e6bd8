//! Resumable scrypt key derivation.
//!
//! A [`DerivedKeyStream`] holds a password, a salt and scrypt cost parameters
//! and hands out the derived key in as many pieces as the caller likes:
//!
//! ```no_run
//! use keystream::{Config, DeriveBytes, DerivedKeyStream};
//!
//! let config = Config::new("correct horse battery staple").salt(*b"NaCl");
//! let mut stream = DerivedKeyStream::new(&config)?;
//! let encryption_key = stream.get_bytes(32)?;
//! let mac_key = stream.get_bytes(32)?;
//! # Ok::<(), keystream::Error>(())
//! ```
//!
//! The bytes read are the same as one scrypt call with the combined length.
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
    clippy::nursery,
    clippy::unwrap_used
)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod config;
mod error;
mod stream;
mod util;

pub use config::{Config, Salt, TomlConfig, DEFAULT_SALT_LEN};
pub use error::{Context, Error, ResultExt, Stage};
pub use scrypt::{Lanes, Params};
pub use stream::{DeriveBytes, DerivedKeyStream};

/// Reads a TOML config and builds a stream from it, salting from the OS RNG
/// if the config asks for a random salt.
pub fn from_toml(s: &str) -> Result<DerivedKeyStream, Context> {
    let config = Config::from_toml(s).during(Stage::Config)?;
    DerivedKeyStream::new(&config).during(Stage::Salt)
}

/// The first `len` bytes derived from a TOML config.
pub fn derive_from_toml(s: &str, len: usize) -> Result<Vec<u8>, Context> {
    from_toml(s)?.get_bytes(len).during(Stage::Derive)
}
