use std::fmt::{Debug, Display};

pub enum Error {
    InvalidField(&'static str),
    InvalidLength,
    MissingField(&'static str),
    Rng(rand_core::Error),
    Scrypt(scrypt::Error),
    Toml(toml::de::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidField(field) => write!(f, "invalid value for config field `{field}`"),
            Self::InvalidLength => f.write_str("at least one byte must be requested"),
            Self::MissingField(field) => write!(f, "missing required config field `{field}`"),
            Self::Rng(e) => write!(f, "could not generate a random salt: {e}"),
            Self::Scrypt(e) => Display::fmt(e, f),
            Self::Toml(e) => write!(f, "could not parse TOML config: {e}"),
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {}

impl From<scrypt::Error> for Error {
    fn from(value: scrypt::Error) -> Self {
        Self::Scrypt(value)
    }
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Self::Toml(value)
    }
}

impl From<rand_core::Error> for Error {
    fn from(value: rand_core::Error) -> Self {
        Self::Rng(value)
    }
}

/// The step of setting up a derivation an error came out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Salt,
    Derive,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Config => "invalid derivation config",
            Self::Salt => "could not salt the derivation",
            Self::Derive => "could not derive key bytes",
        })
    }
}

pub struct Context {
    error: Error,
    stage: Stage,
}

impl Context {
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub const fn error(&self) -> &Error {
        &self.error
    }

    #[must_use]
    pub fn into_error(self) -> Error {
        self.error
    }
}

impl Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.stage, self.error)
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self, f)
    }
}

impl std::error::Error for Context {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub trait ResultExt<T> {
    fn during(self, stage: Stage) -> Result<T, Context>;
}

impl<T, E: Into<Error>> ResultExt<T> for Result<T, E> {
    fn during(self, stage: Stage) -> Result<T, Context> {
        self.map_err(|e| Context {
            error: e.into(),
            stage,
        })
    }
}
