use core::fmt::{Debug, Display};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A parameter or requested length is outside the range scrypt accepts.
    /// Carries the name of the offending argument.
    InvalidArgument(&'static str),
    /// Working memory for the derivation could not be reserved.
    ResourceExhausted { bytes: usize },
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidArgument(what) => write!(f, "invalid argument: {what}"),
            Self::ResourceExhausted { bytes } => {
                write!(f, "could not allocate {bytes} bytes of working memory")
            }
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {}
