use crate::{error::Error, util::from_hex};
use crypto_common::erase::Erase;
use scrypt::{Lanes, Params};

pub const DEFAULT_SALT_LEN: usize = 32;

/// Where the salt of a derivation comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum Salt {
    Bytes(Vec<u8>),
    /// Generate this many bytes from the RNG when the stream is created.
    Random(usize),
}

impl Default for Salt {
    fn default() -> Self {
        Self::Random(DEFAULT_SALT_LEN)
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bytes(b) => f.debug_tuple("Bytes").field(&crate::util::hex(b)).finish(),
            Self::Random(len) => f.debug_tuple("Random").field(len).finish(),
        }
    }
}

/// Everything a [`DerivedKeyStream`](crate::DerivedKeyStream) is built from.
///
/// Cost parameters are validated as they are set, so a `Config` always holds
/// a usable [`Params`].
pub struct Config {
    password: Vec<u8>,
    salt: Salt,
    params: Params,
    lanes: Lanes,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("salt", &self.salt)
            .field("params", &self.params)
            .field("lanes", &self.lanes)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// A config with a random salt and N = 16384, r = 8, p = 1.
    pub fn new(password: impl Into<Vec<u8>>) -> Self {
        Self {
            password: password.into(),
            salt: Salt::default(),
            params: Params::recommended(),
            lanes: Lanes::Sequential,
        }
    }

    #[must_use]
    pub fn salt(mut self, salt: impl Into<Vec<u8>>) -> Self {
        self.salt = Salt::Bytes(salt.into());
        self
    }

    #[must_use]
    pub fn random_salt(mut self, len: usize) -> Self {
        self.salt = Salt::Random(len);
        self
    }

    #[must_use]
    pub const fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn cost(mut self, n: u64) -> Result<Self, Error> {
        self.params = Params::from_cost(n, self.params.r(), self.params.p())?;
        Ok(self)
    }

    pub fn block_size(mut self, r: u32) -> Result<Self, Error> {
        self.params = Params::new(self.params.log_n(), r, self.params.p())?;
        Ok(self)
    }

    pub fn parallelization(mut self, p: u32) -> Result<Self, Error> {
        self.params = Params::new(self.params.log_n(), self.params.r(), p)?;
        Ok(self)
    }

    #[must_use]
    pub const fn lanes(mut self, lanes: Lanes) -> Self {
        self.lanes = lanes;
        self
    }

    pub(crate) fn password(&self) -> &[u8] {
        &self.password
    }

    #[must_use]
    pub const fn salt_source(&self) -> &Salt {
        &self.salt
    }

    #[must_use]
    pub const fn scrypt_params(&self) -> Params {
        self.params
    }

    #[must_use]
    pub const fn lane_mode(&self) -> Lanes {
        self.lanes
    }

    /// Builds a config from a TOML document.
    ///
    /// ```toml
    /// password = "pleaseletmein"      # or password_hex = "..."
    /// salt_hex = "536f6469756d"       # or salt_len = 32
    /// cost = 16384
    /// block_size = 8
    /// parallelization = 1
    /// threads = false
    /// ```
    pub fn from_toml(s: &str) -> Result<Self, Error> {
        let table = toml::from_str::<toml::value::Table>(s)?;
        TomlConfig::new(table).into_config()
    }
}

impl Drop for Config {
    fn drop(&mut self) {
        self.password.erase();
    }
}

#[allow(clippy::module_name_repetitions)]
pub struct TomlConfig {
    table: toml::value::Table,
}

impl std::fmt::Debug for TomlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TomlConfig { ... }")
    }
}

impl TomlConfig {
    #[must_use]
    pub const fn new(table: toml::value::Table) -> Self {
        Self { table }
    }

    pub fn password(&self) -> Result<Vec<u8>, Error> {
        match (self.table.get("password"), self.table.get("password_hex")) {
            (Some(toml::Value::String(v)), None) => Ok(v.as_bytes().to_vec()),
            (None, Some(toml::Value::String(v))) => {
                from_hex(v).ok_or(Error::InvalidField("password_hex"))
            }
            (Some(_), None) => Err(Error::InvalidField("password")),
            (None, Some(_)) | (Some(_), Some(_)) => Err(Error::InvalidField("password_hex")),
            (None, None) => Err(Error::MissingField("password")),
        }
    }

    pub fn salt(&self) -> Result<Salt, Error> {
        match (self.table.get("salt_hex"), self.table.get("salt_len")) {
            (Some(toml::Value::String(v)), None) => from_hex(v)
                .map(Salt::Bytes)
                .ok_or(Error::InvalidField("salt_hex")),
            (None, Some(toml::Value::Integer(v))) => usize::try_from(*v)
                .ok()
                .filter(|&len| len > 0)
                .map(Salt::Random)
                .ok_or(Error::InvalidField("salt_len")),
            (Some(_), None) => Err(Error::InvalidField("salt_hex")),
            (None, Some(_)) | (Some(_), Some(_)) => Err(Error::InvalidField("salt_len")),
            (None, None) => Ok(Salt::default()),
        }
    }

    pub fn cost(&self) -> Result<u64, Error> {
        self.integer("cost", Params::recommended().n())
    }

    pub fn block_size(&self) -> Result<u32, Error> {
        self.integer("block_size", u64::from(Params::RECOMMENDED_R))
            .and_then(|v| u32::try_from(v).map_err(|_| Error::InvalidField("block_size")))
    }

    pub fn parallelization(&self) -> Result<u32, Error> {
        self.integer("parallelization", u64::from(Params::RECOMMENDED_P))
            .and_then(|v| u32::try_from(v).map_err(|_| Error::InvalidField("parallelization")))
    }

    pub fn lanes(&self) -> Result<Lanes, Error> {
        match self.table.get("threads") {
            Some(toml::Value::Boolean(true)) => Ok(Lanes::Threaded),
            Some(toml::Value::Boolean(false)) | None => Ok(Lanes::Sequential),
            Some(_) => Err(Error::InvalidField("threads")),
        }
    }

    /// Negative and non-integer values are rejected here; range checks on the
    /// value itself are left to [`Params`].
    fn integer(&self, field: &'static str, default: u64) -> Result<u64, Error> {
        match self.table.get(field) {
            Some(toml::Value::Integer(v)) => {
                u64::try_from(*v).map_err(|_| Error::InvalidField(field))
            }
            Some(_) => Err(Error::InvalidField(field)),
            None => Ok(default),
        }
    }

    pub fn into_config(self) -> Result<Config, Error> {
        let params =
            Params::from_cost(self.cost()?, self.block_size()?, self.parallelization()?)?;
        Ok(Config {
            password: self.password()?,
            salt: self.salt()?,
            params,
            lanes: self.lanes()?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{Config, Salt};
    use crate::Error;
    use scrypt::{Lanes, Params};

    #[test]
    fn defaults() {
        let config = Config::new("hunter2");
        assert_eq!(config.scrypt_params(), Params::recommended());
        assert_eq!(config.salt_source(), &Salt::Random(32));
        assert_eq!(config.lane_mode(), Lanes::Sequential);
        assert_eq!(config.password(), b"hunter2");
    }

    #[test]
    fn setters_validate() {
        for n in [0, 1, 12345] {
            assert!(matches!(
                Config::new("").cost(n),
                Err(Error::Scrypt(scrypt::Error::InvalidArgument("cost")))
            ));
        }
        assert!(matches!(
            Config::new("").block_size(0),
            Err(Error::Scrypt(scrypt::Error::InvalidArgument("block size")))
        ));
        assert!(matches!(
            Config::new("").parallelization(0),
            Err(Error::Scrypt(scrypt::Error::InvalidArgument("parallelization")))
        ));
        let config = Config::new("")
            .cost(1024)
            .and_then(|c| c.block_size(4))
            .and_then(|c| c.parallelization(2))
            .unwrap();
        assert_eq!(config.scrypt_params(), Params::new(10, 4, 2).unwrap());
    }

    #[test]
    fn from_toml() {
        let config = Config::from_toml(
            r#"
            password = "pleaseletmein"
            salt_hex = "536f6469756d43686c6f72696465"
            cost = 16
            block_size = 1
            parallelization = 2
            threads = true
            "#,
        )
        .unwrap();
        assert_eq!(config.password(), b"pleaseletmein");
        assert_eq!(config.salt_source(), &Salt::Bytes(b"SodiumChloride".to_vec()));
        assert_eq!(config.scrypt_params(), Params::new(4, 1, 2).unwrap());
        assert_eq!(config.lane_mode(), Lanes::Threaded);
    }

    #[test]
    fn toml_defaults_and_hex_password() {
        let config = Config::from_toml("password_hex = \"00ff\"\nsalt_len = 16").unwrap();
        assert_eq!(config.password(), [0x00, 0xff]);
        assert_eq!(config.salt_source(), &Salt::Random(16));
        assert_eq!(config.scrypt_params(), Params::recommended());
    }

    #[test]
    fn toml_rejects_bad_values() {
        let cases = [
            ("salt_len = 8", "password"),
            ("password = \"\"\ncost = -1", "cost"),
            ("password = \"\"\nblock_size = -1", "block_size"),
            ("password = \"\"\nparallelization = -1", "parallelization"),
            ("password = \"\"\nblock_size = 4294967296", "block_size"),
            ("password = \"\"\ncost = \"big\"", "cost"),
            ("password = \"\"\nsalt_hex = \"xyz\"", "salt_hex"),
            ("password = \"\"\nsalt_len = 0", "salt_len"),
            ("password = \"\"\nthreads = 1", "threads"),
            ("password = 1", "password"),
        ];
        for (doc, field) in cases {
            match Config::from_toml(doc) {
                Err(Error::InvalidField(f) | Error::MissingField(f)) => {
                    assert_eq!(f, field, "{doc}");
                }
                other => panic!("{doc}: unexpected {other:?}"),
            }
        }
        for n in [0, 1, 12345] {
            assert!(matches!(
                Config::from_toml(&format!("password = \"\"\ncost = {n}")),
                Err(Error::Scrypt(scrypt::Error::InvalidArgument("cost")))
            ));
        }
        assert!(matches!(Config::from_toml("password = "), Err(Error::Toml(_))));
    }
}
