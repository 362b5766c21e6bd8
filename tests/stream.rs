#![allow(clippy::unwrap_used)]

use keystream::{Config, DeriveBytes, DerivedKeyStream, Error, Lanes, Params};
use rand_core::{CryptoRng, RngCore};

// RFC 7914, section 12
const VECTOR_1: &str = "77d6576238657b203b19ca42c18a0497f16b4844e3074ae8dfdffa3fede21442\
                        fcd0069ded0948f8326a753a0fc81f17e8d3e0fb2e0d3628cf35e20c38d18906";
const VECTOR_2: &str = "fdbabe1c9d3472007856e7190d01e9fe7c6ad7cbc8237830e77376634b373162\
                        2eaf30d92e22a3886ff109279d9830dac727afb94a83ee6d8360cbdfa2cc0640";
const VECTOR_3: &str = "7023bdcb3afd7348461c06cd81fd38ebfda8fbba904f8e3ea9b543f6545da1f2\
                        d5432955613f0fcf62d49705242a9af9e61e85dc0d651e40dfcf017b45575887";

// the PRF parameter is left to its default
type Stream = DerivedKeyStream;

fn small() -> Params {
    Params::from_cost(16, 1, 1).unwrap()
}

fn empty_stream() -> DerivedKeyStream {
    Stream::from_parts(b"", b"", small())
}

fn read(stream: &mut impl DeriveBytes, lens: &[usize]) -> String {
    lens.iter()
        .map(|&n| hex::encode(stream.get_bytes(n).unwrap()))
        .collect()
}

/// Counts up from a seed; predictable, for tests only.
struct CountingRng(u8);

impl RngCore for CountingRng {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0; 4];
        self.fill_bytes(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0; 8];
        self.fill_bytes(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for b in dest {
            *b = self.0;
            self.0 = self.0.wrapping_add(1);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for CountingRng {}

#[test]
fn rfc7914_vectors() {
    assert_eq!(read(&mut empty_stream(), &[64]), VECTOR_1);
    let mut stream = Stream::from_parts(
        b"password",
        b"NaCl",
        Params::from_cost(1024, 8, 16).unwrap(),
    )
    .with_lanes(Lanes::Threaded);
    assert_eq!(read(&mut stream, &[64]), VECTOR_2);
    let config = Config::new("pleaseletmein").salt("SodiumChloride");
    let mut stream = DerivedKeyStream::new(&config).unwrap();
    assert_eq!(stream.cost(), 16384);
    assert_eq!(stream.block_size(), 8);
    assert_eq!(stream.parallelization(), 1);
    assert_eq!(read(&mut stream, &[64]), VECTOR_3);
}

#[test]
fn split_reads_match_one_read() {
    for lens in [
        &[1, 63][..],
        &[32, 32],
        &[31, 2, 31],
        &[5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 4],
        &[33, 31],
    ] {
        assert_eq!(read(&mut empty_stream(), lens), VECTOR_1, "{lens:?}");
    }
    let mut stream = empty_stream();
    let long = read(&mut stream, &[200]);
    assert_eq!(read(&mut empty_stream(), &[7, 100, 93]), long);
}

#[test]
fn fill_bytes_matches_get_bytes() {
    let mut stream = empty_stream();
    let mut a = [0; 10];
    let mut b = [0; 54];
    stream.fill_bytes(&mut a).unwrap();
    stream.fill_bytes(&mut b).unwrap();
    assert_eq!(hex::encode(a) + &hex::encode(b), VECTOR_1);
}

#[test]
fn reset_starts_over() {
    let mut stream = empty_stream();
    let first = read(&mut stream, &[20]);
    stream.reset();
    assert_eq!(read(&mut stream, &[20]), first);
    assert_eq!(first, VECTOR_1[..40]);
}

#[test]
fn reconfiguring_discards_cached_bytes() {
    let mut stream = empty_stream();
    let _ = read(&mut stream, &[5]);

    let mut stream = stream.with_salt(b"NaCl");
    let mut fresh = Stream::from_parts(b"", b"NaCl", small());
    assert_eq!(read(&mut stream, &[20]), read(&mut fresh, &[20]));
    assert_eq!(stream.salt(), b"NaCl");

    let mut stream = stream.with_cost(32).unwrap();
    let mut fresh =
        Stream::from_parts(b"", b"NaCl", Params::from_cost(32, 1, 1).unwrap());
    assert_eq!(read(&mut stream, &[20]), read(&mut fresh, &[20]));

    let mut stream = stream.with_block_size(2).unwrap();
    let mut fresh =
        Stream::from_parts(b"", b"NaCl", Params::from_cost(32, 2, 1).unwrap());
    assert_eq!(read(&mut stream, &[20]), read(&mut fresh, &[20]));

    let mut stream = stream.with_parallelization(3).unwrap();
    let mut fresh =
        Stream::from_parts(b"", b"NaCl", Params::from_cost(32, 2, 3).unwrap());
    assert_eq!(read(&mut stream, &[20]), read(&mut fresh, &[20]));

    let mut stream = stream.with_params(small()).with_salt(b"");
    assert_eq!(read(&mut stream, &[64]), VECTOR_1);

    let _ = read(&mut stream, &[3]);
    let mut stream = stream.reconfigure(b"NaCl", Params::from_cost(32, 2, 3).unwrap());
    assert_eq!(stream.cost(), 32);
    fresh.reset();
    assert_eq!(read(&mut stream, &[20]), read(&mut fresh, &[20]));
}

#[test]
fn lanes_do_not_change_output() {
    let params = Params::from_cost(16, 1, 4).unwrap();
    let mut seq = Stream::from_parts(b"pw", b"salt", params);
    let mut par = Stream::from_parts(b"pw", b"salt", params).with_lanes(Lanes::Threaded);
    assert_eq!(read(&mut seq, &[3, 50]), read(&mut par, &[53]));
    assert_eq!(par.lanes(), Lanes::Threaded);
}

#[test]
fn zero_length_reads_rejected() {
    let mut stream = empty_stream();
    assert!(matches!(stream.get_bytes(0), Err(Error::InvalidLength)));
    assert!(matches!(stream.fill_bytes(&mut []), Err(Error::InvalidLength)));
    // nothing was consumed
    assert_eq!(read(&mut stream, &[64]), VECTOR_1);
}

#[test]
fn invalid_parameters_rejected() {
    for n in [0, 1, 12345] {
        assert!(matches!(
            empty_stream().with_cost(n),
            Err(Error::Scrypt(scrypt::Error::InvalidArgument("cost")))
        ));
    }
    assert!(matches!(
        empty_stream().with_block_size(0),
        Err(Error::Scrypt(scrypt::Error::InvalidArgument("block size")))
    ));
    assert!(matches!(
        empty_stream().with_parallelization(0),
        Err(Error::Scrypt(scrypt::Error::InvalidArgument("parallelization")))
    ));
    assert!(matches!(
        Config::from_toml("password = \"\"\nparallelization = -1"),
        Err(Error::InvalidField("parallelization"))
    ));
}

#[test]
fn random_salt_comes_from_rng() {
    let config = Config::new("pw").params(small()).random_salt(4);
    let mut stream =
        Stream::new_with_rng(&config, &mut CountingRng(7)).unwrap();
    assert_eq!(stream.salt(), [7, 8, 9, 10]);
    let mut same = Stream::from_parts(b"pw", &[7, 8, 9, 10], small());
    assert_eq!(read(&mut stream, &[16]), read(&mut same, &[16]));

    let os = DerivedKeyStream::new(&Config::new("pw").params(small())).unwrap();
    assert_eq!(os.salt().len(), keystream::DEFAULT_SALT_LEN);
}

#[test]
fn debug_hides_password() {
    let stream = Stream::from_parts(b"hunter2", b"\x01\x02", small());
    let debug = format!("{stream:?}");
    assert!(debug.contains("0102"));
    assert!(!debug.contains("hunter2"));
    let config = Config::new("hunter2");
    assert!(!format!("{config:?}").contains("hunter2"));
}

#[test]
fn oversized_requests_fail_before_deriving() {
    let mut stream = empty_stream();
    assert!(stream.get_bytes(usize::MAX).is_err());

    let max = scrypt::max_output_len::<scrypt::HmacSha256>();
    let head = read(&mut stream, &[5]);
    if let Ok(rest) = usize::try_from(max - 4) {
        // one byte past the last PBKDF2 block
        assert!(matches!(
            stream.get_bytes(rest),
            Err(Error::Scrypt(scrypt::Error::InvalidArgument("output length")))
        ));
        assert!(matches!(
            stream.get_bytes(usize::MAX),
            Err(Error::Scrypt(scrypt::Error::InvalidArgument("output length")))
        ));
    }
    // the rejected requests consumed nothing
    assert_eq!(head + &read(&mut stream, &[59]), VECTOR_1);
}

#[cfg(target_pointer_width = "64")]
#[test]
fn unallocatable_scratch_table_is_reported() {
    // N = 2^40, r = 8: a 1 PiB scratch table
    let huge = Params::new(40, 8, 1).unwrap();
    assert_eq!(huge.memory_cost(), 1 << 50);
    let mut stream = Stream::from_parts(b"", b"", huge);
    for _ in 0..2 {
        assert!(matches!(
            stream.get_bytes(32),
            Err(Error::Scrypt(scrypt::Error::ResourceExhausted { .. }))
        ));
    }
    let mut stream = stream.with_params(small());
    assert_eq!(read(&mut stream, &[64]), VECTOR_1);
}
