struct Hex<'a> {
    inner: core::slice::Iter<'a, u8>,
    next: Option<u8>,
}

impl Hex<'_> {
    const TABLE: &'static [u8; 16] = b"0123456789abcdef";
}

impl Iterator for Hex<'_> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next.take() {
            Some(c) => Some(c as char),
            None => self.inner.next().map(|b| {
                let current = Self::TABLE[(b >> 4) as usize];
                self.next = Some(Self::TABLE[(b & 0xf) as usize]);
                current as char
            }),
        }
    }
}

pub fn hex(inp: &[u8]) -> String {
    Hex {
        inner: inp.iter(),
        next: None,
    }
    .collect()
}

pub fn from_hex(s: &str) -> Option<Vec<u8>> {
    const fn decode_char(b: u8) -> Option<u8> {
        match b {
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            b'0'..=b'9' => Some(b - b'0'),
            _ => None,
        }
    }
    let bytes = s.as_bytes();
    if bytes.len() % 2 != 0 {
        return None;
    }
    bytes
        .chunks_exact(2)
        .map(|pair| Some(decode_char(pair[0])? << 4 | decode_char(pair[1])?))
        .collect()
}
