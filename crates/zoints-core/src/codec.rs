//! Fixed-layout binary codec.
//!
//! Every record is the concatenation of its fields in declared order, all
//! little-endian with no padding and no length prefixes. Each record type
//! states its byte length as [`AccountLayout::LEN`] and reads/writes its own
//! fields. Decoding checks the buffer length before reading anything, so the
//! underlying [`Buf`] reads never run past the end.

use bytes::{Buf, BufMut};

use crate::address::{ADDRESS_LEN, Address};
use crate::error::DecodeError;
use crate::time::UnixTimestamp;

/// A record with a fixed binary layout.
pub trait AccountLayout: Sized {
    /// Encoded length in bytes.
    const LEN: usize;

    /// Append the encoded fields to `buf`. Writes exactly [`Self::LEN`] bytes.
    fn write(&self, buf: &mut impl BufMut);

    /// Read the fields from `buf`.
    ///
    /// Callers guarantee at least [`Self::LEN`] bytes remain.
    fn read(buf: &mut impl Buf) -> Result<Self, DecodeError>;

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::LEN);
        self.write(&mut out);
        out
    }

    /// Strict decode: `data` must be exactly [`Self::LEN`] bytes.
    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        ensure_len(Self::LEN, data.len())?;
        if data.len() > Self::LEN {
            return Err(DecodeError::TrailingBytes {
                expected: Self::LEN,
                actual: data.len(),
            });
        }
        Self::read(&mut &data[..])
    }

    /// Lenient decode from the head of `data`, ignoring anything after the
    /// layout. Account data is often allocated with slack.
    fn decode_prefix(data: &[u8]) -> Result<Self, DecodeError> {
        ensure_len(Self::LEN, data.len())?;
        Self::read(&mut &data[..Self::LEN])
    }
}

/// Fail with [`DecodeError::Truncated`] if `actual < expected`.
pub fn ensure_len(expected: usize, actual: usize) -> Result<(), DecodeError> {
    if actual < expected {
        return Err(DecodeError::Truncated { expected, actual });
    }
    Ok(())
}

pub fn put_address(buf: &mut impl BufMut, address: &Address) {
    buf.put_slice(address.as_bytes());
}

pub fn get_address(buf: &mut impl Buf) -> Address {
    let mut bytes = [0u8; ADDRESS_LEN];
    buf.copy_to_slice(&mut bytes);
    Address(bytes)
}

pub fn put_timestamp(buf: &mut impl BufMut, ts: UnixTimestamp) {
    buf.put_u64_le(ts.as_secs());
}

pub fn get_timestamp(buf: &mut impl Buf) -> UnixTimestamp {
    UnixTimestamp(buf.get_u64_le())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Pair {
        owner: Address,
        amount: u64,
    }

    impl AccountLayout for Pair {
        const LEN: usize = 40;

        fn write(&self, buf: &mut impl BufMut) {
            put_address(buf, &self.owner);
            buf.put_u64_le(self.amount);
        }

        fn read(buf: &mut impl Buf) -> Result<Self, DecodeError> {
            Ok(Self {
                owner: get_address(buf),
                amount: buf.get_u64_le(),
            })
        }
    }

    fn sample() -> Pair {
        Pair {
            owner: Address([7u8; 32]),
            amount: 0x0102_0304_0506_0708,
        }
    }

    #[test]
    fn encode_is_little_endian() {
        let bytes = sample().encode();
        assert_eq!(bytes.len(), Pair::LEN);
        assert_eq!(&bytes[32..], &[8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn decode_roundtrip() {
        assert_eq!(Pair::decode(&sample().encode()).unwrap(), sample());
    }

    #[test]
    fn short_buffer_is_truncated() {
        let bytes = sample().encode();
        assert_eq!(
            Pair::decode(&bytes[..39]),
            Err(DecodeError::Truncated { expected: 40, actual: 39 })
        );
        assert_eq!(
            Pair::decode_prefix(&[]),
            Err(DecodeError::Truncated { expected: 40, actual: 0 })
        );
    }

    #[test]
    fn strict_decode_rejects_trailing() {
        let mut bytes = sample().encode();
        bytes.push(0);
        assert_eq!(
            Pair::decode(&bytes),
            Err(DecodeError::TrailingBytes { expected: 40, actual: 41 })
        );
    }

    #[test]
    fn prefix_decode_ignores_slack() {
        let mut bytes = sample().encode();
        bytes.extend_from_slice(&[0xff; 24]);
        assert_eq!(Pair::decode_prefix(&bytes).unwrap(), sample());
    }

    #[test]
    fn timestamp_helpers() {
        let mut buf = Vec::new();
        put_timestamp(&mut buf, UnixTimestamp(0x6110_d6ce));
        assert_eq!(buf, [0xce, 0xd6, 0x10, 0x61, 0, 0, 0, 0]);
        assert_eq!(get_timestamp(&mut &buf[..]), UnixTimestamp(0x6110_d6ce));
    }
}
