//! Wire primitives shared by every scheme.
//!
//! ```text
//! protocol code:   +-------------------+
//!                  | u32 (BE), 4 bytes |
//!                  +-------------------+
//!
//! big integer:     +-------------------+--------------------------+
//!                  | len u32 (BE)      | magnitude, big-endian    |
//!                  +-------------------+--------------------------+
//! ```
//!
//! Big integers are minimal: zero travels as an empty field.

use num_bigint::BigUint;
use num_traits::Zero;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::error::{truncated, FrameError, TransportResult};
use crate::core::{ByteStream, BIGINT_LENGTH_PREFIX_SIZE, MAX_BIGINT_FIELD_SIZE, META_BYTE_SIZE, PROTOCOL_CODE_SIZE};

/// Write the connection preamble.
pub async fn write_protocol_code<S: ByteStream>(stream: &mut S, code: u32) -> TransportResult<()> {
    stream.write_all(&code.to_be_bytes()).await?;
    Ok(())
}

/// Read the connection preamble.
pub async fn read_protocol_code<S: ByteStream>(stream: &mut S) -> TransportResult<u32> {
    let mut buf = [0u8; PROTOCOL_CODE_SIZE];
    stream
        .read_exact(&mut buf)
        .await
        .map_err(truncated("protocol code"))?;
    Ok(u32::from_be_bytes(buf))
}

/// Write one length-prefixed big integer.
pub async fn write_biguint<S: ByteStream>(stream: &mut S, value: &BigUint) -> TransportResult<()> {
    let bytes = if value.is_zero() {
        Vec::new()
    } else {
        value.to_bytes_be()
    };
    if bytes.len() > MAX_BIGINT_FIELD_SIZE {
        return Err(FrameError::FieldTooLarge(bytes.len()).into());
    }
    stream.write_all(&(bytes.len() as u32).to_be_bytes()).await?;
    stream.write_all(&bytes).await?;
    Ok(())
}

/// Read one length-prefixed big integer.
pub async fn read_biguint<S: ByteStream>(stream: &mut S) -> TransportResult<BigUint> {
    let mut len_buf = [0u8; BIGINT_LENGTH_PREFIX_SIZE];
    stream
        .read_exact(&mut len_buf)
        .await
        .map_err(truncated("length prefix"))?;
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_BIGINT_FIELD_SIZE {
        return Err(FrameError::FieldTooLarge(len).into());
    }

    let mut bytes = vec![0u8; len];
    stream
        .read_exact(&mut bytes)
        .await
        .map_err(truncated("big-integer field"))?;
    Ok(BigUint::from_bytes_be(&bytes))
}

/// Read the meta byte of the next block.
///
/// Returns `Ok(None)` when the peer closed the stream at a block boundary.
pub async fn read_meta_byte<S: ByteStream>(stream: &mut S) -> TransportResult<Option<u8>> {
    let mut buf = [0u8; META_BYTE_SIZE];
    match stream.read(&mut buf).await? {
        0 => Ok(None),
        _ => Ok(Some(buf[0])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;

    #[tokio::test]
    async fn test_protocol_code_wire_format() {
        let (mut a, mut b) = tokio::io::duplex(64);
        write_protocol_code(&mut a, 2).await.unwrap();
        drop(a);

        let mut raw = Vec::new();
        b.read_to_end(&mut raw).await.unwrap();
        assert_eq!(raw, hex::decode("00000002").unwrap());
    }

    #[tokio::test]
    async fn test_biguint_wire_format() {
        let (mut a, mut b) = tokio::io::duplex(64);
        write_biguint(&mut a, &BigUint::from(0x0102_03u32)).await.unwrap();
        write_biguint(&mut a, &BigUint::zero()).await.unwrap();
        drop(a);

        let mut raw = Vec::new();
        b.read_to_end(&mut raw).await.unwrap();
        assert_eq!(raw, hex::decode("0000000301020300000000").unwrap());
    }

    #[tokio::test]
    async fn test_biguint_read_back() {
        let (mut a, mut b) = tokio::io::duplex(1024);
        let value = BigUint::from(u64::MAX) * BigUint::from(u64::MAX);
        write_biguint(&mut a, &value).await.unwrap();
        write_biguint(&mut a, &BigUint::zero()).await.unwrap();

        assert_eq!(read_biguint(&mut b).await.unwrap(), value);
        assert!(read_biguint(&mut b).await.unwrap().is_zero());
    }

    #[tokio::test]
    async fn test_oversized_field_rejected() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&u32::MAX.to_be_bytes()).await.unwrap();

        let err = read_biguint(&mut b).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Frame(FrameError::FieldTooLarge(len)) if len == u32::MAX as usize
        ));
    }

    #[tokio::test]
    async fn test_truncated_field() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&hex::decode("0000000401").unwrap()).await.unwrap();
        drop(a);

        let err = read_biguint(&mut b).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Frame(FrameError::Truncated("big-integer field"))
        ));
    }

    #[tokio::test]
    async fn test_meta_byte_eof_is_clean() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(&[3]).await.unwrap();
        drop(a);

        assert_eq!(read_meta_byte(&mut b).await.unwrap(), Some(3));
        assert_eq!(read_meta_byte(&mut b).await.unwrap(), None);
    }
}
