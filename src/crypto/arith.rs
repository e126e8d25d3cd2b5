//! Big-integer helpers shared by the schemes.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::One;
use rand::{CryptoRng, RngCore};

use crate::core::{ConfigError, CryptoError};
use crate::transport::BlockSize;

/// Uniform integer in `[low, high)`.
///
/// Callers guarantee `low < high`.
pub fn random_in_range<R>(rng: &mut R, low: &BigUint, high: &BigUint) -> BigUint
where
    R: RngCore + CryptoRng + ?Sized,
{
    rng.gen_biguint_range(low, high)
}

/// Uniform exponent in `[2, modulus)` sharing no factor with `modulus`.
///
/// Callers guarantee `modulus >= 4`, so `modulus - 1` always qualifies.
pub fn random_coprime<R>(rng: &mut R, modulus: &BigUint) -> BigUint
where
    R: RngCore + CryptoRng + ?Sized,
{
    let two = BigUint::from(2u32);
    loop {
        let candidate = rng.gen_biguint_range(&two, modulus);
        if candidate.gcd(modulus).is_one() {
            return candidate;
        }
    }
}

/// Inverse of `value` modulo `modulus`.
pub fn mod_inverse(value: &BigUint, modulus: &BigUint) -> Result<BigUint, CryptoError> {
    if !value.gcd(modulus).is_one() {
        return Err(CryptoError::NotInvertible);
    }
    value.modinv(modulus).ok_or(CryptoError::NotInvertible)
}

/// Interpret a block as a big-endian integer.
pub fn block_to_int(block: &[u8]) -> BigUint {
    BigUint::from_bytes_be(block)
}

/// Write `value` right-aligned and zero-padded into `buf`.
///
/// Fails if `value` is wider than `buf`, which on the receiving side means
/// the peer encrypted under different parameters.
pub fn int_to_block(value: &BigUint, buf: &mut [u8]) -> Result<(), CryptoError> {
    let max_bits = buf.len() as u64 * 8;
    if value.bits() > max_bits {
        return Err(CryptoError::ValueTooLarge {
            bits: value.bits(),
            max_bits,
        });
    }

    let bytes = value.to_bytes_be();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    let bytes = &bytes[skip..];
    let offset = buf.len() - bytes.len();
    buf[..offset].fill(0);
    buf[offset..].copy_from_slice(bytes);
    Ok(())
}

/// Check that every block value is strictly below `modulus`.
pub fn check_modulus(block_size: BlockSize, modulus: &BigUint) -> Result<(), ConfigError> {
    if modulus.bits() <= block_size.bits() {
        return Err(ConfigError::BlockTooLargeForModulus {
            block_size: block_size.get(),
            needed_bits: block_size.bits(),
            modulus_bits: modulus.bits(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_mod_inverse() {
        let inv = mod_inverse(&BigUint::from(3u32), &BigUint::from(22u32)).unwrap();
        assert_eq!(inv, BigUint::from(15u32)); // 3 * 15 = 45 = 2 * 22 + 1

        assert_eq!(
            mod_inverse(&BigUint::from(4u32), &BigUint::from(22u32)),
            Err(CryptoError::NotInvertible)
        );
    }

    #[test]
    fn test_random_coprime() {
        let modulus = BigUint::from(22u32);
        for _ in 0..64 {
            let c = random_coprime(&mut OsRng, &modulus);
            assert!(c >= BigUint::from(2u32) && c < modulus);
            assert!(c.gcd(&modulus).is_one());
        }
    }

    #[test]
    fn test_int_to_block_right_aligned() {
        let mut buf = [0xFFu8; 4];
        int_to_block(&BigUint::from(0x0102u32), &mut buf).unwrap();
        assert_eq!(buf, [0x00, 0x00, 0x01, 0x02]);

        int_to_block(&BigUint::from(0u32), &mut buf).unwrap();
        assert_eq!(buf, [0; 4]);
    }

    #[test]
    fn test_int_to_block_too_large() {
        let mut buf = [0u8; 1];
        assert_eq!(
            int_to_block(&BigUint::from(256u32), &mut buf),
            Err(CryptoError::ValueTooLarge { bits: 9, max_bits: 8 })
        );
    }

    #[test]
    fn test_check_modulus() {
        let one_byte = BlockSize::new(1).unwrap();
        assert!(check_modulus(one_byte, &BigUint::from(257u32)).is_ok());
        assert!(matches!(
            check_modulus(one_byte, &BigUint::from(251u32)),
            Err(ConfigError::BlockTooLargeForModulus { modulus_bits: 8, .. })
        ));
    }
}
