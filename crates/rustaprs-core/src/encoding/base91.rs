use crate::DecodeError;

/// Lowest base-91 digit (`!`).
pub const DIGIT_OFFSET: u8 = 33;

/// Decodes most-significant-first base-91 digits.
pub fn decode(digits: &[u8]) -> Result<u32, DecodeError> {
    digits.iter().try_fold(0u32, |acc, &b| {
        if (DIGIT_OFFSET..DIGIT_OFFSET + 91).contains(&b) {
            Ok(acc * 91 + u32::from(b - DIGIT_OFFSET))
        } else {
            Err(DecodeError::Message("invalid base-91 digit"))
        }
    })
}

/// Encodes `value` as exactly `N` base-91 digits, saturating at the top.
pub fn encode<const N: usize>(value: u32) -> [u8; N] {
    let mut out = [DIGIT_OFFSET; N];
    let mut rest = value.min(91u32.saturating_pow(N as u32).saturating_sub(1));
    for slot in out.iter_mut().rev() {
        *slot = DIGIT_OFFSET + (rest % 91) as u8;
        rest /= 91;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};
    use proptest::prelude::*;

    #[test]
    fn decodes_reference_digits() {
        // 49.5N from the APRS reference: "5L!!"
        assert_eq!(decode(b"5L!!").unwrap(), 20 * 91 * 91 * 91 + 43 * 91 * 91);
        assert!(decode(b"5L !").is_err());
    }

    #[test]
    fn saturates_out_of_range() {
        assert_eq!(&encode::<2>(u32::MAX), b"{{");
    }

    proptest! {
        #[test]
        fn four_digit_values_survive(v in 0u32..91 * 91 * 91 * 91) {
            prop_assert_eq!(decode(&encode::<4>(v)).unwrap(), v);
        }
    }
}
