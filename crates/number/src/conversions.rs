use {
    alloy::primitives::U256,
    bigdecimal::BigDecimal,
    num::{BigInt, BigUint, bigint::Sign},
};

pub fn u256_to_big_uint(input: &U256) -> BigUint {
    BigUint::from_bytes_be(&input.to_be_bytes::<32>())
}

pub fn u256_to_big_int(input: &U256) -> BigInt {
    BigInt::from_biguint(Sign::Plus, u256_to_big_uint(input))
}

pub fn u256_to_big_decimal(input: &U256) -> BigDecimal {
    BigDecimal::new(u256_to_big_int(input), 0)
}

pub fn big_uint_to_u256(input: &BigUint) -> Option<U256> {
    let bytes = input.to_bytes_be();
    if bytes.len() > 32 {
        return None;
    }
    Some(U256::from_be_slice(&bytes))
}

pub fn big_int_to_u256(input: &BigInt) -> Option<U256> {
    if input.sign() == Sign::Minus {
        return None;
    }
    big_uint_to_u256(input.magnitude())
}

/// Converts an integral, non-negative decimal into a `U256`. Returns `None`
/// for fractional, negative or overflowing values.
pub fn big_decimal_to_u256(input: &BigDecimal) -> Option<U256> {
    if !input.is_integer() {
        return None;
    }
    let (int, _) = input.with_scale(0).into_bigint_and_exponent();
    big_int_to_u256(&int)
}
