use bigdecimal::{BigDecimal, One, Zero};
use num_bigint::BigInt;
use std::ops::{Div, Mul};

pub fn safe_div(amount0: &BigDecimal, amount1: &BigDecimal) -> BigDecimal {
    let big_decimal_zero: &BigDecimal = &BigDecimal::zero();
    return if amount1.eq(big_decimal_zero) {
        BigDecimal::zero()
    } else {
        amount0.clone().div(amount1.clone())
    };
}

pub fn exponent_to_big_decimal(decimals: u64) -> BigDecimal {
    let mut result = BigDecimal::one();
    let big_decimal_ten: &BigDecimal = &BigDecimal::from(10 as i32);

    let mut i = 0 as u64;
    while i < decimals {
        result = result.mul(big_decimal_ten.clone());
        i += 1;
    }

    return result;
}

/// Scales a raw on-chain integer amount down by the token's decimals.
pub fn to_decimal(amount: &BigInt, decimals: u64) -> BigDecimal {
    BigDecimal::new(amount.clone(), decimals as i64)
}

pub fn absolute(amount: &BigDecimal) -> BigDecimal {
    if amount.lt(&BigDecimal::zero()) {
        return amount.clone().mul(BigDecimal::from(-1 as i64));
    }
    amount.clone()
}

pub fn max_big_decimal(current: &BigDecimal, candidate: &BigDecimal) -> BigDecimal {
    if candidate.gt(current) {
        return candidate.clone();
    }
    current.clone()
}

pub fn min_big_decimal(current: &BigDecimal, candidate: &BigDecimal) -> BigDecimal {
    if candidate.lt(current) {
        return candidate.clone();
    }
    current.clone()
}
