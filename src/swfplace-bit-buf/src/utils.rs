//! Helpers for computing bit widths of packed SWF fields.

/// Aligns `value` down to the next multiple of `align`.
///
/// # Panics
///
/// Panics in debug mode when `align` is not a power of two.
#[inline(always)]
pub const fn align_down(value: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    value & !(align - 1)
}

/// Aligns `value` up to the next multiple of `align`.
///
/// # Panics
///
/// Panics in debug mode when `align` is not a power of two.
#[inline(always)]
pub const fn align_up(value: usize, align: usize) -> usize {
    align_down(value + (align - 1), align)
}

/// Gets the minimum number of bits needed to store `value` as an
/// unsigned bit field (`UB[n]`).
#[inline]
pub const fn ub_bits(value: u32) -> u32 {
    u32::BITS - value.leading_zeros()
}

/// Gets the minimum number of bits needed to store `value` as a
/// signed bit field (`SB[n]` or `FB[n]`).
///
/// Zero needs no bits at all; every other value needs one extra
/// bit for the sign.
#[inline]
pub const fn sb_bits(value: i32) -> u32 {
    if value == 0 {
        return 0;
    }

    let magnitude = if value < 0 { !value } else { value };
    u32::BITS - (magnitude as u32).leading_zeros() + 1
}

/// Gets the minimum signed bit width which fits every value in `values`.
#[inline]
pub fn max_sb_bits(values: &[i32]) -> u32 {
    values.iter().map(|&v| sb_bits(v)).max().unwrap_or(0)
}
