//! Fixed-point helpers for sub-pixel stable rasterisation.
//!
//! Values are plain `i32`s carrying `bits` fractional bits; the format is
//! implied by the call site rather than wrapped in a newtype.
//!
//! * Screen-space coordinates use [`SUBPIXEL_BITS`] (1/64 px).
//! * Texture-space steps use [`TEXEL_BITS`] (16.16).

/// Fractional bits for screen-space coordinates.
pub const SUBPIXEL_BITS: u32 = 6;

/// Fractional bits for texture-space coordinates and steps.
pub const TEXEL_BITS: u32 = 16;

/// `1.0` in a format with `bits` fractional bits.
#[inline(always)]
pub const fn one(bits: u32) -> i32 {
    1 << bits
}

/// Mask selecting the fractional part.
#[inline(always)]
pub const fn frac_mask(bits: u32) -> i32 {
    one(bits) - 1
}

/// Float → fixed, truncating toward zero like a C cast.
#[inline(always)]
pub fn to_fixed(v: f32, bits: u32) -> i32 {
    (v * one(bits) as f32) as i32
}

/// Float → fixed, rounding to the nearest representable value.  Use for
/// values that get accumulated, where truncation error would drift.
#[inline(always)]
pub fn to_fixed_round(v: f32, bits: u32) -> i32 {
    (v * one(bits) as f32).round() as i32
}

/// Integer part (floor, arithmetic shift).
#[inline(always)]
pub const fn to_int(v: i32, bits: u32) -> i32 {
    v >> bits
}

/// Integer → fixed.
#[inline(always)]
pub const fn from_int(v: i32, bits: u32) -> i32 {
    v << bits
}

/// Round to the nearest whole unit, result still in fixed-point.
/// Halves round up (toward +inf).
#[inline(always)]
pub const fn round(v: i32, bits: u32) -> i32 {
    if bits == 0 {
        return v;
    }
    (v + (one(bits) >> 1)) & !frac_mask(bits)
}

/// Round up to the next whole unit, result still in fixed-point.
#[inline(always)]
pub const fn ceil(v: i32, bits: u32) -> i32 {
    (v + frac_mask(bits)) & !frac_mask(bits)
}

/// Clamp `v` into `lo..=hi`.
#[inline(always)]
pub fn clip(v: i32, lo: i32, hi: i32) -> i32 {
    v.max(lo).min(hi)
}

/*────────────────────────────── Tests ──────────────────────────────*/
