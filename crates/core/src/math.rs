//! Numeric helpers shared by the converters

use crate::types::Bounds;

/// Compute centre/half-extent bounds from a min/max corner pair
pub fn bounds_from_min_max(mins: [f32; 3], maxs: [f32; 3]) -> Bounds {
    let mut bounds = Bounds::default();
    for axis in 0..3 {
        bounds.mid_point[axis] = (mins[axis] + maxs[axis]) * 0.5;
        bounds.half_size[axis] = (maxs[axis] - mins[axis]) * 0.5;
    }
    bounds
}

/// Convert an `f32` to IEEE 754 binary16 bits, rounding to nearest even
pub fn f32_to_half(f: f32) -> u16 {
    let bits = f.to_bits();
    let sign = (bits >> 16) & 0x8000;
    let f32_exp = (bits >> 23) & 0xFF;
    let mantissa = bits & 0x7FFFFF;

    if f32_exp == 0xFF && mantissa != 0 {
        return (sign | 0x7E00) as u16;
    }

    let exp = f32_exp as i32 - 127 + 15;
    if exp <= 0 {
        return sign as u16;
    }
    if exp >= 31 {
        return (sign | 0x7C00) as u16;
    }

    let truncated = mantissa >> 13;
    let round_bit = (mantissa >> 12) & 1;
    let sticky = mantissa & 0xFFF;
    let rounded = if round_bit != 0 && (sticky != 0 || (truncated & 1) != 0) {
        truncated + 1
    } else {
        truncated
    };
    // mantissa carry bumps the exponent
    if rounded >= 0x400 {
        let new_exp = exp + 1;
        if new_exp >= 31 {
            return (sign | 0x7C00) as u16;
        }
        return (sign | ((new_exp as u32) << 10)) as u16;
    }
    (sign | ((exp as u32) << 10) | rounded) as u16
}

/// Convert IEEE 754 binary16 bits back to `f32`
pub fn half_to_f32(h: u16) -> f32 {
    let sign = ((h >> 15) & 1) as u32;
    let exp = ((h >> 10) & 0x1F) as u32;
    let mantissa = (h & 0x3FF) as u32;
    if exp == 0 {
        return f32::from_bits(sign << 31);
    }
    if exp == 31 {
        return f32::from_bits((sign << 31) | 0x7F800000 | (mantissa << 13));
    }
    f32::from_bits((sign << 31) | ((exp + 127 - 15) << 23) | (mantissa << 13))
}
