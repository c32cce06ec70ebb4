//! Programmer mode: radix conversion, fixed-width clamping and bitwise logic.
//!
//! Engine integers are `i64`. Clamping masks to the selected width for 8, 16
//! and 32 bits and leaves 64-bit values alone, so 64-bit arithmetic is plain
//! two's complement wrapping on the native type.

use tracing::debug;

use super::engine::Calculator;
use super::error::{CalcError, Outcome};
use super::state::{ArithmeticOp, Base, BitLength, BitwiseOp, Mode, Operator};

/// Parse the leading integer literal of `text` in `base`.
///
/// Accepts an optional sign and, for hex, an optional `0x` prefix. Parsing
/// stops at the first character that is not a digit of `base`. Returns `None`
/// when there are no digits or the literal does not fit in 128 bits.
pub fn parse_int(text: &str, base: Base) -> Option<i128> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let digits = if base == Base::Hex {
        digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .unwrap_or(digits)
    } else {
        digits
    };

    let radix = base.radix();
    let mut value: i128 = 0;
    let mut seen_digit = false;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(radix) else {
            break;
        };
        value = value
            .checked_mul(i128::from(radix))?
            .checked_add(i128::from(digit))?;
        seen_digit = true;
    }

    if !seen_digit {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Render `value` in `base` with uppercase digits and a leading `-` if negative.
pub fn render_int(value: i128, base: Base) -> String {
    let radix = base.radix();
    let mut magnitude = value.unsigned_abs();
    if magnitude == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while magnitude > 0 {
        let digit = (magnitude % u128::from(radix)) as u32;
        if let Some(c) = char::from_digit(digit, radix) {
            digits.push(c.to_ascii_uppercase());
        }
        magnitude /= u128::from(radix);
    }
    if value < 0 {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

/// Render an engine integer in `base`.
///
/// Decimal is signed. The other bases show the 64-bit two's complement
/// pattern, so `-1` is `FFFFFFFFFFFFFFFF` in hex. Values clamped to 8, 16 or
/// 32 bits are never negative and render the same either way.
pub fn render_word(value: i64, base: Base) -> String {
    match base {
        Base::Dec => render_int(i128::from(value), base),
        _ => render_int(i128::from(value as u64), base),
    }
}

/// Re-render `value` from one base into another. Unparseable input becomes `"0"`.
pub fn convert_base(value: &str, from: Base, to: Base) -> String {
    match parse_int(value, from) {
        Some(parsed) => render_int(parsed, to),
        None => "0".to_string(),
    }
}

/// A value rendered in each of the four bases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseValues {
    pub hex: String,
    pub dec: String,
    pub oct: String,
    pub bin: String,
}

impl BaseValues {
    pub fn from_int(value: i128) -> Self {
        Self {
            hex: render_int(value, Base::Hex),
            dec: render_int(value, Base::Dec),
            oct: render_int(value, Base::Oct),
            bin: render_int(value, Base::Bin),
        }
    }

    /// An engine integer in all four bases, spelled as [`render_word`] does.
    pub fn from_word(value: i64) -> Self {
        Self {
            hex: render_word(value, Base::Hex),
            dec: render_word(value, Base::Dec),
            oct: render_word(value, Base::Oct),
            bin: render_word(value, Base::Bin),
        }
    }

    /// The rendering for `base`.
    pub fn get(&self, base: Base) -> &str {
        match base {
            Base::Hex => &self.hex,
            Base::Dec => &self.dec,
            Base::Oct => &self.oct,
            Base::Bin => &self.bin,
        }
    }
}

/// Parse `value` once and render it in all four bases; unparseable input is zero.
pub fn value_in_all_bases(value: &str, base: Base) -> BaseValues {
    BaseValues::from_int(parse_int(value, base).unwrap_or(0))
}

/// Mask `value` to `width`. The 64-bit width is the identity.
pub fn clamp(value: i64, width: BitLength) -> i64 {
    match width.mask() {
        Some(mask) => value & mask,
        None => value,
    }
}

/// Pad a binary digit string to a multiple of four and group it by nibble.
pub fn group_binary(bits: &str) -> String {
    let width = bits.len().div_ceil(4).max(1) * 4;
    let padded: Vec<char> = format!("{:0>width$}", bits, width = width).chars().collect();
    padded
        .chunks(4)
        .map(|nibble| nibble.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Apply a bitwise operator and clamp the result to `width`.
///
/// Shift counts use their low six bits. `b` is ignored by `NOT`.
pub fn apply_bitwise(a: i64, op: BitwiseOp, b: i64, width: BitLength) -> i64 {
    let shift = (b & 63) as u32;
    let raw = match op {
        BitwiseOp::And => a & b,
        BitwiseOp::Or => a | b,
        BitwiseOp::Xor => a ^ b,
        BitwiseOp::Nand => !(a & b),
        BitwiseOp::Nor => !(a | b),
        BitwiseOp::Lsh => a.wrapping_shl(shift),
        BitwiseOp::Rsh => a.wrapping_shr(shift),
        BitwiseOp::Not => !a,
    };
    clamp(raw, width)
}

/// Integer arithmetic for programmer mode: wrapping, truncating, clamped.
pub fn apply_integer_arithmetic(
    a: i64,
    op: ArithmeticOp,
    b: i64,
    width: BitLength,
) -> Result<i64, CalcError> {
    let raw = match op {
        ArithmeticOp::Add => a.wrapping_add(b),
        ArithmeticOp::Subtract => a.wrapping_sub(b),
        ArithmeticOp::Multiply => a.wrapping_mul(b),
        ArithmeticOp::Divide => {
            if b == 0 {
                return Err(CalcError::DivisionByZero);
            }
            a.wrapping_div(b)
        }
    };
    Ok(clamp(raw, width))
}

impl Calculator {
    /// Switch base. In programmer mode the current value is carried over.
    pub fn set_base(&mut self, base: Base) -> Outcome {
        let previous = self.state.base;
        self.state.base = base;

        if self.state.mode == Mode::Programmer && !self.state.has_error && previous != base {
            let value = parse_int(&self.state.current_value, previous).unwrap_or(0) as i64;
            self.state.current_value = render_word(self.clamp_to_bit_length(value), base);
        }
        debug!(from = %previous, to = %base, "base changed");
        self.applied()
    }

    /// Switch integer width. In programmer mode the current value is re-clamped.
    pub fn set_bit_length(&mut self, width: BitLength) -> Outcome {
        self.state.bit_length = width;

        if self.state.mode == Mode::Programmer
            && !self.state.has_error
            && let Some(bits) = self.parse_current_bits()
        {
            self.state.current_value = self.render_bits(clamp(bits, width));
        }
        debug!(bits = width.bits(), "bit length changed");
        self.applied()
    }

    /// Mask `value` to the current bit length.
    pub fn clamp_to_bit_length(&self, value: i64) -> i64 {
        clamp(value, self.state.bit_length)
    }

    /// Append a hex digit `A`-`F`. Only valid while the base is hex.
    pub fn input_hex_digit(&mut self, digit: char) -> Outcome {
        if self.state.has_error || self.state.base != Base::Hex {
            return Outcome::Ignored;
        }
        let digit = digit.to_ascii_uppercase();
        if !('A'..='F').contains(&digit) {
            return Outcome::Ignored;
        }
        self.push_digit(digit)
    }

    /// Apply a bitwise operator: `NOT` immediately, the others as a pending operation.
    pub fn bitwise_operation(&mut self, op: BitwiseOp) -> Outcome {
        if op.is_unary() {
            self.bitwise_not()
        } else {
            self.input_operator(Operator::Bitwise(op))
        }
    }

    pub(super) fn bitwise_not(&mut self) -> Outcome {
        if self.state.has_error {
            return Outcome::Ignored;
        }
        let value = self.parse_current_bits().unwrap_or(0);
        let result = apply_bitwise(value, BitwiseOp::Not, 0, self.state.bit_length);
        self.state.current_value = self.render_bits(result);
        self.state.is_result_displayed = true;
        self.applied()
    }

    /// Flip bit `index` of the current value.
    ///
    /// Programmer mode only. Indices outside `0..bit_length` are rejected.
    pub fn toggle_bit(&mut self, index: i32) -> Outcome {
        if self.state.has_error || self.state.mode != Mode::Programmer {
            return Outcome::Ignored;
        }
        let width = self.state.bit_length;
        let Ok(index) = u32::try_from(index) else {
            return Outcome::Ignored;
        };
        if index >= width.bits() {
            return Outcome::Ignored;
        }

        let value = self.parse_current_bits().unwrap_or(0);
        let toggled = clamp(value ^ 1i64.wrapping_shl(index), width);
        self.state.current_value = self.render_bits(toggled);
        self.state.is_result_displayed = true;
        debug!(index, value = toggled, "bit toggled");
        self.applied()
    }

    /// The current value, clamped, in all four bases.
    pub fn values_in_all_bases(&self) -> BaseValues {
        let value = self.parse_current_bits().unwrap_or(0);
        BaseValues::from_word(self.clamp_to_bit_length(value))
    }

    /// The current value in binary, grouped by nibble.
    pub fn binary_display(&self) -> String {
        let value = self.parse_current_bits().unwrap_or(0);
        group_binary(&render_word(self.clamp_to_bit_length(value), Base::Bin))
    }
}
