//! Conversions between numbers and ASCII characters.

use super::engine::Calculator;
use super::error::CalcError;
use super::programmer::clamp;
use super::state::Mode;

/// Largest code point accepted by [`to_ascii`].
pub const MAX_ASCII: f64 = 127.0;

/// The ASCII character for `value`, which must be an integer in `0..=127`.
pub fn to_ascii(value: f64) -> Result<char, CalcError> {
    if value.fract() != 0.0 || !(0.0..=MAX_ASCII).contains(&value) {
        return Err(CalcError::AsciiOutOfRange(value));
    }
    Ok(char::from(value as u8))
}

impl Calculator {
    /// The current value as an ASCII character, if it is one.
    pub fn ascii_char(&self) -> Option<char> {
        if self.state.has_error {
            return None;
        }
        self.current_number().and_then(|n| to_ascii(n).ok())
    }

    /// Load the code point of `text`'s single character into the current value.
    pub fn from_ascii(&mut self, text: &str) -> Result<u32, CalcError> {
        let mut chars = text.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return Err(CalcError::NotSingleCharacter);
        };

        if self.state.has_error {
            self.clear();
        }

        let code = u32::from(c);
        self.state.current_value = if self.state.mode == Mode::Programmer {
            self.render_bits(clamp(i64::from(code), self.state.bit_length))
        } else {
            code.to_string()
        };
        self.state.is_result_displayed = true;
        self.applied();
        Ok(code)
    }
}
