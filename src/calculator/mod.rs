//! Calculator module: the calculation engine and its helpers.
//!
//! This module provides functionality to:
//! - Accumulate digit input and evaluate two-operand operations
//! - Apply scientific functions with angle-unit conversion
//! - Convert between bases and clamp to fixed integer widths
//! - Keep a single memory register
//! - Copy results to and paste operands from the clipboard

mod ascii;
mod clipboard;
mod engine;
mod error;
mod format;
mod memory;
mod programmer;
mod scientific;
mod state;

pub use ascii::to_ascii;
pub use clipboard::{ClipboardError, copy_to_clipboard, is_numeric_paste, paste_from_clipboard};
pub use engine::Calculator;
pub use error::{CalcError, Outcome};
pub use format::{format_number, parse_float};
pub use programmer::{
    BaseValues, clamp, convert_base, group_binary, parse_int, render_int, render_word,
    value_in_all_bases,
};
pub use scientific::{ScientificFn, factorial, to_degrees, to_radians};
pub use state::{
    AngleMode, ArithmeticOp, Base, BitLength, BitwiseOp, CalcRecord, CalcState, MAX_DIGITS, Mode,
    Operand, Operator, UnknownTag, is_sentinel,
};
