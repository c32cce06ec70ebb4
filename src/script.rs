//! Scripted input: a line of whitespace-separated words driving the engine.
//!
//! ```text
//! 12 + 3 =            standard arithmetic
//! prog hex FF not     programmer mode, hexadecimal
//! sci deg 90 sin      scientific functions
//! 5 ms clear mr       memory register
//! prog byte 5 bit:1   toggle a bit
//! ascii:A             load a character's code point
//! ```
//!
//! Words are matched in this order: mode, angle, base and width keywords,
//! then number literals for the active base, then operators and the
//! remaining keywords. In hexadecimal, `c`, `ce` and `e` are therefore
//! digits; use `clear`, `clear-entry` or a mode switch instead.

use lazy_static::lazy_static;
use regex::Regex;
use std::str::FromStr;
use tracing::debug;

use crate::calculator::{
    AngleMode, ArithmeticOp, Base, BitLength, BitwiseOp, CalcError, CalcState, Calculator, Mode,
    Operator, Outcome, ScientificFn,
};

lazy_static! {
    /// Decimal literal: `12`, `-3.5`, `.25`, `7.`
    static ref DECIMAL_LITERAL: Regex = Regex::new(r"^-?(\d+\.?\d*|\.\d+)$").unwrap();
    /// Integer literal in any base up to 16; digits are checked against the base separately.
    static ref INTEGER_LITERAL: Regex = Regex::new(r"^-?(?:0[xX])?[0-9A-Fa-f]+$").unwrap();
    /// `name:argument` words such as `bit:3` or `ascii:A`.
    static ref PARAMETER_WORD: Regex = Regex::new(r"^(?i)(bit|ascii):(.+)$").unwrap();
}

/// One engine action parsed from a script.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// A literal typed digit by digit; a leading `-` negates it afterwards.
    Number(String),
    Decimal,
    Operator(Operator),
    Equals,
    Clear,
    ClearEntry,
    Backspace,
    Negate,
    Percent,
    Scientific(ScientificFn),
    SetMode(Mode),
    SetAngle(AngleMode),
    SetBase(Base),
    SetBitLength(BitLength),
    MemoryClear,
    MemoryStore,
    MemoryRecall,
    MemoryAdd,
    MemorySubtract,
    ToggleBit(i32),
    FromAscii(String),
}

/// Error raised while parsing a script line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("unrecognised word `{0}`")]
    UnknownWord(String),

    #[error("`{word}` is not a number in base {base}")]
    InvalidDigits { word: String, base: Base },

    #[error("invalid bit index `{0}`")]
    InvalidBitIndex(String),
}

/// Parse a script line against the calculator's current `state`.
///
/// Mode and base switches earlier on the line affect how later literals are
/// read.
pub fn parse_script(line: &str, state: &CalcState) -> Result<Vec<Command>, ScriptError> {
    let mut mode = state.mode;
    let mut base = state.base;
    let mut commands = Vec::new();

    for word in line.split_whitespace() {
        let command = parse_word(word, mode, base)?;
        match &command {
            Command::SetMode(next) => mode = *next,
            Command::SetBase(next) => base = *next,
            _ => {}
        }
        commands.push(command);
    }
    Ok(commands)
}

fn parse_word(word: &str, mode: Mode, base: Base) -> Result<Command, ScriptError> {
    let lower = word.to_ascii_lowercase();

    if let Some(command) = setting_word(&lower) {
        return Ok(command);
    }

    if let Some(caps) = PARAMETER_WORD.captures(word) {
        let argument = &caps[2];
        return if caps[1].eq_ignore_ascii_case("bit") {
            argument
                .parse::<i32>()
                .map(Command::ToggleBit)
                .map_err(|_| ScriptError::InvalidBitIndex(argument.to_string()))
        } else {
            Ok(Command::FromAscii(argument.to_string()))
        };
    }

    if let Some(command) = number_literal(word, mode, base)? {
        return Ok(command);
    }

    let command = match lower.as_str() {
        "=" => Command::Equals,
        "." => Command::Decimal,
        "%" => Command::Percent,
        "c" | "ac" | "clear" => Command::Clear,
        "ce" | "clear-entry" => Command::ClearEntry,
        "bs" | "back" | "backspace" => Command::Backspace,
        "neg" | "negate" | "±" => Command::Negate,
        "mc" => Command::MemoryClear,
        "ms" => Command::MemoryStore,
        "mr" => Command::MemoryRecall,
        "m+" => Command::MemoryAdd,
        "m-" => Command::MemorySubtract,
        _ => {
            if let Ok(op) = ArithmeticOp::from_str(word) {
                Command::Operator(Operator::Arithmetic(op))
            } else if let Ok(op) = BitwiseOp::from_str(word) {
                Command::Operator(Operator::Bitwise(op))
            } else if let Ok(func) = ScientificFn::from_str(word) {
                Command::Scientific(func)
            } else {
                return Err(ScriptError::UnknownWord(word.to_string()));
            }
        }
    };
    Ok(command)
}

fn setting_word(lower: &str) -> Option<Command> {
    let command = match lower {
        "std" | "standard" => Command::SetMode(Mode::Standard),
        "sci" | "scientific" => Command::SetMode(Mode::Scientific),
        "prog" | "programmer" => Command::SetMode(Mode::Programmer),
        "deg" => Command::SetAngle(AngleMode::Deg),
        "rad" => Command::SetAngle(AngleMode::Rad),
        "bin" => Command::SetBase(Base::Bin),
        "oct" => Command::SetBase(Base::Oct),
        "dec" => Command::SetBase(Base::Dec),
        "hex" => Command::SetBase(Base::Hex),
        "byte" => Command::SetBitLength(BitLength::Byte),
        "word" => Command::SetBitLength(BitLength::Word),
        "dword" => Command::SetBitLength(BitLength::DWord),
        "qword" => Command::SetBitLength(BitLength::QWord),
        _ => return None,
    };
    Some(command)
}

fn number_literal(word: &str, mode: Mode, base: Base) -> Result<Option<Command>, ScriptError> {
    if mode != Mode::Programmer {
        return Ok(DECIMAL_LITERAL
            .is_match(word)
            .then(|| Command::Number(word.to_string())));
    }

    if !INTEGER_LITERAL.is_match(word) {
        return Ok(None);
    }

    let (sign, digits) = match word.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", word),
    };
    let digits = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(rest) if base == Base::Hex => rest,
        _ => digits,
    };

    if !digits.chars().all(|c| base.accepts(c)) {
        // Letters that are not digits here may still be keywords (`and`, `e`).
        if digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ScriptError::InvalidDigits {
                word: word.to_string(),
                base,
            });
        }
        return Ok(None);
    }
    Ok(Some(Command::Number(format!("{}{}", sign, digits))))
}

/// Apply one command.
pub fn apply(calc: &mut Calculator, command: &Command) -> Outcome {
    match command {
        Command::Number(literal) => type_number(calc, literal),
        Command::Decimal => calc.input_decimal(),
        Command::Operator(op) => calc.input_operator(*op),
        Command::Equals => calc.calculate(),
        Command::Clear => calc.clear(),
        Command::ClearEntry => calc.clear_entry(),
        Command::Backspace => calc.backspace(),
        Command::Negate => calc.negate(),
        Command::Percent => calc.percent(),
        Command::Scientific(func) => calc.scientific_operation(*func),
        Command::SetMode(mode) => calc.set_mode(*mode),
        Command::SetAngle(angle) => calc.set_angle_mode(*angle),
        Command::SetBase(base) => calc.set_base(*base),
        Command::SetBitLength(width) => calc.set_bit_length(*width),
        Command::MemoryClear => calc.memory_clear(),
        Command::MemoryStore => calc.memory_store(),
        Command::MemoryRecall => calc.memory_recall(),
        Command::MemoryAdd => calc.memory_add(),
        Command::MemorySubtract => calc.memory_subtract(),
        Command::ToggleBit(index) => calc.toggle_bit(*index),
        Command::FromAscii(text) => match calc.from_ascii(text) {
            Ok(_) => Outcome::Applied,
            Err(err) => Outcome::Failed(err),
        },
    }
}

/// Apply `commands` in order.
///
/// Returns the error that left the engine failed, if it still is at the end.
/// Failures that were cleared by later commands are not reported.
pub fn run(calc: &mut Calculator, commands: &[Command]) -> Result<(), CalcError> {
    let mut failure = None;
    for command in commands {
        match apply(calc, command) {
            Outcome::Failed(err) => {
                debug!(?command, error = %err, "command failed");
                failure = Some(err);
            }
            _ if !calc.has_error() => failure = None,
            _ => {}
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn type_number(calc: &mut Calculator, literal: &str) -> Outcome {
    let (negative, digits) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal),
    };

    let mut outcome = Outcome::Ignored;
    for c in digits.chars() {
        let typed = match c {
            '.' => calc.input_decimal(),
            '0'..='9' => calc.input_number(c),
            _ => calc.input_hex_digit(c),
        };
        if typed.is_applied() {
            outcome = typed;
        }
    }

    if negative && outcome.is_applied() {
        return calc.negate();
    }
    outcome
}
