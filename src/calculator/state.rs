//! Engine state and the closed vocabularies it is built from.
//!
//! Every tag the calculator understands (modes, operators, bases, widths)
//! is a closed enum with `FromStr`/`Display`, so the keyboard map, the script
//! driver, the config file and the history store all share one spelling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of digits accepted during input (sign and point excluded).
pub const MAX_DIGITS: usize = 16;

/// Sentinel shown for domain errors (division by zero, bad function argument).
pub const ERROR_SENTINEL: &str = "Error";

/// Sentinel shown for overflow and other non-finite results.
pub const INFINITY_SENTINEL: &str = "Infinity";

/// Sentinel for negative overflow. Only reachable through `set_current_value`.
pub const NEG_INFINITY_SENTINEL: &str = "-Infinity";

/// Returns true if `value` is one of the error sentinels.
pub fn is_sentinel(value: &str) -> bool {
    matches!(
        value,
        ERROR_SENTINEL | INFINITY_SENTINEL | NEG_INFINITY_SENTINEL
    )
}

/// Error returned when a textual or numeric tag does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownTag {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownTag {
    fn new(kind: &'static str, value: impl fmt::Display) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Calculator mode. Selects which operations are meaningful to the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Standard,
    Scientific,
    Programmer,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Scientific => "scientific",
            Self::Programmer => "programmer",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "scientific" => Ok(Self::Scientific),
            "programmer" => Ok(Self::Programmer),
            _ => Err(UnknownTag::new("mode", s)),
        }
    }
}

/// Angle unit used by the trigonometric functions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AngleMode {
    #[default]
    Deg,
    Rad,
}

impl fmt::Display for AngleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deg => f.write_str("DEG"),
            Self::Rad => f.write_str("RAD"),
        }
    }
}

impl FromStr for AngleMode {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEG" => Ok(Self::Deg),
            "RAD" => Ok(Self::Rad),
            _ => Err(UnknownTag::new("angle mode", s)),
        }
    }
}

/// Numeric base used to parse and render values in programmer mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Base {
    Bin,
    Oct,
    #[default]
    Dec,
    Hex,
}

impl Base {
    pub const ALL: [Base; 4] = [Self::Hex, Self::Dec, Self::Oct, Self::Bin];

    /// The radix as a number.
    pub fn radix(&self) -> u32 {
        match self {
            Self::Bin => 2,
            Self::Oct => 8,
            Self::Dec => 10,
            Self::Hex => 16,
        }
    }

    /// Whether `c` is a digit of this base (hex digits in either case).
    pub fn accepts(&self, c: char) -> bool {
        c.to_digit(self.radix()).is_some()
    }

    /// Short label, as shown on the base selector.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bin => "BIN",
            Self::Oct => "OCT",
            Self::Dec => "DEC",
            Self::Hex => "HEX",
        }
    }
}

impl TryFrom<u32> for Base {
    type Error = UnknownTag;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::Bin),
            8 => Ok(Self::Oct),
            10 => Ok(Self::Dec),
            16 => Ok(Self::Hex),
            _ => Err(UnknownTag::new("base", value)),
        }
    }
}

impl From<Base> for u32 {
    fn from(base: Base) -> Self {
        base.radix()
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Base {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bin" | "2" => Ok(Self::Bin),
            "oct" | "8" => Ok(Self::Oct),
            "dec" | "10" => Ok(Self::Dec),
            "hex" | "16" => Ok(Self::Hex),
            _ => Err(UnknownTag::new("base", s)),
        }
    }
}

/// Integer width used to clamp bitwise results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BitLength {
    Byte,
    Word,
    #[default]
    DWord,
    QWord,
}

impl BitLength {
    pub fn bits(&self) -> u32 {
        match self {
            Self::Byte => 8,
            Self::Word => 16,
            Self::DWord => 32,
            Self::QWord => 64,
        }
    }

    /// Mask applied by clamping, `None` for the full 64-bit width.
    pub fn mask(&self) -> Option<i64> {
        match self {
            Self::Byte => Some(0xFF),
            Self::Word => Some(0xFFFF),
            Self::DWord => Some(0xFFFF_FFFF),
            Self::QWord => None,
        }
    }
}

impl TryFrom<u32> for BitLength {
    type Error = UnknownTag;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            8 => Ok(Self::Byte),
            16 => Ok(Self::Word),
            32 => Ok(Self::DWord),
            64 => Ok(Self::QWord),
            _ => Err(UnknownTag::new("bit length", value)),
        }
    }
}

impl From<BitLength> for u32 {
    fn from(width: BitLength) -> Self {
        width.bits()
    }
}

impl fmt::Display for BitLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte => f.write_str("BYTE"),
            Self::Word => f.write_str("WORD"),
            Self::DWord => f.write_str("DWORD"),
            Self::QWord => f.write_str("QWORD"),
        }
    }
}

impl FromStr for BitLength {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "byte" | "8" => Ok(Self::Byte),
            "word" | "16" => Ok(Self::Word),
            "dword" | "32" => Ok(Self::DWord),
            "qword" | "64" => Ok(Self::QWord),
            _ => Err(UnknownTag::new("bit length", s)),
        }
    }
}

/// The four arithmetic operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "×",
            Self::Divide => "÷",
        }
    }
}

impl FromStr for ArithmeticOp {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Self::Add),
            "-" => Ok(Self::Subtract),
            "*" | "×" | "x" => Ok(Self::Multiply),
            "/" | "÷" => Ok(Self::Divide),
            _ => Err(UnknownTag::new("operator", s)),
        }
    }
}

/// Bitwise operators. `Not` is unary; all others take two operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Lsh,
    Rsh,
    Not,
}

impl BitwiseOp {
    pub fn name(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Nand => "NAND",
            Self::Nor => "NOR",
            Self::Lsh => "LSH",
            Self::Rsh => "RSH",
            Self::Not => "NOT",
        }
    }

    pub fn is_unary(&self) -> bool {
        matches!(self, Self::Not)
    }
}

impl FromStr for BitwiseOp {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AND" | "&" => Ok(Self::And),
            "OR" | "|" => Ok(Self::Or),
            "XOR" | "^" => Ok(Self::Xor),
            "NAND" => Ok(Self::Nand),
            "NOR" => Ok(Self::Nor),
            "LSH" | "<<" => Ok(Self::Lsh),
            "RSH" | ">>" => Ok(Self::Rsh),
            "NOT" | "~" => Ok(Self::Not),
            _ => Err(UnknownTag::new("bitwise operator", s)),
        }
    }
}

/// A pending binary operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Arithmetic(ArithmeticOp),
    Bitwise(BitwiseOp),
}

impl Operator {
    pub fn is_bitwise(&self) -> bool {
        matches!(self, Self::Bitwise(_))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arithmetic(op) => f.write_str(op.symbol()),
            Self::Bitwise(op) => f.write_str(op.name()),
        }
    }
}

impl From<ArithmeticOp> for Operator {
    fn from(op: ArithmeticOp) -> Self {
        Self::Arithmetic(op)
    }
}

impl From<BitwiseOp> for Operator {
    fn from(op: BitwiseOp) -> Self {
        Self::Bitwise(op)
    }
}

/// Left operand of a pending operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Operand {
    /// Floating-point operand (standard and scientific arithmetic).
    Number(f64),
    /// Fixed-width integer operand (programmer mode).
    Bits(i64),
}

impl Operand {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Number(n) => n,
            Self::Bits(b) => b as f64,
        }
    }

    pub fn as_bits(&self) -> i64 {
        match *self {
            Self::Number(n) => n as i64,
            Self::Bits(b) => b,
        }
    }
}

/// Snapshot of everything the calculator knows.
#[derive(Clone, Debug, PartialEq)]
pub struct CalcState {
    /// Value being edited or displayed, in the current base's textual form.
    pub current_value: String,
    /// Left operand of the pending operation.
    pub previous_value: Option<Operand>,
    /// Pending operator. Set and cleared together with `previous_value`.
    pub current_operator: Option<Operator>,
    pub mode: Mode,
    pub angle_mode: AngleMode,
    pub base: Base,
    pub bit_length: BitLength,
    pub memory_value: f64,
    pub has_memory: bool,
    /// The shown value is final; the next digit starts a new number.
    pub is_result_displayed: bool,
    pub has_error: bool,
    /// Pending left operand and operator, for display only.
    pub expression: String,
}

impl Default for CalcState {
    fn default() -> Self {
        Self {
            current_value: "0".to_string(),
            previous_value: None,
            current_operator: None,
            mode: Mode::default(),
            angle_mode: AngleMode::default(),
            base: Base::default(),
            bit_length: BitLength::default(),
            memory_value: 0.0,
            has_memory: false,
            is_result_displayed: false,
            has_error: false,
            expression: String::new(),
        }
    }
}

impl CalcState {
    /// Whether an operator is waiting for its right operand.
    pub fn is_pending(&self) -> bool {
        self.previous_value.is_some() && self.current_operator.is_some()
    }
}

/// A finished calculation, handed to the history observer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalcRecord {
    pub expression: String,
    pub result: String,
    pub mode: Mode,
}
