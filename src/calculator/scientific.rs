//! Scientific functions applied to the current value.

use std::f64::consts::{E, PI};
use std::fmt;
use std::str::FromStr;

use super::engine::Calculator;
use super::error::{CalcError, Outcome};
use super::format::{format_number, parse_float};
use super::state::{AngleMode, UnknownTag};

/// Largest argument whose factorial is finite.
pub const MAX_FACTORIAL: f64 = 170.0;

/// A single-argument scientific function or constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScientificFn {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Log,
    Ln,
    Log2,
    Sqrt,
    Cbrt,
    Square,
    Cube,
    Exp,
    Pow10,
    Factorial,
    Reciprocal,
    Abs,
    Pi,
    E,
}

impl ScientificFn {
    pub const ALL: [ScientificFn; 20] = [
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Asin,
        Self::Acos,
        Self::Atan,
        Self::Log,
        Self::Ln,
        Self::Log2,
        Self::Sqrt,
        Self::Cbrt,
        Self::Square,
        Self::Cube,
        Self::Exp,
        Self::Pow10,
        Self::Factorial,
        Self::Reciprocal,
        Self::Abs,
        Self::Pi,
        Self::E,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Log => "log",
            Self::Ln => "ln",
            Self::Log2 => "log2",
            Self::Sqrt => "sqrt",
            Self::Cbrt => "cbrt",
            Self::Square => "square",
            Self::Cube => "cube",
            Self::Exp => "exp",
            Self::Pow10 => "pow10",
            Self::Factorial => "factorial",
            Self::Reciprocal => "reciprocal",
            Self::Abs => "abs",
            Self::Pi => "pi",
            Self::E => "e",
        }
    }

    /// Constants ignore the current value.
    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Pi | Self::E)
    }

    /// Evaluate the function at `x`.
    ///
    /// Domain violations are errors. Overflow is not checked here: a
    /// non-finite `Ok` value is the caller's to reject.
    pub fn apply(&self, x: f64, angle: AngleMode) -> Result<f64, CalcError> {
        let domain = || CalcError::Domain(*self);
        let value = match self {
            Self::Sin => to_radians(x, angle).sin(),
            Self::Cos => to_radians(x, angle).cos(),
            Self::Tan => to_radians(x, angle).tan(),
            Self::Asin | Self::Acos if x.abs() > 1.0 => return Err(domain()),
            Self::Asin => to_degrees(x.asin(), angle),
            Self::Acos => to_degrees(x.acos(), angle),
            Self::Atan => to_degrees(x.atan(), angle),
            Self::Log | Self::Ln | Self::Log2 if x <= 0.0 => return Err(domain()),
            Self::Log => x.log10(),
            Self::Ln => x.ln(),
            Self::Log2 => x.log2(),
            Self::Sqrt if x < 0.0 => return Err(domain()),
            Self::Sqrt => x.sqrt(),
            Self::Cbrt => x.cbrt(),
            Self::Square => x * x,
            Self::Cube => x * x * x,
            Self::Exp => x.exp(),
            Self::Pow10 => 10f64.powf(x),
            Self::Factorial => factorial(x).ok_or_else(domain)?,
            Self::Reciprocal if x == 0.0 => return Err(domain()),
            Self::Reciprocal => 1.0 / x,
            Self::Abs => x.abs(),
            Self::Pi => PI,
            Self::E => E,
        };
        Ok(value)
    }
}

impl fmt::Display for ScientificFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScientificFn {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|func| func.name() == lower)
            .ok_or_else(|| UnknownTag {
                kind: "function",
                value: s.to_string(),
            })
    }
}

/// Degrees to radians, unless the calculator already works in radians.
pub fn to_radians(value: f64, angle: AngleMode) -> f64 {
    match angle {
        AngleMode::Rad => value,
        AngleMode::Deg => value * (PI / 180.0),
    }
}

/// Radians to degrees, unless the calculator works in radians.
pub fn to_degrees(value: f64, angle: AngleMode) -> f64 {
    match angle {
        AngleMode::Rad => value,
        AngleMode::Deg => value * (180.0 / PI),
    }
}

/// `n!` by iterative product.
///
/// `None` for negative or non-integer `n`; infinity past [`MAX_FACTORIAL`].
pub fn factorial(n: f64) -> Option<f64> {
    if n < 0.0 || n.fract() != 0.0 {
        return None;
    }
    if n > MAX_FACTORIAL {
        return Some(f64::INFINITY);
    }

    let mut result = 1.0;
    for i in 2..=(n as u32) {
        result *= f64::from(i);
    }
    Some(result)
}

impl Calculator {
    /// Apply `func` to the current value.
    pub fn scientific_operation(&mut self, func: ScientificFn) -> Outcome {
        if self.state.has_error {
            return Outcome::Ignored;
        }

        let x = if func.is_constant() {
            0.0
        } else {
            parse_float(&self.state.current_value).unwrap_or(f64::NAN)
        };
        let result = match func.apply(x, self.state.angle_mode) {
            Ok(result) => result,
            Err(err) => return self.fail(err),
        };
        if !result.is_finite() {
            return self.fail(CalcError::Overflow);
        }

        self.state.current_value = format_number(result);
        self.state.is_result_displayed = true;
        self.applied()
    }
}
