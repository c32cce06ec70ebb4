//! The calculation engine: a state machine over [`CalcState`].
//!
//! Input is accumulated as text in the current base. Binary operations are
//! two-operand and evaluated left to right the moment the next operator or
//! `=` arrives; there is no precedence and no expression tree.

use std::sync::Arc;
use tracing::debug;

use super::error::{CalcError, Outcome};
use super::format::{format_number, parse_float};
use super::programmer::{apply_bitwise, apply_integer_arithmetic, clamp, parse_int, render_word};
use super::state::{
    AngleMode, ArithmeticOp, BitwiseOp, CalcRecord, CalcState, MAX_DIGITS, Mode, Operand,
    Operator, is_sentinel,
};

type StateCallback = Arc<dyn Fn(&CalcState) + Send + Sync>;
type RecordCallback = Arc<dyn Fn(&CalcRecord) + Send + Sync>;

/// A calculator instance. Each instance owns its state.
pub struct Calculator {
    pub(super) state: CalcState,
    on_change: Option<StateCallback>,
    on_record: Option<RecordCallback>,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    pub fn new() -> Self {
        let mut calc = Self {
            state: CalcState::default(),
            on_change: None,
            on_record: None,
        };
        calc.clear();
        calc
    }

    /// Reset the working registers. Mode, base, width and memory survive.
    pub fn init(&mut self) -> Outcome {
        self.clear()
    }

    /// Set callback invoked after every state change.
    pub fn set_on_change(&mut self, callback: impl Fn(&CalcState) + Send + Sync + 'static) {
        self.on_change = Some(Arc::new(callback));
    }

    /// Set callback invoked with every successfully calculated result.
    pub fn set_on_record(&mut self, callback: impl Fn(&CalcRecord) + Send + Sync + 'static) {
        self.on_record = Some(Arc::new(callback));
    }

    /// Snapshot of the current state. Mutating it has no effect on the engine.
    pub fn state(&self) -> CalcState {
        self.state.clone()
    }

    pub fn current_value(&self) -> &str {
        &self.state.current_value
    }

    pub fn has_error(&self) -> bool {
        self.state.has_error
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Load a value from outside (history recall, paste).
    ///
    /// A pending error is cleared first. Error sentinels put the engine back
    /// into the matching error state.
    pub fn set_current_value(&mut self, value: &str) -> Outcome {
        let value = value.trim();
        if value.is_empty() {
            return Outcome::Ignored;
        }

        if self.state.has_error {
            self.clear();
        }

        self.state.current_value = value.to_string();
        self.state.is_result_displayed = true;
        self.state.has_error = is_sentinel(value);
        self.applied()
    }

    pub fn set_mode(&mut self, mode: Mode) -> Outcome {
        self.state.mode = mode;
        debug!(%mode, "mode changed");
        self.applied()
    }

    pub fn set_angle_mode(&mut self, angle_mode: AngleMode) -> Outcome {
        self.state.angle_mode = angle_mode;
        self.applied()
    }

    /// Append a decimal digit.
    ///
    /// In programmer mode digits that are not valid in the current base are
    /// rejected.
    pub fn input_number(&mut self, digit: char) -> Outcome {
        if self.state.has_error || !digit.is_ascii_digit() {
            return Outcome::Ignored;
        }
        if self.state.mode == Mode::Programmer && !self.state.base.accepts(digit) {
            return Outcome::Ignored;
        }
        self.push_digit(digit)
    }

    pub(super) fn push_digit(&mut self, digit: char) -> Outcome {
        if self.state.is_result_displayed {
            self.state.current_value = "0".to_string();
            self.state.is_result_displayed = false;
        }

        let digits = self
            .state
            .current_value
            .chars()
            .filter(|c| *c != '.' && *c != '-')
            .count();
        if digits >= MAX_DIGITS {
            return Outcome::Ignored;
        }

        if self.state.current_value == "0" {
            self.state.current_value = digit.to_string();
        } else {
            self.state.current_value.push(digit);
        }
        self.applied()
    }

    /// Append a decimal point. Programmer mode is integer-only.
    pub fn input_decimal(&mut self) -> Outcome {
        if self.state.has_error || self.state.mode == Mode::Programmer {
            return Outcome::Ignored;
        }

        if self.state.is_result_displayed {
            self.state.current_value = "0".to_string();
            self.state.is_result_displayed = false;
        }

        if self.state.current_value.contains('.') {
            return Outcome::Ignored;
        }
        self.state.current_value.push('.');
        self.applied()
    }

    /// Record a binary operator, evaluating any pending operation first.
    ///
    /// `NOT` is unary and is applied immediately instead.
    pub fn input_operator(&mut self, op: Operator) -> Outcome {
        if self.state.has_error {
            return Outcome::Ignored;
        }
        if op == Operator::Bitwise(BitwiseOp::Not) {
            return self.bitwise_not();
        }

        // Chained calculation: `1 + 2 +` evaluates `1 + 2` first.
        if self.state.is_pending()
            && !self.state.is_result_displayed
            && let Outcome::Failed(err) = self.calculate()
        {
            return Outcome::Failed(err);
        }

        let operand = if op.is_bitwise() || self.state.mode == Mode::Programmer {
            self.parse_current_bits().map(Operand::Bits)
        } else {
            parse_float(&self.state.current_value).map(Operand::Number)
        };
        let Some(operand) = operand else {
            return self.fail(CalcError::InvalidResult);
        };

        self.state.previous_value = Some(operand);
        self.state.current_operator = Some(op);
        self.state.expression = format!("{} {}", self.state.current_value, op);
        self.state.is_result_displayed = true;
        debug!(operator = %op, "operator pending");
        self.applied()
    }

    /// Evaluate the pending operation.
    pub fn calculate(&mut self) -> Outcome {
        if self.state.has_error {
            return Outcome::Ignored;
        }
        let (Some(previous), Some(op)) = (self.state.previous_value, self.state.current_operator)
        else {
            return Outcome::Ignored;
        };

        let evaluated = if op.is_bitwise() || self.state.mode == Mode::Programmer {
            self.evaluate_integer(previous.as_bits(), op)
        } else {
            self.evaluate_float(previous.as_f64(), op)
        };
        let (expression, result) = match evaluated {
            Ok(pair) => pair,
            Err(err) => return self.fail(err),
        };

        debug!(%expression, %result, "calculated");
        let record = CalcRecord {
            expression,
            result: result.clone(),
            mode: self.state.mode,
        };

        self.state.current_value = result;
        self.state.previous_value = None;
        self.state.current_operator = None;
        self.state.expression.clear();
        self.state.is_result_displayed = true;

        if let Some(on_record) = &self.on_record {
            on_record(&record);
        }
        self.applied()
    }

    fn evaluate_float(&self, a: f64, op: Operator) -> Result<(String, String), CalcError> {
        let Operator::Arithmetic(op) = op else {
            return Err(CalcError::InvalidResult);
        };
        // An unparseable right operand poisons the result like any NaN.
        let b = parse_float(&self.state.current_value).unwrap_or(f64::NAN);

        let result = match op {
            ArithmeticOp::Add => a + b,
            ArithmeticOp::Subtract => a - b,
            ArithmeticOp::Multiply => a * b,
            ArithmeticOp::Divide => {
                if b == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                a / b
            }
        };

        if result == f64::INFINITY {
            return Err(CalcError::Overflow);
        }
        if !result.is_finite() {
            return Err(CalcError::InvalidResult);
        }

        let expression = format!("{} {} {}", format_number(a), op.symbol(), format_number(b));
        Ok((expression, format_number(result)))
    }

    fn evaluate_integer(&self, a: i64, op: Operator) -> Result<(String, String), CalcError> {
        // Bitwise operators treat an unparseable operand as zero.
        let b = self.parse_current_bits().unwrap_or(0);
        let width = self.state.bit_length;

        let result = match op {
            Operator::Bitwise(op) => apply_bitwise(a, op, b, width),
            Operator::Arithmetic(op) => apply_integer_arithmetic(a, op, b, width)?,
        };

        let expression = format!("{} {} {}", self.render_bits(a), op, self.render_bits(b));
        Ok((expression, self.render_bits(result)))
    }

    /// Clear everything (AC).
    pub fn clear(&mut self) -> Outcome {
        self.state.current_value = "0".to_string();
        self.state.previous_value = None;
        self.state.current_operator = None;
        self.state.expression.clear();
        self.state.is_result_displayed = false;
        self.state.has_error = false;
        self.applied()
    }

    /// Clear the entry (CE), keeping the pending operation.
    pub fn clear_entry(&mut self) -> Outcome {
        if self.state.has_error {
            return self.clear();
        }
        self.state.current_value = "0".to_string();
        self.state.is_result_displayed = false;
        self.applied()
    }

    /// Delete the last character of the value being typed.
    pub fn backspace(&mut self) -> Outcome {
        if self.state.has_error || self.state.is_result_displayed {
            return Outcome::Ignored;
        }

        let value = &mut self.state.current_value;
        value.pop();
        if value.is_empty() || value.as_str() == "-" {
            *value = "0".to_string();
        }
        self.applied()
    }

    /// Flip the sign. In programmer mode this is two's complement negation.
    ///
    /// A number still being typed has its sign flipped textually. A displayed
    /// result is negated as a float and re-formatted, so results beyond 2^53
    /// may lose precision.
    pub fn negate(&mut self) -> Outcome {
        if self.state.has_error {
            return Outcome::Ignored;
        }

        if self.state.mode == Mode::Programmer {
            let Some(bits) = self.parse_current_bits() else {
                return Outcome::Ignored;
            };
            if bits == 0 {
                return Outcome::Ignored;
            }
            let negated = clamp(bits.wrapping_neg(), self.state.bit_length);
            self.state.current_value = self.render_bits(negated);
        } else {
            let Some(number) = parse_float(&self.state.current_value) else {
                return Outcome::Ignored;
            };
            if number == 0.0 {
                return Outcome::Ignored;
            }
            let value = &mut self.state.current_value;
            if self.state.is_result_displayed {
                *value = format_number(-number);
            } else if let Some(digits) = value.strip_prefix('-') {
                *value = digits.to_string();
            } else {
                value.insert(0, '-');
            }
        }

        self.state.is_result_displayed = false;
        self.applied()
    }

    /// Divide the current value by 100.
    pub fn percent(&mut self) -> Outcome {
        if self.state.has_error {
            return Outcome::Ignored;
        }

        if self.state.mode == Mode::Programmer {
            let Some(bits) = self.parse_current_bits() else {
                return Outcome::Ignored;
            };
            self.state.current_value = self.render_bits(clamp(bits / 100, self.state.bit_length));
        } else {
            let Some(number) = parse_float(&self.state.current_value) else {
                return Outcome::Ignored;
            };
            self.state.current_value = format_number(number / 100.0);
        }

        self.state.is_result_displayed = true;
        self.applied()
    }

    /// Put the engine into the error state for `err`.
    pub(super) fn fail(&mut self, err: CalcError) -> Outcome {
        debug!(error = %err, "calculation failed");
        self.state.has_error = true;
        self.state.current_value = err.sentinel().to_string();
        self.notify();
        Outcome::Failed(err)
    }

    pub(super) fn applied(&self) -> Outcome {
        self.notify();
        Outcome::Applied
    }

    fn notify(&self) {
        if let Some(on_change) = &self.on_change {
            on_change(&self.state);
        }
    }

    /// Current value as an integer in the current base, wrapped to 64 bits.
    pub(super) fn parse_current_bits(&self) -> Option<i64> {
        parse_int(&self.state.current_value, self.state.base).map(|v| v as i64)
    }

    /// Current value as a number, reading integers in programmer mode.
    pub(super) fn current_number(&self) -> Option<f64> {
        if self.state.mode == Mode::Programmer {
            self.parse_current_bits().map(|bits| bits as f64)
        } else {
            parse_float(&self.state.current_value)
        }
    }

    pub(super) fn render_bits(&self, value: i64) -> String {
        render_word(value, self.state.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn type_digits(calc: &mut Calculator, digits: &str) {
        for digit in digits.chars() {
            calc.input_number(digit);
        }
    }

    #[test]
    fn test_clear_resets_working_registers() {
        let mut calc = Calculator::new();
        type_digits(&mut calc, "42");
        calc.input_operator(ArithmeticOp::Add.into());
        calc.clear();

        let state = calc.state();
        assert_eq!(state.current_value, "0");
        assert_eq!(state.previous_value, None);
        assert_eq!(state.current_operator, None);
        assert!(!state.has_error);
    }

    #[test]
    fn test_basic_arithmetic() {
        let cases = [
            ("10", ArithmeticOp::Add, "5", "15"),
            ("20", ArithmeticOp::Subtract, "8", "12"),
            ("6", ArithmeticOp::Multiply, "7", "42"),
            ("50", ArithmeticOp::Divide, "5", "10"),
        ];
        for (a, op, b, expected) in cases {
            let mut calc = Calculator::new();
            type_digits(&mut calc, a);
            calc.input_operator(op.into());
            type_digits(&mut calc, b);
            assert!(calc.calculate().is_applied());
            assert_eq!(calc.current_value(), expected);
        }
    }

    #[test]
    fn test_division_by_zero() {
        let mut calc = Calculator::new();
        type_digits(&mut calc, "10");
        calc.input_operator(ArithmeticOp::Divide.into());
        calc.input_number('0');

        assert_eq!(
            calc.calculate(),
            Outcome::Failed(CalcError::DivisionByZero)
        );
        assert_eq!(calc.current_value(), "Error");
        assert!(calc.has_error());
    }

    #[test]
    fn test_chained_calculation() {
        let mut calc = Calculator::new();
        calc.input_number('1');
        calc.input_operator(ArithmeticOp::Add.into());
        calc.input_number('2');
        calc.input_operator(ArithmeticOp::Add.into());
        assert_eq!(calc.current_value(), "3");
        calc.input_number('3');
        calc.calculate();
        assert_eq!(calc.current_value(), "6");
    }

    #[test]
    fn test_decimal_addition() {
        let mut calc = Calculator::new();
        calc.input_number('0');
        calc.input_decimal();
        calc.input_number('1');
        calc.input_operator(ArithmeticOp::Add.into());
        calc.input_number('0');
        calc.input_decimal();
        calc.input_number('2');
        calc.calculate();
        assert_eq!(calc.current_value(), "0.3");
    }

    #[test]
    fn test_leading_zero_and_decimal() {
        let mut calc = Calculator::new();
        calc.input_number('0');
        calc.input_number('0');
        assert_eq!(calc.current_value(), "0");
        calc.input_decimal();
        calc.input_decimal();
        assert_eq!(calc.current_value(), "0.");
        calc.input_number('5');
        assert_eq!(calc.current_value(), "0.5");
    }

    #[test]
    fn test_digit_cap() {
        let mut calc = Calculator::new();
        type_digits(&mut calc, "1234567890123456");
        assert_eq!(calc.current_value().len(), 16);
        assert!(calc.input_number('7').is_ignored());
        assert_eq!(calc.current_value(), "1234567890123456");
    }

    #[test]
    fn test_clear_entry_keeps_pending_operation() {
        let mut calc = Calculator::new();
        calc.input_number('5');
        calc.input_operator(ArithmeticOp::Add.into());
        calc.input_number('3');
        calc.clear_entry();

        let state = calc.state();
        assert_eq!(state.current_value, "0");
        assert_eq!(state.previous_value, Some(Operand::Number(5.0)));
        assert_eq!(state.current_operator, Some(Operator::Arithmetic(ArithmeticOp::Add)));
    }

    #[test]
    fn test_backspace() {
        let mut calc = Calculator::new();
        type_digits(&mut calc, "123");
        calc.backspace();
        assert_eq!(calc.current_value(), "12");
        calc.backspace();
        calc.backspace();
        assert_eq!(calc.current_value(), "0");
    }

    #[test]
    fn test_backspace_ignores_results() {
        let mut calc = Calculator::new();
        calc.input_number('9');
        calc.input_operator(ArithmeticOp::Multiply.into());
        calc.input_number('9');
        calc.calculate();
        assert!(calc.backspace().is_ignored());
        assert_eq!(calc.current_value(), "81");
    }

    #[test]
    fn test_negate_and_percent() {
        let mut calc = Calculator::new();
        calc.input_number('5');
        calc.negate();
        assert_eq!(calc.current_value(), "-5");
        calc.negate();
        assert_eq!(calc.current_value(), "5");

        calc.clear();
        type_digits(&mut calc, "50");
        calc.percent();
        assert_eq!(calc.current_value(), "0.5");

        calc.clear();
        assert!(calc.negate().is_ignored());
    }

    #[test]
    fn test_negate_keeps_typed_digits() {
        let mut calc = Calculator::new();
        type_digits(&mut calc, "9999999999999999");
        calc.negate();
        assert_eq!(calc.current_value(), "-9999999999999999");
        calc.negate();
        assert_eq!(calc.current_value(), "9999999999999999");

        calc.clear();
        calc.input_decimal();
        calc.input_number('5');
        calc.negate();
        assert_eq!(calc.current_value(), "-0.5");
        calc.input_number('1');
        assert_eq!(calc.current_value(), "-0.51");
    }

    #[test]
    fn test_error_blocks_input_until_clear() {
        let mut calc = Calculator::new();
        calc.input_number('1');
        calc.input_operator(ArithmeticOp::Divide.into());
        calc.input_number('0');
        calc.calculate();

        assert!(calc.input_number('4').is_ignored());
        assert!(calc.input_operator(ArithmeticOp::Add.into()).is_ignored());
        assert!(calc.backspace().is_ignored());
        assert_eq!(calc.current_value(), "Error");

        calc.clear_entry();
        assert!(!calc.has_error());
        calc.input_number('4');
        assert_eq!(calc.current_value(), "4");
    }

    #[test]
    fn test_overflow_reports_infinity() {
        let mut calc = Calculator::new();
        calc.set_current_value("1e308");
        calc.input_operator(ArithmeticOp::Multiply.into());
        calc.input_number('9');
        assert_eq!(calc.calculate(), Outcome::Failed(CalcError::Overflow));
        assert_eq!(calc.current_value(), "Infinity");
    }

    #[test]
    fn test_negative_overflow_reports_error() {
        let mut calc = Calculator::new();
        calc.set_current_value("-1e308");
        calc.input_operator(ArithmeticOp::Multiply.into());
        calc.input_number('9');
        assert_eq!(calc.calculate(), Outcome::Failed(CalcError::InvalidResult));
        assert_eq!(calc.current_value(), "Error");
    }

    #[test]
    fn test_calculate_when_idle_is_ignored() {
        let mut calc = Calculator::new();
        calc.input_number('7');
        assert!(calc.calculate().is_ignored());
        assert_eq!(calc.current_value(), "7");
    }

    #[test]
    fn test_set_current_value() {
        let mut calc = Calculator::new();
        calc.set_current_value("123.5");
        assert_eq!(calc.current_value(), "123.5");
        assert!(calc.state().is_result_displayed);

        calc.set_current_value("Infinity");
        assert!(calc.has_error());

        calc.set_current_value("8");
        assert!(!calc.has_error());
        assert!(calc.set_current_value("  ").is_ignored());
    }

    #[test]
    fn test_callbacks_fire() {
        let records = Arc::new(Mutex::new(Vec::new()));
        let changes = Arc::new(Mutex::new(0usize));

        let mut calc = Calculator::new();
        let sink = records.clone();
        calc.set_on_record(move |record| sink.lock().unwrap().push(record.clone()));
        let counter = changes.clone();
        calc.set_on_change(move |_| *counter.lock().unwrap() += 1);

        calc.input_number('2');
        calc.input_operator(ArithmeticOp::Multiply.into());
        calc.input_number('3');
        calc.calculate();

        let records = records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].expression, "2 × 3");
        assert_eq!(records[0].result, "6");
        assert_eq!(records[0].mode, Mode::Standard);
        assert_eq!(*changes.lock().unwrap(), 4);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut calc = Calculator::new();
        let mut snapshot = calc.state();
        snapshot.current_value = "999".to_string();
        calc.input_number('1');
        assert_eq!(calc.current_value(), "1");
    }
}
