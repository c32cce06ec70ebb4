//! Keyboard mapping: turns key names into calculator actions.
//!
//! Key names follow the DOM `KeyboardEvent.key` convention (`"Enter"`,
//! `"Escape"`, `"a"`, `"+"`), which is also what most terminal and GUI
//! toolkits report for printable keys.

use crate::calculator::{
    ArithmeticOp, Base, BitwiseOp, CalcState, Calculator, Mode, Operator, Outcome,
};

/// Keys that never map to an action on their own.
const IGNORED_KEYS: &[&str] = &["Tab", "CapsLock", "Shift", "Control", "Alt", "Meta"];

/// Modifier keys held while a key is pressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }

    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub fn is_command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// What a key press asks the calculator (or its host) to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Number(char),
    Hex(char),
    Operator(ArithmeticOp),
    Bitwise(BitwiseOp),
    Not,
    Percent,
    Decimal,
    Equals,
    Clear,
    ClearEntry,
    Backspace,
    Negate,
    /// Copy the current value. Handled by the host.
    Copy,
    /// Paste a value. Handled by the host.
    Paste,
    /// Toggle the history list. Handled by the host.
    History,
    /// Open settings. Handled by the host.
    Settings,
    /// Reserved. Handled by the host.
    Undo,
    /// Show key help. Handled by the host.
    Help,
}

impl KeyAction {
    /// Whether the action is a host shortcut rather than engine input.
    pub fn is_shortcut(&self) -> bool {
        matches!(
            self,
            Self::Copy | Self::Paste | Self::History | Self::Settings | Self::Undo | Self::Help
        )
    }
}

/// Map a key press to an action, given the current calculator state.
///
/// Returns `None` for keys with no binding, modifier keys on their own, and
/// digits or hex letters that the active base cannot represent.
pub fn map_key(key: &str, modifiers: Modifiers, state: &CalcState) -> Option<KeyAction> {
    if IGNORED_KEYS.contains(&key) {
        return None;
    }

    if modifiers.is_command()
        && let Some(action) = shortcut(key)
    {
        return Some(action);
    }

    match key {
        "F1" => return Some(KeyAction::Help),
        "F9" => return Some(KeyAction::Negate),
        _ => {}
    }

    let programmer = state.mode == Mode::Programmer;
    if let Some(action) = standard_key(key) {
        if programmer
            && let KeyAction::Number(digit) = action
            && !state.base.accepts(digit)
        {
            return None;
        }
        return Some(action);
    }

    if programmer {
        return programmer_key(key, state.base);
    }
    None
}

/// Run an engine action. Shortcut actions are left to the host and ignored here.
pub fn execute(calc: &mut Calculator, action: KeyAction) -> Outcome {
    match action {
        KeyAction::Number(digit) => calc.input_number(digit),
        KeyAction::Hex(digit) => calc.input_hex_digit(digit),
        KeyAction::Operator(op) => calc.input_operator(Operator::Arithmetic(op)),
        KeyAction::Bitwise(op) => calc.bitwise_operation(op),
        KeyAction::Not => calc.bitwise_operation(BitwiseOp::Not),
        KeyAction::Percent => calc.percent(),
        KeyAction::Decimal => calc.input_decimal(),
        KeyAction::Equals => calc.calculate(),
        KeyAction::Clear => calc.clear(),
        KeyAction::ClearEntry => calc.clear_entry(),
        KeyAction::Backspace => calc.backspace(),
        KeyAction::Negate => calc.negate(),
        KeyAction::Copy
        | KeyAction::Paste
        | KeyAction::History
        | KeyAction::Settings
        | KeyAction::Undo
        | KeyAction::Help => Outcome::Ignored,
    }
}

fn shortcut(key: &str) -> Option<KeyAction> {
    match key.to_lowercase().as_str() {
        "c" => Some(KeyAction::Copy),
        "v" => Some(KeyAction::Paste),
        "h" => Some(KeyAction::History),
        "," => Some(KeyAction::Settings),
        "z" => Some(KeyAction::Undo),
        _ => None,
    }
}

fn standard_key(key: &str) -> Option<KeyAction> {
    let action = match key {
        "+" => KeyAction::Operator(ArithmeticOp::Add),
        "-" => KeyAction::Operator(ArithmeticOp::Subtract),
        "*" => KeyAction::Operator(ArithmeticOp::Multiply),
        "/" => KeyAction::Operator(ArithmeticOp::Divide),
        "%" => KeyAction::Percent,
        "." | "," => KeyAction::Decimal,
        "Enter" | "=" => KeyAction::Equals,
        "Escape" => KeyAction::Clear,
        "Delete" => KeyAction::ClearEntry,
        "Backspace" => KeyAction::Backspace,
        _ => return single_char(key).filter(char::is_ascii_digit).map(KeyAction::Number),
    };
    Some(action)
}

fn programmer_key(key: &str, base: Base) -> Option<KeyAction> {
    let action = match key {
        "&" => KeyAction::Bitwise(BitwiseOp::And),
        "|" => KeyAction::Bitwise(BitwiseOp::Or),
        "^" => KeyAction::Bitwise(BitwiseOp::Xor),
        "<" => KeyAction::Bitwise(BitwiseOp::Lsh),
        ">" => KeyAction::Bitwise(BitwiseOp::Rsh),
        "~" => KeyAction::Not,
        _ => {
            let c = single_char(key)?.to_ascii_uppercase();
            if !('A'..='F').contains(&c) || base != Base::Hex {
                return None;
            }
            KeyAction::Hex(c)
        }
    };
    Some(action)
}

fn single_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn programmer_state(base: Base) -> CalcState {
        CalcState {
            mode: Mode::Programmer,
            base,
            ..CalcState::default()
        }
    }

    #[test]
    fn test_standard_keys() {
        let state = CalcState::default();
        let none = Modifiers::default();

        assert_eq!(map_key("7", none, &state), Some(KeyAction::Number('7')));
        assert_eq!(
            map_key("*", none, &state),
            Some(KeyAction::Operator(ArithmeticOp::Multiply))
        );
        assert_eq!(map_key(",", none, &state), Some(KeyAction::Decimal));
        assert_eq!(map_key("Enter", none, &state), Some(KeyAction::Equals));
        assert_eq!(map_key("Delete", none, &state), Some(KeyAction::ClearEntry));
    }

    #[test]
    fn test_modifier_keys_ignored() {
        let state = CalcState::default();
        assert_eq!(map_key("Shift", Modifiers::default(), &state), None);
        assert_eq!(map_key("Control", Modifiers::ctrl(), &state), None);
    }

    #[test]
    fn test_shortcuts_need_command_modifier() {
        let state = CalcState::default();
        assert_eq!(map_key("c", Modifiers::ctrl(), &state), Some(KeyAction::Copy));
        assert_eq!(map_key("V", Modifiers::ctrl(), &state), Some(KeyAction::Paste));

        let meta = Modifiers {
            meta: true,
            ..Modifiers::default()
        };
        assert_eq!(map_key("h", meta, &state), Some(KeyAction::History));
        assert_eq!(map_key("c", Modifiers::default(), &state), None);
    }

    #[test]
    fn test_function_keys() {
        let state = CalcState::default();
        assert_eq!(map_key("F1", Modifiers::default(), &state), Some(KeyAction::Help));
        assert_eq!(map_key("F9", Modifiers::default(), &state), Some(KeyAction::Negate));
    }

    #[test]
    fn test_hex_and_bitwise_only_in_programmer_mode() {
        let none = Modifiers::default();
        assert_eq!(map_key("a", none, &CalcState::default()), None);
        assert_eq!(map_key("&", none, &CalcState::default()), None);

        let hex = programmer_state(Base::Hex);
        assert_eq!(map_key("a", none, &hex), Some(KeyAction::Hex('A')));
        assert_eq!(
            map_key("&", none, &hex),
            Some(KeyAction::Bitwise(BitwiseOp::And))
        );
        assert_eq!(map_key("~", none, &hex), Some(KeyAction::Not));
    }

    #[test]
    fn test_keys_validated_against_base() {
        let none = Modifiers::default();
        let bin = programmer_state(Base::Bin);
        assert_eq!(map_key("1", none, &bin), Some(KeyAction::Number('1')));
        assert_eq!(map_key("2", none, &bin), None);
        assert_eq!(map_key("f", none, &programmer_state(Base::Dec)), None);
    }

    #[test]
    fn test_execute_drives_engine() {
        let mut calc = Calculator::new();
        let state = calc.state();
        for key in ["1", "2", "+", "3", "Enter"] {
            let action = map_key(key, Modifiers::default(), &state).unwrap();
            execute(&mut calc, action);
        }
        assert_eq!(calc.current_value(), "15");
    }

    #[test]
    fn test_shortcuts_not_executed() {
        let mut calc = Calculator::new();
        assert!(KeyAction::Copy.is_shortcut());
        assert!(execute(&mut calc, KeyAction::Copy).is_ignored());
    }
}
