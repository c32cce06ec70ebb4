use calcdeck::calculator::{Calculator, Mode};
use calcdeck::keyboard::{self, Modifiers};
use calcdeck::script::{parse_script, run};

fn eval(line: &str) -> Calculator {
    let mut calc = Calculator::new();
    let commands = parse_script(line, &calc.state()).unwrap();
    let _ = run(&mut calc, &commands);
    calc
}

#[test]
fn scripted_arithmetic() {
    assert_eq!(eval("1 + 2 + 3 =").current_value(), "6");
    assert_eq!(eval("0.1 + 0.2 =").current_value(), "0.3");
    assert_eq!(eval("10 / 0 =").current_value(), "Error");
}

#[test]
fn scripted_programmer_mode() {
    assert_eq!(eval("prog 12 and 10 =").current_value(), "8");
    assert_eq!(eval("prog byte 12 nand 10 =").current_value(), "247");
    assert_eq!(eval("prog byte 256 + 0 =").current_value(), "0");
    assert_eq!(eval("prog hex ff dec").current_value(), "255");

    let calc = eval("prog 10 bin");
    assert_eq!(calc.current_value(), "1010");
    assert_eq!(calc.binary_display(), "1010");
}

#[test]
fn scripted_scientific_mode() {
    assert_eq!(eval("sci deg 90 sin").current_value(), "1");
    assert_eq!(eval("sci 5 factorial").current_value(), "120");
    assert_eq!(eval("sci 2 asin").current_value(), "Error");
}

#[test]
fn scripted_ascii() {
    let calc = eval("ascii:A");
    assert_eq!(calc.current_value(), "65");
    assert_eq!(calc.ascii_char(), Some('A'));
}

#[test]
fn keys_and_scripts_agree() {
    let mut by_keys = Calculator::new();
    by_keys.set_mode(Mode::Programmer);
    for key in ["1", "2", "&", "1", "0", "Enter"] {
        let action = keyboard::map_key(key, Modifiers::default(), &by_keys.state()).unwrap();
        keyboard::execute(&mut by_keys, action);
    }

    assert_eq!(by_keys.current_value(), eval("prog 12 & 10 =").current_value());
}
