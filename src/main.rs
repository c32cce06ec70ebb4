use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calcdeck::calculator::{
    AngleMode, Base, BitLength, CalcRecord, Calculator, Mode, copy_to_clipboard,
    paste_from_clipboard,
};
use calcdeck::config::{Config, HistoryConfig};
use calcdeck::history::History;
use calcdeck::script;

#[derive(Parser, Debug)]
#[command(name = "calcdeck")]
#[command(version)]
#[command(about = "Standard, scientific and programmer calculator", long_about = None)]
struct Args {
    /// Calculator mode (standard, scientific, programmer)
    #[arg(long)]
    mode: Option<Mode>,

    /// Base for programmer mode (bin, oct, dec, hex or 2, 8, 10, 16)
    #[arg(long)]
    base: Option<Base>,

    /// Integer width for programmer mode (8, 16, 32, 64)
    #[arg(long)]
    bits: Option<BitLength>,

    /// Angle unit for trigonometry (deg, rad)
    #[arg(long)]
    angle: Option<AngleMode>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Do not read or write calculation history
    #[arg(long)]
    no_history: bool,

    /// Copy the final value to the clipboard
    #[arg(long)]
    copy: bool,

    /// Script words to run once, e.g. `12 + 3 =`. Reads stdin when empty.
    #[arg(value_name = "WORDS", trailing_var_arg = true, allow_hyphen_values = true)]
    script: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calcdeck=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    let mut config =
        Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(base) = args.base {
        config.base = base;
    }
    if let Some(bits) = args.bits {
        config.bit_length = bits;
    }
    if let Some(angle) = args.angle {
        config.angle_mode = angle;
    }
    if args.no_history {
        config.history.enabled = false;
    }

    let history = Arc::new(Mutex::new(open_history(&config.history)));

    let mut calc = Calculator::new();
    config.apply(&mut calc);

    let recorder = Arc::clone(&history);
    calc.set_on_record(move |record| {
        record_into(&recorder, record);
    });

    info!(mode = %config.mode, base = %config.base, bits = config.bit_length.bits(), "calculator ready");

    if args.script.is_empty() {
        return repl(&mut calc, &history);
    }

    run_line(&mut calc, &args.script.join(" "))?;
    print_value(&calc);
    if args.copy {
        copy_to_clipboard(calc.current_value()).context("Failed to copy result")?;
    }
    Ok(())
}

fn open_history(config: &HistoryConfig) -> History {
    match config.resolved_path() {
        Some(path) if config.enabled => History::open(path, config.max_items),
        _ => History::in_memory(config.max_items),
    }
}

/// Add a finished calculation to the shared history. Returns whether it was kept.
fn record_into(history: &Mutex<History>, record: &CalcRecord) -> bool {
    match history.lock() {
        Ok(mut history) => history.add(record),
        Err(_) => {
            warn!(expression = %record.expression, "history lock poisoned, record dropped");
            false
        }
    }
}

fn lock(history: &Mutex<History>) -> Result<MutexGuard<'_, History>> {
    history.lock().map_err(|_| anyhow!("History lock poisoned"))
}

fn run_line(calc: &mut Calculator, line: &str) -> Result<()> {
    let commands = script::parse_script(line, &calc.state())?;
    if let Err(err) = script::run(calc, &commands) {
        debug!(error = %err, "line ended in error state");
    }
    Ok(())
}

fn print_value(calc: &Calculator) {
    println!("{}", calc.current_value());

    if calc.mode() == Mode::Programmer && !calc.has_error() {
        let values = calc.values_in_all_bases();
        let line: Vec<String> = Base::ALL
            .iter()
            .map(|base| format!("{} {}", base.label(), values.get(*base)))
            .collect();
        println!("{}", line.join("  "));
    }
}

fn repl(calc: &mut Calculator, history: &Mutex<History>) -> Result<()> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read input")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let result = match line.strip_prefix(':') {
            Some(command) => repl_command(calc, history, command),
            None => run_line(calc, line).map(|()| {
                print_value(calc);
                false
            }),
        };

        match result {
            Ok(true) => break,
            Ok(false) => {}
            Err(err) => eprintln!("{:#}", err),
        }
    }
    Ok(())
}

/// Run a `:command`. Returns `true` when the session should end.
fn repl_command(calc: &mut Calculator, history: &Mutex<History>, command: &str) -> Result<bool> {
    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();

    match name {
        "q" | "quit" | "exit" => return Ok(true),
        "history" => {
            let history = lock(history)?;
            if history.is_empty() {
                println!("(no history)");
            }
            for (i, entry) in history.entries().iter().enumerate() {
                println!("{:>3}  {}", i + 1, entry.summary());
            }
        }
        "clear-history" => lock(history)?.clear(),
        "recall" => {
            let index: usize = words
                .next()
                .context("Usage: :recall N")?
                .parse()
                .context("History index must be a number")?;
            let result = lock(history)?
                .get(index.wrapping_sub(1))
                .map(|entry| entry.result.clone())
                .with_context(|| format!("No history entry {}", index))?;
            calc.set_current_value(&result);
            print_value(calc);
        }
        "copy" => {
            copy_to_clipboard(calc.current_value()).context("Failed to copy result")?;
            println!("copied {}", calc.current_value());
        }
        "paste" => {
            let Some(text) = paste_from_clipboard().context("Failed to paste")? else {
                bail!("Clipboard does not hold a number");
            };
            calc.set_current_value(&text);
            print_value(calc);
        }
        "state" => {
            let state = calc.state();
            println!(
                "{} {} {} {} memory={}{}",
                state.mode,
                state.angle_mode,
                state.base,
                state.bit_length,
                state.memory_value,
                if state.expression.is_empty() {
                    String::new()
                } else {
                    format!(" pending=\"{}\"", state.expression)
                }
            );
        }
        other => bail!("Unknown command :{}", other),
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn record() -> CalcRecord {
        CalcRecord {
            expression: "2 × 3".to_string(),
            result: "6".to_string(),
            mode: Mode::Standard,
        }
    }

    #[test]
    fn test_record_into_history() {
        let history = Mutex::new(History::in_memory(10));
        assert!(record_into(&history, &record()));
        assert_eq!(history.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_record_into_poisoned_history_is_dropped() {
        let history = Arc::new(Mutex::new(History::in_memory(10)));
        let holder = Arc::clone(&history);
        let _ = thread::spawn(move || {
            let _guard = holder.lock().unwrap();
            panic!("panic while holding the history lock");
        })
        .join();

        assert!(history.is_poisoned());
        assert!(!record_into(&history, &record()));
    }
}
