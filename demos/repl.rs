use minilisp::environment::Environment;
use minilisp::{ErrorPolicy, Session, SessionConfig};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    println!("minilisp - integers, symbols, lists and quote");
    println!("Enter S-expressions like: (+ 1 2)");
    println!("Type :help for more commands, or Ctrl+C to exit.");
    println!();

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("Could not initialize REPL: {err}");
            return ExitCode::FAILURE;
        }
    };

    let session = Session::new(SessionConfig {
        error_policy: ErrorPolicy::Continue,
        ..SessionConfig::default()
    });

    loop {
        match rl.readline("minilisp> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                // Add the line to history
                let _ = rl.add_history_entry(line);

                match line {
                    ":help" => {
                        print_help();
                        continue;
                    }
                    ":env" => {
                        print_environment(session.environment());
                        continue;
                    }
                    ":quit" | ":exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => {}
                }

                match session.eval_line(line) {
                    Ok(Some(result)) => println!("=> {result}"),
                    Ok(None) => {} // comment
                    Err(e) => println!("Error: {e:#}"),
                }
            }

            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

fn print_help() {
    println!("minilisp REPL:");
    println!("  :help      - Show this help message");
    println!("  :env       - Show current environment bindings");
    println!("  :quit      - Exit the interpreter");
    println!("  :exit      - Exit the interpreter");
    println!("  Ctrl+C     - Exit the interpreter");
    println!();
    println!("Supported forms:");
    println!("  Integers: 42, -5");
    println!("  Arithmetic: +, -, *, / (any number of arguments)");
    println!("  Quoting: (quote x) or 'x");
    println!("  Comments: lines starting with ';'");
    println!();
    println!("Examples:");
    println!("  (+ 3 1)");
    println!("  (- 5 2 1)");
    println!("  '(a b c)");
    println!();
}

fn print_environment(env: &Environment) {
    if env.is_empty() {
        println!("Environment is empty.");
        return;
    }

    println!("Environment bindings ({} total, most recent first):", env.len());
    for (name, value) in env.bindings() {
        println!("  {name:<8} = {value}");
    }
}
