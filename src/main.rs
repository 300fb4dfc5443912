use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::process::ExitCode;

use log::debug;

use minilisp::{ErrorPolicy, Session, SessionConfig};

fn main() -> ExitCode {
    env_logger::init();

    let args = {
        let mut args = env::args();
        args.next(); // Skip the executable's name.
        args.collect::<Vec<String>>()
    };

    if args.iter().any(|x| x == "--help" || x == "-h") {
        println!("{HELP_MSG}");
        return ExitCode::SUCCESS;
    }

    let mut config = SessionConfig::default();
    let mut filename = None;
    for arg in &args {
        match arg.as_str() {
            "--keep-going" | "-k" => config.error_policy = ErrorPolicy::Continue,
            flag if flag.starts_with('-') && flag != "-" => {
                eprintln!("Unknown option '{flag}'");
                eprintln!("{USAGE}");
                return ExitCode::FAILURE;
            }
            name if filename.is_none() => filename = Some(name),
            _ => {
                eprintln!("{USAGE}");
                return ExitCode::FAILURE;
            }
        }
    }

    let Some(filename) = filename else {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };

    let reader: Box<dyn BufRead> = if filename == "-" {
        Box::new(io::stdin().lock())
    } else {
        match File::open(filename) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                eprintln!("Error opening file: {e}");
                return ExitCode::FAILURE;
            }
        }
    };

    debug!("running {filename} with {config:?}");
    let session = Session::new(config);
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();

    match session.run(reader, &mut stdout, &mut stderr) {
        Ok(outcome) => {
            debug!("finished: {outcome:?}");
            if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            // Nothing more can be reported if stderr itself is gone
            let _ = writeln!(stderr, "Error reading input: {e}");
            ExitCode::FAILURE
        }
    }
}

const USAGE: &str = "Usage: minilisp [--keep-going] <file.lisp>";

const HELP_MSG: &str = r#"Usage: minilisp [--keep-going|-k] [--help|-h] FILE

  FILE  Source file to evaluate, one expression per line ('-' for stdin)

Lines starting with ';' are comments. Each result is printed as '=> value'.

Options:
  -k, --keep-going  Report errors and continue with the next line
  -h, --help        Print this message

Set RUST_LOG=minilisp=debug for diagnostic logging."#;
