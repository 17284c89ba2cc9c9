//! CLI binary for the no-fixme pre-commit hook.
//!
//! This binary is a thin wrapper that parses arguments and delegates to the library.

use std::env;
use std::process::ExitCode;

use no_fixme_hook::cli::{parse_args, run, HookExit};

fn main() -> ExitCode {
    let cli = match parse_args(env::args_os()) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version also arrive here and are not failures.
            return if e.use_stderr() { HookExit::ArgumentError.into() } else { ExitCode::SUCCESS };
        }
    };

    let output = run(&cli);

    for line in output.stdout {
        println!("{line}");
    }
    for msg in output.stderr {
        eprintln!("{msg}");
    }

    output.exit_code
}
