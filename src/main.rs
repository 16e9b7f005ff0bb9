use std::{env, io};

use nutshell::{NutshellOptions, NutshellRuntime, NutshellRuntimeKind, NutshellRuntimeResult};

const USAGE: &str = "Usage: nutshell init [--no-interaction|-n] [--reconfigure]";

/// Entry point of the Nutshell installer. Runs in the project root, on a single thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> NutshellRuntimeResult<()> {
    let mut args = env::args();

    // Skip the program name.
    args.next();

    match args.next() {
        Some(runtime_kind) if runtime_kind == "init" => {
            let mut options = NutshellOptions::default();

            for flag in args {
                match flag.as_str() {
                    "--no-interaction" | "-n" => options.no_interaction = true,
                    "--reconfigure" => options.reconfigure = true,
                    _ => return Err(invalid_input(&format!("Unknown option `{}`", flag))),
                }
            }

            let current_dir = env::current_dir()?;
            let mut runtime = NutshellRuntime::new(NutshellRuntimeKind::Init, current_dir, options);

            runtime.run().await
        }
        _ => Err(invalid_input("Invalid Nutshell mode!")),
    }
}

fn invalid_input(message: &str) -> io::Error {
    eprintln!("{}\nAvailable modes: 'init'", USAGE);

    io::Error::new(io::ErrorKind::InvalidInput, message.to_string())
}
