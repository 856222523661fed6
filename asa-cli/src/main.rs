use clap::Parser;
use color_eyre::eyre;
use dialoguer::Input;
use tracing::{trace, warn};

use asa::Asa;

/// Interactive shell over an aggregating sorted associative structure of
/// 64-bit integer keys.
#[derive(Parser)]
struct Args {
    /// Keys to insert before the shell starts accepting input.
    #[clap(long, value_delimiter = ',')]
    seed: Vec<i64>,
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::try_init().map_err(|e| eyre::eyre!(e))?;

    let args = Args::parse();
    let mut asa = Asa::new();
    for key in args.seed {
        asa.insert(key);
    }

    loop {
        let input: String = Input::new().interact()?;

        if let Some(command) = input.strip_prefix('/') {
            let items = command.split_whitespace().collect::<Vec<_>>();

            match items.as_slice() {
                [] => (),
                ["quit", ..] => return Ok(()),
                ["insert", keys @ ..] => {
                    for key in keys {
                        match key.parse::<i64>() {
                            Ok(key) => {
                                asa.insert(key);
                            }
                            Err(e) => warn!(key = %key, error = %e, "not an integer"),
                        }
                    }
                }
                ["delete", keys @ ..] => {
                    for key in keys {
                        match key.parse::<i64>() {
                            Ok(key) => {
                                let outcome = asa.delete(&key);
                                if !outcome.is_success() {
                                    println!(" :: {key} not found");
                                }
                            }
                            Err(e) => warn!(key = %key, error = %e, "not an integer"),
                        }
                    }
                }
                ["search", key] => match key.parse::<i64>() {
                    Ok(key) => {
                        let (value, _) = asa.search(&key);
                        println!(" :: {}", if value.is_some() { "found" } else { "not found" });
                    }
                    Err(e) => warn!(key = %key, error = %e, "not an integer"),
                },
                ["min"] => println!(" :: {:?}", asa.min()),
                ["max"] => println!(" :: {:?}", asa.max()),
                ["sum"] => println!(" :: {}", asa.sum()),
                ["mean"] => println!(" :: {:?}", asa.mean()),
                ["median"] => println!(" :: {:?}", asa.median()),
                ["list"] => {
                    let items = asa
                        .iterate()
                        .map(|(key, count)| format!(" - {key} (x{count})"))
                        .collect::<Vec<_>>();
                    println!(" :: {} distinct keys:\n{}", items.len(), items.join("\n"));
                }
                _ => println!("unrecognised command: {}", items.join(" ")),
            }

            continue;
        }

        trace!(line = %input, "ignoring non-command input");
    }
}
