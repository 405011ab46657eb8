use clap::{Arg, ArgAction, Command};

use pushdown::loader::{self, Context};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let matches = Command::new("pushdown")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile a pushdown machine description and run input strings against it")
        .arg_required_else_help(true)
        .arg(
            Arg::new("machine")
                .help("Path to the machine description")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("input")
                .help("Input strings to run against the machine")
                .action(ArgAction::Append)
                .index(2),
        )
        .arg(
            Arg::new("emit-json")
                .long("emit-json")
                .help("Print the compiled machine as JSON")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let path = matches
        .get_one::<String>("machine")
        .expect("machine path is required");
    let src = match std::fs::read_to_string(path) {
        Ok(src) => src,
        Err(err) => {
            eprintln!("error: cannot read {path}: {err}");
            std::process::exit(2);
        }
    };

    let mut ctx = Context::new(&src);
    let machine = loader::load(&mut ctx);
    for log in ctx.logs_display() {
        eprint!("{log}");
    }
    let Some(machine) = machine else {
        std::process::exit(1);
    };

    if matches.get_flag("emit-json") {
        #[cfg(feature = "serde")]
        match serde_json::to_string_pretty(&machine) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("error: cannot serialize machine: {err}"),
        }
        #[cfg(not(feature = "serde"))]
        eprintln!("error: --emit-json requires the 'serde' feature");
    }

    let mut failed = false;
    for input in matches.get_many::<String>("input").into_iter().flatten() {
        match machine.process(input) {
            Ok(true) => println!("'{input}': accepted"),
            Ok(false) => println!("'{input}': rejected"),
            Err(err) => {
                eprintln!("'{input}': error: {err}");
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}
