use std::env;
use std::fs;
use std::process;

use rascal::repl::Repl;
use rascal::runtime::{Runtime, DEFAULT_GC_THRESHOLD};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone)]
enum ArgCmd {
    Repl { gc_every: usize },
    File { path: String, gc_every: usize },
    Help,
}

fn print_usage() {
    println!("Rascal v{}\n", VERSION);
    println!("Usage:");
    println!("  rascal                    Start the REPL");
    println!("  rascal --file <path>      Evaluate a file and print the final value");
    println!("  rascal --gc-every <n>     Collect once live objects exceed n (0 disables)");
    println!("  rascal -h                 Show this help message");
}

fn parse_args(args: Vec<String>) -> Result<ArgCmd, String> {
    let mut gc_every = DEFAULT_GC_THRESHOLD;
    let mut file_path: Option<String> = None;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                return Ok(ArgCmd::Help);
            }
            "--file" => {
                if i + 1 >= args.len() {
                    return Err("Error: --file requires a file path".to_string());
                }
                file_path = Some(args[i + 1].clone());
                i += 1;
            }
            "--gc-every" => {
                if i + 1 >= args.len() {
                    return Err("Error: --gc-every requires a count".to_string());
                }
                gc_every = args[i + 1]
                    .parse()
                    .map_err(|_| format!("Error: invalid count '{}'", args[i + 1]))?;
                i += 1;
            }
            arg => {
                return Err(format!("Error: Unknown argument '{}'", arg));
            }
        }
        i += 1;
    }

    if let Some(path) = file_path {
        Ok(ArgCmd::File { path, gc_every })
    } else {
        Ok(ArgCmd::Repl { gc_every })
    }
}

fn run_file(path: &str, gc_every: usize) -> Result<(), String> {
    let source =
        fs::read_to_string(path).map_err(|err| format!("Error reading {}: {}", path, err))?;
    let mut runtime = Runtime::with_gc_threshold(gc_every);
    if let Some(outcome) = runtime.rep(&source).pop() {
        println!("{}", outcome.rendered);
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let command = match parse_args(args) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("{}\n", e);
            print_usage();
            process::exit(1);
        }
    };

    match command {
        ArgCmd::Help => {
            print_usage();
        }
        ArgCmd::Repl { gc_every } => {
            println!("Rascal v{}", VERSION);
            println!("Press ctrl+d to exit\n");
            let mut repl = Repl::new(Runtime::with_gc_threshold(gc_every));
            repl.run();
        }
        ArgCmd::File { path, gc_every } => {
            if let Err(e) = run_file(&path, gc_every) {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
    }
}
