use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::runtime::Runtime;

const HISTORY_FILE: &str = ".rascal-history";

pub struct Repl {
    runtime: Runtime,
}

impl Repl {
    pub fn new(runtime: Runtime) -> Self {
        Repl { runtime }
    }

    pub fn run(&mut self) {
        let mut rl = DefaultEditor::new().unwrap();
        if rl.load_history(HISTORY_FILE).is_err() {}

        'repl_loop: loop {
            let readline = rl.readline("rascal> ");
            match readline {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue 'repl_loop;
                    }

                    if let Err(err) = rl.add_history_entry(line.as_str()) {
                        eprintln!("Error adding to history: {:?}", err);
                    }
                    if let Err(err) = rl.save_history(HISTORY_FILE) {
                        eprintln!("Error saving history: {:?}", err);
                    }

                    for outcome in self.runtime.rep(&line) {
                        if outcome.is_error {
                            println!("{}", outcome.rendered.red());
                        } else {
                            println!("{}", outcome.rendered);
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => continue 'repl_loop,
                Err(ReadlineError::Eof) => break 'repl_loop,
                Err(err) => {
                    println!("Error: {:?}", err);
                    break 'repl_loop;
                }
            }
        }
    }
}
