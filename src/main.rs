// ABOUTME: CLI entry point — runs a script file or starts an interactive REPL

use clap::Parser;
use lispkit::runtime::Runtime;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::path::PathBuf;

/// An embeddable interpreter core for a small Lisp dialect
#[derive(Parser, Debug)]
#[command(name = "lispkit")]
#[command(version = lispkit::config::VERSION)]
#[command(about = "A small embeddable Lisp interpreter")]
struct CliArgs {
    /// Script file to execute (if omitted, starts the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let mut rt = Runtime::new();
    let scope = rt.global_scope();

    if let Some(script_path) = args.script {
        run_script(&mut rt, scope, &script_path)?;
        return Ok(());
    }

    run_repl(&mut rt, scope)
}

fn run_script(rt: &mut Runtime, scope: lispkit::heap::ObjRef, path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = std::fs::File::open(path).map_err(|e| format!("cannot open {}: {}", path.display(), e))?;
    match rt.load_file(scope, &mut file) {
        Ok(_) => Ok(()),
        Err(_) => {
            let mut stderr = std::io::stderr();
            rt.print_error(&mut stderr)?;
            rt.clear_error();
            Err("evaluation failed".into())
        }
    }
}

fn run_repl(rt: &mut Runtime, scope: lispkit::heap::ObjRef) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(config)?;

    let history_file = ".lispkit_history";
    let _ = rl.load_history(history_file);

    println!("{}", lispkit::config::WELCOME_MESSAGE);
    println!("{}", lispkit::config::WELCOME_SUBTITLE);

    loop {
        let readline = rl.readline("lispkit> ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                match line.trim() {
                    "(quit)" | "(exit)" => break,
                    _ => {}
                }

                match rt.parse_value(&line, 0) {
                    Ok((value, _)) => match rt.eval(scope, value) {
                        Ok(result) => {
                            if !rt.heap.is_nil(result) {
                                print!("=> ");
                                rt.print_value(&mut std::io::stdout(), result)?;
                                println!();
                            }
                        }
                        Err(_) => {
                            rt.print_error(&mut std::io::stderr())?;
                            rt.clear_error();
                        }
                    },
                    Err(_) => {
                        rt.print_error(&mut std::io::stderr())?;
                        rt.clear_error();
                    }
                }

                // Collect after every top-level form, rooted at the global scope.
                rt.collect(&[]);
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("readline error: {}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
    Ok(())
}
