use minischeme::Error;
use minischeme::ast::Value;
use minischeme::config::Config;
use minischeme::evaluator::{self, Environment};
use minischeme::scheme::parse_program;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::{Path, PathBuf};
use std::{fs, panic, process};

const PROMPT: &str = "scheme> ";
const CONTINUATION_PROMPT: &str = "   ...> ";

struct Options {
    config: Config,
    quiet: bool,
    file: Option<PathBuf>,
}

fn print_usage() {
    println!("Usage: minischeme [options] [FILE]");
    println!("Options:");
    println!("  -h, --help: Print this help message");
    println!("  --max-depth <n>: Fail evaluation nested deeper than n (default: unlimited)");
    println!("  --no-comments: Do not treat ';' as a line comment");
    println!("  -q, --quiet: Do not print the banner");
    println!("With FILE, evaluate every expression in it and exit; otherwise start a REPL.");
}

fn parse_options() -> Result<Options, String> {
    let mut args = pico_args::Arguments::from_env();

    if args.contains(["-h", "--help"]) {
        print_usage();
        process::exit(0);
    }

    let mut config = Config::default();
    if let Some(limit) = args
        .opt_value_from_str::<_, usize>("--max-depth")
        .map_err(|e| e.to_string())?
    {
        config = config.with_max_eval_depth(limit);
    }
    if args.contains("--no-comments") {
        config = config.without_comments();
    }
    let quiet = args.contains(["-q", "--quiet"]);

    let file = args
        .opt_free_from_str::<PathBuf>()
        .map_err(|e| e.to_string())?;

    let remaining = args.finish();
    if !remaining.is_empty() {
        return Err(format!("unexpected arguments: {remaining:?}"));
    }

    Ok(Options {
        config,
        quiet,
        file,
    })
}

/// Install a log subscriber, only when RUST_LOG asks for one
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    if std::env::var("RUST_LOG").is_ok() {
        let filter = EnvFilter::from_default_env();
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .init();
    }
}

fn main() {
    init_tracing();

    let options = match parse_options() {
        Ok(options) => options,
        Err(msg) => {
            eprintln!("Error: {msg}");
            print_usage();
            process::exit(2);
        }
    };

    let result = panic::catch_unwind(|| match &options.file {
        Some(path) => run_script(path, options.config),
        None => run_repl(options.config, options.quiet),
    });

    match result {
        Ok(status) => process::exit(status),
        Err(panic_info) => {
            eprintln!("The interpreter encountered an unexpected error and must exit.");

            if let Some(msg) = panic_info.downcast_ref::<&str>() {
                eprintln!("Error: {msg}");
            } else if let Some(msg) = panic_info.downcast_ref::<String>() {
                eprintln!("Error: {msg}");
            } else {
                eprintln!("Error: Unknown panic occurred");
            }

            process::exit(1);
        }
    }
}

/// Evaluate every expression in a file, printing each result. The first
/// error ends the run with status 1.
fn run_script(path: &Path, config: Config) -> i32 {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: cannot read {}: {e}", path.display());
            return 1;
        }
    };

    let program = match parse_program(&source, config.parse_config()) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let mut env = evaluator::create_global_env_with_config(config);
    for expr in &program {
        match evaluator::eval(expr, &mut env) {
            Ok(result) => println!("{result}"),
            Err(Error::Exit) => return 0,
            Err(e) => {
                eprintln!("Error: {e}");
                return 1;
            }
        }
    }

    0
}

fn run_repl(config: Config, quiet: bool) -> i32 {
    if !quiet {
        println!("minischeme - a small Scheme evaluator");
        println!("Enter S-expressions like: (+ 1 2)");
        println!("Type :help for more commands, or Ctrl+D to exit.");
        println!();
    }

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Error: could not initialize line editor: {e}");
            return 1;
        }
    };
    let mut env = evaluator::create_global_env_with_config(config);

    // Lines of an expression that is still missing closing parentheses
    let mut pending = String::new();

    loop {
        let prompt = if pending.is_empty() {
            PROMPT
        } else {
            CONTINUATION_PROMPT
        };

        match rl.readline(prompt) {
            Ok(line) => {
                if pending.is_empty() {
                    let command = line.trim();
                    if command.is_empty() {
                        continue;
                    }
                    match command {
                        ":help" => {
                            let _ = rl.add_history_entry(command);
                            print_help();
                            continue;
                        }
                        ":env" => {
                            let _ = rl.add_history_entry(command);
                            print_environment(&env);
                            continue;
                        }
                        ":quit" | ":exit" => {
                            if !quiet {
                                println!("Goodbye!");
                            }
                            return 0;
                        }
                        _ => {}
                    }
                }

                pending.push_str(&line);
                pending.push('\n');

                let program = match parse_program(&pending, config.parse_config()) {
                    Err(Error::ParseError(e)) if e.is_incomplete() => continue,
                    other => other,
                };
                let _ = rl.add_history_entry(pending.trim_end());
                pending.clear();

                let program = match program {
                    Ok(program) => program,
                    Err(e) => {
                        eprintln!("Error: {e}");
                        continue;
                    }
                };

                for expr in &program {
                    match evaluator::eval(expr, &mut env) {
                        Ok(result) => println!("{result}"),
                        Err(Error::Exit) => return 0,
                        Err(e) => {
                            eprintln!("Error: {e}");
                            break;
                        }
                    }
                }
            }

            Err(ReadlineError::Eof | ReadlineError::Interrupted) => {
                if !quiet {
                    println!("Goodbye!");
                }
                return 0;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                return 1;
            }
        }
    }
}

fn print_help() {
    println!("minischeme commands:");
    println!("  :help      - Show this help message");
    println!("  :env       - Show current environment bindings");
    println!("  :quit      - Exit the interpreter");
    println!("  :exit      - Exit the interpreter");
    println!("  Ctrl+D     - Exit the interpreter");
    println!();
    println!("Data: integers (42, -5), booleans (#t, #f), symbols, lists ('(1 2 3), '(1 . 2))");
    println!();
    println!("Special forms: quote, lambda, define, cond, if, and, or");
    println!("Lists: list, cons, car, cdr, append, assoc");
    println!("Predicates: list?, null?, empty?, symbol?, function?, equal?, not");
    println!("Arithmetic: +, -, *   Comparison: =, <, >, <=, >=");
    println!("Other: exit");
    println!();
    println!("Examples:");
    println!("  (define (square x) (* x x))");
    println!("  (square 5)");
    println!("  (append '(1 2) '(3 4))");
    println!("  (cond ((null? '()) 'empty) (else 'full))");
    println!();
}

fn print_environment(env: &Environment) {
    let bindings = env.get_all_bindings();

    println!("Environment bindings ({} total):", bindings.len());
    println!();

    // Separate built-in functions from user-defined values
    let mut builtins = Vec::new();
    let mut user_defined = Vec::new();

    for (name, value) in bindings {
        match value {
            Value::Builtin(_) => builtins.push(name),
            _ => user_defined.push((name, value)),
        }
    }

    if !builtins.is_empty() {
        println!("Built-in procedures and special forms ({}):", builtins.len());
        // Print in columns for readability
        let mut col = 0;
        for name in builtins {
            print!("  {name:<15}");
            col += 1;
            if col % 4 == 0 {
                println!();
            }
        }
        if col % 4 != 0 {
            println!();
        }
        println!();
    }

    if !user_defined.is_empty() {
        println!("User-defined values ({}):", user_defined.len());
        for (name, value) in user_defined {
            println!("  {name} = {value}");
        }
    }
}
