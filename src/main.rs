use std::io::Write;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use treelox::{
    format::format,
    parser::Parser as LoxParser,
    session::{LoxError, Session, Step},
    tokenizer::{TokenType, Tokenizer},
    tree_walk_interpreter::{Interpreter, Value},
};

const EXIT_USAGE: i32 = 64;
const EXIT_DATA: i32 = 65;
const EXIT_IO: i32 = 74;

#[derive(Debug, Parser)]
#[command(version, about = "A tree-walking Lox interpreter")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Raise the log level (-v info, -vv debug, -vvv trace). `RUST_LOG` wins when set.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    pub fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Repl)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute a script file.
    Run(FileArgs),
    /// Read and execute statements line by line.
    Repl,
    /// Print the token stream of a file.
    Tokens(FileArgs),
    /// Print a file in canonical layout.
    Fmt(FileArgs),
}

#[derive(Debug, Args)]
struct FileArgs {
    file: String,
}

fn main() {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { EXIT_USAGE } else { 0 });
        }
    };

    init_tracing(args.verbose);

    let code = match args.command() {
        Command::Repl => repl_command(),
        Command::Run(args) => run_command(args),
        Command::Tokens(args) => tokens_command(args),
        Command::Fmt(args) => fmt_command(args),
    };
    std::process::exit(code);
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(file: &str) -> Result<String, i32> {
    std::fs::read_to_string(file).map_err(|e| {
        eprintln!("could not read {file}: {e}");
        EXIT_IO
    })
}

fn repl_command() -> i32 {
    println!("Welcome to the Lox REPL!");
    println!("EOF to exit. (Ctrl+D on *nix, Ctrl+Z on Windows)");

    let mut interpreter = Interpreter::default();
    let mut input = String::new();

    loop {
        print!("> ");
        if std::io::stdout().flush().is_err() {
            return EXIT_IO;
        }

        input.clear();
        match std::io::stdin().read_line(&mut input) {
            Ok(0) => return 0,
            Ok(_) => {}
            Err(e) => {
                eprintln!("could not read input: {e}");
                return EXIT_IO;
            }
        }

        let mut session = Session::from_source(&input, interpreter);
        loop {
            match session.step() {
                Ok(Step::Done) => break,
                Ok(Step::Executed(Value::Nil)) => {}
                Ok(Step::Executed(value)) => println!("{value}"),
                Err(e) => eprintln!("{e}"),
            }
        }
        interpreter = session.into_interpreter();
    }
}

/// Runs a script. After a static error the rest of the file is still parsed
/// and resolved so every broken statement is reported, but nothing more runs.
fn run_command(args: &FileArgs) -> i32 {
    let source = match read_source(&args.file) {
        Ok(source) => source,
        Err(code) => return code,
    };

    let mut session = Session::from_source(&source, Interpreter::default());
    let mut code = 0;
    loop {
        let result = if code == 0 {
            session.step().map(|step| step != Step::Done)
        } else {
            session.check()
        };
        match result {
            Ok(true) => {}
            Ok(false) => return code,
            Err(e @ LoxError::Runtime(_)) => {
                eprintln!("{e}");
                return e.exit_code();
            }
            Err(e) => {
                eprintln!("{e}");
                code = e.exit_code();
            }
        }
    }
}

fn tokens_command(args: &FileArgs) -> i32 {
    let source = match read_source(&args.file) {
        Ok(source) => source,
        Err(code) => return code,
    };

    let mut code = 0;
    let mut line = 0;
    for token in Tokenizer::from_source(&source) {
        let token = match token {
            Ok(token) => token,
            Err(e) => {
                eprintln!("{e}");
                code = EXIT_DATA;
                continue;
            }
        };

        if token.line != line {
            print!("{:4} ", token.line);
            line = token.line;
        } else {
            print!("   | ");
        }

        let kind = match token.token_type() {
            TokenType::String(_) => "String".to_string(),
            TokenType::Number(_) => "Number".to_string(),
            other => format!("{:?}", other),
        };
        match token.literal() {
            Some(literal) => println!("{:<12} {} ({})", kind, token.lexeme, literal),
            None => println!("{:<12} {}", kind, token.lexeme),
        }
    }
    code
}

fn fmt_command(args: &FileArgs) -> i32 {
    let source = match read_source(&args.file) {
        Ok(source) => source,
        Err(code) => return code,
    };

    let mut parser = LoxParser::from_source(&source);
    let mut code = 0;
    loop {
        match parser.next_statement() {
            Ok(treelox::ast::Statement::End) => return code,
            Ok(statement) => println!("{}", format(&statement)),
            Err(e) => {
                eprintln!("{e}");
                code = EXIT_DATA;
            }
        }
    }
}
