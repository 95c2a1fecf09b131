use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use log::{debug, trace, warn};
use mini_compiler::{Error, ErrorKind, Expr, Mode};
use miette::IntoDiagnostic;
use miette::WrapErr;

#[derive(Parser, Debug)]
#[command(version, about = "Tokenize, parse and evaluate small conditional expressions")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print one token per line.
    Tokenize(Input),
    /// Print the syntax tree as an S-expression.
    Parse {
        #[command(flatten)]
        input: Input,
        /// Print an indented outline instead, one node per line.
        #[arg(long)]
        tree: bool,
    },
    /// Print the value of the expression.
    Evaluate {
        #[command(flatten)]
        input: Input,
        /// One of arithmetic, logical or conditional.
        #[arg(short, long)]
        mode: Option<Mode>,
    },
    /// Read expressions from stdin, one per line.
    Repl {
        /// One of arithmetic, logical or conditional.
        #[arg(short, long)]
        mode: Option<Mode>,
    },
}

#[derive(Debug, clap::Args)]
struct Input {
    /// Expression text.
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    expression: Option<String>,
    /// Read the expression from a file instead.
    #[arg(short, long)]
    file: Option<PathBuf>,
}

impl Input {
    /// Returns a display name and the trimmed expression text.
    fn read(self) -> miette::Result<(String, String)> {
        match (self.expression, self.file) {
            (Some(expression), _) => Ok(("<input>".to_string(), expression.trim().to_string())),
            (None, Some(filename)) => {
                let file_contents = fs::read_to_string(&filename)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("reading `{}` failed", filename.display()))?;
                Ok((filename.display().to_string(), file_contents.trim().to_string()))
            }
            (None, None) => Err(miette::miette!("no expression given")),
        }
    }
}

fn print_tree(expr: &Expr<'_>, indent: usize) {
    println!("{:indent$}{}", "", expr.label(), indent = indent * 2);
    for child in expr.children() {
        print_tree(child, indent + 1);
    }
}

fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Lexical | ErrorKind::Syntactic | ErrorKind::Mode => 65,
        ErrorKind::Evaluation => 70,
    }
}

fn fail(error: Error, name: &str, source: &str) -> ! {
    let code = exit_code(error.kind());
    warn!("{:?} error in {name}", error.kind());
    eprintln!("{:?}", error.into_report(name, source));
    std::process::exit(code);
}

fn main() -> miette::Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Tokenize(input) => {
            let (name, source) = input.read()?;
            debug!("tokenizing {name}");
            let tokens = match mini_compiler::tokenize(&source) {
                Ok(tokens) => tokens,
                Err(e) => fail(e.into(), &name, &source),
            };
            for token in tokens {
                println!("{token}");
            }
            println!("EOF  null");
        }
        Commands::Parse { input, tree } => {
            let (name, source) = input.read()?;
            debug!("parsing {name}");
            let tokens = match mini_compiler::tokenize(&source) {
                Ok(tokens) => tokens,
                Err(e) => fail(e.into(), &name, &source),
            };
            trace!("{} tokens", tokens.len());
            match mini_compiler::parse(tokens) {
                Ok(ast) if tree => print_tree(&ast, 0),
                Ok(ast) => println!("{ast}"),
                Err(e) => fail(e.into(), &name, &source),
            }
        }
        Commands::Evaluate { input, mode } => {
            let (name, source) = input.read()?;
            debug!("evaluating {name} in mode {mode:?}");
            match mini_compiler::run(&source, mode) {
                Ok(outcome) => {
                    trace!("ast: {} ({} nodes)", outcome.ast, outcome.ast.node_count());
                    println!("{}", outcome.value);
                }
                Err(e) => fail(e, &name, &source),
            }
        }
        Commands::Repl { mode } => repl(mode)?,
    }
    Ok(())
}

fn repl(mode: Option<Mode>) -> miette::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    debug!("repl started in mode {mode:?}");

    loop {
        print!("> ");
        stdout.flush().into_diagnostic()?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .into_diagnostic()
            .wrap_err("reading stdin failed")?;
        if read == 0 {
            break;
        }

        let expression = line.trim();
        if expression.is_empty() {
            println!("Please enter an expression.");
            continue;
        }

        match mini_compiler::run(expression, mode) {
            Ok(outcome) => {
                trace!("ast: {}", outcome.ast);
                println!("Result: {}", outcome.value);
            }
            Err(e) => {
                warn!("{:?} error", e.kind());
                eprintln!("{:?}", e.into_report("<stdin>", expression));
            }
        }
    }
    Ok(())
}
