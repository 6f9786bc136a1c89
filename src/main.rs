use clap::{Parser as ClapParser, Subcommand};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tiny::config::{Config, TreeFormat};
use tiny::diagnostics::Reporter;
use tiny::error::CompilerError;
use tiny::lexer;
use tiny::parser::Parser;

#[derive(ClapParser)]
#[command(author, version, about = "TINY language scanner and parser")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a TINY file and print one `value, KIND` line per token
    #[command(short_flag = 's')]
    Scan {
        /// Source file to scan
        input: PathBuf,
        /// Write tokens here instead of stdout
        output: Option<PathBuf>,
    },
    /// Parse a TINY file and print its syntax tree
    #[command(short_flag = 'p')]
    Parse {
        /// Source file to parse
        input: PathBuf,
        /// Write the tree here instead of stdout
        output: Option<PathBuf>,
        /// Overrides `tree_format` from the config file
        #[arg(long, value_enum)]
        format: Option<TreeFormat>,
    },
}

fn read_source(path: &Path) -> Result<String, CompilerError> {
    fs::read_to_string(path).map_err(|source| CompilerError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, CompilerError> {
    Ok(match path {
        Some(path) => Box::new(io::BufWriter::new(fs::File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}

fn scan_file(
    input: &Path,
    output: Option<&Path>,
    reporter: &mut Reporter,
) -> Result<(), CompilerError> {
    let source = read_source(input)?;
    let mut out = open_output(output)?;

    for token in lexer::tokenize(&source, reporter) {
        writeln!(out, "{}", token)?;
    }
    out.flush()?;

    Ok(())
}

fn parse_file(
    input: &Path,
    output: Option<&Path>,
    config: &Config,
    format: TreeFormat,
    reporter: &mut Reporter,
) -> Result<(), CompilerError> {
    let source = read_source(input)?;
    let (tree, root) = Parser::new(&source, reporter)
        .with_max_depth(config.max_depth)
        .parse();
    tracing::info!(%root, nodes = tree.len(), "parsed {}", input.display());

    let mut out = open_output(output)?;
    match format {
        TreeFormat::Outline => write!(out, "{}", tree)?,
        TreeFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &tree)?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_max_level(config.level())
        .with_writer(io::stderr)
        .init();

    let mut reporter = if config.echo_diagnostics {
        Reporter::stderr()
    } else {
        Reporter::buffered()
    };

    match cli.command {
        Commands::Scan { input, output } => {
            scan_file(&input, output.as_deref(), &mut reporter)?;
        }
        Commands::Parse {
            input,
            output,
            format,
        } => {
            let format = format.unwrap_or(config.tree_format);
            parse_file(&input, output.as_deref(), &config, format, &mut reporter)?;
        }
    }

    if reporter.has_errors() {
        return Err(Box::new(CompilerError::Failed {
            count: reporter.count(),
        }));
    }

    Ok(())
}
