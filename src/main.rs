//! Circuit Illustrator CLI
//!
//! Usage:
//!   circuit-illustrator [OPTIONS] [FILE]
//!
//! Options:
//!   -s, --stylesheet <FILE>  Stylesheet file for colors and font (TOML format)
//!   -W, --width <N>          Drawing surface width
//!   -H, --height <N>         Drawing surface height
//!   -f, --font-size <PX>     Label font size
//!   -d, --debug              Dump the circuit model and geometry to stderr
//!   -h, --help               Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use clap::Parser;
use log::{debug, info, LevelFilter};

use circuit_illustrator::{render_with_config, RenderConfig, RenderError, Stylesheet};

#[derive(Parser, Debug)]
#[command(name = "circuit-illustrator")]
#[command(about = "Draw quantum circuit descriptions as SVG")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Stylesheet file for colors and font (TOML format)
    #[arg(short, long)]
    stylesheet: Option<PathBuf>,

    /// Drawing surface width
    #[arg(short = 'W', long, default_value_t = 800)]
    width: i32,

    /// Drawing surface height
    #[arg(short = 'H', long, default_value_t = 400)]
    height: i32,

    /// Label font size, overriding the stylesheet
    #[arg(short, long)]
    font_size: Option<f64>,

    /// Fail when the surface is too small instead of drawing a cramped layout
    #[arg(long)]
    strict: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Debug mode: dump the circuit model and geometry to stderr
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_level = LevelFilter::from_str(&cli.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", cli.log_level);
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    debug!(cli:?; "Parsed arguments");

    // If no input file and stdin is a terminal (interactive), show intro help
    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let mut stylesheet = match &cli.stylesheet {
        Some(path) => match Stylesheet::from_file(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading stylesheet '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Stylesheet::default(),
    };
    if let Some(size) = cli.font_size {
        stylesheet.font.size = size;
    }

    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    process::exit(1);
                }
            }
        }
    };

    let config = RenderConfig::new()
        .with_stylesheet(stylesheet)
        .with_surface(cli.width, cli.height)
        .with_strict(cli.strict)
        .with_debug(cli.debug);

    match render_with_config(&source, config) {
        Ok(svg) => {
            println!("{}", svg);
            info!(bytes = svg.len(); "Rendered circuit");
        }
        Err(RenderError::Parse(e)) => {
            eprint!("{}", e.format(&source, &filename));
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn print_intro() {
    println!(
        r#"Circuit Illustrator - Draw quantum circuit descriptions as SVG

USAGE:
    circuit-illustrator [OPTIONS] [FILE]
    echo '<code>' | circuit-illustrator

OPTIONS:
    -s, --stylesheet   Custom colors and font (TOML file)
    -W, --width        Drawing surface width (default 800)
    -H, --height       Drawing surface height (default 400)
    -f, --font-size    Label font size
    --strict           Fail if the circuit does not fit the surface
    --log-level        Log verbosity (default warn)
    -d, --debug        Dump model and geometry to stderr
    -h, --help         Print help

QUICK START:
    printf 'qubits 2\nh q0\ncnot q0,q1\nmeasure\n' | circuit-illustrator > bell.svg

This draws a Bell-pair preparation followed by measurement of both qubits."#
    );
}
