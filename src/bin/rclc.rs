use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::Level;

use rclc_engine::engine::{ConvertRequest, FinancialRequest};
use rclc_engine::financial::FinancialParameters;
use rclc_engine::router::dispatch_json;
use rclc_engine::{CalculationRequest, Engine, EngineConfig, Mode, NumberSystem};

#[derive(Parser, Debug)]
#[command(name = "rclc", version, about = "Multi-mode calculator")]
struct Cli {
    /// Engine settings (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging on stderr: -v info, -vv debug
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate an expression.
    Calc {
        expression: String,
        /// basic, scientific, financial, or programming
        #[arg(long, default_value = "basic")]
        mode: Mode,
        /// Number system of literals and results: decimal, octal, hexadecimal, binary
        #[arg(long, default_value = "decimal")]
        base: NumberSystem,
        #[arg(long)]
        session: Option<String>,
    },
    /// Convert an integer between bases.
    Convert {
        value: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Run a financial formula, e.g. `financial loan_payment -p principal=1000 -p rate=0.05 -p years=2`.
    Financial {
        calculation_type: String,
        /// Parameter as key=value; repeatable
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, f64)>,
    },
    /// Read one JSON request per line from stdin, write one JSON response per line.
    Batch,
}

fn parse_param(s: &str) -> Result<(String, f64), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("bad value for '{}': {}", key, e))?;
    Ok((key.trim().to_string(), value))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn run_batch(engine: &Engine) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in stdin.lock().lines() {
        let line = line.context("Read request from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        writeln!(out, "{}", dispatch_json(engine, &line)).context("Write response")?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let engine = Engine::new(config);

    match cli.cmd {
        Command::Calc {
            expression,
            mode,
            base,
            session,
        } => {
            let mut req = CalculationRequest::new(&expression, mode, base);
            req.session_id = session;
            let res = engine.calculate(&req);
            match res.error {
                None => println!("{}", res.formatted_result),
                Some(err) => anyhow::bail!(err),
            }
        }
        Command::Convert { value, from, to } => {
            let res = engine.convert_number(&ConvertRequest {
                value,
                from_base: from,
                to_base: to,
            })?;
            println!("{}", res.converted);
        }
        Command::Financial {
            calculation_type,
            params,
        } => {
            let parameters: FinancialParameters = params.into_iter().collect();
            let res = engine.financial(&FinancialRequest {
                calculation_type,
                parameters,
            })?;
            println!("{}", res.formatted_result);
        }
        Command::Batch => run_batch(&engine)?,
    }
    Ok(())
}
