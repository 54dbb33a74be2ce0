use std::io::{Read, Write};

use clap::Parser;
use passageiq::{Analysis, ModelManager, analyze, error, report};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{AnalyzeArgs, Cli, Command};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("PASSAGEIQ_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Analyze(args) => {
            cmd_analyze(cli.model.as_deref(), &args)?;
        }
        Command::Completions(args) => {
            args.generate();
        }
    }

    Ok(())
}

fn read_content(args: &AnalyzeArgs) -> error::Result<String> {
    match &args.input {
        Some(path) if !args.reads_stdin() => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut content = String::new();
            std::io::stdin().read_to_string(&mut content)?;
            Ok(content)
        }
    }
}

fn cmd_analyze(model_id: Option<&str>, args: &AnalyzeArgs) -> error::Result<()> {
    args.check_outputs()?;
    let content = read_content(args)?;
    let model = ModelManager::shared(model_id);

    let analysis =
        analyze(model, &content, args.query.as_deref(), &args.options())?;
    let result = match analysis {
        Analysis::Empty => {
            eprintln!("Warning: {}", report::EMPTY_CONTENT_WARNING);
            return Ok(());
        }
        Analysis::Complete(result) => result,
    };

    let csv_to_stdout = args.csv_to_stdout();
    let mut stdout = std::io::stdout().lock();

    if args.json {
        report::write_json(&mut stdout, &result)?;
    } else if !csv_to_stdout {
        report::write_human(&mut stdout, &result, !args.no_chart)?;
    }

    if let Some(path) = &args.csv {
        if csv_to_stdout {
            result.write_csv(&mut stdout)?;
        } else {
            result.write_csv(std::fs::File::create(path)?)?;
            eprintln!("Saved results to {}", path.display());
        }
    }

    stdout.flush()?;
    Ok(())
}
