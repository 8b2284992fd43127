//! Replay a JSON Lines landmark recording through the gesture pipeline.
//!
//! ```text
//! gesture-replay <frames.jsonl> [--config <file>] [--output <file>] [--json]
//! ```
//!
//! Records go to stdout unless `--output` is given; logs and the session
//! summary go to stderr. Set `RUST_LOG` to change log verbosity.

use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

use gesture_analysis::{
    replay, AnalysisConfig, CsvRecordSink, GesturePipeline, JsonLinesRecordSink, RecordSink,
};
use tracing_subscriber::EnvFilter;

struct Args {
    input: String,
    config: Option<String>,
    output: Option<String>,
    json: bool,
}

const USAGE: &str = "usage: gesture-replay <frames.jsonl> [--config <file>] [--output <file>] [--json]";

fn parse_args() -> Option<Args> {
    let mut args = env::args().skip(1);
    let mut input = None;
    let mut config = None;
    let mut output = None;
    let mut json = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(args.next()?),
            "--output" => output = Some(args.next()?),
            "--json" => json = true,
            flag if flag.starts_with("--") => return None,
            _ if input.is_none() => input = Some(arg),
            _ => return None,
        }
    }

    Some(Args {
        input: input?,
        config,
        output,
        json,
    })
}

fn open_sink(args: &Args) -> gesture_core::Result<Box<dyn RecordSink>> {
    let sink: Box<dyn RecordSink> = match (&args.output, args.json) {
        (Some(path), true) => Box::new(JsonLinesRecordSink::create(path)?),
        (Some(path), false) => Box::new(CsvRecordSink::create(path)?),
        (None, true) => Box::new(JsonLinesRecordSink::new(io::stdout().lock())),
        (None, false) => Box::new(CsvRecordSink::new(io::stdout().lock())),
    };
    Ok(sink)
}

fn run(args: &Args) -> gesture_core::Result<GesturePipeline> {
    let config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::from_env()?,
    };
    let mut pipeline = GesturePipeline::new(config)?;

    let input = BufReader::new(File::open(&args.input)?);
    let mut sink = open_sink(args)?;
    replay(&mut pipeline, input, sink.as_mut())?;

    Ok(pipeline)
}

fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Some(args) = parse_args() else {
        eprintln!("{USAGE}");
        process::exit(2);
    };

    match run(&args) {
        Ok(pipeline) => {
            eprintln!("session {}", pipeline.session_id());
            eprint!("{}", pipeline.summary());
        }
        Err(err) => {
            eprintln!("replay failed: {err}");
            process::exit(1);
        }
    }
}
