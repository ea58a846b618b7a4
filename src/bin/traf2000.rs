use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::fmt::time::ChronoLocal;

use traf2000::core::{ConvertError, TracingSink};
use traf2000::pipeline::{Converter, Settings};
use traf2000::traf2000::write_credit_note_report;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Billing export to convert (.csv or .xml)
    input: PathBuf,

    /// TRAF2000 file to write, replaced if it exists
    #[arg(short, long, default_value = "TRAF2000")]
    output: PathBuf,

    /// JSON file with `import` and `encoder` settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the credit-note report here instead of stdout
    #[arg(long)]
    credit_notes: Option<PathBuf>,

    /// Keep the stamp duty inside the first health-expense slot
    #[arg(long)]
    legacy: bool,

    /// Log every record as it is built
    #[arg(short, long)]
    verbose: bool,
}

fn load_settings(path: Option<&Path>) -> Result<Settings, ConvertError> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text)
        .map_err(|e| ConvertError::Parse(format!("{}: {e}", path.display())))
}

fn run(args: &Args) -> Result<(), ConvertError> {
    let mut settings = load_settings(args.config.as_deref())?;
    if args.legacy {
        settings.encoder.split_stamp_duty = false;
    }

    let converter = Converter::new(settings)?;
    let report = converter.convert_file(&args.input, &args.output, &mut TracingSink)?;

    for outcome in &report.outcomes {
        println!(
            "{}: {}",
            outcome.invoice.as_deref().unwrap_or("?"),
            outcome.outcome
        );
    }

    match &args.credit_notes {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            write_credit_note_report(&mut out, &report.credit_notes)?;
            out.flush()?;
        }
        None => write_credit_note_report(&mut io::stdout().lock(), &report.credit_notes)?,
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
