use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use beancount_ingest::bjbank::DEFAULT_ACCOUNT;
use beancount_ingest::{ingest, BJBankImporter, ImportFile, Importer, PdfToText};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "bean-ingest",
    version,
    about = "Import Bank of Beijing PDF statements into Beancount"
)]
struct Cli {
    /// Account the statement's transactions post against
    #[arg(long, global = true, default_value = DEFAULT_ACCOUNT)]
    account: String,

    /// pdftotext executable to run
    #[arg(long, global = true, default_value = "pdftotext")]
    pdftotext: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report which importer recognizes each file
    Identify {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the entries of each recognized file
    Extract {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print where each recognized file would be archived
    File {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

impl Command {
    fn files(&self) -> &[PathBuf] {
        match self {
            Command::Identify { files } | Command::Extract { files } | Command::File { files } => {
                files
            }
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn process(
    command: &Command,
    importers: &[Box<dyn Importer>],
    file: &ImportFile,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let path = file.path().display();
    match command {
        Command::Identify { .. } => {
            let matched = ingest::identify(importers, file)?;
            if matched.is_empty() {
                writeln!(out, "{}: no importer", path)?;
            }
            for importer in matched {
                writeln!(
                    out,
                    "{}: {} ({})",
                    path,
                    importer.name(),
                    importer.file_account(file)
                )?;
            }
        }
        Command::Extract { .. } => {
            if let Some((_, ledger)) = ingest::extract(importers, file)? {
                writeln!(out, "**** {}", path)?;
                writeln!(out)?;
                beancount_render::render(out, &ledger)?;
            }
        }
        Command::File { .. } => {
            if let Some(importer) = ingest::identify(importers, file)?.into_iter().next() {
                let dest = ingest::archive_path(importer, file)?;
                writeln!(out, "{} -> {}", path, dest.display())?;
            }
        }
    }
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let converter = PdfToText::with_program(&cli.pdftotext);
    let importer = BJBankImporter::with_converter(&cli.account, converter)
        .with_context(|| format!("cannot configure importer for '{}'", cli.account))?;
    let importers: Vec<Box<dyn Importer>> = vec![Box::new(importer)];

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Command::Extract { .. } = cli.command {
        writeln!(out, ";; -*- mode: beancount -*-")?;
    }

    let mut ok = true;
    for path in cli.command.files() {
        let file = ImportFile::new(path);
        if let Err(err) = process(&cli.command, &importers, &file, &mut out) {
            error!(path = %path.display(), "{:#}", err);
            ok = false;
        }
    }
    Ok(ok)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
