//! Comissa CLI - fills commission report documents from spreadsheets

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use comissa::prelude::*;

#[derive(Parser)]
#[command(name = "comissa")]
#[command(
    author,
    version,
    about = "Commission spreadsheet to document table filler"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill the template with the records of one or more spreadsheets
    Fill {
        /// Input spreadsheet files (xlsx)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Document template (docx) with the 11-column table
        #[arg(short, long)]
        template: PathBuf,

        /// Output directory (default: current directory)
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Show the table structure of a document template
    Inspect {
        /// Template file (docx)
        template: PathBuf,
    },

    /// Print the derived records of a spreadsheet without filling anything
    Preview {
        /// Input spreadsheet file (xlsx)
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Fill {
            inputs,
            template,
            out_dir,
        } => fill(&inputs, &template, &out_dir),
        Commands::Inspect { template } => inspect(&template),
        Commands::Preview { input } => preview(&input),
    }
}

fn fill(inputs: &[PathBuf], template: &Path, out_dir: &Path) -> Result<()> {
    if !out_dir.is_dir() {
        bail!("output directory '{}' does not exist", out_dir.display());
    }

    let outcomes = process_batch(inputs, template, out_dir);
    let mut failures = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(batch) => println!(
                "{}: {} row(s) from sheet '{}' -> {}",
                outcome.input.display(),
                batch.rows_written,
                batch.sheet_name,
                batch.output.display()
            ),
            Err(e) => {
                eprintln!("warning: {}: {e}", outcome.input.display());
                failures += 1;
            }
        }
    }

    if failures == outcomes.len() {
        bail!("no input file could be processed");
    }
    if failures > 0 {
        eprintln!("{failures} of {} file(s) skipped", outcomes.len());
    }
    Ok(())
}

fn inspect(template: &Path) -> Result<()> {
    let file = File::open(template)
        .with_context(|| format!("failed to open '{}'", template.display()))?;
    let model = DocumentModel::from_docx(file)
        .with_context(|| format!("failed to read '{}'", template.display()))?;

    println!("Tables: {}", model.table_count);
    match model.first_table {
        Some(table) => {
            println!("First table: {} row(s) x {} column(s)", table.rows.len(), table.cols);
            let headers = table.headers();
            if !headers.is_empty() {
                println!("Headers: {}", headers.join(" | "));
            }
            let suitable = table.rows.len() >= 2 && table.cols >= 11;
            println!(
                "Suitable for filling: {}",
                if suitable { "yes" } else { "no" }
            );
        }
        None => println!("No table found - this template cannot be filled"),
    }
    Ok(())
}

fn preview(input: &Path) -> Result<()> {
    let (sheet_name, records) = derive_records(input)
        .with_context(|| format!("failed to process '{}'", input.display()))?;

    println!("Sheet: {sheet_name}");
    for record in &records {
        let cells = record.rendered_columns();
        // Skip the trailing reserved column in terminal output
        println!("{}", cells[..10].join(";"));
    }
    println!("{} record(s)", records.len());
    Ok(())
}
