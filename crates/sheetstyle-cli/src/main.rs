//! sheetstyle CLI - inspect and restyle xlsx workbooks

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use sheetstyle::prelude::*;
use sheetstyle::{Borders, NumberFormatType};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetstyle")]
#[command(author, version, about = "Inspect and restyle xlsx workbooks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a workbook
    Info {
        /// Input xlsx file
        input: PathBuf,
    },

    /// List all sheets in a workbook
    Sheets {
        /// Input xlsx file
        input: PathBuf,
    },

    /// Dump the workbook's cell formats
    Styles {
        /// Input xlsx file
        input: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Fit column widths to their content and save
    Autofit {
        /// Input xlsx file
        input: PathBuf,

        /// Sheet number (1-based, default: every sheet)
        #[arg(short, long)]
        sheet: Option<u32>,

        /// Output file (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input } => show_info(&input),
        Commands::Sheets { input } => list_sheets(&input),
        Commands::Styles { input, json } => dump_styles(&input, json),
        Commands::Autofit {
            input,
            sheet,
            output,
        } => autofit(&input, sheet, output.as_deref()),
    }
}

fn open(input: &Path) -> Result<Workbook> {
    Workbook::open(input).with_context(|| format!("Failed to open '{}'", input.display()))
}

fn show_info(input: &Path) -> Result<()> {
    let workbook = open(input)?;
    let styles = &workbook.styles;

    println!("File: {}", input.display());
    println!("Sheets: {}", workbook.sheet_count());
    println!("Active sheet: {}", workbook.active_sheet());
    println!(
        "Styles: {} cell formats, {} fonts, {} fills, {} border sets, {} number formats",
        styles.cell_formats.len(),
        styles.fonts.len(),
        styles.fills.len(),
        styles.borders.len(),
        styles.number_formats.len()
    );
    println!("Shared strings: {}", workbook.shared_strings().len());
    println!("Defined names: {}", workbook.defined_names.len());

    for (i, sheet) in (1..).zip(workbook.worksheets()) {
        println!();
        println!("  Sheet {}: \"{}\"", i, sheet.name());
        println!("    Used range: {}", sheet.dimension());
        println!("    Merges: {}", sheet.merges().len());
        println!("    Hyperlinks: {}", sheet.hyperlinks().len());
        if sheet.view.frozen_row > 0 || sheet.view.frozen_column > 0 {
            println!(
                "    Frozen: {} rows, {} columns",
                sheet.view.frozen_row, sheet.view.frozen_column
            );
        }
    }

    Ok(())
}

fn list_sheets(input: &Path) -> Result<()> {
    let workbook = open(input)?;

    for (i, sheet) in (1..).zip(workbook.worksheets()) {
        let state = match sheet.visibility() {
            SheetVisibility::Visible => "visible",
            SheetVisibility::Hidden => "hidden",
            SheetVisibility::VeryHidden => "veryHidden",
        };
        println!("{}\t{}\t{}", i, sheet.name(), state);
    }

    Ok(())
}

/// One cell format with its components resolved
#[derive(Serialize)]
struct StyleEntry {
    id: u32,
    font: Font,
    fill: Fill,
    borders: Borders,
    alignment: Alignment,
    number_format: String,
    format_type: NumberFormatType,
}

fn style_entries(workbook: &Workbook) -> Vec<StyleEntry> {
    let styles = &workbook.styles;
    styles
        .cell_formats
        .iter()
        .map(|(id, _)| {
            let number_format = styles.effective_number_format(id);
            StyleEntry {
                id,
                font: styles.effective_font(id),
                fill: styles.effective_fill(id),
                borders: styles.effective_borders(id),
                alignment: styles.effective_alignment(id),
                format_type: number_format.format_type(workbook.locale()),
                number_format: number_format.code().to_string(),
            }
        })
        .collect()
}

fn dump_styles(input: &Path, json: bool) -> Result<()> {
    let workbook = open(input)?;
    let entries = style_entries(&workbook);

    if json {
        let text = serde_json::to_string_pretty(&entries).context("Failed to serialize styles")?;
        println!("{text}");
        return Ok(());
    }

    println!("id\tfont\tbold\titalic\tfill\tformat");
    for entry in &entries {
        let font = format!(
            "{} {}",
            entry.font.name().unwrap_or("-"),
            entry.font.size().unwrap_or_else(|| workbook.styles.default_font_size())
        );
        let fill = entry
            .fill
            .foreground()
            .rgb_value()
            .unwrap_or("-")
            .to_string();
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            entry.id,
            font,
            entry.font.bold(),
            entry.font.italic(),
            fill,
            entry.number_format
        );
    }

    Ok(())
}

fn autofit(input: &Path, sheet: Option<u32>, output: Option<&Path>) -> Result<()> {
    let mut file =
        XlsxFile::open(input).with_context(|| format!("Failed to open '{}'", input.display()))?;

    let sheets = match sheet {
        Some(index) => {
            if index == 0 || index > file.workbook.sheet_count() {
                bail!(
                    "Sheet {} not found (workbook has {})",
                    index,
                    file.workbook.sheet_count()
                );
            }
            index..=index
        }
        None => 1..=file.workbook.sheet_count(),
    };
    for index in sheets {
        file.workbook
            .autofit(index)
            .with_context(|| format!("Failed to fit sheet {index}"))?;
    }

    match output {
        Some(path) => {
            file.save_as(path)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            eprintln!("Wrote '{}'", path.display());
        }
        None => {
            file.save()
                .with_context(|| format!("Failed to write '{}'", input.display()))?;
            eprintln!("Updated '{}'", input.display());
        }
    }

    Ok(())
}
