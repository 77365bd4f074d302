mod menu;
mod render;

pub use menu::Menu;

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::application::ExpenseService;
use crate::config::Settings;
use crate::domain::{
    Cents, Clock, Granularity, NewRecord, RecordId, RecordUpdate, SortOrder, format_cents,
    parse_cents,
};
use crate::io::Exporter;

/// Spendlog - Personal Expense Tracker
#[derive(Parser)]
#[command(name = "spendlog")]
#[command(about = "Record expenses and summarize where the money went")]
#[command(version)]
pub struct Cli {
    /// Data file path (overrides the config file)
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Accept expenses dated after today
    #[arg(long, global = true)]
    pub allow_future: bool,

    /// Enable verbose logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run; the interactive menu when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a new expense
    Add {
        /// Amount spent (e.g., "12.50" or "12")
        amount: String,

        /// Category label (e.g., "Food")
        category: String,

        /// Date of the expense (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Free-text note
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List recorded expenses
    List {
        /// Sort order: insertion, date, amount, category
        #[arg(long, default_value = "insertion")]
        sort: String,

        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Total, per-category breakdown and recent spending
    Summary {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Details for one category
    Category {
        /// Category name
        name: String,
    },

    /// Spending per day, week or month
    Period {
        /// Granularity: day, week, month
        #[arg(long, default_value = "month")]
        by: String,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Change fields of an existing expense
    Edit {
        /// Expense ID
        id: RecordId,

        /// New amount
        #[arg(short, long)]
        amount: Option<String>,

        /// New category
        #[arg(short, long)]
        category: Option<String>,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// New description (empty string clears it)
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        id: RecordId,
    },

    /// Export expenses to CSV or JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Format: csv, json
        #[arg(long, default_value = "csv")]
        format: String,
    },

    /// Interactive menu
    Menu,
}

impl Cli {
    /// Settings from the config file with command line overrides applied.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(file) = &self.file {
            settings.data_file = file.clone();
        }
        if self.allow_future {
            settings.allow_future_dates = true;
        }
        Ok(settings)
    }

    pub fn run(self) -> Result<()> {
        let settings = self.settings()?;
        let mut service = ExpenseService::open(&settings, Clock::System)
            .with_context(|| format!("Failed to open {}", settings.data_file.display()))?;

        let command = self.command.unwrap_or(Commands::Menu);
        let outcome = run_command(&mut service, command);
        finish_session(service, outcome)
    }
}

/// Close the service even when the command failed, so changes held for
/// the end of the session are still written. The command's error wins.
fn finish_session(service: ExpenseService, outcome: Result<()>) -> Result<()> {
    let closed = service.close().context("Failed to save expenses");
    outcome?;
    closed
}

fn run_command(service: &mut ExpenseService, command: Commands) -> Result<()> {
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Add {
            amount,
            category,
            date,
            description,
        } => {
            let amount_cents = parse_amount(&amount)?;
            let mut new = NewRecord::new(amount_cents, category);
            if let Some(date) = date {
                new = new.on(parse_date(&date)?);
            }
            if let Some(description) = description {
                new = new.with_description(description);
            }

            let record = service.add_expense(new)?;
            write!(stdout, "Recorded expense: ")?;
            render::write_record(&mut stdout, &record)?;
        }

        Commands::List {
            sort,
            category,
            format,
        } => {
            let order: SortOrder = sort.parse().map_err(|e| {
                anyhow::anyhow!(
                    "Invalid sort '{}'. Valid: insertion, date, amount, category. Error: {}",
                    sort,
                    e
                )
            })?;
            let mut records = service.list_expenses(order);
            if let Some(category) = category {
                records.retain(|r| r.category.eq_ignore_ascii_case(category.trim()));
            }

            match format.as_str() {
                "json" => writeln!(stdout, "{}", serde_json::to_string_pretty(&records)?)?,
                _ => render::write_records(&mut stdout, &records)?,
            }
        }

        Commands::Summary { format } => {
            let summary = service.summary();
            match format.as_str() {
                "json" => writeln!(stdout, "{}", serde_json::to_string_pretty(&summary)?)?,
                _ => render::write_summary(&mut stdout, &summary)?,
            }
        }

        Commands::Category { name } => {
            let detail = service.category_detail(&name)?;
            render::write_category_detail(&mut stdout, &detail)?;
        }

        Commands::Period { by, format } => {
            let granularity: Granularity = by.parse().map_err(|e| {
                anyhow::anyhow!(
                    "Invalid period '{}'. Valid: day, week, month. Error: {}",
                    by,
                    e
                )
            })?;
            let report = service.period_report(granularity);

            match format.as_str() {
                "json" => writeln!(stdout, "{}", serde_json::to_string_pretty(&report)?)?,
                "csv" => {
                    writeln!(stdout, "period,period_start,period_end,total")?;
                    for period in &report.periods {
                        writeln!(
                            stdout,
                            "{},{},{},{}",
                            period.label,
                            period.period_start.format("%Y-%m-%d"),
                            period.period_end.format("%Y-%m-%d"),
                            format_cents(period.total)
                        )?;
                    }
                }
                _ => render::write_period_report(&mut stdout, &report)?,
            }
        }

        Commands::Edit {
            id,
            amount,
            category,
            date,
            description,
        } => {
            let update = RecordUpdate {
                amount_cents: amount.as_deref().map(parse_amount).transpose()?,
                category,
                date: date.as_deref().map(parse_date).transpose()?,
                description,
            };
            if update.is_empty() {
                anyhow::bail!("Nothing to change. Pass --amount, --category, --date or --description");
            }

            let record = service.edit_expense(id, update)?;
            write!(stdout, "Updated expense: ")?;
            render::write_record(&mut stdout, &record)?;
        }

        Commands::Delete { id } => {
            let record = service.delete_expense(id)?;
            write!(stdout, "Deleted expense: ")?;
            render::write_record(&mut stdout, &record)?;
        }

        Commands::Export { output, format } => {
            run_export_command(service, output, &format)?;
        }

        Commands::Menu => {
            drop(stdout);
            let stdin = io::stdin().lock();
            Menu::new(service, stdin, io::stdout()).run()?;
        }
    }

    Ok(())
}

fn run_export_command(service: &ExpenseService, output: Option<PathBuf>, format: &str) -> Result<()> {
    let exporter = Exporter::new(service);

    // Determine output writer
    let writer: Box<dyn Write> = match &output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(io::stdout()),
    };

    let count = match format {
        "csv" => exporter.export_csv(writer)?,
        "json" => exporter.export_json(writer)?.len(),
        _ => anyhow::bail!("Invalid export format '{}'. Valid formats: csv, json", format),
    };

    if let Some(path) = output {
        eprintln!("Exported {} expenses to {}", count, path.display());
    }
    Ok(())
}

fn parse_amount(input: &str) -> Result<Cents> {
    parse_cents(input).with_context(|| format!("Invalid amount '{}'. Use '12.50' or '12'", input))
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str))
}
