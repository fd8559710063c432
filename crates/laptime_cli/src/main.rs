//! Terminal front-end for the lap board.
//!
//! # Responsibility
//! - Open the contact database and hand the connection to the core service.
//! - Render the contact table and a text bar chart.
//! - Map table actions (add, delete, edit, search) onto service calls.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use laptime_core::db::open_db;
use laptime_core::{
    default_log_level, format_duration, init_logging, parse_duration, AttributeSet, BoardConfig,
    ChartModel, Column, ContactRepository, ContactService, NewRecord, Record, RecordId, RowStore,
    SortKey, SortOrder, SqliteContactRepository, ViewQuery,
};
use log::info;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "laptime", version, about = "Contact table with lap-time bar chart")]
struct Cli {
    /// SQLite database file.
    #[arg(long, global = true, default_value = "contacts.sqlite")]
    db: PathBuf,
    /// JSON board configuration (title and lap attributes).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, global = true)]
    log_dir: Option<String>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Insert the sample contacts.
    Seed {
        /// Remove existing contacts first and restart ids at 1.
        #[arg(long)]
        reset: bool,
    },
    /// Print the table, optionally filtered and sorted.
    List {
        /// `All` or a column name (header or key).
        #[arg(long, default_value = "All")]
        column: String,
        /// Regular expression.
        #[arg(long, default_value = "")]
        pattern: String,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
    },
    /// Append a contact.
    Add {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        job: String,
        #[arg(long, default_value = "")]
        email: String,
        /// Lap time as `attribute=m:ss`; repeatable.
        #[arg(long = "time", value_parser = parse_time_arg)]
        times: Vec<(String, String)>,
    },
    /// Delete the row at a position of the (filtered) table.
    Delete {
        /// Zero-based row position.
        position: usize,
        #[arg(long, default_value = "All")]
        column: String,
        #[arg(long, default_value = "")]
        pattern: String,
    },
    /// Edit one cell.
    Set {
        id: RecordId,
        column: String,
        value: String,
    },
    /// Print the lap-time bar chart.
    Chart {
        /// Width of the longest bar in characters.
        #[arg(long, default_value_t = 40)]
        width: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    let config = match &cli.config {
        Some(path) => BoardConfig::load(path)?,
        None => BoardConfig::default(),
    };

    let conn = open_db(&cli.db)?;
    let repo = SqliteContactRepository::try_new(&conn)?;
    if let Command::Seed { reset: true } = cli.command {
        repo.reset_contacts()?;
    }
    let mut service = ContactService::load(repo, config.attributes.clone())?;

    match cli.command {
        Command::Seed { .. } => {
            let created = service.seed_samples()?;
            info!(
                "event=cli_seed module=cli status=ok rows={}",
                created.len()
            );
            print_table(&config, service.records());
        }
        Command::List {
            column,
            pattern,
            sort,
            desc,
        } => {
            let query = build_query(service.store(), &column, &pattern, sort.as_deref(), desc)?;
            println!("{}", config.table_label);
            print_table(&config, &service.view(&query)?);
        }
        Command::Add {
            name,
            job,
            email,
            times,
        } => {
            let fields = new_record(&config.attributes, name, job, email, times)?;
            let record = service.add(fields)?;
            println!("added contact {}", record.id);
        }
        Command::Delete {
            position,
            column,
            pattern,
        } => {
            let view = service.filter(&column, &pattern)?;
            let id = service.delete_in(&view, position)?;
            println!("deleted contact {id}");
        }
        Command::Set { id, column, value } => {
            let column = service.store().resolve_column(&column)?;
            if let Column::Attribute(_) = column {
                parse_duration(&value)?;
            }
            service.update_field(id, &column, value)?;
            println!("updated contact {id}");
        }
        Command::Chart { width } => {
            let chart = ChartModel::tolerant(
                config.chart_title.as_str(),
                config.attributes.clone(),
                service.records(),
            );
            print_chart(&chart, width);
        }
    }

    Ok(())
}

fn parse_time_arg(raw: &str) -> Result<(String, String), String> {
    let (attribute, time) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected `attribute=m:ss`, got `{raw}`"))?;
    parse_duration(time).map_err(|err| err.to_string())?;
    Ok((attribute.trim().to_string(), time.trim().to_string()))
}

/// Builds a contact from CLI fields; `times` name attributes by key or label.
fn new_record(
    attributes: &AttributeSet,
    name: String,
    job: String,
    email: String,
    times: Vec<(String, String)>,
) -> Result<NewRecord> {
    let mut fields = NewRecord::new(name, job, email);
    for (attribute, time) in times {
        let key = attributes
            .resolve(&attribute)
            .map(|spec| spec.key.clone())
            .with_context(|| format!("unknown lap attribute `{attribute}`"))?;
        fields = fields.with_duration(key, time);
    }
    Ok(fields)
}

fn build_query(
    store: &RowStore,
    column: &str,
    pattern: &str,
    sort: Option<&str>,
    desc: bool,
) -> Result<ViewQuery> {
    let sort = match sort {
        Some(name) => Some(SortKey {
            column: store.resolve_column(name)?,
            order: if desc {
                SortOrder::Descending
            } else {
                SortOrder::Ascending
            },
        }),
        None if desc => bail!("--desc needs --sort"),
        None => None,
    };
    Ok(ViewQuery {
        selector: store.resolve_selector(column)?,
        pattern: pattern.to_string(),
        sort,
    })
}

fn print_table(config: &BoardConfig, records: &[Record]) {
    let columns = Column::all(&config.attributes);
    let mut rows = vec![columns
        .iter()
        .map(|column| column.header(&config.attributes).to_string())
        .collect::<Vec<_>>()];
    rows.extend(records.iter().map(|record| {
        columns
            .iter()
            .map(|column| record.field(column).unwrap_or_default().into_owned())
            .collect::<Vec<_>>()
    }));

    let widths = (0..columns.len())
        .map(|index| {
            rows.iter()
                .map(|row| row[index].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();

    for row in &rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:^width$}"))
            .collect::<Vec<_>>()
            .join(" | ");
        println!("{}", line.trim_end());
    }
}

/// Bar length scaled so that `max` fills `width` characters.
fn bar_length(seconds: u32, max: u32, width: usize) -> usize {
    seconds as usize * width / max.max(1) as usize
}

fn print_chart(chart: &ChartModel, width: usize) {
    println!("{}", chart.title());
    let series = chart.series();
    let max = chart.max_value();
    let label_width = series
        .iter()
        .map(|series| series.label.chars().count())
        .max()
        .unwrap_or(0);

    for (index, category) in chart.categories().into_iter().enumerate() {
        println!("{category}");
        for series in &series {
            let seconds = series.values[index];
            let bar = "#".repeat(bar_length(seconds, max, width));
            println!(
                "  {:<label_width$}  {:<width$}  {}",
                series.label,
                bar,
                format_duration(seconds)
            );
        }
    }

    let incomplete = chart.incomplete();
    if !incomplete.is_empty() {
        println!("(incomplete rows left out: {incomplete:?})");
    }
}
