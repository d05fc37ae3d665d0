use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use probate_cli::commands::{self, DrillKind};
use probate_cli::{CliContext, logging, readline};
use probate_core::{ChartEvent, DashboardCommand};

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();
    let ctx = CliContext::new().map_err(|e| e.to_string())?;

    // Initial load with no filters
    commands::start(&ctx).await;

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{}", err.trim_end()).map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "probate filings dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Filters, sort, page and per-source status
    Show,
    Kpis,
    /// Print one chart by endpoint name, or `absentee-split`
    Chart {
        name: String,
    },
    /// List filter keys with their current values
    Filters,
    Filter {
        key: String,
        #[arg(required = true, num_args = 1..)]
        value: Vec<String>,
    },
    Clear {
        key: String,
    },
    ClearAll,
    /// Narrow the filter as if a chart element were clicked
    Drill {
        #[arg(value_enum)]
        kind: DrillKind,
        /// Bucket/category label, or slice index for `class`
        target: String,
    },
    AbsenteeOnly,
    /// Cycle a column through ascending, descending and unsorted
    Sort {
        column: String,
    },
    Next,
    Prev,
    Page {
        number: u32,
    },
    Rows,
    Export {
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
    Upload {
        #[arg(short, long)]
        path: PathBuf,
    },
    Analyze {
        #[arg(short, long)]
        path: PathBuf,
    },
    Refresh,
    Config,
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "probate".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match cli.command {
        Some(Commands::Show) => commands::show(ctx).await,
        Some(Commands::Kpis) => commands::kpis(ctx).await,
        Some(Commands::Chart { name }) => commands::chart(ctx, &name).await,
        Some(Commands::Filters) => commands::list_filters(ctx).await,
        Some(Commands::Filter { key, value }) => commands::set_filter(ctx, &key, &value).await,
        Some(Commands::Clear { key }) => commands::clear_filter(ctx, &key).await,
        Some(Commands::ClearAll) => commands::execute(ctx, DashboardCommand::ClearAll).await,
        Some(Commands::Drill { kind, target }) => commands::drill(ctx, kind, &target).await,
        Some(Commands::AbsenteeOnly) => {
            commands::execute(ctx, DashboardCommand::Drill(ChartEvent::AbsenteeOnly)).await
        }
        Some(Commands::Sort { column }) => {
            commands::execute(ctx, DashboardCommand::ToggleSort(column)).await
        }
        Some(Commands::Next) => commands::execute(ctx, DashboardCommand::NextPage).await,
        Some(Commands::Prev) => commands::execute(ctx, DashboardCommand::PrevPage).await,
        Some(Commands::Page { number }) => {
            commands::execute(ctx, DashboardCommand::GotoPage(number)).await
        }
        Some(Commands::Rows) => commands::rows(ctx).await,
        Some(Commands::Export { path }) => commands::export(ctx, path).await,
        Some(Commands::Upload { path }) => commands::upload(ctx, path).await,
        Some(Commands::Analyze { path }) => commands::analyze(ctx, path).await,
        Some(Commands::Refresh) => commands::execute(ctx, DashboardCommand::Refresh).await,
        Some(Commands::Config) => commands::show_settings(ctx).await,
        Some(Commands::Exit) => {
            commands::exit();
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
