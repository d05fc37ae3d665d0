use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use chrono::offset;

use probate_core::filter::parse_value;
use probate_core::{
    ApiError, ChartEvent, ChartSource, Completion, DashboardCommand, DashboardConfigExt, DashboardConfig,
    Dispatch, FilterError, FilterKey, SourceId, default_export_file_name,
};

use crate::context::CliContext;
use crate::render;

/// An error and its causes on one line, plus a hint when a request timed out
fn describe(err: &(dyn Error + 'static)) -> String {
    let mut line = format!("error: {err}");
    let mut timed_out = false;
    let mut cause = Some(err);
    while let Some(current) = cause {
        if current.downcast_ref::<ApiError>().is_some_and(ApiError::is_timeout) {
            timed_out = true;
        }
        if let Some(inner) = current.source() {
            line.push_str(": ");
            line.push_str(&inner.to_string());
        }
        cause = current.source();
    }
    if timed_out {
        line.push_str("\n  the server did not answer in time; try again or raise request_timeout_secs");
    }
    line
}

fn report(err: &(dyn Error + 'static)) {
    println!("{}", describe(err));
}

/// Wait for a dispatch and summarize what landed
async fn settle(ctx: &CliContext, dispatch: Dispatch) {
    if dispatch.is_empty() {
        println!("nothing to reload");
        return;
    }
    let settled = dispatch.settled().await;
    let failed: Vec<SourceId> = settled
        .iter()
        .filter(|(_, c)| *c == Completion::Failed)
        .map(|(s, _)| *s)
        .collect();
    println!(
        "reloaded {} source{}",
        settled.len(),
        if settled.len() == 1 { "" } else { "s" }
    );

    if !failed.is_empty() {
        let slots = ctx.dashboard.slots().await;
        for source in failed {
            let error = match source {
                SourceId::Chart(chart) => slots.chart(chart).error(),
                SourceId::Shortlist => slots.shortlist().error(),
            };
            println!("  {source}: {}", error.unwrap_or("failed"));
        }
    }
}

pub async fn execute(ctx: &CliContext, command: DashboardCommand) {
    match ctx.dashboard.execute(command).await {
        Ok(dispatch) => settle(ctx, dispatch).await,
        Err(e) => report(&e),
    }
}

pub async fn start(ctx: &CliContext) {
    let dispatch = ctx.dashboard.start().await;
    settle(ctx, dispatch).await;
}

pub async fn show(ctx: &CliContext) {
    let filters = ctx.dashboard.filters().await;
    let sort = ctx.dashboard.sort().await;
    let page = ctx.dashboard.page().await;

    print!("{}", render::filters(&filters));
    println!("sort: {}", render::sort(&sort));

    let slots = ctx.dashboard.slots().await;
    match slots.shortlist().data() {
        Some(data) => println!("{}", render::page_line(&data.meta)),
        None => println!("page {page}"),
    }

    for source in ChartSource::ALL {
        println!("{}", render::slot_line(source.endpoint(), slots.chart(source)));
    }
    println!("{}", render::slot_line("shortlist", slots.shortlist()));
}

pub async fn kpis(ctx: &CliContext) {
    chart(ctx, ChartSource::Kpis.endpoint()).await;
}

pub async fn chart(ctx: &CliContext, name: &str) {
    if name == "absentee-split" {
        let split = ctx.dashboard.absentee_split_by_month().await;
        println!("Absentee vs Local by Month");
        print!("{}", render::absentee_split(&split));
        return;
    }

    let Some(source) = ChartSource::from_endpoint(name) else {
        let names: Vec<&str> = ChartSource::ALL.iter().map(|s| s.endpoint()).collect();
        println!("unknown chart '{name}', expected one of: {}, absentee-split", names.join(", "));
        return;
    };

    let slots = ctx.dashboard.slots().await;
    let slot = slots.chart(source);
    println!("{}", source.title());
    let status = render::slot_status(slot);
    if !status.is_empty() {
        println!("[{status}]");
    }
    if let Some(data) = slot.data() {
        print!("{}", render::chart(source, data, &ctx.config.thresholds));
    }
}

pub async fn list_filters(ctx: &CliContext) {
    let filters = ctx.dashboard.filters().await;
    print!("{}", render::filter_keys(&filters));
}

fn filter_key(name: &str) -> Result<FilterKey, FilterError> {
    FilterKey::from_name(name).ok_or_else(|| FilterError::UnknownKey {
        name: name.to_string(),
    })
}

pub async fn set_filter(ctx: &CliContext, key: &str, words: &[String]) {
    let parsed = filter_key(key).and_then(|key| parse_value(key, words).map(|value| (key, value)));
    match parsed {
        Ok((key, value)) => execute(ctx, DashboardCommand::SetFilter { key, value }).await,
        Err(e) => report(&e),
    }
}

pub async fn clear_filter(ctx: &CliContext, key: &str) {
    match filter_key(key) {
        Ok(key) => execute(ctx, DashboardCommand::ClearFilter(key)).await,
        Err(e) => report(&e),
    }
}

/// Chart element kinds accepted by `drill`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DrillKind {
    County,
    Month,
    PetitionType,
    Value,
    Class,
    DaysSincePetition,
    DeathToPetition,
}

pub async fn drill(ctx: &CliContext, kind: DrillKind, target: &str) {
    let event = match kind {
        DrillKind::County => ChartEvent::County(target.to_string()),
        DrillKind::Month => ChartEvent::Month(target.to_string()),
        DrillKind::PetitionType => ChartEvent::PetitionType(target.to_string()),
        DrillKind::Value => ChartEvent::ValueBucket(target.to_string()),
        DrillKind::DaysSincePetition => ChartEvent::DaysSincePetition(target.to_string()),
        DrillKind::DeathToPetition => ChartEvent::DaysDeathToPetition(target.to_string()),
        DrillKind::Class => match target.parse::<usize>() {
            Ok(index) => ChartEvent::ClassSlice(index),
            Err(_) => {
                println!("class drill-down takes a slice index, see `chart property-class-mix`");
                return;
            }
        },
    };
    execute(ctx, DashboardCommand::Drill(event)).await;
}

pub async fn rows(ctx: &CliContext) {
    let slots = ctx.dashboard.slots().await;
    let slot = slots.shortlist();
    let status = render::slot_status(slot);
    if !status.is_empty() {
        println!("[{status}]");
    }
    if let Some(page) = slot.data() {
        print!("{}", render::rows(&page.rows));
        println!("{}", render::page_line(&page.meta));
    }
}

pub async fn export(ctx: &CliContext, path: Option<PathBuf>) {
    let path = path.unwrap_or_else(|| {
        PathBuf::from(default_export_file_name(offset::Local::now().date_naive()))
    });
    match ctx.dashboard.export(&path).await {
        Ok(summary) => {
            println!("wrote {} rows to {}", summary.rows, summary.path.display());
            if summary.truncated() {
                println!(
                    "note: {} records matched; raise export_max_rows to include them all",
                    summary.total
                );
            }
        }
        Err(e) => report(&e),
    }
}

pub async fn upload(ctx: &CliContext, path: PathBuf) {
    match ctx.dashboard.upload(&path).await {
        Ok(dispatch) => {
            println!("uploaded {}", path.display());
            settle(ctx, dispatch).await;
        }
        Err(e) => report(&e),
    }
}

pub async fn analyze(ctx: &CliContext, path: PathBuf) {
    let preview = match ctx.dashboard.analyze(&path).await {
        Ok(preview) => preview,
        Err(e) => return report(&e),
    };

    println!("sample size: {}", preview.sample_size);
    println!("absentee rate: {:.0}%", preview.charts.absentee_rate * 100.0);
    for (title, counts) in [
        ("tiers", &preview.charts.tiers),
        ("top counties", &preview.charts.top_counties),
        ("petition types", &preview.charts.petition_types),
    ] {
        let line = counts
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("{title}: {line}");
    }
    if !preview.charts.by_month.is_empty() {
        let line = preview
            .charts
            .by_month
            .iter()
            .map(|m| format!("{}={}", m.month, m.count))
            .collect::<Vec<_>>()
            .join(", ");
        println!("by month: {line}");
    }
    print!("{}", render::rows(&preview.records));
}

pub async fn show_settings(ctx: &CliContext) {
    let config = &ctx.config;
    if let Ok(path) = DashboardConfig::config_path() {
        println!("config file: {}", path.display());
    }
    println!("api_base: {}", config.api_base);
    println!("page_size: {}", config.page_size);
    println!("export_max_rows: {}", config.export_max_rows);
    println!("request_timeout_secs: {}", config.request_timeout_secs);
    println!("analyze_max_records: {}", config.analyze_max_records);
    println!(
        "thresholds: absentee target {:.0}%, buy-box {} – {}",
        config.thresholds.absentee_rate_target * 100.0,
        render::money(config.thresholds.buybox_value_min),
        render::money(config.thresholds.buybox_value_max)
    );
}

pub fn exit() {
    // Nothing useful to do if stdout is already gone
    let _ = write!(std::io::stdout(), "quitting...");
    let _ = std::io::stdout().flush();
}
