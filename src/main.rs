use std::sync::Arc;

use anyhow::{Result, bail};
use chrono::{NaiveDate, Utc};

use pitchcast::cache::TtlCache;
use pitchcast::fixtures::{DaySelector, FixtureGateway};
use pitchcast::history::JsonHistoryStore;
use pitchcast::pipeline::{generate_predictions, record_predictions_by_match_date, settle_day};
use pitchcast::results::HtmlResultSource;
use pitchcast::types::{BetResult, RiskProfile};

const DEFAULT_LEAGUES: &str = "PL,PD,SA,BL1,FL1";

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("predict") => run_predict(&args[1..]),
        Some("settle") => run_settle(&args[1..]),
        _ => {
            eprintln!("usage: pitchcast predict [today|tomorrow|weekend] [--risk over-under|btts|match-winner]");
            eprintln!("       pitchcast settle [YYYY-MM-DD]");
            Ok(())
        }
    }
}

fn run_predict(args: &[String]) -> Result<()> {
    let mut day = DaySelector::Today;
    let mut risk = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--risk" {
            let Some(raw) = iter.next() else {
                bail!("--risk needs a value");
            };
            let Some(parsed) = RiskProfile::parse(raw) else {
                bail!("unknown risk profile: {raw}");
            };
            risk = Some(parsed);
        } else if let Some(parsed) = DaySelector::parse(arg) {
            day = parsed;
        } else {
            bail!("unknown argument: {arg}");
        }
    }

    let leagues = league_list();
    let cache = Arc::new(TtlCache::new());
    let gateway = FixtureGateway::from_env(cache)?;

    let predictions = generate_predictions(&gateway, &leagues, day, risk)?;
    if predictions.is_empty() {
        println!("No matches found for {}.", day.key());
        return Ok(());
    }

    // Items are keyed by the day the matches are played; `settle` for that
    // day then scrapes the right results page.
    let store = JsonHistoryStore::from_env()?;
    let (window_start, _) = day.date_range(Utc::now().date_naive());
    record_predictions_by_match_date(&store, window_start, &predictions)?;

    for p in &predictions {
        println!(
            "{} vs {} | {} | {} | {}% ",
            p.home_team,
            p.away_team,
            p.league,
            p.market.label(),
            p.confidence
        );
    }
    Ok(())
}

fn run_settle(args: &[String]) -> Result<()> {
    let date = match args.first() {
        Some(raw) => raw
            .parse::<NaiveDate>()
            .map_err(|_| anyhow::anyhow!("bad date {raw}, expected YYYY-MM-DD"))?,
        None => Utc::now().date_naive(),
    };

    let source = HtmlResultSource::from_env()?;
    let store = JsonHistoryStore::from_env()?;
    let record = settle_day(&source, &store, date)?;

    if record.items.is_empty() {
        println!("No history for {date}.");
        return Ok(());
    }
    for item in &record.items {
        let state = match item.result {
            BetResult::Won => "WON",
            BetResult::Lost => "LOST",
            BetResult::Pending => "PENDING",
            BetResult::Postponed => "POSTPONED",
        };
        println!(
            "{} vs {} | {} | {} | {}",
            item.home_team,
            item.away_team,
            item.market.label(),
            state,
            item.score
        );
    }
    Ok(())
}

fn league_list() -> Vec<String> {
    std::env::var("PITCHCAST_LEAGUES")
        .unwrap_or_else(|_| DEFAULT_LEAGUES.to_string())
        .split(',')
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
        .collect()
}
