use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;

use crate::fixtures::{DaySelector, FixtureGateway};
use crate::history::{HistoryStore, merge_into_record};
use crate::matcher::normalize_team;
use crate::results::ResultSource;
use crate::scoring::{ScoringWeights, analyze_match};
use crate::selector::select_market;
use crate::settle::settle_item;
use crate::types::{
    BetResult, DailyRecord, Fixture, HeadToHead, HistoryItem, Prediction, RiskProfile, StandingRow,
    TeamStats,
};

/// Fetches, scores and selects: one prediction per upcoming fixture.
/// Zero fixtures is a plain empty list so the caller can render
/// "no matches found" instead of an error state.
pub fn generate_predictions(
    gateway: &FixtureGateway,
    leagues: &[String],
    day: DaySelector,
    risk: Option<RiskProfile>,
) -> Result<Vec<Prediction>> {
    let fixtures = gateway.fetch_fixtures(leagues, day)?;
    if fixtures.is_empty() {
        log::info!("no upcoming fixtures for {:?}", day.key());
        return Ok(Vec::new());
    }

    // Only pull tables for leagues that actually have fixtures.
    let mut seen: Vec<String> = Vec::new();
    for fixture in &fixtures {
        if !seen.contains(&fixture.league) {
            seen.push(fixture.league.clone());
        }
    }
    let standings = gateway.fetch_standings(&seen)?;

    let weights = ScoringWeights::default();
    let predictions = fixtures
        .iter()
        .map(|fixture| {
            let table = standings.get(&fixture.league).map(|rows| rows.as_slice());
            let home = table.and_then(|rows| stats_for(rows, fixture.home_id, &fixture.home_team));
            let away = table.and_then(|rows| stats_for(rows, fixture.away_id, &fixture.away_team));
            build_prediction(fixture, home.as_ref(), away.as_ref(), None, risk, &weights)
        })
        .collect();
    Ok(predictions)
}

/// Scores one fixture and assembles the immutable prediction. H2H history
/// is optional; the scorer falls back to a neutral prior without it.
pub fn build_prediction(
    fixture: &Fixture,
    home: Option<&TeamStats>,
    away: Option<&TeamStats>,
    h2h: Option<&HeadToHead>,
    risk: Option<RiskProfile>,
    weights: &ScoringWeights,
) -> Prediction {
    let analysis = analyze_match(home, away, h2h, weights);
    let (market, confidence) = select_market(&analysis, risk);
    Prediction {
        id: fixture.id,
        home_team: fixture.home_team.clone(),
        away_team: fixture.away_team.clone(),
        market,
        confidence,
        league: if fixture.league_name.is_empty() {
            fixture.league.clone()
        } else {
            fixture.league_name.clone()
        },
        match_time: fixture.kickoff.clone(),
        match_id: Some(fixture.id),
    }
}

/// Standings lookup by team id first, by normalized name as a fallback
/// (some feeds renumber teams between seasons).
fn stats_for(rows: &[StandingRow], team_id: u64, team_name: &str) -> Option<TeamStats> {
    if let Some(row) = rows.iter().find(|row| row.team_id == team_id && team_id != 0) {
        return Some(row.to_stats());
    }
    let wanted = normalize_team(team_name);
    rows.iter()
        .find(|row| normalize_team(&row.team) == wanted)
        .map(|row| row.to_stats())
}

/// Read-before-merge, upsert-after-merge. Safe to call repeatedly with
/// overlapping prediction sets.
pub fn record_predictions(
    store: &dyn HistoryStore,
    date: NaiveDate,
    predictions: &[Prediction],
) -> Result<DailyRecord> {
    let mut record = store
        .load(date)?
        .unwrap_or_else(|| DailyRecord::empty(date));
    let incoming = predictions.iter().map(HistoryItem::from_prediction).collect();
    merge_into_record(&mut record, incoming);
    store.upsert(&record)?;
    Ok(record)
}

/// Records a batch under the dates the matches are actually played, not the
/// date the batch was generated. A weekend run lands its items in Saturday's
/// and Sunday's records, so each record later settles against its own day's
/// results page. Predictions whose kickoff fails to parse fall back to the
/// given date.
pub fn record_predictions_by_match_date(
    store: &dyn HistoryStore,
    fallback: NaiveDate,
    predictions: &[Prediction],
) -> Result<Vec<DailyRecord>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<Prediction>> = BTreeMap::new();
    for prediction in predictions {
        let date = match_date(prediction).unwrap_or(fallback);
        by_date.entry(date).or_default().push(prediction.clone());
    }

    let mut records = Vec::with_capacity(by_date.len());
    for (date, group) in by_date {
        records.push(record_predictions(store, date, &group)?);
    }
    Ok(records)
}

/// Kickoff timestamps are ISO-8601, so the leading ten chars are the date.
fn match_date(prediction: &Prediction) -> Option<NaiveDate> {
    prediction.match_time.get(..10)?.parse().ok()
}

/// Settles every still-pending item of a date against the scraped results
/// and writes the record back. Already-settled items are left alone.
pub fn settle_day(
    source: &dyn ResultSource,
    store: &dyn HistoryStore,
    date: NaiveDate,
) -> Result<DailyRecord> {
    let mut record = store
        .load(date)?
        .unwrap_or_else(|| DailyRecord::empty(date));
    if record.items.is_empty() {
        return Ok(record);
    }

    let results = source.fetch_results_for_date(date)?;
    if results.is_empty() {
        log::info!("no results available for {date}, leaving record untouched");
        return Ok(record);
    }

    let mut changed = 0usize;
    for item in &mut record.items {
        if item.result != BetResult::Pending {
            continue;
        }
        let settled = settle_item(item, &results);
        if settled.result != item.result || settled.match_id != item.match_id {
            changed += 1;
        }
        *item = settled;
    }
    log::info!("settled {changed} item(s) for {date}");

    store.upsert(&record)?;
    Ok(record)
}
