use std::cell::RefCell;
use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDate;

use pitchcast::history::{HistoryStore, merge_into_record};
use pitchcast::pipeline::{record_predictions, settle_day};
use pitchcast::results::{ResultSource, parse_results_html};
use pitchcast::types::{
    BetResult, DailyRecord, HistoryItem, Market, MatchResult, Prediction,
};

struct MemoryStore {
    days: RefCell<HashMap<NaiveDate, DailyRecord>>,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            days: RefCell::new(HashMap::new()),
        }
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self, date: NaiveDate) -> Result<Option<DailyRecord>> {
        Ok(self.days.borrow().get(&date).cloned())
    }

    fn upsert(&self, record: &DailyRecord) -> Result<()> {
        self.days.borrow_mut().insert(record.date, record.clone());
        Ok(())
    }
}

/// Serves the checked-in results page, the way the scraper would after a
/// successful fetch.
struct PageSource;

impl ResultSource for PageSource {
    fn fetch_results_for_date(&self, _date: NaiveDate) -> Result<Vec<MatchResult>> {
        let raw = std::fs::read_to_string(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/results_page.html"
        ))?;
        Ok(parse_results_html(&raw))
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
}

fn prediction(id: u64, home: &str, away: &str, market: Market) -> Prediction {
    Prediction {
        id,
        home_team: home.to_string(),
        away_team: away.to_string(),
        market,
        confidence: 70,
        league: "Premier League".to_string(),
        match_time: "2026-08-29T15:00:00Z".to_string(),
        match_id: None,
    }
}

#[test]
fn full_settlement_pass_over_scraped_results() {
    let store = MemoryStore::new();
    let predictions = vec![
        // Feed names differ from ours: the matcher has to bridge them.
        prediction(1, "Wolverhampton Wanderers", "Manchester City", Market::AwayWin),
        prediction(2, "Arsenal", "Chelsea", Market::BttsYes),
        prediction(3, "Leeds United", "Everton", Market::HomeWin),
        prediction(4, "Newcastle United", "Aston Villa", Market::Over25),
    ];
    record_predictions(&store, date(), &predictions).unwrap();

    let record = settle_day(&PageSource, &store, date()).unwrap();
    assert_eq!(record.items.len(), 4);

    let by_home = |home: &str| {
        record
            .items
            .iter()
            .find(|i| i.home_team == home)
            .expect("item present")
            .clone()
    };

    let wolves = by_home("Wolverhampton Wanderers");
    assert_eq!(wolves.result, BetResult::Won);
    assert_eq!(wolves.score, "1-3");
    assert!(wolves.match_id.is_some());

    let arsenal = by_home("Arsenal");
    // 2-0: both teams to score loses.
    assert_eq!(arsenal.result, BetResult::Lost);

    let leeds = by_home("Leeds United");
    assert_eq!(leeds.result, BetResult::Postponed);
    assert_eq!(leeds.score, "-");

    // No result scraped for this pairing: stays pending for a later run.
    let newcastle = by_home("Newcastle United");
    assert_eq!(newcastle.result, BetResult::Pending);
    assert_eq!(newcastle.match_id, None);
}

#[test]
fn settlement_is_stable_across_repeated_runs() {
    let store = MemoryStore::new();
    record_predictions(
        &store,
        date(),
        &[prediction(1, "Arsenal", "Chelsea", Market::HomeWin)],
    )
    .unwrap();

    let first = settle_day(&PageSource, &store, date()).unwrap();
    let second = settle_day(&PageSource, &store, date()).unwrap();
    assert_eq!(first.items.len(), second.items.len());
    assert_eq!(first.items[0].result, second.items[0].result);
    assert_eq!(first.items[0].score, second.items[0].score);
}

#[test]
fn half_dependent_market_pends_until_halftime_data_arrives() {
    let store = MemoryStore::new();
    record_predictions(
        &store,
        date(),
        // The Brentford row is in-play with no half-time score on the page.
        &[prediction(1, "Brentford", "Fulham", Market::HighestScoringHalf1st)],
    )
    .unwrap();

    let record = settle_day(&PageSource, &store, date()).unwrap();
    assert_eq!(record.items[0].result, BetResult::Pending);
    // The feed id is stamped so the next run can re-check.
    assert!(record.items[0].match_id.is_some());
}

#[test]
fn merge_after_settlement_does_not_duplicate_or_reset() {
    let mut record = DailyRecord::empty(date());
    let mut settled = HistoryItem::from_prediction(&prediction(1, "Arsenal", "Chelsea", Market::HomeWin));
    settled.result = BetResult::Won;
    settled.score = "2-0".to_string();
    merge_into_record(&mut record, vec![settled]);

    let regenerated = HistoryItem::from_prediction(&prediction(9, "Arsenal", "Chelsea", Market::HomeWin));
    merge_into_record(&mut record, vec![regenerated]);

    assert_eq!(record.items.len(), 1);
    assert_eq!(record.items[0].result, BetResult::Won);
}
