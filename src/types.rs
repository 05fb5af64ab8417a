use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Season stats for one side of a fixture. Every field is optional in
/// practice: standings rows are frequently partial mid-season and a missing
/// value must degrade to a neutral signal, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamStats {
    /// Recent results, most recent first, chars in {W, D, L}.
    #[serde(default)]
    pub form: String,
    #[serde(default)]
    pub league_rank: Option<u32>,
    #[serde(default)]
    pub goals_for: Option<u32>,
    #[serde(default)]
    pub goals_against: Option<u32>,
    #[serde(default)]
    pub clean_sheets: Option<u32>,
}

/// Head-to-head tally between two specific teams. A zero total is the valid
/// "no history" state.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HeadToHead {
    pub home_wins: u32,
    pub draws: u32,
    pub away_wins: u32,
}

impl HeadToHead {
    pub fn total(&self) -> u32 {
        self.home_wins + self.draws + self.away_wins
    }
}

/// Derived match strength snapshot. Computed fresh per fixture, consumed
/// immediately, never persisted or cached.
#[derive(Debug, Clone, Copy)]
pub struct MatchAnalysis {
    /// Normalized 0-100 strength per side.
    pub home_score: u32,
    pub away_score: u32,
    /// Expected goals per side, clamped to 0.1..=4.0.
    pub expected_goals_home: f64,
    pub expected_goals_away: f64,
    /// 0-100, capped at 98 before the per-market nudge.
    pub confidence: u32,
    /// 0.0..=1.0, rounded to 2 decimals.
    pub btts_probability: f64,
}

/// The closed set of betting markets. This enumeration is the contract
/// between the selector and the settlement evaluator: anything one side
/// produces the other must understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    #[serde(rename = "Home Team to Win")]
    HomeWin,
    #[serde(rename = "Away Team to Win")]
    AwayWin,
    #[serde(rename = "Draw")]
    Draw,
    #[serde(rename = "Home Win or Draw")]
    HomeOrDraw,
    #[serde(rename = "Away Win or Draw")]
    AwayOrDraw,
    #[serde(rename = "Over 0.5 Goals")]
    Over05,
    #[serde(rename = "Over 1.5 Goals")]
    Over15,
    #[serde(rename = "Over 2.5 Goals")]
    Over25,
    #[serde(rename = "Under 2.5 Goals")]
    Under25,
    #[serde(rename = "Under 3.5 Goals")]
    Under35,
    #[serde(rename = "Under 4.5 Goals")]
    Under45,
    #[serde(rename = "Both Teams to Score: Yes")]
    BttsYes,
    #[serde(rename = "Both Teams to Score: No")]
    BttsNo,
    #[serde(rename = "Home Team to Score")]
    HomeToScore,
    #[serde(rename = "Away Team to Score")]
    AwayToScore,
    #[serde(rename = "Highest Scoring Half: 1st")]
    HighestScoringHalf1st,
    #[serde(rename = "Highest Scoring Half: 2nd")]
    HighestScoringHalf2nd,
    #[serde(rename = "Goal in 1st Half")]
    GoalInFirstHalf,
    #[serde(rename = "Goal in 2nd Half")]
    GoalInSecondHalf,
    #[serde(rename = "Home -1 Handicap")]
    HomeMinusOne,
    #[serde(rename = "Away +1 Handicap")]
    AwayPlusOne,
    #[serde(rename = "No Pick")]
    NoPick,
}

impl Market {
    /// Stable display label, also the serialized wire form.
    pub fn label(&self) -> &'static str {
        match self {
            Market::HomeWin => "Home Team to Win",
            Market::AwayWin => "Away Team to Win",
            Market::Draw => "Draw",
            Market::HomeOrDraw => "Home Win or Draw",
            Market::AwayOrDraw => "Away Win or Draw",
            Market::Over05 => "Over 0.5 Goals",
            Market::Over15 => "Over 1.5 Goals",
            Market::Over25 => "Over 2.5 Goals",
            Market::Under25 => "Under 2.5 Goals",
            Market::Under35 => "Under 3.5 Goals",
            Market::Under45 => "Under 4.5 Goals",
            Market::BttsYes => "Both Teams to Score: Yes",
            Market::BttsNo => "Both Teams to Score: No",
            Market::HomeToScore => "Home Team to Score",
            Market::AwayToScore => "Away Team to Score",
            Market::HighestScoringHalf1st => "Highest Scoring Half: 1st",
            Market::HighestScoringHalf2nd => "Highest Scoring Half: 2nd",
            Market::GoalInFirstHalf => "Goal in 1st Half",
            Market::GoalInSecondHalf => "Goal in 2nd Half",
            Market::HomeMinusOne => "Home -1 Handicap",
            Market::AwayPlusOne => "Away +1 Handicap",
            Market::NoPick => "No Pick",
        }
    }
}

/// Risk-profile hint for the market selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskProfile {
    OverUnder,
    Btts,
    MatchWinner,
}

impl RiskProfile {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "over-under" | "overunder" => Some(RiskProfile::OverUnder),
            "btts" => Some(RiskProfile::Btts),
            "match-winner" | "matchwinner" => Some(RiskProfile::MatchWinner),
            _ => None,
        }
    }
}

/// A scheduled, not-yet-played match as returned by the fixture feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub id: u64,
    pub league: String,
    pub league_name: String,
    pub home_team: String,
    pub away_team: String,
    pub home_id: u64,
    pub away_id: u64,
    /// Kickoff in ISO-8601, as delivered by the feed.
    pub kickoff: String,
}

/// One row of a league standings table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingRow {
    pub team_id: u64,
    pub team: String,
    pub position: u32,
    #[serde(default)]
    pub form: String,
    #[serde(default)]
    pub goals_for: Option<u32>,
    #[serde(default)]
    pub goals_against: Option<u32>,
    #[serde(default)]
    pub clean_sheets: Option<u32>,
}

impl StandingRow {
    pub fn to_stats(&self) -> TeamStats {
        TeamStats {
            form: self.form.clone(),
            league_rank: Some(self.position),
            goals_for: self.goals_for,
            goals_against: self.goals_against,
            clean_sheets: self.clean_sheets,
        }
    }
}

/// A scored pick for one fixture, immutable once assembled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: u64,
    pub home_team: String,
    pub away_team: String,
    #[serde(rename = "betType")]
    pub market: Market,
    pub confidence: u32,
    pub league: String,
    pub match_time: String,
    #[serde(default)]
    pub match_id: Option<u64>,
}

/// Settlement state of a persisted prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetResult {
    Won,
    Lost,
    Pending,
    Postponed,
}

/// A persisted prediction plus its settlement state. Mutated exactly once
/// per real-world match conclusion; otherwise stays Pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: u64,
    pub home_team: String,
    pub away_team: String,
    #[serde(rename = "betType")]
    pub market: Market,
    pub confidence: u32,
    pub league: String,
    pub match_time: String,
    pub result: BetResult,
    /// Formatted final score, "-" while unsettled.
    pub score: String,
    #[serde(default)]
    pub match_id: Option<u64>,
}

impl HistoryItem {
    pub fn from_prediction(p: &Prediction) -> Self {
        Self {
            id: p.id,
            home_team: p.home_team.clone(),
            away_team: p.away_team.clone(),
            market: p.market,
            confidence: p.confidence,
            league: p.league.clone(),
            match_time: p.match_time.clone(),
            result: BetResult::Pending,
            score: "-".to_string(),
            match_id: p.match_id,
        }
    }
}

/// All history items generated or merged for one date. Uniqueness of the
/// (home, away) pair is enforced at merge time, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub items: Vec<HistoryItem>,
}

impl DailyRecord {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            items: Vec::new(),
        }
    }
}

/// Lifecycle state of a match as reported by the result feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Finished,
    InPlay,
    Paused,
    Scheduled,
    Postponed,
    Cancelled,
    Unknown,
}

/// One finished (or in-progress) match from the result feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: u64,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u32,
    pub away_goals: u32,
    #[serde(default)]
    pub home_ht: Option<u32>,
    #[serde(default)]
    pub away_ht: Option<u32>,
    pub status: MatchStatus,
}
