use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use serde::Deserialize;

use crate::cache::TtlCache;
use crate::http_client::http_client;
use crate::types::{Fixture, StandingRow};

/// Which day window a fixtures request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySelector {
    Today,
    Tomorrow,
    Weekend,
}

impl DaySelector {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "today" => Some(DaySelector::Today),
            "tomorrow" => Some(DaySelector::Tomorrow),
            "weekend" => Some(DaySelector::Weekend),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            DaySelector::Today => "today",
            DaySelector::Tomorrow => "tomorrow",
            DaySelector::Weekend => "weekend",
        }
    }

    /// Inclusive date range for the selector. The weekend window is the
    /// upcoming Saturday/Sunday pair (or the remainder of a weekend already
    /// in progress).
    pub fn date_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            DaySelector::Today => (today, today),
            DaySelector::Tomorrow => {
                let next = today + Days::new(1);
                (next, next)
            }
            DaySelector::Weekend => match today.weekday() {
                Weekday::Sat => (today, today + Days::new(1)),
                Weekday::Sun => (today, today),
                other => {
                    let until_sat = (Weekday::Sat.num_days_from_monday() + 7
                        - other.num_days_from_monday())
                        % 7;
                    let saturday = today + Days::new(until_sat as u64);
                    (saturday, saturday + Days::new(1))
                }
            },
        }
    }
}

/// A raw HTTP exchange, narrow enough to stub in tests.
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Transport seam for the gateway. The production implementation goes
/// through the shared blocking client; tests script status sequences.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse>;
}

pub struct ReqwestTransport {
    token: String,
}

impl ReqwestTransport {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse> {
        let client = http_client()?;
        let resp = client
            .get(url)
            .header("X-Auth-Token", &self.token)
            .timeout(timeout)
            .send()
            .context("request failed")?;
        let status = resp.status().as_u16();
        let body = resp.text().context("failed reading body")?;
        Ok(HttpResponse { status, body })
    }
}

/// Gateway tunables. The delays keep sequential calls under the external
/// quota of 10 requests/minute; the TTLs match how quickly each feed
/// actually changes.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub fixtures_ttl: Duration,
    pub standings_ttl: Duration,
    pub fixtures_delay: Duration,
    pub standings_delay: Duration,
    pub max_attempts: u32,
    pub rate_limit_base_wait: Duration,
    pub rate_limit_max_wait: Duration,
    pub failure_wait_step: Duration,
    pub fixtures_timeout: Duration,
    pub standings_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.football-data.org/v4".to_string(),
            fixtures_ttl: Duration::from_secs(300),
            standings_ttl: Duration::from_secs(3600),
            fixtures_delay: Duration::from_millis(6500),
            standings_delay: Duration::from_millis(1500),
            max_attempts: 3,
            rate_limit_base_wait: Duration::from_secs(1),
            rate_limit_max_wait: Duration::from_secs(10),
            failure_wait_step: Duration::from_secs(2),
            fixtures_timeout: Duration::from_secs(15),
            standings_timeout: Duration::from_secs(5),
        }
    }
}

/// Sequential, retried, cache-fronted access to the fixture and standings
/// feeds. One instance per composition root; the cache is shared in from
/// outside so tests can isolate it.
pub struct FixtureGateway {
    cache: Arc<TtlCache>,
    transport: Box<dyn Transport>,
    config: GatewayConfig,
}

impl FixtureGateway {
    pub fn new(cache: Arc<TtlCache>, transport: Box<dyn Transport>, config: GatewayConfig) -> Self {
        Self {
            cache,
            transport,
            config,
        }
    }

    /// Builds the production gateway from the environment.
    pub fn from_env(cache: Arc<TtlCache>) -> Result<Self> {
        let token = std::env::var("PITCHCAST_API_TOKEN")
            .context("PITCHCAST_API_TOKEN is not set")?;
        let mut config = GatewayConfig::default();
        if let Ok(base) = std::env::var("PITCHCAST_API_BASE") {
            if !base.trim().is_empty() {
                config.base_url = base.trim().trim_end_matches('/').to_string();
            }
        }
        Ok(Self::new(cache, Box::new(ReqwestTransport::new(token)), config))
    }

    /// Upcoming fixtures for the given leagues and day window. Leagues that
    /// exhaust their retries are skipped; the result is the union of the
    /// leagues that answered. An empty vec is a valid "nothing on" outcome.
    pub fn fetch_fixtures(&self, leagues: &[String], day: DaySelector) -> Result<Vec<Fixture>> {
        let today = Utc::now().date_naive();
        let (from, to) = day.date_range(today);

        let mut fixtures = Vec::new();
        let mut first_call = true;
        for league in leagues {
            let key = format!("fixtures:{league}:{}:{from}", day.key());
            if let Some(cached) = self.cache.get_as::<Vec<Fixture>>(&key, self.config.fixtures_ttl)
            {
                fixtures.extend(cached);
                continue;
            }

            if !first_call {
                std::thread::sleep(self.config.fixtures_delay);
            }
            first_call = false;

            let url = format!(
                "{}/competitions/{league}/matches?dateFrom={from}&dateTo={to}&status=SCHEDULED",
                self.config.base_url
            );
            match self.fetch_with_retry(&url, self.config.fixtures_timeout) {
                Ok(body) => match parse_fixtures_json(league, &body) {
                    Ok(rows) => {
                        self.cache.set_from(&key, &rows);
                        fixtures.extend(rows);
                    }
                    Err(err) => log::warn!("skipping league {league}: bad fixtures payload: {err}"),
                },
                Err(err) => log::warn!("skipping league {league}: {err}"),
            }
        }
        Ok(fixtures)
    }

    /// Standings tables for the given leagues, keyed by league code.
    pub fn fetch_standings(&self, leagues: &[String]) -> Result<HashMap<String, Vec<StandingRow>>> {
        let mut tables = HashMap::new();
        let mut first_call = true;
        for league in leagues {
            let key = format!("standings:{league}");
            if let Some(cached) = self
                .cache
                .get_as::<Vec<StandingRow>>(&key, self.config.standings_ttl)
            {
                tables.insert(league.clone(), cached);
                continue;
            }

            if !first_call {
                std::thread::sleep(self.config.standings_delay);
            }
            first_call = false;

            let url = format!("{}/competitions/{league}/standings", self.config.base_url);
            match self.fetch_with_retry(&url, self.config.standings_timeout) {
                Ok(body) => match parse_standings_json(&body) {
                    Ok(rows) => {
                        self.cache.set_from(&key, &rows);
                        tables.insert(league.clone(), rows);
                    }
                    Err(err) => log::warn!("skipping league {league}: bad standings payload: {err}"),
                },
                Err(err) => log::warn!("skipping league {league}: {err}"),
            }
        }
        Ok(tables)
    }

    /// Up to `max_attempts` tries per call. 429 waits grow exponentially
    /// (capped); other failures wait linearly. The caller decides what an
    /// exhausted league means; this function just reports it.
    fn fetch_with_retry(&self, url: &str, timeout: Duration) -> Result<String> {
        let mut last_error = anyhow!("no attempts made");
        for attempt in 1..=self.config.max_attempts {
            match self.transport.get(url, timeout) {
                Ok(resp) if (200..300).contains(&resp.status) => return Ok(resp.body),
                Ok(resp) if resp.status == 429 => {
                    last_error = anyhow!("rate limited (429)");
                    if attempt < self.config.max_attempts {
                        let wait = self
                            .config
                            .rate_limit_base_wait
                            .saturating_mul(1 << (attempt - 1))
                            .min(self.config.rate_limit_max_wait);
                        std::thread::sleep(wait);
                    }
                }
                Ok(resp) => {
                    last_error = anyhow!("http {}", resp.status);
                    if attempt < self.config.max_attempts {
                        std::thread::sleep(self.config.failure_wait_step.saturating_mul(attempt));
                    }
                }
                Err(err) => {
                    last_error = err;
                    if attempt < self.config.max_attempts {
                        std::thread::sleep(self.config.failure_wait_step.saturating_mul(attempt));
                    }
                }
            }
        }
        Err(last_error.context(format!("retries exhausted for {url}")))
    }
}

#[derive(Debug, Deserialize)]
struct MatchesResponse {
    #[serde(default)]
    matches: Vec<ApiMatch>,
}

#[derive(Debug, Deserialize)]
struct ApiMatch {
    id: u64,
    #[serde(rename = "utcDate")]
    utc_date: String,
    #[serde(default)]
    competition: Option<ApiCompetition>,
    #[serde(rename = "homeTeam")]
    home_team: ApiTeam,
    #[serde(rename = "awayTeam")]
    away_team: ApiTeam,
}

#[derive(Debug, Deserialize)]
struct ApiCompetition {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiTeam {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct StandingsResponse {
    #[serde(default)]
    standings: Vec<ApiStanding>,
}

#[derive(Debug, Deserialize)]
struct ApiStanding {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    table: Vec<ApiTableRow>,
}

#[derive(Debug, Deserialize)]
struct ApiTableRow {
    position: u32,
    team: ApiTeam,
    #[serde(rename = "form", default)]
    form: Option<String>,
    #[serde(rename = "goalsFor", default)]
    goals_for: Option<u32>,
    #[serde(rename = "goalsAgainst", default)]
    goals_against: Option<u32>,
    #[serde(rename = "cleanSheets", default)]
    clean_sheets: Option<u32>,
}

pub fn parse_fixtures_json(league: &str, raw: &str) -> Result<Vec<Fixture>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let data: MatchesResponse = serde_json::from_str(trimmed).context("invalid fixtures json")?;
    Ok(data
        .matches
        .into_iter()
        .filter(|m| !m.home_team.name.is_empty() && !m.away_team.name.is_empty())
        .map(|m| Fixture {
            id: m.id,
            league: league.to_string(),
            league_name: m.competition.map(|c| c.name).unwrap_or_default(),
            home_team: m.home_team.name,
            away_team: m.away_team.name,
            home_id: m.home_team.id,
            away_id: m.away_team.id,
            kickoff: m.utc_date,
        })
        .collect())
}

pub fn parse_standings_json(raw: &str) -> Result<Vec<StandingRow>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let data: StandingsResponse = serde_json::from_str(trimmed).context("invalid standings json")?;

    // The feed publishes TOTAL plus HOME/AWAY splits; the overall table is
    // the one the scorer wants.
    let table = data
        .standings
        .into_iter()
        .find(|s| s.kind.is_empty() || s.kind == "TOTAL")
        .map(|s| s.table)
        .unwrap_or_default();

    Ok(table
        .into_iter()
        .filter(|row| !row.team.name.is_empty())
        .map(|row| StandingRow {
            team_id: row.team.id,
            team: row.team.name,
            position: row.position,
            form: normalize_form(row.form.as_deref()),
            goals_for: row.goals_for,
            goals_against: row.goals_against,
            clean_sheets: row.clean_sheets,
        })
        .collect())
}

/// The feed sends form as "W,L,D,W,W"; the scorer expects a plain string of
/// result chars, most recent first.
fn normalize_form(raw: Option<&str>) -> String {
    raw.unwrap_or_default()
        .chars()
        .filter(|c| matches!(c, 'W' | 'D' | 'L' | 'w' | 'd' | 'l'))
        .collect()
}
