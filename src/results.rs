use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use scraper::{Html, Selector};

use crate::http_client::http_client;
use crate::types::{MatchResult, MatchStatus};

const RESULTS_TIMEOUT: Duration = Duration::from_secs(10);

/// Narrow seam around the fragile scraping logic: settlement and matching
/// only ever see `Vec<MatchResult>`, so the selector soup can be swapped or
/// mocked without touching them.
pub trait ResultSource {
    fn fetch_results_for_date(&self, date: NaiveDate) -> Result<Vec<MatchResult>>;
}

/// Scrapes finished-match results from an HTML results page.
pub struct HtmlResultSource {
    base_url: String,
}

impl HtmlResultSource {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let base = std::env::var("PITCHCAST_RESULTS_URL")
            .context("PITCHCAST_RESULTS_URL is not set")?;
        Ok(Self::new(base))
    }
}

impl ResultSource for HtmlResultSource {
    fn fetch_results_for_date(&self, date: NaiveDate) -> Result<Vec<MatchResult>> {
        let client = http_client()?;
        let url = format!("{}?date={date}", self.base_url);
        let resp = client
            .get(url)
            .header("User-Agent", "Mozilla/5.0")
            .timeout(RESULTS_TIMEOUT)
            .send()
            .context("results request failed")?;
        if !resp.status().is_success() {
            log::warn!("results page answered http {}", resp.status());
            return Ok(Vec::new());
        }
        let body = resp.text().context("failed reading results page")?;
        Ok(parse_results_html(&body))
    }
}

/// Structural pass first; if the page yields nothing (markup drift, partial
/// render), fall back to scanning plain text for "<home> vs <away> <score>"
/// lines. Parse trouble is logged, never raised: an empty list is the worst
/// case.
pub fn parse_results_html(html: &str) -> Vec<MatchResult> {
    let structural = parse_structural(html);
    if !structural.is_empty() {
        return structural;
    }
    let fallback = parse_text_fallback(html);
    if fallback.is_empty() {
        log::debug!("results page yielded no matches from either pass");
    }
    fallback
}

const CONTAINER_SELECTORS: &[&str] = &[".match-row", "[data-match-id]", ".event-match"];
const TEAM_SELECTORS: &[&str] = &[".team-name", ".participant", ".team"];
const SCORE_SELECTORS: &[&str] = &[".score", ".result", ".match-score"];
const HT_SELECTORS: &[&str] = &[".score-ht", ".halftime"];
const STATUS_SELECTORS: &[&str] = &[".status", ".match-status", ".period"];

fn parse_structural(html: &str) -> Vec<MatchResult> {
    let document = Html::parse_document(html);
    let mut out = Vec::new();

    for raw in CONTAINER_SELECTORS {
        let Ok(container) = Selector::parse(raw) else {
            continue;
        };
        for element in document.select(&container) {
            if let Some(result) = parse_match_element(&element) {
                out.push(result);
            }
        }
        if !out.is_empty() {
            break;
        }
    }
    out
}

fn parse_match_element(element: &scraper::ElementRef<'_>) -> Option<MatchResult> {
    let teams = select_texts(element, TEAM_SELECTORS);
    let (home_team, away_team) = match teams.as_slice() {
        [home, away, ..] if !home.is_empty() && !away.is_empty() => (home.clone(), away.clone()),
        _ => return None,
    };

    let score_text = select_texts(element, SCORE_SELECTORS).into_iter().next()?;
    let (home_goals, away_goals) = parse_score(&score_text)?;

    let half_time = select_texts(element, HT_SELECTORS)
        .into_iter()
        .next()
        .and_then(|text| parse_score(&text));
    let status_text = select_texts(element, STATUS_SELECTORS)
        .into_iter()
        .next()
        .unwrap_or_default();

    Some(MatchResult {
        id: synthetic_id(&home_team, &away_team),
        home_team,
        away_team,
        home_goals,
        away_goals,
        home_ht: half_time.map(|(h, _)| h),
        away_ht: half_time.map(|(_, a)| a),
        status: classify_status(&status_text),
    })
}

/// First non-empty text per matching node, tried over a few selector
/// spellings because the source site renames classes now and then.
fn select_texts(element: &scraper::ElementRef<'_>, selectors: &[&str]) -> Vec<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        let texts: Vec<String> = element
            .select(&selector)
            .map(|node| node.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();
        if !texts.is_empty() {
            return texts;
        }
    }
    Vec::new()
}

/// Both goals parsed means the match at least kicked off: FINISHED unless
/// the status text carries a live or postponed marker.
fn classify_status(status_text: &str) -> MatchStatus {
    let lowered = status_text.to_lowercase();
    const LIVE_MARKERS: &[&str] = &["live", "half", "1st", "2nd", "'"];
    const POSTPONED_MARKERS: &[&str] = &["postp", "cancel", "abandon", "susp"];

    if POSTPONED_MARKERS.iter().any(|m| lowered.contains(m)) {
        MatchStatus::Cancelled
    } else if LIVE_MARKERS.iter().any(|m| lowered.contains(m)) {
        MatchStatus::InPlay
    } else {
        MatchStatus::Finished
    }
}

fn parse_score(raw: &str) -> Option<(u32, u32)> {
    let cleaned = raw
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .replace(':', "-");
    let mut parts = cleaned.splitn(2, '-');
    let home = parts.next()?.trim().parse::<u32>().ok()?;
    let away = parts.next()?.trim().parse::<u32>().ok()?;
    Some((home, away))
}

/// Text-pattern extraction used when the structural pass finds nothing.
/// Accepts lines shaped like "Arsenal vs Chelsea 2-1" (or "versus"), with
/// the score as the trailing token.
fn parse_text_fallback(html: &str) -> Vec<MatchResult> {
    let document = Html::parse_document(html);
    let text: String = document.root_element().text().collect::<Vec<_>>().join("\n");

    let mut out = Vec::new();
    for line in text.lines() {
        if let Some(result) = parse_text_line(line) {
            out.push(result);
        }
    }
    out
}

fn parse_text_line(line: &str) -> Option<MatchResult> {
    let line = line.trim();
    let (home_part, rest) = split_versus(line)?;

    let mut tokens: Vec<&str> = rest.split_whitespace().collect();
    let score_token = tokens.pop()?;
    let (home_goals, away_goals) = parse_score(score_token)?;

    let home_team = home_part.trim().to_string();
    let away_team = tokens.join(" ").trim().to_string();
    if home_team.is_empty() || away_team.is_empty() {
        return None;
    }

    Some(MatchResult {
        id: synthetic_id(&home_team, &away_team),
        home_team,
        away_team,
        home_goals,
        away_goals,
        home_ht: None,
        away_ht: None,
        status: MatchStatus::Finished,
    })
}

fn split_versus(line: &str) -> Option<(&str, &str)> {
    for separator in [" versus ", " vs ", " vs. ", " v "] {
        if let Some(idx) = line.find(separator) {
            return Some((&line[..idx], &line[idx + separator.len()..]));
        }
    }
    None
}

/// Stable within one scrape run. The prediction feed derives its own ids,
/// so cross-source alignment is never assumed; the team matcher bridges.
fn synthetic_id(home: &str, away: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    format!("{home}|{away}").hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_parse_reads_rows() {
        let html = r#"
            <div class="match-row">
                <span class="team-name">Arsenal</span>
                <span class="team-name">Chelsea</span>
                <span class="score">2-1</span>
                <span class="score-ht">(1-0)</span>
                <span class="status">FT</span>
            </div>
            <div class="match-row">
                <span class="team-name">Leeds United</span>
                <span class="team-name">Everton</span>
                <span class="score">0 - 0</span>
                <span class="status">65'</span>
            </div>"#;
        let results = parse_results_html(html);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].home_team, "Arsenal");
        assert_eq!(results[0].home_goals, 2);
        assert_eq!(results[0].home_ht, Some(1));
        assert_eq!(results[0].status, MatchStatus::Finished);
        assert_eq!(results[1].status, MatchStatus::InPlay);
        assert_eq!(results[1].home_ht, None);
    }

    #[test]
    fn postponed_marker_classifies_cancelled() {
        let html = r#"
            <div class="match-row">
                <span class="team-name">Brentford</span>
                <span class="team-name">Fulham</span>
                <span class="score">0-0</span>
                <span class="status">Postponed</span>
            </div>"#;
        let results = parse_results_html(html);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, MatchStatus::Cancelled);
    }

    #[test]
    fn text_fallback_when_structure_is_gone() {
        let html = "<html><body><p>Arsenal vs Chelsea 2-1</p>\
                    <p>Wolves versus Man City 0-3</p></body></html>";
        let results = parse_results_html(html);
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].home_team, "Wolves");
        assert_eq!(results[1].away_goals, 3);
        assert_eq!(results[1].status, MatchStatus::Finished);
    }

    #[test]
    fn garbage_yields_empty_not_error() {
        assert!(parse_results_html("<html><body>nothing here</body></html>").is_empty());
        assert!(parse_results_html("").is_empty());
    }

    #[test]
    fn score_parser_variants() {
        assert_eq!(parse_score("2-1"), Some((2, 1)));
        assert_eq!(parse_score(" 0 : 0 "), Some((0, 0)));
        assert_eq!(parse_score("(1-0)"), Some((1, 0)));
        assert_eq!(parse_score("abandoned"), None);
    }

    #[test]
    fn synthetic_ids_are_stable_per_pairing() {
        let a = synthetic_id("Arsenal", "Chelsea");
        let b = synthetic_id("Arsenal", "Chelsea");
        let c = synthetic_id("Chelsea", "Arsenal");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
