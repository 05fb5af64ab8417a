use crate::types::{HeadToHead, MatchAnalysis, TeamStats};

/// Scoring weights and normalization caps. Extracted from the formulas so
/// golden-value tests survive tuning changes.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub rank: f64,
    pub form: f64,
    pub goals: f64,
    pub h2h: f64,
    pub defense: f64,
    /// Max form points over the 5-game window (5 wins x 3).
    pub form_points_cap: f64,
    /// Goals-for count treated as a maxed-out attack.
    pub goals_cap: f64,
    /// Clean-sheet count treated as a maxed-out defense.
    pub clean_sheets_cap: f64,
    pub xg_base: f64,
    pub xg_span: f64,
    /// Opponent defense pullback applied to expected goals.
    pub xg_defense_pull: f64,
    pub xg_min: f64,
    pub xg_max: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            rank: 0.40,
            form: 0.30,
            goals: 0.15,
            h2h: 0.10,
            defense: 0.05,
            form_points_cap: 15.0,
            goals_cap: 30.0,
            clean_sheets_cap: 10.0,
            xg_base: 0.7,
            xg_span: 2.8,
            xg_defense_pull: 0.4,
            xg_min: 0.1,
            xg_max: 4.0,
        }
    }
}

/// Scores one fixture from whatever inputs survived the fetch. Absent stats
/// contribute zero (H2H falls back to a neutral prior) rather than failing.
pub fn analyze_match(
    home: Option<&TeamStats>,
    away: Option<&TeamStats>,
    h2h: Option<&HeadToHead>,
    weights: &ScoringWeights,
) -> MatchAnalysis {
    let (home_h2h, away_h2h) = h2h_strengths(h2h);
    let home_score = side_score(home, home_h2h, weights);
    let away_score = side_score(away, away_h2h, weights);

    let home_defense = home.map(|s| defense_strength(s, weights)).unwrap_or(0.0);
    let away_defense = away.map(|s| defense_strength(s, weights)).unwrap_or(0.0);

    let expected_goals_home = expected_goals(home_score, away_defense, weights);
    let expected_goals_away = expected_goals(away_score, home_defense, weights);

    let btts_probability = round2(
        clamp(expected_goals_home / 2.0, 0.0, 0.95) * clamp(expected_goals_away / 2.0, 0.0, 0.95),
    );

    let confidence = confidence_for(home_score, away_score, completeness(home, away, h2h));

    MatchAnalysis {
        home_score,
        away_score,
        expected_goals_home,
        expected_goals_away,
        confidence,
        btts_probability,
    }
}

fn side_score(stats: Option<&TeamStats>, h2h_strength: f64, w: &ScoringWeights) -> u32 {
    let Some(stats) = stats else {
        return (100.0 * w.h2h * h2h_strength).round() as u32;
    };

    let weighted = w.rank * rank_strength(stats.league_rank)
        + w.form * form_strength(&stats.form, w)
        + w.goals * goals_strength(stats.goals_for, w)
        + w.h2h * h2h_strength
        + w.defense * defense_strength(stats, w);

    (100.0 * weighted).round() as u32
}

/// 3 points per win, 1 per draw, over the most recent five results.
fn form_strength(form: &str, w: &ScoringWeights) -> f64 {
    let mut points = 0u32;
    for ch in form.chars().take(5) {
        match ch.to_ascii_uppercase() {
            'W' => points += 3,
            'D' => points += 1,
            _ => {}
        }
    }
    clamp(points as f64 / w.form_points_cap, 0.0, 1.0)
}

/// Rank 1 maps to 1.0, rank 20 to 0.0; absent rank is a zero signal.
fn rank_strength(rank: Option<u32>) -> f64 {
    let Some(rank) = rank else {
        return 0.0;
    };
    clamp((20.0 - rank as f64) / 19.0, 0.0, 1.0)
}

fn goals_strength(goals_for: Option<u32>, w: &ScoringWeights) -> f64 {
    clamp(goals_for.unwrap_or(0) as f64 / w.goals_cap, 0.0, 1.0)
}

fn defense_strength(stats: &TeamStats, w: &ScoringWeights) -> f64 {
    clamp(
        stats.clean_sheets.unwrap_or(0) as f64 / w.clean_sheets_cap,
        0.0,
        1.0,
    )
}

/// Per-side win share of the head-to-head history, or a neutral 0.5 prior
/// when the pairing has no history.
fn h2h_strengths(h2h: Option<&HeadToHead>) -> (f64, f64) {
    match h2h {
        Some(h) if h.total() > 0 => {
            let total = h.total() as f64;
            (h.home_wins as f64 / total, h.away_wins as f64 / total)
        }
        _ => (0.5, 0.5),
    }
}

fn expected_goals(score: u32, opponent_defense: f64, w: &ScoringWeights) -> f64 {
    let raw = w.xg_base + (score as f64 / 100.0) * w.xg_span - w.xg_defense_pull * opponent_defense;
    clamp(raw, w.xg_min, w.xg_max)
}

/// Count of present signals out of 7: form, rank and goals per side, plus
/// H2H history.
fn completeness(
    home: Option<&TeamStats>,
    away: Option<&TeamStats>,
    h2h: Option<&HeadToHead>,
) -> u32 {
    let mut present = 0;
    for side in [home, away] {
        let Some(stats) = side else { continue };
        if !stats.form.trim().is_empty() {
            present += 1;
        }
        if stats.league_rank.is_some() {
            present += 1;
        }
        if stats.goals_for.is_some() {
            present += 1;
        }
    }
    if h2h.map(|h| h.total() > 0).unwrap_or(false) {
        present += 1;
    }
    present
}

/// Data-completeness keeps a floor of 0.4 so zero-data fixtures still score,
/// and the pre-nudge cap of 98 leaves headroom for the per-market bonus.
fn confidence_for(home_score: u32, away_score: u32, completeness: u32) -> u32 {
    let factor = completeness as f64 / 7.0 * 0.6 + 0.4;
    let gap = home_score.abs_diff(away_score) as f64;
    let base = 50.0 + 0.4 * gap;
    (base * factor).min(98.0).round() as u32
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}
