use crate::types::{Market, MatchAnalysis, RiskProfile};

/// Picks one market for a scored fixture and returns it with the adjusted
/// confidence. The rules form an ordered waterfall: the first condition
/// that fires wins, regardless of how strong a later rule would have been.
/// The ordering is a deliberate bias toward low-variance markets and must
/// not be re-sorted by perceived quality.
pub fn select_market(analysis: &MatchAnalysis, risk: Option<RiskProfile>) -> (Market, u32) {
    let market = risk
        .and_then(|profile| profile_pick(analysis, profile))
        .unwrap_or_else(|| generic_pick(analysis));
    let confidence = nudged_confidence(market, analysis.confidence);
    (market, confidence)
}

/// A risk-profile hint tries its own rule list first; if nothing fires the
/// selector falls through to the generic waterfall.
fn profile_pick(a: &MatchAnalysis, profile: RiskProfile) -> Option<Market> {
    let total = a.expected_goals_home + a.expected_goals_away;
    match profile {
        RiskProfile::OverUnder => {
            if total > 2.8 {
                Some(Market::Over25)
            } else if total > 1.8 {
                Some(Market::Over15)
            } else if total < 2.1 {
                Some(Market::Under35)
            } else if total > 1.1 {
                Some(Market::Over05)
            } else {
                None
            }
        }
        RiskProfile::Btts => {
            if a.btts_probability >= 0.60 {
                Some(Market::BttsYes)
            } else if a.btts_probability <= 0.35 {
                Some(Market::BttsNo)
            } else {
                None
            }
        }
        RiskProfile::MatchWinner => {
            let gap = a.home_score.abs_diff(a.away_score);
            if a.confidence > 70 && gap > 25 {
                Some(win_side(a))
            } else if gap < 8 && a.confidence > 65 {
                Some(Market::Draw)
            } else if a.confidence > 55 {
                Some(double_chance_side(a))
            } else {
                None
            }
        }
    }
}

fn generic_pick(a: &MatchAnalysis) -> Market {
    let gap = a.home_score.abs_diff(a.away_score);
    let total = a.expected_goals_home + a.expected_goals_away;

    // Tier 1: near-certain edge goes to the double chance.
    if gap > 50 && a.confidence > 85 {
        return double_chance_side(a);
    }
    // Tier 2: the safest goals market.
    if total > 1.1 {
        return Market::Over05;
    }
    // Tier 3: outright win.
    if a.confidence > 75 && gap > 35 {
        return win_side(a);
    }
    // Tier 4: progressively looser goal totals. Only very low-scoring
    // projections reach this far (tier 2 already caught total > 1.1).
    if total > 2.8 {
        return Market::Over25;
    }
    if total > 2.2 {
        return Market::Over15;
    }
    if total < 0.8 {
        return Market::Under35;
    }
    // Tier 5: both teams to score.
    if a.btts_probability >= 0.65 {
        return Market::BttsYes;
    }
    if a.btts_probability <= 0.30 {
        return Market::BttsNo;
    }
    // Tier 6: tight, confident games lean draw.
    if gap < 10 && a.confidence > 70 {
        return Market::Draw;
    }
    if a.confidence > 55 {
        return double_chance_side(a);
    }
    Market::NoPick
}

fn win_side(a: &MatchAnalysis) -> Market {
    if a.home_score >= a.away_score {
        Market::HomeWin
    } else {
        Market::AwayWin
    }
}

fn double_chance_side(a: &MatchAnalysis) -> Market {
    if a.home_score >= a.away_score {
        Market::HomeOrDraw
    } else {
        Market::AwayOrDraw
    }
}

/// Safe markets earn a small bonus on top of the scorer's confidence:
/// +5 (cap 99) for the near-banker labels, +2 (cap 97) for the mildly
/// loose totals. The final value is clamped to 30..=99.
fn nudged_confidence(market: Market, confidence: u32) -> u32 {
    let label = market.label();
    let nudged = if label.contains("0.5 Goals") || label.contains("Win or Draw") {
        (confidence + 5).min(99)
    } else if label.contains("Under 3.5") || label.contains("Over 1.5") {
        (confidence + 2).min(97)
    } else {
        confidence
    };
    nudged.clamp(30, 99)
}
