use crate::matcher::find_result_for;
use crate::types::{BetResult, HistoryItem, Market, MatchResult, MatchStatus};

/// Resolves one market against final (and optional half-time) goals.
///
/// Pure and total over the `Market` enum: every variant has an explicit
/// clause, so adding a market without wiring it here is a compile error
/// rather than a silent loss. Half-dependent markets never guess; they stay
/// `Pending` until half-time goals are available.
pub fn verify_market(
    market: Market,
    home_goals: u32,
    away_goals: u32,
    half_time: Option<(u32, u32)>,
) -> BetResult {
    let total = home_goals + away_goals;
    match market {
        Market::HomeWin => won_if(home_goals > away_goals),
        Market::AwayWin => won_if(away_goals > home_goals),
        Market::Draw => won_if(home_goals == away_goals),
        Market::HomeOrDraw => won_if(home_goals >= away_goals),
        Market::AwayOrDraw => won_if(away_goals >= home_goals),
        Market::Over05 => won_if(total > 0),
        Market::Over15 => won_if(total > 1),
        Market::Over25 => won_if(total > 2),
        Market::Under25 => won_if(total < 3),
        Market::Under35 => won_if(total < 4),
        Market::Under45 => won_if(total < 5),
        Market::BttsYes => won_if(home_goals > 0 && away_goals > 0),
        Market::BttsNo => won_if(home_goals == 0 || away_goals == 0),
        Market::HomeToScore => won_if(home_goals > 0),
        Market::AwayToScore => won_if(away_goals > 0),
        Market::HighestScoringHalf1st => match half_time {
            // Strict comparison: a tie between halves loses both variants.
            Some((ht_home, ht_away)) => {
                let first = ht_home + ht_away;
                won_if(first > total.saturating_sub(first))
            }
            None => BetResult::Pending,
        },
        Market::HighestScoringHalf2nd => match half_time {
            Some((ht_home, ht_away)) => {
                let first = ht_home + ht_away;
                won_if(total.saturating_sub(first) > first)
            }
            None => BetResult::Pending,
        },
        Market::GoalInFirstHalf => match half_time {
            Some((ht_home, ht_away)) => won_if(ht_home + ht_away > 0),
            None => BetResult::Pending,
        },
        Market::GoalInSecondHalf => match half_time {
            Some((ht_home, ht_away)) => won_if(total.saturating_sub(ht_home + ht_away) > 0),
            None => BetResult::Pending,
        },
        Market::HomeMinusOne => won_if(home_goals >= away_goals + 2),
        Market::AwayPlusOne => won_if(away_goals + 1 > home_goals),
        // The sentinel settles as a loss. This ports the source system's
        // unknown-market default and is covered by an explicit test.
        Market::NoPick => BetResult::Lost,
    }
}

/// Settles one stored item against a batch of scraped results.
///
/// Evaluation only runs for matches that are finished or at least underway
/// (partial data is acceptable for in-play re-checks). Anything postponed or
/// cancelled flips to `Postponed`; any other status leaves the item
/// `Pending`, stamped with the result-feed id so a later run can re-check
/// without re-matching by name.
pub fn settle_item(item: &HistoryItem, results: &[MatchResult]) -> HistoryItem {
    let mut settled = item.clone();
    let Some(result) = find_result_for(&item.home_team, &item.away_team, results) else {
        return settled;
    };

    match result.status {
        MatchStatus::Finished | MatchStatus::InPlay | MatchStatus::Paused => {
            let half_time = match (result.home_ht, result.away_ht) {
                (Some(h), Some(a)) => Some((h, a)),
                _ => None,
            };
            settled.result =
                verify_market(item.market, result.home_goals, result.away_goals, half_time);
            settled.score = format!("{}-{}", result.home_goals, result.away_goals);
            settled.match_id = Some(result.id);
        }
        MatchStatus::Postponed | MatchStatus::Cancelled => {
            settled.result = BetResult::Postponed;
            settled.match_id = Some(result.id);
        }
        MatchStatus::Scheduled | MatchStatus::Unknown => {
            settled.result = BetResult::Pending;
            settled.match_id = Some(result.id);
        }
    }
    settled
}

fn won_if(condition: bool) -> BetResult {
    if condition {
        BetResult::Won
    } else {
        BetResult::Lost
    }
}
