use pitchcast::scoring::{ScoringWeights, analyze_match};
use pitchcast::selector::select_market;
use pitchcast::settle::verify_market;
use pitchcast::types::{BetResult, HeadToHead, Market, RiskProfile, TeamStats};

const ALL_MARKETS: [Market; 22] = [
    Market::HomeWin,
    Market::AwayWin,
    Market::Draw,
    Market::HomeOrDraw,
    Market::AwayOrDraw,
    Market::Over05,
    Market::Over15,
    Market::Over25,
    Market::Under25,
    Market::Under35,
    Market::Under45,
    Market::BttsYes,
    Market::BttsNo,
    Market::HomeToScore,
    Market::AwayToScore,
    Market::HighestScoringHalf1st,
    Market::HighestScoringHalf2nd,
    Market::GoalInFirstHalf,
    Market::GoalInSecondHalf,
    Market::HomeMinusOne,
    Market::AwayPlusOne,
    Market::NoPick,
];

fn stats(form: &str, rank: u32, gf: u32, cs: u32) -> TeamStats {
    TeamStats {
        form: form.to_string(),
        league_rank: Some(rank),
        goals_for: Some(gf),
        goals_against: None,
        clean_sheets: Some(cs),
    }
}

/// Sweep a coarse grid of inputs: whatever comes out, the confidence stays
/// inside the published bounds and the market is always a real enum value.
#[test]
fn selector_output_is_always_in_contract() {
    let forms = ["", "WWWWW", "LLLLL", "WDLWD"];
    let ranks = [1, 5, 10, 20];
    let goals = [0, 10, 30];
    let profiles = [
        None,
        Some(RiskProfile::OverUnder),
        Some(RiskProfile::Btts),
        Some(RiskProfile::MatchWinner),
    ];

    let weights = ScoringWeights::default();
    for home_form in forms {
        for away_rank in ranks {
            for gf in goals {
                for profile in profiles {
                    let home = stats(home_form, 3, gf, 5);
                    let away = stats("DLWLD", away_rank, 14, 2);
                    let analysis =
                        analyze_match(Some(&home), Some(&away), None, &weights);
                    assert!(analysis.confidence <= 98, "pre-nudge cap breached");

                    let (market, confidence) = select_market(&analysis, profile);
                    assert!(
                        (30..=99).contains(&confidence),
                        "confidence {confidence} out of range for {market:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn partial_stats_never_panic_the_scorer() {
    let weights = ScoringWeights::default();
    let sparse = TeamStats {
        form: "W".to_string(),
        ..TeamStats::default()
    };
    let h2h = HeadToHead {
        home_wins: 1,
        draws: 0,
        away_wins: 2,
    };
    for home in [None, Some(&sparse)] {
        for h2h in [None, Some(&h2h)] {
            let analysis = analyze_match(home, None, h2h, &weights);
            assert!(analysis.expected_goals_home >= 0.1);
            assert!(analysis.expected_goals_home <= 4.0);
            assert!(analysis.btts_probability <= 1.0);
        }
    }
}

/// Every market settles to the same value on every call, and with half-time
/// data present nothing is left pending.
#[test]
fn settlement_is_total_and_deterministic() {
    let scores = [(0, 0), (1, 0), (0, 1), (1, 1), (2, 0), (3, 1), (2, 2), (0, 4)];
    for market in ALL_MARKETS {
        for (h, a) in scores {
            let ht = Some((h.min(1), a.min(1)));
            let first = verify_market(market, h, a, ht);
            let second = verify_market(market, h, a, ht);
            assert_eq!(first, second, "{market:?} not deterministic");
            assert_ne!(
                first,
                BetResult::Pending,
                "{market:?} pending despite half-time data"
            );
        }
    }
}

#[test]
fn only_half_markets_need_halftime_data() {
    let half_markets = [
        Market::HighestScoringHalf1st,
        Market::HighestScoringHalf2nd,
        Market::GoalInFirstHalf,
        Market::GoalInSecondHalf,
    ];
    for market in ALL_MARKETS {
        let outcome = verify_market(market, 2, 1, None);
        if half_markets.contains(&market) {
            assert_eq!(outcome, BetResult::Pending);
        } else {
            assert_ne!(outcome, BetResult::Pending);
        }
    }
}

#[test]
fn market_labels_roundtrip_through_serde() {
    for market in ALL_MARKETS {
        let json = serde_json::to_string(&market).unwrap();
        assert_eq!(json, format!("\"{}\"", market.label()));
        let back: Market = serde_json::from_str(&json).unwrap();
        assert_eq!(back, market);
    }
}
