use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::types::MatchResult;

/// Club-suffix tokens dropped during normalization. Country suffixes cover
/// the common continental naming patterns.
const SUFFIX_TOKENS: &[&str] = &[
    "fc", "afc", "cf", "sc", "ac", "cd", "sd", "ud", "ssc", "fk", "sk", "bk", "if", "de", "club",
    "clube", "sporting", "calcio", "deportivo", "england", "spain", "italy", "germany", "france",
];

/// Known nicknames and their expansions. Triggered by substring overlap so
/// either the prediction side or the result side may carry the short form.
static NICKNAMES: Lazy<Vec<(&str, &str)>> = Lazy::new(|| {
    vec![
        ("wolves", "wolverhampton"),
        ("spurs", "tottenham"),
        ("inter", "internazionale"),
        ("man city", "manchester city"),
        ("man utd", "manchester united"),
        ("man united", "manchester united"),
        ("barca", "barcelona"),
        ("atleti", "atletico madrid"),
        ("gunners", "arsenal"),
        ("psg", "paris saint germain"),
        ("gladbach", "borussia monchengladbach"),
    ]
});

/// Finds the first result whose team pair corresponds to the prediction's,
/// tolerating naming differences and a swapped home/away orientation.
/// No ranking among candidates: the first hit wins.
pub fn find_result_for<'a>(
    home_team: &str,
    away_team: &str,
    results: &'a [MatchResult],
) -> Option<&'a MatchResult> {
    let home_terms = search_terms(home_team);
    let away_terms = search_terms(away_team);

    results.iter().find(|result| {
        let result_home = search_terms(&result.home_team);
        let result_away = search_terms(&result.away_team);
        (terms_overlap(&home_terms, &result_home) && terms_overlap(&away_terms, &result_away))
            || (terms_overlap(&home_terms, &result_away)
                && terms_overlap(&away_terms, &result_home))
    })
}

/// Lowercases, strips punctuation and drops known suffix tokens.
pub fn normalize_team(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned
        .split_whitespace()
        .filter(|word| !SUFFIX_TOKENS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Search terms for a team: the normalized full name, every word longer
/// than 3 characters, and any nickname expansion triggered by overlap.
fn search_terms(name: &str) -> HashSet<String> {
    let norm = normalize_team(name);
    let mut terms = HashSet::new();
    if !norm.is_empty() {
        terms.insert(norm.clone());
    }
    for word in norm.split_whitespace() {
        if word.len() > 3 {
            terms.insert(word.to_string());
        }
    }
    for (nick, full) in NICKNAMES.iter() {
        if !norm.is_empty() && (norm.contains(nick) || nick.contains(norm.as_str())) {
            terms.insert((*nick).to_string());
            terms.insert((*full).to_string());
        }
    }
    terms
}

/// Bidirectional substring containment between any pair of terms.
fn terms_overlap(a: &HashSet<String>, b: &HashSet<String>) -> bool {
    a.iter()
        .any(|x| b.iter().any(|y| x.contains(y.as_str()) || y.contains(x.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MatchStatus;

    fn result(home: &str, away: &str) -> MatchResult {
        MatchResult {
            id: 7,
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_goals: 1,
            away_goals: 0,
            home_ht: None,
            away_ht: None,
            status: MatchStatus::Finished,
        }
    }

    #[test]
    fn normalization_strips_suffixes_and_punctuation() {
        assert_eq!(normalize_team("Arsenal F.C."), "arsenal");
        assert_eq!(normalize_team("AFC Bournemouth"), "bournemouth");
        assert_eq!(normalize_team("Sporting Clube de Portugal"), "portugal");
        assert_eq!(normalize_team("Atletico de Madrid"), "atletico madrid");
    }

    #[test]
    fn nicknames_bridge_the_feeds() {
        let results = vec![result("Wolves", "Man City")];
        let found = find_result_for("Wolverhampton Wanderers", "Manchester City", &results);
        assert!(found.is_some());
    }

    #[test]
    fn match_is_order_invariant() {
        let results = vec![result("Man City", "Wolves")];
        let found = find_result_for("Wolverhampton Wanderers", "Manchester City", &results);
        assert!(found.is_some());
    }

    #[test]
    fn unrelated_teams_do_not_match() {
        let results = vec![result("Everton", "Fulham")];
        let found = find_result_for("Arsenal", "Chelsea", &results);
        assert!(found.is_none());
    }

    #[test]
    fn one_side_matching_is_not_enough() {
        let results = vec![result("Arsenal", "Fulham")];
        let found = find_result_for("Arsenal", "Chelsea", &results);
        assert!(found.is_none());
    }

    #[test]
    fn first_hit_wins_among_candidates() {
        let results = vec![result("Inter", "Juventus"), result("Internazionale", "Juventus")];
        let found = find_result_for("Internazionale Milano", "Juventus", &results).expect("match");
        assert_eq!(found.home_team, "Inter");
    }

    #[test]
    fn suffix_only_name_matches_nothing() {
        // A name that normalizes to nothing yields no search terms and so
        // can never overlap, not even with itself.
        let results = vec![result("FC", "Everton")];
        let found = find_result_for("FC", "Everton", &results);
        assert!(found.is_none());
    }
}
