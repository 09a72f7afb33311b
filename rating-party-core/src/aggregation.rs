//! Turns raw ratings into a ranked leaderboard.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::Identity;

/// The four sub-scores a participant gives a wine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub sight: i32,
    pub aroma: i32,
    pub taste: i32,
    pub overall: i32,
}

impl Scores {
    /// The highest value a single sub-score may take
    pub const MAX: i32 = 100;

    /// The total score, always derived and never stored
    pub fn total(&self) -> i64 {
        self.all().iter().map(|s| i64::from(*s)).sum()
    }

    /// Returns true if every sub-score lies within `0..=Scores::MAX`
    pub fn is_in_range(&self) -> bool {
        self.all().iter().all(|s| (0..=Self::MAX).contains(s))
    }

    fn all(&self) -> [i32; 4] {
        [self.sight, self.aroma, self.taste, self.overall]
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// One participant's rating of one wine
#[derive(Debug, Clone)]
pub struct RatingEntry {
    pub participant_id: Uuid,
    pub wine_id: Uuid,
    pub scores: Scores,
    pub comments: String,
}

impl RatingEntry {
    /// A rating with no scores and no comment has not been filled in yet
    pub fn is_submitted(&self) -> bool {
        !(self.scores.is_zero() && self.comments.is_empty())
    }
}

/// A participant of the game being aggregated
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub participant_id: Uuid,
    pub username: String,
}

/// The display attributes of a wine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WineInfo {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub year: i32,
}

/// Which view of the leaderboard the caller receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Includes every participant's individual score
    Admin,
    /// Only averages and ranks
    Participant,
}

impl From<&Identity> for View {
    fn from(identity: &Identity) -> Self {
        if identity.is_admin() {
            Self::Admin
        } else {
            Self::Participant
        }
    }
}

/// A single ranked row of the leaderboard
#[derive(Debug, Clone, PartialEq)]
pub struct ItemResult {
    pub wine: WineInfo,
    /// Totals keyed by username, only present in [View::Admin]
    pub scores: Option<BTreeMap<String, i64>>,
    /// The mean total over participants who rated the wine, rounded to two decimals
    pub average: f64,
    /// How many participants contributed to the average
    pub raters: usize,
    /// 1-based position after sorting
    pub rank: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregationError {
    /// A rating points at a wine that is not part of the game
    #[error("Rating references unknown wine {0}")]
    UnknownWine(Uuid),
}

/// Computes the ranked leaderboard of a game.
///
/// Ratings that were never filled in are skipped, and participants who did not
/// rate a wine count neither towards its sum nor towards its number of raters.
/// Wines without a single submitted rating are left out. Equal averages are
/// ordered by wine code, then by id.
pub fn compute_leaderboard(
    ratings: &[RatingEntry],
    roster: &[RosterEntry],
    wines: &[WineInfo],
    view: View,
) -> Result<Vec<ItemResult>, AggregationError> {
    let mut totals_by_wine: HashMap<Uuid, HashMap<Uuid, i64>> = HashMap::new();

    for rating in ratings.iter().filter(|r| r.is_submitted()) {
        totals_by_wine
            .entry(rating.wine_id)
            .or_default()
            .insert(rating.participant_id, rating.scores.total());
    }

    let wines_by_id: HashMap<Uuid, &WineInfo> = wines.iter().map(|w| (w.id, w)).collect();

    let mut results = totals_by_wine
        .into_iter()
        .map(|(wine_id, totals)| {
            let wine = wines_by_id
                .get(&wine_id)
                .ok_or(AggregationError::UnknownWine(wine_id))?;

            Ok(aggregate_wine(wine, &totals, roster, view))
        })
        .collect::<Result<Vec<_>, AggregationError>>()?;

    results.sort_by(|a, b| {
        b.average
            .total_cmp(&a.average)
            .then_with(|| a.wine.code.cmp(&b.wine.code))
            .then_with(|| a.wine.id.cmp(&b.wine.id))
    });

    for (index, result) in results.iter_mut().enumerate() {
        result.rank = index + 1;
    }

    Ok(results)
}

fn aggregate_wine(
    wine: &WineInfo,
    totals: &HashMap<Uuid, i64>,
    roster: &[RosterEntry],
    view: View,
) -> ItemResult {
    let mut scores = BTreeMap::new();
    let mut sum: i64 = 0;
    let mut raters = 0;

    for member in roster {
        let Some(total) = totals.get(&member.participant_id) else {
            continue;
        };

        if view == View::Admin {
            scores.insert(member.username.clone(), *total);
        }

        sum += *total;
        raters += 1;
    }

    let average = if raters == 0 {
        0.0
    } else {
        round_to_hundredths(sum as f64 / raters as f64)
    };

    ItemResult {
        wine: wine.clone(),
        scores: (view == View::Admin).then_some(scores),
        average,
        raters,
        rank: 0,
    }
}

/// Rounds half away from zero
fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        wines: Vec<WineInfo>,
        roster: Vec<RosterEntry>,
        ratings: Vec<RatingEntry>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                wines: vec![],
                roster: vec![],
                ratings: vec![],
            }
        }

        fn wine(&mut self, code: &str) -> Uuid {
            let id = Uuid::new_v4();

            self.wines.push(WineInfo {
                id,
                name: format!("Wine {}", code),
                code: code.to_string(),
                year: 2019,
            });

            id
        }

        fn participant(&mut self, username: &str) -> Uuid {
            let id = Uuid::new_v4();

            self.roster.push(RosterEntry {
                participant_id: id,
                username: username.to_string(),
            });

            id
        }

        fn rate(&mut self, participant_id: Uuid, wine_id: Uuid, scores: (i32, i32, i32, i32)) {
            self.rate_with_comment(participant_id, wine_id, scores, "");
        }

        fn rate_with_comment(
            &mut self,
            participant_id: Uuid,
            wine_id: Uuid,
            (sight, aroma, taste, overall): (i32, i32, i32, i32),
            comments: &str,
        ) {
            self.ratings.push(RatingEntry {
                participant_id,
                wine_id,
                scores: Scores {
                    sight,
                    aroma,
                    taste,
                    overall,
                },
                comments: comments.to_string(),
            });
        }

        fn compute(&self, view: View) -> Vec<ItemResult> {
            compute_leaderboard(&self.ratings, &self.roster, &self.wines, view).unwrap()
        }
    }

    #[test]
    fn test_scenario() {
        let mut fixture = Fixture::new();
        let w1 = fixture.wine("W1");
        let w2 = fixture.wine("W2");
        let p1 = fixture.participant("p1");
        let p2 = fixture.participant("p2");

        fixture.rate(p1, w1, (3, 3, 3, 3));
        fixture.rate(p2, w1, (2, 2, 2, 2));
        fixture.rate(p2, w2, (4, 4, 4, 4));

        let results = fixture.compute(View::Admin);

        assert_eq!(results.len(), 2);

        assert_eq!(results[0].wine.id, w2);
        assert_eq!(results[0].average, 16.0);
        assert_eq!(results[0].rank, 1);
        assert_eq!(
            results[0].scores,
            Some(BTreeMap::from([("p2".to_string(), 16)]))
        );

        assert_eq!(results[1].wine.id, w1);
        assert_eq!(results[1].average, 10.0);
        assert_eq!(results[1].rank, 2);
        assert_eq!(
            results[1].scores,
            Some(BTreeMap::from([("p1".to_string(), 12), ("p2".to_string(), 8)]))
        );
    }

    #[test]
    fn test_non_raters_do_not_lower_average() {
        let mut fixture = Fixture::new();
        let x = fixture.wine("X");
        let a = fixture.participant("a");
        let b = fixture.participant("b");
        fixture.participant("c");

        fixture.rate(a, x, (3, 3, 3, 3));
        fixture.rate(b, x, (2, 2, 2, 2));

        let results = fixture.compute(View::Admin);

        assert_eq!(results[0].average, 10.0);
        assert_eq!(results[0].raters, 2);
        assert!(!results[0].scores.as_ref().unwrap().contains_key("c"));
    }

    #[test]
    fn test_empty_ratings_are_skipped() {
        let mut fixture = Fixture::new();
        let x = fixture.wine("X");
        let y = fixture.wine("Y");
        let a = fixture.participant("a");
        let b = fixture.participant("b");

        fixture.rate(a, x, (4, 4, 4, 4));
        fixture.rate(b, x, (0, 0, 0, 0));
        fixture.rate(b, y, (0, 0, 0, 0));

        let results = fixture.compute(View::Admin);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].wine.id, x);
        assert_eq!(results[0].average, 16.0);
        assert_eq!(results[0].raters, 1);
    }

    #[test]
    fn test_zero_scores_with_comment_count() {
        let mut fixture = Fixture::new();
        let x = fixture.wine("X");
        let a = fixture.participant("a");
        let b = fixture.participant("b");

        fixture.rate(a, x, (4, 4, 4, 4));
        fixture.rate_with_comment(b, x, (0, 0, 0, 0), "corked");

        let results = fixture.compute(View::Admin);

        assert_eq!(results[0].average, 8.0);
        assert_eq!(results[0].raters, 2);
    }

    #[test]
    fn test_ranking_ignores_creation_order() {
        let mut fixture = Fixture::new();
        let low = fixture.wine("A");
        let high = fixture.wine("B");
        let a = fixture.participant("a");
        let b = fixture.participant("b");

        fixture.rate(a, low, (3, 3, 3, 3));
        fixture.rate(a, high, (4, 4, 4, 3));
        fixture.rate(b, high, (4, 4, 4, 4));

        let results = fixture.compute(View::Participant);

        assert_eq!(results[0].wine.id, high);
        assert_eq!(results[0].average, 15.5);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].wine.id, low);
        assert_eq!(results[1].average, 12.0);
        assert_eq!(results[1].rank, 2);
    }

    #[test]
    fn test_ties_are_ordered_by_code() {
        let mut fixture = Fixture::new();
        let c = fixture.wine("C");
        let a = fixture.wine("A");
        let b = fixture.wine("B");
        let p = fixture.participant("p");

        for wine in [c, a, b] {
            fixture.rate(p, wine, (1, 1, 1, 1));
        }

        let codes: Vec<_> = fixture
            .compute(View::Participant)
            .into_iter()
            .map(|r| (r.wine.code, r.rank))
            .collect();

        assert_eq!(
            codes,
            vec![
                ("A".to_string(), 1),
                ("B".to_string(), 2),
                ("C".to_string(), 3)
            ]
        );
    }

    #[test]
    fn test_average_is_rounded() {
        let mut fixture = Fixture::new();
        let x = fixture.wine("X");
        let a = fixture.participant("a");
        let b = fixture.participant("b");
        let c = fixture.participant("c");

        fixture.rate(a, x, (1, 1, 1, 1));
        fixture.rate(b, x, (1, 1, 1, 1));
        fixture.rate(c, x, (1, 1, 1, 2));

        // 13 / 3 = 4.333...
        assert_eq!(fixture.compute(View::Participant)[0].average, 4.33);

        let mut fixture = Fixture::new();
        let x = fixture.wine("X");
        let a = fixture.participant("a");
        let b = fixture.participant("b");
        let c = fixture.participant("c");

        fixture.rate(a, x, (1, 1, 1, 1));
        fixture.rate(b, x, (1, 1, 1, 2));
        fixture.rate(c, x, (1, 1, 1, 2));

        // 14 / 3 = 4.666...
        assert_eq!(fixture.compute(View::Participant)[0].average, 4.67);
    }

    #[test]
    fn test_participant_view_hides_scores() {
        let mut fixture = Fixture::new();
        let x = fixture.wine("X");
        let a = fixture.participant("a");

        fixture.rate(a, x, (1, 2, 3, 4));

        let results = fixture.compute(View::Participant);

        assert_eq!(results[0].scores, None);
        assert_eq!(results[0].average, 10.0);
    }

    #[test]
    fn test_raters_outside_roster_are_ignored() {
        let mut fixture = Fixture::new();
        let x = fixture.wine("X");
        let stranger = Uuid::new_v4();

        fixture.rate(stranger, x, (1, 2, 3, 4));

        let results = fixture.compute(View::Admin);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].average, 0.0);
        assert_eq!(results[0].raters, 0);
        assert_eq!(results[0].scores, Some(BTreeMap::new()));
    }

    #[test]
    fn test_unknown_wine_is_fatal() {
        let mut fixture = Fixture::new();
        fixture.wine("X");
        let a = fixture.participant("a");
        let missing = Uuid::new_v4();

        fixture.rate(a, missing, (1, 1, 1, 1));

        assert_eq!(
            compute_leaderboard(
                &fixture.ratings,
                &fixture.roster,
                &fixture.wines,
                View::Admin
            ),
            Err(AggregationError::UnknownWine(missing))
        );
    }

    #[test]
    fn test_no_ratings() {
        let mut fixture = Fixture::new();
        fixture.wine("X");
        fixture.participant("a");

        assert!(fixture.compute(View::Admin).is_empty());
    }

    #[test]
    fn test_view_from_identity() {
        assert_eq!(View::from(&Identity::Admin), View::Admin);
        assert_eq!(
            View::from(&Identity::Participant {
                participant_id: Uuid::new_v4(),
                game_id: Uuid::new_v4()
            }),
            View::Participant
        );
    }

    #[test]
    fn test_scores_range_and_total() {
        let maxed = Scores {
            sight: i32::MAX,
            aroma: i32::MAX,
            taste: i32::MAX,
            overall: i32::MAX,
        };

        assert_eq!(maxed.total(), 4 * i64::from(i32::MAX));
        assert!(!maxed.is_in_range());

        let top = Scores {
            sight: Scores::MAX,
            aroma: Scores::MAX,
            taste: Scores::MAX,
            overall: Scores::MAX,
        };
        assert!(top.is_in_range());
        assert!(Scores::default().is_in_range());
        assert!(!Scores {
            overall: -1,
            ..Default::default()
        }
        .is_in_range());
    }
}
