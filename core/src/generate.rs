use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use time::macros::format_description;
use time::{Duration, OffsetDateTime};

use crate::types::{
    BettingOption, CATEGORIES, MarketCategory, Match, Price, Sport, option_id,
};

const TEAMS: &[&str] = &[
    "Manchester United",
    "Liverpool",
    "Barcelona",
    "Real Madrid",
    "Bayern Munich",
    "PSG",
    "Juventus",
    "AC Milan",
    "Chelsea",
    "Arsenal",
    "Inter Milan",
    "Napoli",
    "Ajax",
    "Benfica",
    "Porto",
    "Celtic",
    "Lakers",
    "Warriors",
    "Celtics",
    "Heat",
    "Bulls",
    "Nuggets",
    "Bucks",
    "Suns",
    "Djokovic",
    "Nadal",
    "Alcaraz",
    "Sinner",
    "Medvedev",
    "Zverev",
    "Swiatek",
    "Sabalenka",
    "Yankees",
    "Red Sox",
    "Dodgers",
    "Cubs",
    "Patriots",
    "Chiefs",
    "Packers",
    "Steelers",
    "Bruins",
    "Penguins",
    "Maple Leafs",
    "Red Wings",
];

const LIVE_PROBABILITY: f64 = 0.7;

/// Build `count` matches with unique, index-derived ids and prices inside the
/// tradable band.
pub fn generate_matches<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Match> {
    let now = OffsetDateTime::now_utc();
    (0..count)
        .map(|i| generate_match(i, now, &mut *rng))
        .collect()
}

pub fn generate_matches_seeded(count: usize, seed: Option<u64>) -> Vec<Match> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    generate_matches(count, &mut rng)
}

fn generate_match<R: Rng + ?Sized>(index: usize, now: OffsetDateTime, rng: &mut R) -> Match {
    let sport = Sport::ALL[rng.gen_range(0..Sport::ALL.len())];
    let config = sport.config();
    let mut teams = TEAMS.choose_multiple(rng, 2);
    let team1 = teams.next().copied().unwrap_or("Home");
    let team2 = teams.next().copied().unwrap_or("Away");
    let league = config.leagues[rng.gen_range(0..config.leagues.len())];

    Match {
        id: format!("match-{index}"),
        sport,
        team1: team1.to_string(),
        team2: team2.to_string(),
        league: league.to_string(),
        start_time: start_time(now, rng),
        score: format!("{} - {}", rng.gen_range(0..5), rng.gen_range(0..5)),
        is_live: rng.gen_bool(LIVE_PROBABILITY),
        betting_options: CATEGORIES
            .iter()
            .map(|category| MarketCategory {
                name: category.name.to_string(),
                options: category
                    .options
                    .iter()
                    .map(|name| BettingOption {
                        id: option_id(index, category.name, name),
                        name: name.to_string(),
                        value: Price::from_hundredths(
                            rng.gen_range(Price::MIN.hundredths()..=Price::MAX.hundredths()),
                        ),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn start_time<R: Rng + ?Sized>(now: OffsetDateTime, rng: &mut R) -> String {
    let offset = Duration::minutes(rng.gen_range(-90..=90));
    let format = format_description!("[hour]:[minute]");
    (now + offset)
        .format(&format)
        .unwrap_or_else(|_| "--:--".to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::matches::MatchStore;

    #[test]
    fn matches_follow_the_board_shape() {
        let matches = generate_matches_seeded(500, Some(42));
        assert_eq!(matches.len(), 500);
        for (i, m) in matches.iter().enumerate() {
            assert_eq!(m.id, format!("match-{i}"));
            assert_ne!(m.team1, m.team2);
            assert!(m.sport.config().leagues.contains(&m.league.as_str()));
            assert_eq!(m.start_time.len(), 5);
            let names: Vec<_> = m.betting_options.iter().map(|c| c.name.as_str()).collect();
            assert_eq!(names, ["1X2", "Double Chance", "Total", "Both Teams Score"]);
            for option in m.betting_options.iter().flat_map(|c| &c.options) {
                assert!(option.value >= Price::MIN && option.value <= Price::MAX);
                assert!(option.id.starts_with(&format!("match-{i}-")));
            }
        }
    }

    #[test]
    fn ids_are_unique_and_seeded_runs_repeat() {
        let matches = generate_matches_seeded(200, Some(9));
        let ids: HashSet<_> = matches
            .iter()
            .flat_map(|m| m.betting_options.iter().flat_map(|c| &c.options))
            .map(|o| o.id.clone())
            .collect();
        assert_eq!(ids.len(), 200 * 10);
        assert!(MatchStore::new(matches.clone()).is_ok());

        let again = generate_matches_seeded(200, Some(9));
        let prices = |ms: &[Match]| -> Vec<Price> {
            ms.iter()
                .flat_map(|m| m.betting_options.iter().flat_map(|c| &c.options))
                .map(|o| o.value)
                .collect()
        };
        assert_eq!(prices(&matches), prices(&again));
    }

    #[test]
    fn roughly_seventy_percent_live() {
        let matches = generate_matches_seeded(5_000, Some(1));
        let live = matches.iter().filter(|m| m.is_live).count();
        assert!((3_300..=3_700).contains(&live), "live = {live}");
    }
}
