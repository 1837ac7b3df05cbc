use std::collections::HashMap;

use rand::Rng;

use crate::error::BoardError;
use crate::types::{
    AppliedUpdate, BettingOption, Direction, MAX_PRICE_CHANGE, Match, Price, VisibleRange,
};

/// Where an option lives inside the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionAddress {
    pub match_index: usize,
    pub category_index: usize,
    pub option_index: usize,
}

/// Fixed-size, ordered match collection. Only option prices change after
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchStore {
    matches: Vec<Match>,
    addresses: HashMap<String, OptionAddress>,
}

impl MatchStore {
    pub fn new(matches: Vec<Match>) -> Result<Self, BoardError> {
        let mut addresses = HashMap::new();
        for (match_index, m) in matches.iter().enumerate() {
            for (category_index, category) in m.betting_options.iter().enumerate() {
                for (option_index, option) in category.options.iter().enumerate() {
                    let address = OptionAddress {
                        match_index,
                        category_index,
                        option_index,
                    };
                    if addresses.insert(option.id.clone(), address).is_some() {
                        return Err(BoardError::DuplicateOptionId(option.id.clone()));
                    }
                }
            }
        }
        Ok(Self { matches, addresses })
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Match> {
        self.matches.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter()
    }

    /// The rows covered by `range`, clipped to the store.
    pub fn rows(&self, range: VisibleRange) -> &[Match] {
        &self.matches[range.indices(self.matches.len())]
    }

    pub fn resolve(&self, option_id: &str) -> Option<OptionAddress> {
        self.addresses.get(option_id).copied()
    }

    pub fn option(&self, option_id: &str) -> Option<&BettingOption> {
        let address = self.resolve(option_id)?;
        self.matches
            .get(address.match_index)?
            .betting_options
            .get(address.category_index)?
            .options
            .get(address.option_index)
    }

    pub fn live_count(&self) -> usize {
        self.matches.iter().filter(|m| m.is_live).count()
    }

    /// Move one option's price by the relative `change` (clamped to ±10%).
    /// References that do not resolve are dropped and leave the store as is.
    pub fn apply_update(
        &mut self,
        match_index: usize,
        category: &str,
        option_index: usize,
        change: f64,
    ) -> Option<AppliedUpdate> {
        let option = self
            .matches
            .get_mut(match_index)?
            .betting_options
            .iter_mut()
            .find(|c| c.name == category)?
            .options
            .get_mut(option_index)?;

        let old_value = option.value;
        let new_value = perturb(old_value, change);
        option.value = new_value;

        Some(AppliedUpdate {
            option_id: option.id.clone(),
            match_index,
            old_value,
            new_value,
            direction: Direction::between(old_value, new_value),
        })
    }
}

/// `old * (1 + change)`, kept inside the price band and rounded to cents.
pub fn perturb(old: Price, change: f64) -> Price {
    let change = if change.is_finite() {
        change.clamp(-MAX_PRICE_CHANGE, MAX_PRICE_CHANGE)
    } else {
        0.0
    };
    Price::from_f64_clamped(old.as_f64() * (1.0 + change))
}

pub fn sample_change<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(-MAX_PRICE_CHANGE..=MAX_PRICE_CHANGE)
}

#[cfg(test)]
pub(crate) mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::types::{MarketCategory, Sport, option_id};

    /// `count` matches with a single `1X2` market priced at `price` hundredths.
    pub(crate) fn flat_matches(count: usize, price: u32) -> Vec<Match> {
        (0..count)
            .map(|i| Match {
                id: format!("match-{i}"),
                sport: Sport::Soccer,
                team1: "Ajax".into(),
                team2: "Benfica".into(),
                league: "Champions League".into(),
                start_time: "20:45".into(),
                score: "0 - 0".into(),
                is_live: i % 2 == 0,
                betting_options: vec![MarketCategory {
                    name: "1X2".into(),
                    options: ["1", "X", "2"]
                        .into_iter()
                        .map(|name| BettingOption {
                            id: option_id(i, "1X2", name),
                            name: name.into(),
                            value: Price::from_hundredths(price),
                        })
                        .collect(),
                }],
            })
            .collect()
    }

    #[test]
    fn forced_increase_updates_only_the_target() {
        let mut store = MatchStore::new(flat_matches(3, 200)).unwrap();
        let before = store.clone();

        let applied = store.apply_update(1, "1X2", 0, 0.05).unwrap();
        assert_eq!(applied.option_id, "match-1-1X2-1");
        assert_eq!(applied.new_value.to_string(), "2.10");
        assert_eq!(applied.direction, Direction::Increase);

        for (i, m) in store.iter().enumerate() {
            for (j, option) in m.betting_options[0].options.iter().enumerate() {
                if (i, j) == (1, 0) {
                    assert_eq!(option.value, Price::from_hundredths(210));
                } else {
                    assert_eq!(option, &before.get(i).unwrap().betting_options[0].options[j]);
                }
            }
        }
    }

    #[test]
    fn unresolved_references_leave_store_untouched() {
        let mut store = MatchStore::new(flat_matches(3, 200)).unwrap();
        let before = store.clone();
        assert!(store.apply_update(3, "1X2", 0, 0.05).is_none());
        assert!(store.apply_update(usize::MAX, "1X2", 0, 0.05).is_none());
        assert!(store.apply_update(0, "Total", 0, 0.05).is_none());
        assert!(store.apply_update(0, "1X2", 3, 0.05).is_none());
        assert_eq!(store, before);
    }

    #[test]
    fn random_updates_stay_in_band_and_bounded() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut store = MatchStore::new(flat_matches(4, 250)).unwrap();
        for step in 0..2_000 {
            let match_index = step % 4;
            let option_index = step % 3;
            let old = store.get(match_index).unwrap().betting_options[0].options[option_index].value;
            let change = sample_change(&mut rng);
            let applied = store
                .apply_update(match_index, "1X2", option_index, change)
                .unwrap();
            assert!(applied.new_value >= Price::MIN && applied.new_value <= Price::MAX);
            let delta = (applied.new_value.as_f64() - old.as_f64()).abs();
            assert!(delta <= old.as_f64() * MAX_PRICE_CHANGE + 0.005 + 1e-9);
            assert_eq!(applied.old_value, old);
        }
    }

    #[test]
    fn perturb_clamps_change_and_band() {
        assert_eq!(perturb(Price::from_hundredths(200), 0.5), Price::from_hundredths(220));
        assert_eq!(perturb(Price::from_hundredths(490), 0.1), Price::MAX);
        assert_eq!(perturb(Price::from_hundredths(105), -0.1), Price::MIN);
        assert_eq!(perturb(Price::from_hundredths(300), f64::NAN), Price::from_hundredths(300));
    }

    #[test]
    fn tie_reports_decrease() {
        let mut store = MatchStore::new(flat_matches(1, 500)).unwrap();
        let applied = store.apply_update(0, "1X2", 2, 0.08).unwrap();
        assert_eq!(applied.new_value, applied.old_value);
        assert_eq!(applied.direction, Direction::Decrease);
    }

    #[test]
    fn option_ids_resolve_to_one_address() {
        let store = MatchStore::new(flat_matches(3, 200)).unwrap();
        assert_eq!(
            store.resolve("match-2-1X2-X"),
            Some(OptionAddress {
                match_index: 2,
                category_index: 0,
                option_index: 1,
            })
        );
        assert_eq!(store.option("match-2-1X2-X").unwrap().name, "X");
        assert!(store.resolve("match-3-1X2-X").is_none());
        assert_eq!(store.live_count(), 2);
        assert_eq!(store.rows(VisibleRange { start: 1, end: 9 }).len(), 2);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut matches = flat_matches(2, 200);
        matches[1].betting_options[0].options[0].id = matches[0].betting_options[0].options[0].id.clone();
        assert!(matches!(
            MatchStore::new(matches),
            Err(BoardError::DuplicateOptionId(id)) if id == "match-0-1X2-1"
        ));
    }
}
