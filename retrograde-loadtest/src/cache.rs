//! Per-user cache of cards seen in the last successful card listing

use crate::random::{choose, RandomSource};
use serde::Deserialize;

/// A card as returned by `GET /boards/{board}/cards`.
///
/// Only the fields needed to address the card are kept; everything else in
/// the payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KnownCard {
    pub id: String,
    pub rank_id: String,
}

impl KnownCard {
    pub fn new(id: impl Into<String>, rank_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rank_id: rank_id.into(),
        }
    }
}

/// Ordered `(id, rank_id)` pairs owned by one virtual user.
///
/// Contents are only ever replaced wholesale; there is no incremental add
/// or remove, so a card created or deleted by this user stays invisible
/// until the next listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownCards {
    cards: Vec<KnownCard>,
}

impl KnownCards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole cache
    pub fn replace(&mut self, cards: Vec<KnownCard>) {
        self.cards = cards;
    }

    /// A uniformly random card, `None` when empty
    pub fn choose(&self, rng: &mut impl RandomSource) -> Option<&KnownCard> {
        choose(rng, &self.cards)
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn as_slice(&self) -> &[KnownCard] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;

    #[test]
    fn test_replace_discards_previous_contents() {
        let mut cache = KnownCards::new();
        assert!(cache.is_empty());

        cache.replace(vec![KnownCard::new("c1", "r1"), KnownCard::new("c2", "r2")]);
        assert_eq!(cache.len(), 2);

        cache.replace(vec![KnownCard::new("c3", "r1")]);
        assert_eq!(cache.as_slice(), &[KnownCard::new("c3", "r1")]);

        cache.replace(Vec::new());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_choose() {
        let mut cache = KnownCards::new();
        let mut rng = ScriptedRandom::new(vec![1]);
        assert!(cache.choose(&mut rng).is_none());

        cache.replace(vec![KnownCard::new("c1", "r1"), KnownCard::new("c2", "r2")]);
        assert_eq!(cache.choose(&mut rng), Some(&KnownCard::new("c2", "r2")));
    }

    #[test]
    fn test_deserialize_ignores_extra_fields() {
        let body = r#"[
            {"id":"c1","rank_id":"r1","name":"n","description":"d","votes":3,"voted":false,"owner":true},
            {"id":"c2","rank_id":"r4"}
        ]"#;
        let cards: Vec<KnownCard> = serde_json::from_str(body).unwrap();
        assert_eq!(
            cards,
            vec![KnownCard::new("c1", "r1"), KnownCard::new("c2", "r4")]
        );
    }
}
