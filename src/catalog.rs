//! Read-only card reference data consulted by legality predicates.

use std::collections::{BTreeMap, HashMap};

use crate::card::PaperCard;
use crate::rarity::Rarity;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Lookup surface over every known printing.
///
/// Legality rules only ask about card names: a card is legal "in the
/// abstract" if any printing of that name satisfies the rule, regardless of
/// the printing actually in the deck.
pub trait CardCatalog {
    /// Returns true if `set_code` names a known edition.
    fn edition_exists(&self, set_code: &str) -> bool;

    /// Returns true if any printing of `card_name` appeared in one of `set_codes`.
    fn was_printed_in_sets(&self, card_name: &str, set_codes: &[String]) -> bool;

    /// Returns true if any printing of `card_name` was printed at `rarity`.
    fn was_printed_at_rarity(&self, card_name: &str, rarity: Rarity) -> bool;

    /// All printings in `set_code`, in collector order.
    fn cards_in_set(&self, set_code: &str) -> Vec<PaperCard>;
}

/// An edition known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Edition {
    pub code: String,
    pub name: String,
}

/// Catalog held entirely in memory, built up by registering editions and
/// printings.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct InMemoryCatalog {
    #[cfg_attr(feature = "serialization", serde(default))]
    editions: BTreeMap<String, Edition>,
    printings: Vec<PaperCard>,
    #[cfg_attr(feature = "serialization", serde(skip))]
    by_name: HashMap<String, Vec<usize>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edition(&mut self, code: impl Into<String>, name: impl Into<String>) {
        let code = code.into();
        self.editions.insert(
            code.clone(),
            Edition {
                code,
                name: name.into(),
            },
        );
    }

    /// Registers a printing. Its edition is created on the fly if unknown.
    pub fn add_printing(&mut self, card: PaperCard) {
        if !self.editions.contains_key(&card.set_code) {
            self.add_edition(card.set_code.clone(), card.set_code.clone());
        }
        self.by_name
            .entry(card.name.clone())
            .or_default()
            .push(self.printings.len());
        self.printings.push(card);
    }

    pub fn with_printing(mut self, card: PaperCard) -> Self {
        self.add_printing(card);
        self
    }

    pub fn edition(&self, code: &str) -> Option<&Edition> {
        self.editions.get(code)
    }

    pub fn editions(&self) -> impl Iterator<Item = &Edition> {
        self.editions.values()
    }

    /// Every printing of `card_name`.
    pub fn printings_of<'a>(&'a self, card_name: &str) -> impl Iterator<Item = &'a PaperCard> {
        self.by_name
            .get(card_name)
            .into_iter()
            .flatten()
            .map(|&idx| &self.printings[idx])
    }

    pub fn len(&self) -> usize {
        self.printings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.printings.is_empty()
    }

    /// Rebuilds the name index. Needed after deserializing, since the index
    /// is not part of the stored form.
    pub fn reindex(&mut self) {
        self.by_name.clear();
        for (idx, card) in self.printings.iter().enumerate() {
            self.by_name.entry(card.name.clone()).or_default().push(idx);
        }
        for card in &self.printings {
            if !self.editions.contains_key(&card.set_code) {
                self.editions.insert(
                    card.set_code.clone(),
                    Edition {
                        code: card.set_code.clone(),
                        name: card.set_code.clone(),
                    },
                );
            }
        }
    }

    /// Parses a catalog from its JSON form and rebuilds the name index.
    #[cfg(feature = "serialization")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut catalog: InMemoryCatalog = serde_json::from_str(json)?;
        catalog.reindex();
        Ok(catalog)
    }
}

impl FromIterator<PaperCard> for InMemoryCatalog {
    fn from_iter<I: IntoIterator<Item = PaperCard>>(iter: I) -> Self {
        let mut catalog = InMemoryCatalog::new();
        for card in iter {
            catalog.add_printing(card);
        }
        catalog
    }
}

impl CardCatalog for InMemoryCatalog {
    fn edition_exists(&self, set_code: &str) -> bool {
        self.editions.contains_key(set_code)
    }

    fn was_printed_in_sets(&self, card_name: &str, set_codes: &[String]) -> bool {
        self.printings_of(card_name)
            .any(|card| card.printed_in_sets(set_codes))
    }

    fn was_printed_at_rarity(&self, card_name: &str, rarity: Rarity) -> bool {
        self.printings_of(card_name).any(|card| card.rarity == rarity)
    }

    fn cards_in_set(&self, set_code: &str) -> Vec<PaperCard> {
        self.printings
            .iter()
            .filter(|card| card.set_code == set_code)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> InMemoryCatalog {
        [
            PaperCard::new("Lightning Bolt", "LEA", Rarity::Common),
            PaperCard::new("Lightning Bolt", "M10", Rarity::Common),
            PaperCard::new("Lightning Bolt", "2XM", Rarity::Uncommon),
            PaperCard::new("Black Lotus", "LEA", Rarity::Rare),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_printed_in_any_set() {
        let catalog = sample_catalog();
        let sets = vec!["M10".to_string(), "M11".to_string()];
        assert!(catalog.was_printed_in_sets("Lightning Bolt", &sets));
        assert!(!catalog.was_printed_in_sets("Black Lotus", &sets));
        assert!(!catalog.was_printed_in_sets("Unknown Card", &sets));
    }

    #[test]
    fn test_printed_at_rarity_considers_every_printing() {
        let catalog = sample_catalog();
        assert!(catalog.was_printed_at_rarity("Lightning Bolt", Rarity::Common));
        assert!(catalog.was_printed_at_rarity("Lightning Bolt", Rarity::Uncommon));
        assert!(!catalog.was_printed_at_rarity("Black Lotus", Rarity::Common));
    }

    #[test]
    fn test_editions_created_from_printings() {
        let mut catalog = sample_catalog();
        catalog.add_edition("ICE", "Ice Age");
        assert!(catalog.edition_exists("LEA"));
        assert!(catalog.edition_exists("ICE"));
        assert!(!catalog.edition_exists("XYZ"));
        assert_eq!(catalog.edition("ICE").map(|e| e.name.as_str()), Some("Ice Age"));
        assert_eq!(catalog.cards_in_set("LEA").len(), 2);
        assert!(catalog.cards_in_set("ICE").is_empty());
    }

    #[cfg(feature = "serialization")]
    #[test]
    fn test_json_load_rebuilds_index() {
        let json = serde_json::to_string(&sample_catalog()).expect("serialize catalog");
        let catalog = InMemoryCatalog::from_json(&json).expect("parse catalog");
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.printings_of("Lightning Bolt").count(), 3);
    }
}
