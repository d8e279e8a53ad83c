//! Card pools and decks.
//!
//! A pool is a multiset of printings: each distinct printing appears once
//! with a copy count. Insertion order is preserved so reports list cards in
//! the order the deck was built.

use std::collections::BTreeMap;

use crate::card::PaperCard;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct CardPool {
    entries: Vec<(PaperCard, u32)>,
}

impl CardPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single copy of `card`.
    pub fn add(&mut self, card: PaperCard) {
        self.add_n(card, 1);
    }

    /// Adds `count` copies of `card`. Adding zero copies is a no-op.
    pub fn add_n(&mut self, card: PaperCard, count: u32) {
        if count == 0 {
            return;
        }
        match self.entries.iter_mut().find(|(existing, _)| *existing == card) {
            Some((_, existing_count)) => *existing_count += count,
            None => self.entries.push((card, count)),
        }
    }

    /// Adds every entry of `other` to this pool.
    pub fn merge(&mut self, other: &CardPool) {
        for (card, count) in other.iter() {
            self.add_n(card.clone(), count);
        }
    }

    /// Number of copies of this exact printing.
    pub fn count(&self, card: &PaperCard) -> u32 {
        self.entries
            .iter()
            .find(|(existing, _)| existing == card)
            .map_or(0, |(_, count)| *count)
    }

    /// Number of copies across all printings sharing `name`.
    pub fn count_by_name(&self, name: &str) -> u32 {
        self.entries
            .iter()
            .filter(|(card, _)| card.name == name)
            .map(|(_, count)| *count)
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PaperCard, u32)> {
        self.entries.iter().map(|(card, count)| (card, *count))
    }

    /// Number of distinct printings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of cards, counting copies.
    pub fn total_cards(&self) -> u32 {
        self.entries.iter().map(|(_, count)| *count).sum()
    }
}

impl FromIterator<(PaperCard, u32)> for CardPool {
    fn from_iter<I: IntoIterator<Item = (PaperCard, u32)>>(iter: I) -> Self {
        let mut pool = CardPool::new();
        for (card, count) in iter {
            pool.add_n(card, count);
        }
        pool
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum DeckSection {
    Commander,
    Main,
    Sideboard,
}

/// A named deck made of one pool per section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Deck {
    pub name: String,
    sections: BTreeMap<DeckSection, CardPool>,
}

impl Deck {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: BTreeMap::new(),
        }
    }

    /// Returns the pool for `section`, creating it if needed.
    pub fn section_mut(&mut self, section: DeckSection) -> &mut CardPool {
        self.sections.entry(section).or_default()
    }

    pub fn section(&self, section: DeckSection) -> Option<&CardPool> {
        self.sections.get(&section)
    }

    pub fn main(&self) -> Option<&CardPool> {
        self.section(DeckSection::Main)
    }

    /// Adds `count` copies of `card` to the main section.
    pub fn with_main(mut self, card: PaperCard, count: u32) -> Self {
        self.section_mut(DeckSection::Main).add_n(card, count);
        self
    }

    /// Adds `count` copies of `card` to the sideboard.
    pub fn with_sideboard(mut self, card: PaperCard, count: u32) -> Self {
        self.section_mut(DeckSection::Sideboard).add_n(card, count);
        self
    }

    /// Merges every section into one pool, so copies split between main
    /// deck and sideboard are counted together.
    pub fn all_cards_in_single_pool(&self) -> CardPool {
        let mut all = CardPool::new();
        for pool in self.sections.values() {
            all.merge(pool);
        }
        all
    }
}
