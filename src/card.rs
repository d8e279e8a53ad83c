use crate::rarity::Rarity;
use crate::types::{CardType, Supertype};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Prefix the digital rebalancing pass puts in front of adjusted card names.
pub const REBALANCED_PREFIX: &str = "A-";

/// A specific printing of a card: the card identity plus the set it was
/// printed in and the rarity it was printed at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PaperCard {
    pub name: String,
    pub set_code: String,
    pub rarity: Rarity,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub supertypes: Vec<Supertype>,
    #[cfg_attr(feature = "serialization", serde(default))]
    pub card_types: Vec<CardType>,
    /// True if this printing is a rebalanced variant of another card.
    #[cfg_attr(feature = "serialization", serde(default))]
    pub rebalanced: bool,
    /// True if a rebalanced variant of this card exists.
    #[cfg_attr(feature = "serialization", serde(default))]
    pub has_rebalanced_variant: bool,
}

impl PaperCard {
    pub fn new(name: impl Into<String>, set_code: impl Into<String>, rarity: Rarity) -> Self {
        Self {
            name: name.into(),
            set_code: set_code.into(),
            rarity,
            supertypes: Vec::new(),
            card_types: Vec::new(),
            rebalanced: false,
            has_rebalanced_variant: false,
        }
    }

    pub fn builder(name: impl Into<String>, set_code: impl Into<String>) -> PaperCardBuilder {
        PaperCardBuilder::new(name, set_code)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if this card has the given card type.
    pub fn has_card_type(&self, card_type: CardType) -> bool {
        self.card_types.contains(&card_type)
    }

    /// Returns true if this card has the given supertype.
    pub fn has_supertype(&self, supertype: Supertype) -> bool {
        self.supertypes.contains(&supertype)
    }

    /// Returns true if this is a legendary card.
    pub fn is_legendary(&self) -> bool {
        self.has_supertype(Supertype::Legendary)
    }

    /// Returns true if this is a planeswalker card.
    pub fn is_planeswalker(&self) -> bool {
        self.has_card_type(CardType::Planeswalker)
    }

    /// Returns true for rebalanced printings, either flagged explicitly or
    /// carrying the rebalanced name prefix.
    pub fn is_rebalanced(&self) -> bool {
        self.rebalanced || self.name.starts_with(REBALANCED_PREFIX)
    }

    /// Returns true for original cards that have a rebalanced counterpart.
    pub fn is_unrebalanced(&self) -> bool {
        self.has_rebalanced_variant
    }

    /// Returns true if this printing comes from one of `set_codes`.
    pub fn printed_in_sets(&self, set_codes: &[String]) -> bool {
        set_codes.iter().any(|code| *code == self.set_code)
    }
}

/// Builder for constructing PaperCard instances.
#[derive(Debug, Clone)]
pub struct PaperCardBuilder {
    card: PaperCard,
}

impl PaperCardBuilder {
    pub fn new(name: impl Into<String>, set_code: impl Into<String>) -> Self {
        Self {
            card: PaperCard::new(name, set_code, Rarity::Common),
        }
    }

    pub fn rarity(mut self, rarity: Rarity) -> Self {
        self.card.rarity = rarity;
        self
    }

    pub fn supertypes(mut self, supertypes: Vec<Supertype>) -> Self {
        self.card.supertypes = supertypes;
        self
    }

    pub fn card_types(mut self, types: Vec<CardType>) -> Self {
        self.card.card_types = types;
        self
    }

    pub fn rebalanced(mut self, rebalanced: bool) -> Self {
        self.card.rebalanced = rebalanced;
        self
    }

    pub fn has_rebalanced_variant(mut self, has_variant: bool) -> Self {
        self.card.has_rebalanced_variant = has_variant;
        self
    }

    pub fn build(self) -> PaperCard {
        self.card
    }
}
