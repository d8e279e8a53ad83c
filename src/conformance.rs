//! Deck conformance checks.
//!
//! A pool is checked in two phases. The first rejects any card the format's
//! rules filter doesn't accept. Only a pool that passes it is checked for
//! restricted cards, i.e. cards present in more than one copy that are
//! either on the restricted list or legendary non-planeswalkers in a format
//! that restricts legendaries.

use crate::card::PaperCard;
use crate::catalog::CardCatalog;
use crate::format::FormatRule;
use crate::pool::{CardPool, Deck};

fn list_names(cards: &[PaperCard]) -> String {
    cards.iter().map(|card| format!("\n{}", card.name)).collect()
}

/// Why a pool doesn't conform to a format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// Cards the format's rules filter rejects.
    #[error("contains the following illegal cards:\n{}", list_names(.0))]
    IllegalCards(Vec<PaperCard>),
    /// Restricted cards present in more than one copy.
    #[error("contains more than one copy of the following restricted cards:\n{}", list_names(.0))]
    RestrictedOverLimit(Vec<PaperCard>),
}

impl Violation {
    pub fn cards(&self) -> &[PaperCard] {
        match self {
            Violation::IllegalCards(cards) | Violation::RestrictedOverLimit(cards) => cards,
        }
    }

    pub fn card_names(&self) -> Vec<&str> {
        self.cards().iter().map(|card| card.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConformanceError {
    /// No deck was given to check.
    #[error("is not selected")]
    MissingDeck,
    #[error(transparent)]
    Violation(#[from] Violation),
}

/// Checks `pool` against `rule`, returning the first failing phase's report.
pub fn check_pool(
    rule: &FormatRule,
    pool: &CardPool,
    catalog: &dyn CardCatalog,
) -> Option<Violation> {
    let illegal: Vec<PaperCard> = pool
        .iter()
        .filter(|(card, _)| !rule.is_card_legal(card, catalog))
        .map(|(card, _)| card.clone())
        .collect();
    if !illegal.is_empty() {
        return Some(Violation::IllegalCards(illegal));
    }

    if rule.restricted_card_names().is_empty() && !rule.is_restricted_legendary() {
        return None;
    }

    // A single copy is always fine, even for a card that is both restricted
    // and legendary.
    let over_limit: Vec<PaperCard> = pool
        .iter()
        .filter(|(card, count)| *count > 1 && is_restricted(rule, card))
        .map(|(card, _)| card.clone())
        .collect();
    if !over_limit.is_empty() {
        return Some(Violation::RestrictedOverLimit(over_limit));
    }

    None
}

fn is_restricted(rule: &FormatRule, card: &PaperCard) -> bool {
    let listed = rule.restricted_card_names().contains(&card.name);
    let legendary = rule.is_restricted_legendary() && card.is_legendary() && !card.is_planeswalker();
    listed || legendary
}

/// Checks every section of `deck` as one pool.
pub fn check_deck(
    rule: &FormatRule,
    deck: Option<&Deck>,
    catalog: &dyn CardCatalog,
) -> Result<(), ConformanceError> {
    let deck = deck.ok_or(ConformanceError::MissingDeck)?;
    match check_pool(rule, &deck.all_cards_in_single_pool(), catalog) {
        Some(violation) => Err(violation.into()),
        None => Ok(()),
    }
}

pub fn is_pool_legal(rule: &FormatRule, pool: &CardPool, catalog: &dyn CardCatalog) -> bool {
    check_pool(rule, pool, catalog).is_none()
}

pub fn is_deck_legal(rule: &FormatRule, deck: &Deck, catalog: &dyn CardCatalog) -> bool {
    is_pool_legal(rule, &deck.all_cards_in_single_pool(), catalog)
}
