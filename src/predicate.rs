//! Card legality predicates.
//!
//! A predicate is a plain shared closure over a printing and the catalog.
//! Formats compile two of them once at construction (see [`compile`]) and
//! evaluate them many times afterwards.

use std::collections::HashSet;
use std::sync::Arc;

use crate::card::PaperCard;
use crate::catalog::CardCatalog;
use crate::format::{FormatRule, FormatSubType};
use crate::rarity::Rarity;

pub type CardPredicate = Arc<dyn Fn(&PaperCard, &dyn CardCatalog) -> bool + Send + Sync>;

// ============================================================================
// Combinators
// ============================================================================

pub fn always() -> CardPredicate {
    Arc::new(|_, _| true)
}

pub fn not(inner: CardPredicate) -> CardPredicate {
    Arc::new(move |card, catalog| !inner(card, catalog))
}

pub fn and(lhs: CardPredicate, rhs: CardPredicate) -> CardPredicate {
    Arc::new(move |card, catalog| lhs(card, catalog) && rhs(card, catalog))
}

pub fn or(lhs: CardPredicate, rhs: CardPredicate) -> CardPredicate {
    Arc::new(move |card, catalog| lhs(card, catalog) || rhs(card, catalog))
}

/// True if any of `predicates` holds. An empty list never matches.
pub fn any_of(predicates: Vec<CardPredicate>) -> CardPredicate {
    Arc::new(move |card, catalog| predicates.iter().any(|p| p(card, catalog)))
}

// ============================================================================
// Leaf predicates
// ============================================================================

/// Exact, case-sensitive name membership.
pub fn name_in(names: &[String]) -> CardPredicate {
    let names: HashSet<String> = names.iter().cloned().collect();
    Arc::new(move |card, _| names.contains(&card.name))
}

pub fn is_rebalanced() -> CardPredicate {
    Arc::new(|card, _| card.is_rebalanced())
}

pub fn is_unrebalanced() -> CardPredicate {
    Arc::new(|card, _| card.is_unrebalanced())
}

/// The printing itself comes from one of `set_codes`.
pub fn printed_in_sets(set_codes: &[String]) -> CardPredicate {
    let set_codes = set_codes.to_vec();
    Arc::new(move |card, _| card.printed_in_sets(&set_codes))
}

/// Some printing of the card, not necessarily this one, comes from one of
/// `set_codes`.
pub fn was_printed_in_sets(set_codes: &[String]) -> CardPredicate {
    let set_codes = set_codes.to_vec();
    Arc::new(move |card, catalog| catalog.was_printed_in_sets(&card.name, &set_codes))
}

pub fn was_printed_at_rarity(rarity: Rarity) -> CardPredicate {
    Arc::new(move |card, catalog| catalog.was_printed_at_rarity(&card.name, rarity))
}

// ============================================================================
// Format compilation
// ============================================================================

/// Compiles the legality predicate for `rule`.
///
/// With `printed` set, the set restriction applies to the printing being
/// evaluated; otherwise it is enough for any printing of the card to come
/// from an allowed set. The two only differ when the rule restricts sets.
///
/// The additional-cards whitelist is applied last and overrides every
/// other clause, bans included.
pub fn compile(rule: &FormatRule, printed: bool) -> CardPredicate {
    let mut predicate = not(name_in(rule.banned_card_names()));

    predicate = if rule.format_subtype() == FormatSubType::Arena {
        and(predicate, not(is_unrebalanced()))
    } else {
        and(predicate, not(is_rebalanced()))
    };

    let sets = rule.allowed_set_codes();
    if !sets.is_empty() {
        let in_sets = if printed {
            printed_in_sets(sets)
        } else {
            was_printed_in_sets(sets)
        };
        predicate = and(predicate, in_sets);
    }

    let rarities = rule.allowed_rarities();
    if !rarities.is_empty() {
        let any_rarity = any_of(rarities.iter().copied().map(was_printed_at_rarity).collect());
        predicate = and(predicate, any_rarity);
    }

    let additional = rule.additional_card_names();
    if !additional.is_empty() {
        predicate = or(predicate, name_in(additional));
    }

    predicate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::format::FormatType;

    fn catalog() -> InMemoryCatalog {
        [
            PaperCard::new("Lightning Bolt", "LEA", Rarity::Common),
            PaperCard::new("Lightning Bolt", "M10", Rarity::Common),
            PaperCard::new("Counterspell", "LEA", Rarity::Uncommon),
            PaperCard::new("Counterspell", "MH2", Rarity::Uncommon),
            PaperCard::new("Black Lotus", "LEA", Rarity::Rare),
            PaperCard::new("Pack Rat", "RTR", Rarity::Rare),
            PaperCard::new("Pack Rat", "PRM", Rarity::Special),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_combinators() {
        let catalog = catalog();
        let bolt = PaperCard::new("Lightning Bolt", "M10", Rarity::Common);
        let yes = always();
        let no = not(always());

        assert!(yes(&bolt, &catalog));
        assert!(!no(&bolt, &catalog));
        assert!(!and(yes.clone(), no.clone())(&bolt, &catalog));
        assert!(or(no.clone(), yes.clone())(&bolt, &catalog));
        assert!(!any_of(Vec::new())(&bolt, &catalog));
        assert!(any_of(vec![no, yes])(&bolt, &catalog));
    }

    #[test]
    fn test_name_match_is_case_sensitive() {
        let catalog = catalog();
        let p = name_in(&["Lightning Bolt".to_string()]);
        assert!(p(&PaperCard::new("Lightning Bolt", "M10", Rarity::Common), &catalog));
        assert!(!p(&PaperCard::new("lightning bolt", "M10", Rarity::Common), &catalog));
    }

    #[test]
    fn test_printed_and_rules_filters_diverge_on_promo() {
        let catalog = catalog();
        let rule = FormatRule::builder("Return to Ravnica Block", FormatType::Archived)
            .sets(["RTR"])
            .build_unchecked();
        let promo = PaperCard::new("Pack Rat", "PRM", Rarity::Special);

        assert!(compile(&rule, false)(&promo, &catalog));
        assert!(!compile(&rule, true)(&promo, &catalog));
    }

    #[test]
    fn test_printed_and_rules_agree_without_set_restriction() {
        let catalog = catalog();
        let rule = FormatRule::builder("Pauper", FormatType::Sanctioned)
            .rarities([Rarity::Common])
            .banned(["Black Lotus"])
            .build_unchecked();
        let rules = compile(&rule, false);
        let printed = compile(&rule, true);

        for card in catalog.cards_in_set("LEA").iter().chain(&catalog.cards_in_set("PRM")) {
            assert_eq!(rules(card, &catalog), printed(card, &catalog), "{}", card.name);
        }
    }

    #[test]
    fn test_rarity_clause_checks_any_printing() {
        let catalog = catalog();
        let rule = FormatRule::builder("Pauper", FormatType::Sanctioned)
            .rarities([Rarity::Common])
            .build_unchecked();
        let p = compile(&rule, false);

        // An uncommon printing of a card that was also printed at common is fine.
        let bolt = PaperCard::new("Lightning Bolt", "2XM", Rarity::Uncommon);
        assert!(p(&bolt, &catalog));
        let counterspell = PaperCard::new("Counterspell", "MH2", Rarity::Uncommon);
        assert!(!p(&counterspell, &catalog));
    }

    #[test]
    fn test_additional_cards_override_bans_and_sets() {
        let catalog = catalog();
        let rule = FormatRule::builder("Odd Format", FormatType::Casual)
            .sets(["M10"])
            .banned(["Black Lotus"])
            .additional(["Black Lotus"])
            .build_unchecked();
        let lotus = PaperCard::new("Black Lotus", "LEA", Rarity::Rare);
        let counterspell = PaperCard::new("Counterspell", "LEA", Rarity::Uncommon);

        assert!(compile(&rule, false)(&lotus, &catalog));
        assert!(compile(&rule, true)(&lotus, &catalog));
        assert!(!compile(&rule, false)(&counterspell, &catalog));
    }

    #[test]
    fn test_rebalanced_handling_depends_on_arena_subtype() {
        let catalog = catalog();
        let rebalanced = PaperCard::builder("A-Lightning Bolt", "YMID").build();
        let original = PaperCard::builder("Lightning Bolt", "M10")
            .has_rebalanced_variant(true)
            .build();

        let paper = FormatRule::builder("Vintage", FormatType::Sanctioned)
            .subtype(FormatSubType::Vintage)
            .build_unchecked();
        let arena = FormatRule::builder("Historic", FormatType::Digital)
            .subtype(FormatSubType::Arena)
            .build_unchecked();

        assert!(!compile(&paper, false)(&rebalanced, &catalog));
        assert!(compile(&paper, false)(&original, &catalog));
        assert!(compile(&arena, false)(&rebalanced, &catalog));
        assert!(!compile(&arena, false)(&original, &catalog));
    }
}
