//! Format definitions.
//!
//! A [`FormatRule`] describes one named ruleset: which sets and rarities are
//! allowed, which cards are banned, restricted or additionally allowed, and
//! the metadata used to order formats against each other.

use std::fmt;
use std::sync::{Arc, LazyLock};

use chrono::NaiveDate;

use crate::card::PaperCard;
use crate::catalog::CardCatalog;
use crate::predicate::{self, CardPredicate};
use crate::rarity::Rarity;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Date format used for effective dates in definitions and display.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Name of the "unclassified" sentinel format.
pub const NO_FORMAT_NAME: &str = "(none)";

/// The effective date of formats that don't declare one.
pub fn undated() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Primary classification axis. Declaration order is the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum FormatType {
    Sanctioned,
    Casual,
    Archived,
    Digital,
    Custom,
}

impl FormatType {
    pub const ALL: [FormatType; 5] = [
        FormatType::Sanctioned,
        FormatType::Casual,
        FormatType::Archived,
        FormatType::Digital,
        FormatType::Custom,
    ];

    /// Upper-case identifier, as used in category keys.
    pub fn key(self) -> &'static str {
        match self {
            FormatType::Sanctioned => "SANCTIONED",
            FormatType::Casual => "CASUAL",
            FormatType::Archived => "ARCHIVED",
            FormatType::Digital => "DIGITAL",
            FormatType::Custom => "CUSTOM",
        }
    }

    /// Case-insensitive lookup by identifier.
    pub fn from_key(text: &str) -> Option<FormatType> {
        let text = text.trim();
        Self::ALL
            .into_iter()
            .find(|ty| ty.key().eq_ignore_ascii_case(text))
    }
}

/// Secondary classification axis. Declaration order is the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum FormatSubType {
    Block,
    Standard,
    Extended,
    Pauper,
    Pioneer,
    Modern,
    Legacy,
    Vintage,
    Commander,
    Planechase,
    VideoGame,
    Mtgo,
    Arena,
    Custom,
}

impl FormatSubType {
    pub const ALL: [FormatSubType; 14] = [
        FormatSubType::Block,
        FormatSubType::Standard,
        FormatSubType::Extended,
        FormatSubType::Pauper,
        FormatSubType::Pioneer,
        FormatSubType::Modern,
        FormatSubType::Legacy,
        FormatSubType::Vintage,
        FormatSubType::Commander,
        FormatSubType::Planechase,
        FormatSubType::VideoGame,
        FormatSubType::Mtgo,
        FormatSubType::Arena,
        FormatSubType::Custom,
    ];

    /// Upper-case identifier, as used in category keys.
    pub fn key(self) -> &'static str {
        match self {
            FormatSubType::Block => "BLOCK",
            FormatSubType::Standard => "STANDARD",
            FormatSubType::Extended => "EXTENDED",
            FormatSubType::Pauper => "PAUPER",
            FormatSubType::Pioneer => "PIONEER",
            FormatSubType::Modern => "MODERN",
            FormatSubType::Legacy => "LEGACY",
            FormatSubType::Vintage => "VINTAGE",
            FormatSubType::Commander => "COMMANDER",
            FormatSubType::Planechase => "PLANECHASE",
            FormatSubType::VideoGame => "VIDEOGAME",
            FormatSubType::Mtgo => "MTGO",
            FormatSubType::Arena => "ARENA",
            FormatSubType::Custom => "CUSTOM",
        }
    }

    /// Case-insensitive lookup by identifier.
    pub fn from_key(text: &str) -> Option<FormatSubType> {
        let text = text.trim();
        Self::ALL
            .into_iter()
            .find(|subtype| subtype.key().eq_ignore_ascii_case(text))
    }
}

/// One format's constraints and ordering metadata.
///
/// Everything except the allowed set list is fixed at construction; the set
/// list can only grow through [`FormatRule::unlock_set`], which recompiles
/// the predicates.
#[derive(Clone)]
pub struct FormatRule {
    name: String,
    format_type: FormatType,
    format_subtype: FormatSubType,
    allowed_set_codes: Vec<String>,
    allowed_rarities: Vec<Rarity>,
    banned_card_names: Vec<String>,
    restricted_card_names: Vec<String>,
    additional_card_names: Vec<String>,
    restricted_legendary: bool,
    effective_date: NaiveDate,
    /// Lower is more recent; source data numbers formats newest first.
    order_index: i32,
    filter_rules: CardPredicate,
    filter_printed: CardPredicate,
}

static NO_FORMAT: LazyLock<Arc<FormatRule>> = LazyLock::new(|| {
    Arc::new(
        FormatRule::builder(NO_FORMAT_NAME, FormatType::Custom)
            .order_index(i32::MAX)
            .build_unchecked(),
    )
});

/// The sentinel returned when nothing else matches: no restrictions, and it
/// sorts after every real format with a lower index.
pub fn no_format() -> Arc<FormatRule> {
    Arc::clone(&NO_FORMAT)
}

impl FormatRule {
    pub fn builder(name: impl Into<String>, format_type: FormatType) -> FormatRuleBuilder {
        FormatRuleBuilder::new(name, format_type)
    }

    /// An undated custom format limited to `sets` with `banned` cards.
    pub fn custom<S, B>(name: impl Into<String>, sets: S, banned: B, catalog: &dyn CardCatalog) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        FormatRule::builder(name, FormatType::Custom)
            .sets(sets)
            .banned(banned)
            .build(catalog)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format_type(&self) -> FormatType {
        self.format_type
    }

    pub fn format_subtype(&self) -> FormatSubType {
        self.format_subtype
    }

    /// Allowed set codes. Empty means every set is allowed.
    pub fn allowed_set_codes(&self) -> &[String] {
        &self.allowed_set_codes
    }

    /// Allowed rarities. Empty means every rarity is allowed.
    pub fn allowed_rarities(&self) -> &[Rarity] {
        &self.allowed_rarities
    }

    pub fn banned_card_names(&self) -> &[String] {
        &self.banned_card_names
    }

    pub fn restricted_card_names(&self) -> &[String] {
        &self.restricted_card_names
    }

    /// Cards legal even though they were never printed in an allowed set.
    pub fn additional_card_names(&self) -> &[String] {
        &self.additional_card_names
    }

    pub fn is_restricted_legendary(&self) -> bool {
        self.restricted_legendary
    }

    pub fn effective_date(&self) -> NaiveDate {
        self.effective_date
    }

    pub fn is_dated(&self) -> bool {
        self.effective_date != undated()
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }

    /// Predicate deciding whether a card is legal by its rules identity.
    pub fn filter_rules(&self) -> &CardPredicate {
        &self.filter_rules
    }

    /// Predicate deciding whether this exact printing is legal.
    pub fn filter_printed(&self) -> &CardPredicate {
        &self.filter_printed
    }

    pub fn is_card_legal(&self, card: &PaperCard, catalog: &dyn CardCatalog) -> bool {
        (self.filter_rules)(card, catalog)
    }

    pub fn is_printing_legal(&self, card: &PaperCard, catalog: &dyn CardCatalog) -> bool {
        (self.filter_printed)(card, catalog)
    }

    pub fn is_set_legal(&self, set_code: &str) -> bool {
        self.allowed_set_codes.is_empty() || self.allowed_set_codes.iter().any(|s| s == set_code)
    }

    /// [`FormatRule::is_set_legal`] as a standalone closure, for filtering
    /// edition lists.
    pub fn edition_legal_predicate(&self) -> impl Fn(&str) -> bool + '_ {
        move |set_code| self.is_set_legal(set_code)
    }

    /// Every printing from the allowed sets that isn't banned.
    pub fn all_cards(&self, catalog: &dyn CardCatalog) -> Vec<PaperCard> {
        self.allowed_set_codes
            .iter()
            .flat_map(|set_code| catalog.cards_in_set(set_code))
            .filter(|card| !self.banned_card_names.contains(&card.name))
            .collect()
    }

    /// Adds `set_code` to the allowed sets, e.g. when a progression mode
    /// unlocks an extra edition. Returns false if it was already allowed.
    ///
    /// A format with no set list allows every set, so unlocking a set there
    /// narrows it to that one set. Callers are expected to only unlock sets
    /// on formats that already restrict sets.
    pub fn unlock_set(&mut self, set_code: impl Into<String>) -> bool {
        let set_code = set_code.into();
        if self.allowed_set_codes.contains(&set_code) {
            return false;
        }
        self.allowed_set_codes.push(set_code);
        self.recompile();
        true
    }

    fn recompile(&mut self) {
        self.filter_rules = predicate::compile(self, false);
        self.filter_printed = predicate::compile(self, true);
    }
}

impl fmt::Debug for FormatRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRule")
            .field("name", &self.name)
            .field("format_type", &self.format_type)
            .field("format_subtype", &self.format_subtype)
            .field("allowed_set_codes", &self.allowed_set_codes)
            .field("allowed_rarities", &self.allowed_rarities)
            .field("banned_card_names", &self.banned_card_names)
            .field("restricted_card_names", &self.restricted_card_names)
            .field("additional_card_names", &self.additional_card_names)
            .field("restricted_legendary", &self.restricted_legendary)
            .field("effective_date", &self.effective_date)
            .field("order_index", &self.order_index)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for FormatRule {
    /// Dated archived formats show their date unless the name already has it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.format_type != FormatType::Archived || !self.is_dated() {
            return f.write_str(&self.name);
        }
        let date = self.effective_date.format(DATE_FORMAT).to_string();
        if self.name.contains(&date) {
            f.write_str(&self.name)
        } else {
            write!(f, "{} ({})", self.name, date)
        }
    }
}

/// Builder for constructing FormatRule instances.
#[derive(Debug, Clone)]
pub struct FormatRuleBuilder {
    name: String,
    format_type: FormatType,
    format_subtype: FormatSubType,
    sets: Vec<String>,
    rarities: Vec<Rarity>,
    banned: Vec<String>,
    restricted: Vec<String>,
    additional: Vec<String>,
    restricted_legendary: bool,
    effective_date: NaiveDate,
    order_index: i32,
}

fn collect_strings<I>(items: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

impl FormatRuleBuilder {
    pub fn new(name: impl Into<String>, format_type: FormatType) -> Self {
        Self {
            name: name.into(),
            format_type,
            format_subtype: FormatSubType::Custom,
            sets: Vec::new(),
            rarities: Vec::new(),
            banned: Vec::new(),
            restricted: Vec::new(),
            additional: Vec::new(),
            restricted_legendary: false,
            effective_date: undated(),
            order_index: 0,
        }
    }

    pub fn subtype(mut self, subtype: FormatSubType) -> Self {
        self.format_subtype = subtype;
        self
    }

    pub fn sets<I>(mut self, sets: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.sets = collect_strings(sets);
        self
    }

    pub fn rarities(mut self, rarities: impl IntoIterator<Item = Rarity>) -> Self {
        self.rarities = rarities.into_iter().collect();
        self
    }

    pub fn banned<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.banned = collect_strings(names);
        self
    }

    pub fn restricted<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.restricted = collect_strings(names);
        self
    }

    pub fn additional<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.additional = collect_strings(names);
        self
    }

    pub fn restricted_legendary(mut self, restricted_legendary: bool) -> Self {
        self.restricted_legendary = restricted_legendary;
        self
    }

    pub fn effective_date(mut self, date: NaiveDate) -> Self {
        self.effective_date = date;
        self
    }

    pub fn order_index(mut self, index: i32) -> Self {
        self.order_index = index;
        self
    }

    /// Builds the rule, dropping set codes the catalog doesn't know.
    pub fn build(mut self, catalog: &dyn CardCatalog) -> FormatRule {
        let name = self.name.clone();
        self.sets.retain(|set_code| {
            let known = catalog.edition_exists(set_code);
            if !known {
                tracing::warn!(
                    format = %name,
                    set = %set_code,
                    "set does not match any valid editions"
                );
            }
            known
        });
        self.build_unchecked()
    }

    /// Builds the rule without validating set codes.
    pub fn build_unchecked(self) -> FormatRule {
        let mut allowed_set_codes: Vec<String> = Vec::with_capacity(self.sets.len());
        for set_code in self.sets {
            if !allowed_set_codes.contains(&set_code) {
                allowed_set_codes.push(set_code);
            }
        }

        let mut rule = FormatRule {
            name: self.name,
            format_type: self.format_type,
            format_subtype: self.format_subtype,
            allowed_set_codes,
            allowed_rarities: self.rarities,
            banned_card_names: self.banned,
            restricted_card_names: self.restricted,
            additional_card_names: self.additional,
            restricted_legendary: self.restricted_legendary,
            effective_date: self.effective_date,
            order_index: self.order_index,
            filter_rules: predicate::always(),
            filter_printed: predicate::always(),
        };
        rule.recompile();
        rule
    }
}
