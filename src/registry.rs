//! The collection of known formats.
//!
//! The registry is filled once at load time and queried read-only
//! afterwards. Sorted and filtered views are computed on first use and kept
//! for the registry's lifetime; registering another format resets them.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;

use crate::card::PaperCard;
use crate::catalog::CardCatalog;
use crate::conformance::is_pool_legal;
use crate::format::{FormatRule, FormatSubType, FormatType, no_format};
use crate::ordering::inverse_date_cmp;
use crate::pool::{CardPool, Deck};

pub type SharedCatalog = Arc<dyn CardCatalog + Send + Sync>;

/// Subtypes archived formats are grouped under, in display order.
pub const ARCHIVED_CATEGORIES: [FormatSubType; 8] = [
    FormatSubType::Standard,
    FormatSubType::Modern,
    FormatSubType::Legacy,
    FormatSubType::Vintage,
    FormatSubType::Block,
    FormatSubType::Extended,
    FormatSubType::Pioneer,
    FormatSubType::Arena,
];

/// A block format whose presence means archived formats were loaded.
const ARCHIVED_MARKER_FORMAT: &str = "Odyssey Block";

/// Archived formats keyed by category, keys in first-seen order.
pub type ArchivedGroups = IndexMap<String, Vec<Arc<FormatRule>>>;

/// Category key of an archived format: `"{TYPE}-{SUBTYPE}: {name prefix}"`,
/// where the prefix is the name up to its first `" ("`. Block formats named
/// "... Block" share the bare `"{TYPE}-{SUBTYPE}"` key.
pub fn category_key(rule: &FormatRule) -> String {
    let mut key = format!(
        "{}-{}",
        rule.format_type().key(),
        rule.format_subtype().key()
    );
    if rule.format_subtype() != FormatSubType::Block || !rule.name().ends_with("Block") {
        let prefix = rule.name().split(" (").next().unwrap_or_default();
        key.push_str(": ");
        key.push_str(prefix);
    }
    key
}

pub struct FormatRegistry {
    catalog: SharedCatalog,
    formats: Vec<Arc<FormatRule>>,
    by_name: HashMap<String, usize>,
    ordered: OnceLock<Vec<Arc<FormatRule>>>,
    reverse_date_ordered: OnceLock<Vec<Arc<FormatRule>>>,
    filter_list: OnceLock<Vec<Arc<FormatRule>>>,
    archived: OnceLock<Vec<Arc<FormatRule>>>,
    archived_groups: OnceLock<ArchivedGroups>,
}

impl FormatRegistry {
    pub fn new(catalog: SharedCatalog) -> Self {
        Self {
            catalog,
            formats: Vec::new(),
            by_name: HashMap::new(),
            ordered: OnceLock::new(),
            reverse_date_ordered: OnceLock::new(),
            filter_list: OnceLock::new(),
            archived: OnceLock::new(),
            archived_groups: OnceLock::new(),
        }
    }

    /// Builds a registry from a batch of rules and computes every view up
    /// front.
    pub fn from_rules(catalog: SharedCatalog, rules: impl IntoIterator<Item = FormatRule>) -> Self {
        let mut registry = Self::new(catalog);
        for rule in rules {
            registry.register(rule);
        }
        registry.warm_views();
        registry
    }

    /// Adds a format. A format with the same name replaces the earlier one.
    pub fn register(&mut self, rule: FormatRule) {
        let rule = Arc::new(rule);
        match self.by_name.get(rule.name()) {
            Some(&idx) => {
                tracing::debug!(format = %rule.name(), "replacing previously registered format");
                self.formats[idx] = rule;
            }
            None => {
                self.by_name.insert(rule.name().to_string(), self.formats.len());
                self.formats.push(rule);
            }
        }
        self.reset_views();
    }

    fn reset_views(&mut self) {
        self.ordered.take();
        self.reverse_date_ordered.take();
        self.filter_list.take();
        self.archived.take();
        self.archived_groups.take();
    }

    /// Computes every cached view now rather than on first query.
    pub fn warm_views(&self) {
        self.ordered_view();
        self.reverse_date_ordered_view();
        self.filter_view();
        self.archived_by_category();
    }

    pub fn catalog(&self) -> &dyn CardCatalog {
        self.catalog.as_ref()
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<FormatRule>> {
        self.by_name.get(name).map(|&idx| &self.formats[idx])
    }

    pub fn standard(&self) -> Option<&Arc<FormatRule>> {
        self.get("Standard")
    }

    pub fn extended(&self) -> Option<&Arc<FormatRule>> {
        self.get("Extended")
    }

    pub fn pioneer(&self) -> Option<&Arc<FormatRule>> {
        self.get("Pioneer")
    }

    pub fn historic(&self) -> Option<&Arc<FormatRule>> {
        self.get("Historic")
    }

    pub fn modern(&self) -> Option<&Arc<FormatRule>> {
        self.get("Modern")
    }

    pub fn vintage(&self) -> Option<&Arc<FormatRule>> {
        self.get("Vintage")
    }

    pub fn premodern(&self) -> Option<&Arc<FormatRule>> {
        self.get("Premodern")
    }

    pub fn pauper(&self) -> Option<&Arc<FormatRule>> {
        self.get("Pauper")
    }

    /// True if archived formats were loaded.
    pub fn all_formats_enabled(&self) -> bool {
        self.get(ARCHIVED_MARKER_FORMAT).is_some()
    }

    // ========================================================================
    // Ordered views
    // ========================================================================

    /// Every format in natural order.
    pub fn ordered_view(&self) -> &[Arc<FormatRule>] {
        self.ordered.get_or_init(|| {
            let mut ordered = self.formats.clone();
            ordered.sort();
            ordered
        })
    }

    /// Every format in recency-scan order.
    pub fn reverse_date_ordered_view(&self) -> &[Arc<FormatRule>] {
        self.reverse_date_ordered.get_or_init(|| {
            let mut ordered = self.formats.clone();
            ordered.sort_by(|a, b| inverse_date_cmp(a, b));
            ordered
        })
    }

    fn filter_ordered(&self, keep: impl Fn(&Arc<FormatRule>) -> bool) -> Vec<Arc<FormatRule>> {
        self.ordered_view()
            .iter()
            .filter(|&rule| keep(rule))
            .cloned()
            .collect()
    }

    pub fn by_type(&self, format_type: FormatType) -> Vec<Arc<FormatRule>> {
        self.filter_ordered(|rule| rule.format_type() == format_type)
    }

    pub fn sanctioned_view(&self) -> Vec<Arc<FormatRule>> {
        self.by_type(FormatType::Sanctioned)
    }

    pub fn casual_view(&self) -> Vec<Arc<FormatRule>> {
        self.by_type(FormatType::Casual)
    }

    /// Formats offered as filters: everything except archived and digital.
    pub fn filter_view(&self) -> &[Arc<FormatRule>] {
        self.filter_list.get_or_init(|| {
            self.filter_ordered(|rule| {
                !matches!(
                    rule.format_type(),
                    FormatType::Archived | FormatType::Digital
                )
            })
        })
    }

    /// Filter formats that restrict sets.
    pub fn filter_view_with_allowed_sets(&self) -> Vec<Arc<FormatRule>> {
        self.filter_view()
            .iter()
            .filter(|rule| !rule.allowed_set_codes().is_empty())
            .cloned()
            .collect()
    }

    // ========================================================================
    // Archived formats
    // ========================================================================

    pub fn archived_view(&self) -> &[Arc<FormatRule>] {
        self.archived
            .get_or_init(|| self.filter_ordered(|rule| rule.format_type() == FormatType::Archived))
    }

    pub fn archived_by_subtype(&self, subtype: FormatSubType) -> Vec<Arc<FormatRule>> {
        self.archived_view()
            .iter()
            .filter(|rule| rule.format_subtype() == subtype)
            .cloned()
            .collect()
    }

    /// Archived formats grouped per category, for format pickers.
    ///
    /// Categories follow [`ARCHIVED_CATEGORIES`]; within one, formats are
    /// grouped by [`category_key`] in natural (chronological) order.
    /// Archived formats of other subtypes are left out.
    pub fn archived_by_category(&self) -> &ArchivedGroups {
        self.archived_groups.get_or_init(|| {
            let mut groups = ArchivedGroups::new();
            for subtype in ARCHIVED_CATEGORIES {
                for rule in self.archived_by_subtype(subtype) {
                    groups.entry(category_key(&rule)).or_default().push(rule);
                }
            }
            groups
        })
    }

    /// Archived block formats proper, e.g. "Odyssey Block".
    pub fn main_block_formats(&self) -> Vec<Arc<FormatRule>> {
        let mut blocks: Vec<Arc<FormatRule>> = self
            .archived_view()
            .iter()
            .filter(|rule| rule.format_subtype() == FormatSubType::Block)
            .filter(|rule| rule.name().ends_with("Block"))
            .cloned()
            .collect();
        blocks.sort();
        blocks
    }

    // ========================================================================
    // Classification
    // ========================================================================

    /// Every format `deck` conforms to.
    ///
    /// Commander formats are never considered, since their deck rules go
    /// beyond a pool check. Unless `exhaustive` is set, digital formats are
    /// skipped and only the most recent matching archived format of each
    /// subtype is kept. Returns just the no-format sentinel when nothing
    /// matches.
    pub fn classify_deck(&self, deck: &Deck, exhaustive: bool) -> BTreeSet<Arc<FormatRule>> {
        self.classify_pool(&deck.all_cards_in_single_pool(), exhaustive)
    }

    pub fn classify_pool(&self, pool: &CardPool, exhaustive: bool) -> BTreeSet<Arc<FormatRule>> {
        let mut result = BTreeSet::new();
        let mut covered: HashSet<FormatSubType> = HashSet::new();

        for rule in self.reverse_date_ordered_view() {
            if rule.format_type() == FormatType::Digital && !exhaustive {
                continue;
            }
            if rule.format_subtype() == FormatSubType::Commander {
                continue;
            }
            if rule.format_type() == FormatType::Archived
                && covered.contains(&rule.format_subtype())
                && !exhaustive
            {
                continue;
            }
            if is_pool_legal(rule, pool, self.catalog()) {
                covered.insert(rule.format_subtype());
                result.insert(Arc::clone(rule));
            }
        }

        if result.is_empty() {
            result.insert(no_format());
        }
        tracing::debug!(matches = result.len(), exhaustive, "classified card pool");
        result
    }

    /// The first format in recency-scan order that `deck` conforms to, or
    /// the no-format sentinel.
    pub fn most_recent_legal_format(&self, deck: &Deck) -> Arc<FormatRule> {
        let pool = deck.all_cards_in_single_pool();
        self.reverse_date_ordered_view()
            .iter()
            .find(|rule| is_pool_legal(rule, &pool, self.catalog()))
            .cloned()
            .unwrap_or_else(no_format)
    }

    /// Every format whose rules filter accepts `card`, or the no-format
    /// sentinel.
    pub fn all_formats_legal_for_card(&self, card: &PaperCard) -> BTreeSet<Arc<FormatRule>> {
        let mut result: BTreeSet<Arc<FormatRule>> = self
            .ordered_view()
            .iter()
            .filter(|rule| rule.is_card_legal(card, self.catalog()))
            .cloned()
            .collect();
        if result.is_empty() {
            result.insert(no_format());
        }
        result
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.formats)
            .finish_non_exhaustive()
    }
}
