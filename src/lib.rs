pub mod card;
pub mod catalog;
pub mod conformance;
pub mod format;
pub mod ordering;
pub mod pool;
pub mod predicate;
pub mod rarity;
pub mod reader;
pub mod registry;
pub mod types;

pub use card::{PaperCard, PaperCardBuilder};
pub use catalog::{CardCatalog, Edition, InMemoryCatalog};
pub use conformance::{
    ConformanceError, Violation, check_deck, check_pool, is_deck_legal, is_pool_legal,
};
pub use format::{FormatRule, FormatRuleBuilder, FormatSubType, FormatType, no_format};
pub use ordering::{FormatSortKey, InverseDate, inverse_date_cmp, natural_cmp};
pub use pool::{CardPool, Deck, DeckSection};
pub use predicate::CardPredicate;
pub use rarity::Rarity;
pub use reader::{
    FormatLoadError, FormatReader, FormatSection, LoadNotice, LoadReport, ReaderOptions, read_format,
    read_format_text,
};
pub use registry::{ArchivedGroups, FormatRegistry, SharedCatalog, category_key};
pub use types::{CardType, Supertype};
