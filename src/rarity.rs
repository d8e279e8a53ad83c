use std::fmt;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Printed rarity of a card in a given set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Rarity {
    BasicLand,
    Common,
    Uncommon,
    Rare,
    MythicRare,
    Special,
}

impl Rarity {
    pub const ALL: [Rarity; 6] = [
        Rarity::BasicLand,
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::MythicRare,
        Rarity::Special,
    ];

    /// One-letter code used in set listings.
    pub fn code(self) -> &'static str {
        match self {
            Rarity::BasicLand => "L",
            Rarity::Common => "C",
            Rarity::Uncommon => "U",
            Rarity::Rare => "R",
            Rarity::MythicRare => "M",
            Rarity::Special => "S",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Rarity::BasicLand => "Basic Land",
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::MythicRare => "Mythic Rare",
            Rarity::Special => "Special",
        }
    }

    /// Parses either the short code or the full name.
    ///
    /// Case and whitespace are ignored, and "Mythic" is accepted for
    /// `MythicRare`. Anything else yields `None`.
    pub fn parse_lenient(text: &str) -> Option<Rarity> {
        let normalized: String = text
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .map(|ch| ch.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "l" | "basicland" | "land" => Some(Rarity::BasicLand),
            "c" | "common" => Some(Rarity::Common),
            "u" | "uncommon" => Some(Rarity::Uncommon),
            "r" | "rare" => Some(Rarity::Rare),
            "m" | "mythic" | "mythicrare" => Some(Rarity::MythicRare),
            "s" | "special" => Some(Rarity::Special),
            _ => None,
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
