//! Loading format definitions from text files.
//!
//! A definition file is split into `[section]` blocks of `key:value` lines.
//! Only the `[format]` section is read:
//!
//! ```text
//! [format]
//! Name:Standard
//! Type:Sanctioned
//! Subtype:Standard
//! Order:100
//! Effective:2024-08-02
//! Sets:WOE, LCI, MKM
//! Banned:The Meathook Massacre; Fable of the Mirror-Breaker
//! ```
//!
//! Set and rarity lists are split on `", "`, card lists on `"; "`. A bad
//! record never stops the rest of the batch from loading.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use walkdir::WalkDir;

use crate::catalog::CardCatalog;
use crate::format::{DATE_FORMAT, FormatRule, FormatSubType, FormatType, undated};
use crate::rarity::Rarity;
use crate::registry::{FormatRegistry, SharedCatalog};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

pub const FORMAT_SECTION: &str = "format";
const LIST_SEPARATOR: &str = ", ";
const CARD_LIST_SEPARATOR: &str = "; ";
/// Type name from older definition files, now spelled "Archived".
const LEGACY_ARCHIVED_TYPE: &str = "Historic";

#[derive(Debug, thiserror::Error)]
pub enum FormatLoadError {
    #[error("no [format] section")]
    MissingFormatSection,
    #[error("format section has no name")]
    MissingName,
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Something a caller should pass on to whoever maintains a definition,
/// even though the definition loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadNotice {
    #[error("{format} uses the retired type Historic; update the definition to use Archived")]
    LegacyArchivedType { format: String },
}

// ============================================================================
// Sections
// ============================================================================

/// Splits `text` into named sections. Section names are lower-cased; lines
/// before the first header, blank lines and `#` comments are dropped.
pub fn parse_sections(text: &str) -> HashMap<String, Vec<String>> {
    let mut sections: HashMap<String, Vec<String>> = HashMap::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            let name = header.trim().to_ascii_lowercase();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }
        if let Some(name) = &current {
            sections.entry(name.clone()).or_default().push(line.to_string());
        }
    }

    sections
}

/// Key/value pairs of one section. Keys are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatSection {
    values: HashMap<String, String>,
}

impl FormatSection {
    /// Parses `key:value` lines. Lines without a colon are ignored.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Self {
        let values = lines
            .iter()
            .filter_map(|line| line.as_ref().split_once(':'))
            .map(|(key, value)| (key.trim().to_ascii_lowercase(), value.trim().to_string()))
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Integer value, or 0 when missing or malformed.
    pub fn get_int(&self, key: &str) -> i32 {
        self.get(key)
            .and_then(|value| value.parse().ok())
            .unwrap_or(0)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        let value = self.get(key)?;
        if value.eq_ignore_ascii_case("true") {
            Some(true)
        } else if value.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormatSection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let values = iter
            .into_iter()
            .map(|(key, value)| (key.into().to_ascii_lowercase(), value.into()))
            .collect();
        Self { values }
    }
}

// ============================================================================
// Field parsing
// ============================================================================

/// Parses an effective date. Month-only dates (`2019-10`) mean the first of
/// the month.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.len() <= 7 {
        NaiveDate::parse_from_str(&format!("{text}-01"), DATE_FORMAT).ok()
    } else {
        NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
    }
}

fn parse_format_type(name: &str, value: Option<&str>) -> FormatType {
    let Some(value) = value else {
        return FormatType::Custom;
    };
    if let Some(format_type) = FormatType::from_key(value) {
        return format_type;
    }
    if is_legacy_archived_type(value) {
        tracing::warn!(
            format = %name,
            "Historic is no longer used as a format type; update the definition to use Archived"
        );
        return FormatType::Archived;
    }
    FormatType::Custom
}

fn is_legacy_archived_type(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case(LEGACY_ARCHIVED_TYPE)
}

/// Notices for a section that still loads but uses retired spellings.
pub fn section_notices(section: &FormatSection) -> Vec<LoadNotice> {
    let mut notices = Vec::new();
    if let (Some(name), Some(value)) = (section.get("name"), section.get("type")) {
        if is_legacy_archived_type(value) {
            notices.push(LoadNotice::LegacyArchivedType {
                format: name.to_string(),
            });
        }
    }
    notices
}

fn split_list<'a>(value: Option<&'a str>, separator: &str) -> Vec<&'a str> {
    value
        .map(|value| value.split(separator).collect())
        .unwrap_or_default()
}

/// Builds a rule from an already parsed `[format]` section.
///
/// Unknown types and subtypes fall back to `Custom`, unknown rarities are
/// dropped, a missing or unreadable effective date means undated, and set
/// codes the catalog doesn't know are dropped.
pub fn read_format(section: &FormatSection, catalog: &dyn CardCatalog) -> Result<FormatRule, FormatLoadError> {
    let name = section.get("name").ok_or(FormatLoadError::MissingName)?;

    let format_type = parse_format_type(name, section.get("type"));
    let subtype = section
        .get("subtype")
        .and_then(FormatSubType::from_key)
        .unwrap_or(FormatSubType::Custom);

    let effective_date = match section.get("effective") {
        None => undated(),
        Some(text) => parse_date(text).unwrap_or_else(|| {
            tracing::warn!(format = %name, date = %text, "unreadable effective date, treating as undated");
            undated()
        }),
    };

    let rarities = split_list(section.get("rarities"), LIST_SEPARATOR)
        .into_iter()
        .filter_map(Rarity::parse_lenient);

    let rule = FormatRule::builder(name, format_type)
        .subtype(subtype)
        .order_index(section.get_int("order"))
        .effective_date(effective_date)
        .sets(split_list(section.get("sets"), LIST_SEPARATOR))
        .banned(split_list(section.get("banned"), CARD_LIST_SEPARATOR))
        .restricted(split_list(section.get("restricted"), CARD_LIST_SEPARATOR))
        .restricted_legendary(section.get_bool("restrictedlegendary").unwrap_or(false))
        .additional(split_list(section.get("additional"), CARD_LIST_SEPARATOR))
        .rarities(rarities)
        .build(catalog);

    Ok(rule)
}

/// Reads the `[format]` section out of a whole definition file.
pub fn read_format_text(text: &str, catalog: &dyn CardCatalog) -> Result<FormatRule, FormatLoadError> {
    let sections = parse_sections(text);
    let lines = sections
        .get(FORMAT_SECTION)
        .ok_or(FormatLoadError::MissingFormatSection)?;
    read_format(&FormatSection::parse(lines), catalog)
}

// ============================================================================
// Directory loading
// ============================================================================

/// Which definition files get loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(default))]
pub struct ReaderOptions {
    /// Load every definition. When false only `core_formats` are read.
    pub include_archived: bool,
    /// File names of the always-loaded formats.
    pub core_formats: Vec<String>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        let core_formats = [
            "Standard.txt",
            "Pioneer.txt",
            "Historic.txt",
            "Modern.txt",
            "Legacy.txt",
            "Vintage.txt",
            "Commander.txt",
            "Extended.txt",
            "Brawl.txt",
            "Oathbreaker.txt",
            "Premodern.txt",
            "Pauper.txt",
        ];
        Self {
            include_archived: true,
            core_formats: core_formats.into_iter().map(String::from).collect(),
        }
    }
}

/// Result of reading a batch of definition files.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub rules: Vec<FormatRule>,
    pub skipped: Vec<(PathBuf, FormatLoadError)>,
    pub notices: Vec<(PathBuf, LoadNotice)>,
}

impl LoadReport {
    pub fn into_registry(self, catalog: SharedCatalog) -> FormatRegistry {
        FormatRegistry::from_rules(catalog, self.rules)
    }
}

/// Reads definitions from the bundled formats directory and, optionally, a
/// user directory of custom formats. Both are walked recursively.
#[derive(Debug, Clone)]
pub struct FormatReader {
    formats_dir: PathBuf,
    user_dir: Option<PathBuf>,
    options: ReaderOptions,
}

impl FormatReader {
    pub fn new(formats_dir: impl Into<PathBuf>) -> Self {
        Self {
            formats_dir: formats_dir.into(),
            user_dir: None,
            options: ReaderOptions::default(),
        }
    }

    pub fn with_user_dir(mut self, user_dir: impl Into<PathBuf>) -> Self {
        self.user_dir = Some(user_dir.into());
        self
    }

    pub fn with_options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    /// Reads every eligible file. Failures are logged and collected in
    /// the report's `skipped` list.
    pub fn read_all(&self, catalog: &dyn CardCatalog) -> LoadReport {
        let mut report = LoadReport::default();
        let dirs = std::iter::once(&self.formats_dir).chain(self.user_dir.as_ref());

        for dir in dirs {
            let mut files = collect_definition_files(dir, &mut report.skipped);
            files.sort();

            for path in files {
                if !self.is_eligible(&path) {
                    continue;
                }
                match read_file(&path, catalog) {
                    Ok((rule, notices)) => {
                        report.rules.push(rule);
                        report
                            .notices
                            .extend(notices.into_iter().map(|notice| (path.clone(), notice)));
                    }
                    Err(err) => {
                        tracing::warn!(path = %path.display(), error = %err, "skipping format definition");
                        report.skipped.push((path, err));
                    }
                }
            }
        }

        tracing::debug!(
            loaded = report.rules.len(),
            skipped = report.skipped.len(),
            notices = report.notices.len(),
            "read format definitions"
        );
        report
    }

    fn is_eligible(&self, path: &Path) -> bool {
        if self.options.include_archived {
            return true;
        }
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.options.core_formats.iter().any(|core| core == name))
    }
}

/// Every `*.txt` file under `dir`. Symlinked directories are not followed.
/// Entries that can't be read are recorded in `skipped` and the walk goes on.
fn collect_definition_files(
    dir: &Path,
    skipped: &mut Vec<(PathBuf, FormatLoadError)>,
) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "txt") && path.is_file() {
                    files.push(entry.into_path());
                }
            }
            Err(err) => {
                let path = err.path().unwrap_or(dir).to_path_buf();
                tracing::warn!(path = %path.display(), error = %err, "cannot read formats directory entry");
                skipped.push((
                    path.clone(),
                    FormatLoadError::Io {
                        path,
                        source: err.into(),
                    },
                ));
            }
        }
    }
    files
}

/// Reads one definition file, along with any notices about it.
pub fn read_file(
    path: &Path,
    catalog: &dyn CardCatalog,
) -> Result<(FormatRule, Vec<LoadNotice>), FormatLoadError> {
    let text = fs::read_to_string(path).map_err(|source| FormatLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let sections = parse_sections(&text);
    let lines = sections
        .get(FORMAT_SECTION)
        .ok_or(FormatLoadError::MissingFormatSection)?;
    let section = FormatSection::parse(lines);
    let rule = read_format(&section, catalog)?;
    Ok((rule, section_notices(&section)))
}
