use std::fs;
use std::path::Path;
use std::sync::Arc;

use maigus_formats::{
    FormatLoadError, FormatReader, FormatRegistry, FormatSubType, FormatType, InMemoryCatalog,
    LoadNotice, PaperCard, Rarity, ReaderOptions,
};

fn catalog() -> InMemoryCatalog {
    [
        PaperCard::new("Lightning Bolt", "M10", Rarity::Common),
        PaperCard::new("Llanowar Elves", "M19", Rarity::Common),
        PaperCard::new("Counterspell", "ICE", Rarity::Uncommon),
        PaperCard::new("Black Lotus", "LEA", Rarity::Rare),
        PaperCard::new("Chainer's Edict", "TOR", Rarity::Uncommon),
    ]
    .into_iter()
    .collect()
}

fn write(dir: &Path, file: &str, text: &str) {
    let path = dir.join(file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

fn bundled_formats(dir: &Path) {
    write(
        dir,
        "Standard.txt",
        "[format]\nName:Standard\nType:Sanctioned\nSubtype:Standard\nOrder:100\nSets:M19, M10\n",
    );
    write(
        dir,
        "Vintage.txt",
        "[format]\nName:Vintage\nType:Sanctioned\nSubtype:Vintage\nRestricted:Black Lotus\n",
    );
    write(
        dir,
        "Block/Odyssey Block.txt",
        "[format]\nName:Odyssey Block\nType:Archived\nSubtype:Block\nOrder:300\nEffective:2002-05\nSets:ODY, TOR, JUD\n",
    );
    write(dir, "notes.md", "[format]\nName:Not A Format\n");
}

#[test]
fn reads_nested_definitions_and_skips_other_files() {
    let dir = tempfile::tempdir().unwrap();
    bundled_formats(dir.path());

    let catalog = Arc::new(catalog());
    let report = FormatReader::new(dir.path()).read_all(catalog.as_ref());
    assert!(report.skipped.is_empty());

    let registry = report.into_registry(catalog);
    assert_eq!(registry.len(), 3);
    assert!(registry.get("Not A Format").is_none());
    assert!(registry.all_formats_enabled());

    let standard = registry.standard().expect("standard loaded");
    assert_eq!(standard.format_type(), FormatType::Sanctioned);
    assert_eq!(standard.order_index(), 100);
    assert_eq!(standard.allowed_set_codes(), ["M19", "M10"]);

    // Only TOR is known to the catalog.
    let odyssey = registry.get("Odyssey Block").expect("block loaded");
    assert_eq!(odyssey.allowed_set_codes(), ["TOR"]);
    assert_eq!(odyssey.effective_date().to_string(), "2002-05-01");
}

#[test]
fn bad_definition_is_reported_and_the_rest_load() {
    let dir = tempfile::tempdir().unwrap();
    bundled_formats(dir.path());
    write(dir.path(), "Broken.txt", "[format]\nType:Casual\n");
    write(dir.path(), "NoSection.txt", "[metadata]\nName:Orphan\n");

    let catalog = Arc::new(catalog());
    let report = FormatReader::new(dir.path()).read_all(catalog.as_ref());

    assert_eq!(report.rules.len(), 3);
    assert_eq!(report.skipped.len(), 2);
    let errors: Vec<_> = report
        .skipped
        .iter()
        .map(|(path, err)| (path.file_name().unwrap().to_str().unwrap(), err))
        .collect();
    assert!(matches!(errors[0], ("Broken.txt", FormatLoadError::MissingName)));
    assert!(matches!(
        errors[1],
        ("NoSection.txt", FormatLoadError::MissingFormatSection)
    ));
}

#[test]
fn core_only_skips_archived_definitions() {
    let dir = tempfile::tempdir().unwrap();
    bundled_formats(dir.path());

    let options = ReaderOptions {
        include_archived: false,
        ..ReaderOptions::default()
    };
    let catalog = Arc::new(catalog());
    let registry = FormatReader::new(dir.path())
        .with_options(options)
        .read_all(catalog.as_ref())
        .into_registry(catalog);

    assert_eq!(registry.len(), 2);
    assert!(registry.vintage().is_some());
    assert!(!registry.all_formats_enabled());
    assert!(registry.archived_by_category().is_empty());
}

#[test]
fn user_definitions_load_after_bundled_ones() {
    let bundled = tempfile::tempdir().unwrap();
    let user = tempfile::tempdir().unwrap();
    bundled_formats(bundled.path());
    write(
        user.path(),
        "Kitchen Table.txt",
        "[format]\nName:Kitchen Table\nType:Custom\nBanned:Black Lotus\n",
    );
    write(
        user.path(),
        "Vintage.txt",
        "[format]\nName:Vintage\nType:Casual\nSubtype:Vintage\nRestrictedLegendary:true\n",
    );

    let catalog = Arc::new(catalog());
    let registry = FormatReader::new(bundled.path())
        .with_user_dir(user.path())
        .read_all(catalog.as_ref())
        .into_registry(catalog);

    assert_eq!(registry.len(), 4);
    let table = registry.get("Kitchen Table").expect("user format");
    assert_eq!(table.format_type(), FormatType::Custom);
    assert_eq!(table.format_subtype(), FormatSubType::Custom);

    let vintage = registry.vintage().expect("vintage");
    assert_eq!(vintage.format_type(), FormatType::Casual);
    assert!(vintage.is_restricted_legendary());
    assert!(vintage.restricted_card_names().is_empty());
}

#[test]
fn missing_directory_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nowhere");

    let report = FormatReader::new(&missing).read_all(&catalog());
    assert!(report.rules.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].0, missing);
    assert!(matches!(report.skipped[0].1, FormatLoadError::Io { .. }));
}

#[test]
fn historic_type_loads_as_archived() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "Standard 2019.txt",
        "[format]\nName:Standard 2019\nType:Historic\nSubtype:Standard\nOrder:5\nEffective:2019-10\n",
    );

    let catalog = Arc::new(catalog());
    let report = FormatReader::new(dir.path()).read_all(catalog.as_ref());
    assert_eq!(report.notices.len(), 1);
    assert_eq!(report.notices[0].0, dir.path().join("Standard 2019.txt"));
    assert_eq!(
        report.notices[0].1,
        LoadNotice::LegacyArchivedType {
            format: "Standard 2019".to_string()
        }
    );
    let registry = report.into_registry(catalog);

    let rule = registry.get("Standard 2019").expect("loaded");
    assert_eq!(rule.format_type(), FormatType::Archived);
    assert_eq!(rule.to_string(), "Standard 2019 (2019-10-01)");

    let groups = registry.archived_by_category();
    assert_eq!(
        groups.keys().collect::<Vec<_>>(),
        ["ARCHIVED-STANDARD: Standard 2019"]
    );
}

#[cfg(unix)]
#[test]
fn symlinked_directories_are_not_followed() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Standard.txt", "[format]\nName:Standard\nType:Sanctioned\n");
    write(dir.path(), "Vintage.txt", "[format]\nName:Vintage\nType:Sanctioned\n");
    std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

    let report = FormatReader::new(dir.path()).read_all(&catalog());
    assert_eq!(report.rules.len(), 2);
    assert!(report.skipped.is_empty());
}

#[cfg(unix)]
#[test]
fn unreadable_subdirectory_does_not_stop_the_walk() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Standard.txt", "[format]\nName:Standard\nType:Sanctioned\n");
    write(dir.path(), "Vintage.txt", "[format]\nName:Vintage\nType:Sanctioned\n");
    write(dir.path(), "locked/Extended.txt", "[format]\nName:Extended\nType:Sanctioned\n");
    let locked = dir.path().join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let report = FormatReader::new(dir.path()).read_all(&catalog());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let names: Vec<&str> = report.rules.iter().map(|rule| rule.name()).collect();
    assert!(names.contains(&"Standard"));
    assert!(names.contains(&"Vintage"));
    // Privileged users can still read the directory; otherwise it is reported.
    if names.contains(&"Extended") {
        assert!(report.skipped.is_empty());
    } else {
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].0.starts_with(&locked));
        assert!(matches!(report.skipped[0].1, FormatLoadError::Io { .. }));
    }
}

#[test]
fn mixed_dated_and_undated_archived_formats_load() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..60 {
        let effective = if i % 2 == 0 {
            format!("Effective:{}-0{}\n", 2000 + i % 7, 1 + i % 9)
        } else {
            String::new()
        };
        write(
            dir.path(),
            &format!("Standard {i}.txt"),
            &format!(
                "[format]\nName:Standard {i}\nType:Archived\nSubtype:Standard\nOrder:{}\n{effective}",
                (i * 7) % 13
            ),
        );
    }

    let catalog = Arc::new(catalog());
    let report = FormatReader::new(dir.path()).read_all(catalog.as_ref());
    assert!(report.skipped.is_empty());
    let registry: FormatRegistry = report.into_registry(catalog);

    let ordered = registry.ordered_view();
    assert_eq!(ordered.len(), 60);
    let first_dated = ordered.iter().position(|rule| rule.is_dated()).unwrap();
    assert!(ordered[..first_dated].iter().all(|rule| !rule.is_dated()));
    assert!(ordered[first_dated..].iter().all(|rule| rule.is_dated()));
    assert!(ordered.is_sorted());
}
