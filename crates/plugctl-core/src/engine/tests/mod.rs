use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tempfile::tempdir;

use crate::engine::{
    EngineAssociation, EngineLocator, EngineVersion, FixedEngineLocator, SettingsEngineLocator,
};

#[test]
fn test_engine_version_pads_short_forms() {
    let v = EngineVersion::parse("5.3").unwrap();
    assert_eq!(v.major(), 5);
    assert_eq!(v.minor(), 3);
    assert_eq!(v.semver().patch, 0);
    assert_eq!(v.as_str(), "5.3");
    assert_eq!(v.short(), "5.3");

    let full = EngineVersion::parse("4.27.2").unwrap();
    assert_eq!(full.short(), "4.27");
    assert!(full < v);
}

#[test]
fn test_engine_version_rejects_garbage() {
    assert!(EngineVersion::parse("").is_err());
    assert!(EngineVersion::parse("5.").is_err());
    assert!(EngineVersion::parse("5.3.1.7").is_err());
    assert!(EngineVersion::parse("five").is_err());
}

#[test]
fn test_association_classification() {
    assert_eq!(EngineAssociation::parse(""), EngineAssociation::Unspecified);
    assert_eq!(EngineAssociation::parse("   "), EngineAssociation::Unspecified);
    assert!(matches!(EngineAssociation::parse("5.3"), EngineAssociation::Version(_)));

    let guid = "{6F1A1A3E-4B8E-4C57-9F0D-6B8D3A1E7A11}";
    assert_eq!(
        EngineAssociation::parse(guid),
        EngineAssociation::Build(guid.to_string())
    );
    assert_eq!(EngineAssociation::parse(guid).as_str(), guid);
}

#[test]
fn test_fixed_locator() {
    let assoc = EngineAssociation::parse("5.3");
    assert_eq!(
        FixedEngineLocator::new("/opt/ue").resolve(&assoc),
        Some(PathBuf::from("/opt/ue"))
    );
    assert_eq!(FixedEngineLocator::none().resolve(&assoc), None);
}

#[test]
fn test_settings_locator_explicit_entries() {
    let mut engines = BTreeMap::new();
    engines.insert("5.3".to_string(), PathBuf::from("/engines/53"));
    engines.insert(
        "6F1A1A3E-4B8E-4C57-9F0D-6B8D3A1E7A11".to_string(),
        PathBuf::from("/engines/source"),
    );
    let locator = SettingsEngineLocator::new(engines, Vec::new());

    assert_eq!(
        locator.resolve(&EngineAssociation::parse("5.3")),
        Some(PathBuf::from("/engines/53"))
    );
    // a three-part version falls back to the major.minor key
    assert_eq!(
        locator.resolve(&EngineAssociation::parse("5.3.2")),
        Some(PathBuf::from("/engines/53"))
    );
    // braces and case are ignored for build ids
    assert_eq!(
        locator.resolve(&EngineAssociation::parse(
            "{6f1a1a3e-4b8e-4c57-9f0d-6b8d3a1e7a11}"
        )),
        Some(PathBuf::from("/engines/source"))
    );
    assert_eq!(locator.resolve(&EngineAssociation::Unspecified), None);
    assert_eq!(locator.resolve(&EngineAssociation::parse("4.27")), None);
}

#[test]
fn test_settings_locator_install_root_convention() {
    let temp = tempdir().unwrap();
    fs::create_dir_all(temp.path().join("UE_5.4")).unwrap();
    let locator = SettingsEngineLocator::new(BTreeMap::new(), vec![temp.path().to_path_buf()]);

    assert_eq!(
        locator.resolve(&EngineAssociation::parse("5.4")),
        Some(temp.path().join("UE_5.4"))
    );
    // convention only applies when the folder exists
    assert_eq!(locator.resolve(&EngineAssociation::parse("5.5")), None);
    // build ids never use the convention
    assert_eq!(locator.resolve(&EngineAssociation::parse("UE_5.4")), None);
}
