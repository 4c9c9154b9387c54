use std::fs;

use tempfile::tempdir;

use crate::storage::{DirectoryTrash, TrashBin};

#[test]
fn test_soft_delete_moves_into_trash_dir() {
    let dir = tempdir().unwrap();
    let victim = dir.path().join("Plugins").join("Old");
    fs::create_dir_all(victim.join("Content")).unwrap();
    fs::write(victim.join("Old.uplugin"), "{}").unwrap();
    let trash = DirectoryTrash::new(dir.path().join("Trash"));

    trash.soft_delete(&victim).unwrap();

    assert!(!victim.exists());
    assert!(trash.dir().join("Old").join("Old.uplugin").is_file());
    assert!(trash.dir().join("Old").join("Content").is_dir());
}

#[test]
fn test_repeated_names_get_suffixes() {
    let dir = tempdir().unwrap();
    let trash = DirectoryTrash::new(dir.path().join("Trash"));

    for _ in 0..3 {
        let victim = dir.path().join("Old");
        fs::create_dir_all(&victim).unwrap();
        trash.soft_delete(&victim).unwrap();
    }

    assert!(trash.dir().join("Old").is_dir());
    assert!(trash.dir().join("Old.1").is_dir());
    assert!(trash.dir().join("Old.2").is_dir());
}

#[test]
fn test_missing_source_fails() {
    let dir = tempdir().unwrap();
    let trash = DirectoryTrash::new(dir.path().join("Trash"));
    assert!(trash.soft_delete(&dir.path().join("Nothing")).is_err());
}
