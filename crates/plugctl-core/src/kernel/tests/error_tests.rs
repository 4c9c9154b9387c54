use std::io;
use std::path::PathBuf;

use crate::kernel::error::Error;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::{PluginKey, PluginSource};
use crate::storage::error::StorageSystemError;

#[test]
fn test_io_helper_keeps_context() {
    let err = Error::io(
        io::Error::from(io::ErrorKind::NotFound),
        "read_project_descriptor",
        PathBuf::from("/game/Game.uproject"),
    );

    match &err {
        Error::StorageSystem(StorageSystemError::Io { operation, path, .. }) => {
            assert_eq!(operation, "read_project_descriptor");
            assert_eq!(path, &PathBuf::from("/game/Game.uproject"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_permission_denied());
    assert!(err.as_plugin_error().is_none());
}

#[test]
fn test_access_errors_become_permission_denied() {
    let denied = PluginSystemError::from_io(
        io::Error::from(io::ErrorKind::PermissionDenied),
        "rename_plugin",
        PathBuf::from("/game/Plugins/Foo"),
    );
    assert!(denied.is_permission_denied());
    assert!(denied.to_string().contains("Close the editor"));
    assert!(denied.to_string().contains("rename_plugin"));

    let other = PluginSystemError::from_io(
        io::Error::from(io::ErrorKind::NotFound),
        "rename_plugin",
        PathBuf::from("/game/Plugins/Foo"),
    );
    assert!(!other.is_permission_denied());
    assert!(matches!(other, Error::StorageSystem(StorageSystemError::Io { .. })));
}

#[test]
fn test_conflict_message_lists_sources() {
    let err: Error = PluginSystemError::Conflict {
        name: "Twin".to_string(),
        sources: vec![PluginSource::Project, PluginSource::Marketplace],
    }
    .into();

    assert!(err.is_conflict());
    assert_eq!(
        err.to_string(),
        "Plugin system error: Plugin 'Twin' is installed in more than one source (project, marketplace)"
    );
}

#[test]
fn test_batch_incomplete_reports_progress() {
    let cause = Error::io(
        io::Error::other("disk full"),
        "write_project_descriptor",
        PathBuf::from("/game/Game.uproject"),
    );
    let err = PluginSystemError::BatchIncomplete {
        applied: vec![PluginKey::new("Bar", PluginSource::Engine)],
        failed: PluginKey::new("Foo", PluginSource::Project),
        source: Box::new(cause),
    };

    let message = err.to_string();
    assert!(message.starts_with("Batch stopped at Foo (project) after 1 applied change(s)"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_string_conversions() {
    let err: Error = "plain failure".into();
    assert_eq!(err.to_string(), "Error: plain failure");
    let err: Error = String::from("owned failure").into();
    assert!(matches!(err, Error::Other(ref m) if m == "owned failure"));
}
