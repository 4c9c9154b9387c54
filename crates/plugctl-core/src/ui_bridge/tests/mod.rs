use std::cell::Cell;

use crate::plugin_system::manifest::{PluginKey, PluginSource};
use crate::ui_bridge::{format_affected, AutoConfirm, ConfirmationPrompt, DeclineAll};

fn affected() -> Vec<PluginKey> {
    vec![
        PluginKey::new("Bar", PluginSource::Engine),
        PluginKey::new("Baz", PluginSource::Marketplace),
    ]
}

#[test]
fn test_stock_prompts() {
    assert!(AutoConfirm.confirm("go?", &affected()));
    assert!(!DeclineAll.confirm("go?", &affected()));
}

#[test]
fn test_closure_prompt_sees_request() {
    let count = Cell::new(0);
    let prompt = |message: &str, keys: &[PluginKey]| {
        count.set(keys.len());
        message.starts_with("Enable")
    };

    assert!(prompt.confirm("Enable Foo?", &affected()));
    assert_eq!(count.get(), 2);
    assert!(!prompt.confirm("Disable Foo?", &[]));
    assert_eq!(count.get(), 0);
}

#[test]
fn test_format_affected() {
    assert_eq!(
        format_affected(&affected()),
        "  - Bar (engine)\n  - Baz (marketplace)"
    );
    assert_eq!(format_affected(&[]), "");
}
