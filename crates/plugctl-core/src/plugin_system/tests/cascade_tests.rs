use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use crate::kernel::error::Error;
use crate::plugin_system::cascade::ChangeOutcome;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::{OverrideState, PluginKey, PluginSource};
use crate::test_support::{plugin_json, Fixture};
use crate::ui_bridge::{AutoConfirm, ConfirmationPrompt, DeclineAll};

type Calls = Rc<RefCell<Vec<(String, Vec<PluginKey>)>>>;

/// Prompt answering `answer` and recording every question
fn recording_prompt(answer: bool) -> (Box<dyn ConfirmationPrompt>, Calls) {
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&calls);
    let prompt = move |message: &str, affected: &[PluginKey]| {
        seen.borrow_mut()
            .push((message.to_string(), affected.to_vec()));
        answer
    };
    (Box::new(prompt), calls)
}

fn project_override(fixture: &Fixture, name: &str) -> Option<bool> {
    fixture.uproject_json()["Plugins"]
        .as_array()
        .and_then(|entries| {
            entries
                .iter()
                .find(|e| e["Name"] == name)
                .and_then(|e| e["Enabled"].as_bool())
        })
}

#[test]
fn test_enable_cascades_to_disabled_dependency() {
    let fixture = Fixture::empty();
    fixture.add_project_plugin("Foo", &plugin_json(false, &["Bar"]));
    fixture.add_engine_plugin("Bar", &plugin_json(false, &[]));
    let (prompt, calls) = recording_prompt(true);
    let mut manager = fixture.manager().with_prompt(prompt);

    let outcome = manager.enable("Foo", PluginSource::Project).unwrap();

    assert_eq!(
        outcome,
        ChangeOutcome::Applied(vec![
            PluginKey::new("Bar", PluginSource::Engine),
            PluginKey::new("Foo", PluginSource::Project),
        ])
    );
    assert_eq!(calls.borrow().len(), 1);
    assert_eq!(calls.borrow()[0].1, vec![PluginKey::new("Bar", PluginSource::Engine)]);

    for (name, source) in [("Foo", PluginSource::Project), ("Bar", PluginSource::Engine)] {
        let plugin = manager.registry().get(name, source).unwrap();
        assert_eq!(plugin.explicit_override, OverrideState::Enabled);
        assert_eq!(project_override(&fixture, name), Some(true));
    }
}

#[test]
fn test_enable_without_cascade_does_not_prompt() {
    let fixture = Fixture::empty();
    fixture.add_project_plugin("Foo", &plugin_json(false, &["Bar"]));
    fixture.add_engine_plugin("Bar", &plugin_json(true, &[]));
    let (prompt, calls) = recording_prompt(false);
    let mut manager = fixture.manager().with_prompt(prompt);

    let outcome = manager.enable("Foo", PluginSource::Project).unwrap();

    assert!(outcome.is_applied());
    assert!(calls.borrow().is_empty());
    assert_eq!(project_override(&fixture, "Foo"), Some(true));
    assert_eq!(project_override(&fixture, "Bar"), None);
}

#[test]
fn test_enable_does_not_follow_dependency_chains() {
    let fixture = Fixture::empty();
    fixture.add_project_plugin("A", &plugin_json(false, &["B"]));
    fixture.add_project_plugin("B", &plugin_json(false, &["C"]));
    fixture.add_project_plugin("C", &plugin_json(false, &[]));
    let mut manager = fixture.manager().with_prompt(Box::new(AutoConfirm));

    manager.enable("A", PluginSource::Project).unwrap();

    assert!(manager.is_enabled("A", PluginSource::Project));
    assert!(manager.is_enabled("B", PluginSource::Project));
    assert!(!manager.is_enabled("C", PluginSource::Project));
    assert_eq!(project_override(&fixture, "C"), None);
}

#[test]
fn test_declined_enable_leaves_everything_untouched() {
    let fixture = Fixture::new(
        "{\n  \"EngineAssociation\" : \"5.3\",\n  \"Plugins\": [ {\"Name\": \"Other\", \"Enabled\": true}, ]\n}",
    );
    fixture.add_project_plugin("Foo", &plugin_json(false, &["Bar"]));
    fixture.add_engine_plugin("Bar", &plugin_json(false, &[]));
    let before = fs::read(fixture.uproject()).unwrap();
    let mut manager = fixture.manager().with_prompt(Box::new(DeclineAll));

    let outcome = manager.enable("Foo", PluginSource::Project).unwrap();

    assert_eq!(outcome, ChangeOutcome::Declined);
    assert_eq!(fs::read(fixture.uproject()).unwrap(), before);
    assert!(!manager.is_enabled("Foo", PluginSource::Project));
    assert_eq!(
        manager.registry().get("Bar", PluginSource::Engine).unwrap().explicit_override,
        OverrideState::Unset
    );
}

#[test]
fn test_disable_cascades_to_enabled_dependents_in_every_source() {
    let fixture = Fixture::empty();
    fixture.add_engine_plugin("Core", &plugin_json(true, &[]));
    fixture.add_engine_plugin("EngineUser", &plugin_json(true, &["Core"]));
    fixture.add_project_plugin("ProjectUser", &plugin_json(true, &["Core"]));
    fixture.add_marketplace_plugin("IdleUser", &plugin_json(false, &["Core"]));
    let (prompt, calls) = recording_prompt(true);
    let mut manager = fixture.manager().with_prompt(prompt);

    let outcome = manager.disable("Core", PluginSource::Engine).unwrap();

    assert_eq!(
        outcome,
        ChangeOutcome::Applied(vec![
            PluginKey::new("ProjectUser", PluginSource::Project),
            PluginKey::new("EngineUser", PluginSource::Engine),
            PluginKey::new("Core", PluginSource::Engine),
        ])
    );
    assert!(calls.borrow()[0].0.contains("also disables 2 enabled dependents"));
    assert_eq!(project_override(&fixture, "Core"), Some(false));
    assert_eq!(project_override(&fixture, "EngineUser"), Some(false));
    assert_eq!(project_override(&fixture, "ProjectUser"), Some(false));
    assert_eq!(project_override(&fixture, "IdleUser"), None);
    assert!(!manager.is_enabled("ProjectUser", PluginSource::Project));
}

#[test]
fn test_declined_disable_leaves_everything_untouched() {
    let fixture = Fixture::empty();
    fixture.add_engine_plugin("Core", &plugin_json(true, &[]));
    fixture.add_project_plugin("User", &plugin_json(true, &["Core"]));
    let before = fs::read(fixture.uproject()).unwrap();
    let mut manager = fixture.manager();

    let outcome = manager.disable("Core", PluginSource::Engine).unwrap();

    assert_eq!(outcome, ChangeOutcome::Declined);
    assert_eq!(fs::read(fixture.uproject()).unwrap(), before);
    assert!(manager.is_enabled("Core", PluginSource::Engine));
}

#[test]
fn test_enable_refuses_conflicted_plugin() {
    let fixture = Fixture::empty();
    fixture.add_project_plugin("Twin", &plugin_json(false, &[]));
    fixture.add_marketplace_plugin("Twin", &plugin_json(false, &[]));
    let before = fs::read(fixture.uproject()).unwrap();
    let mut manager = fixture.manager().with_prompt(Box::new(AutoConfirm));

    let err = manager.enable("Twin", PluginSource::Project).unwrap_err();

    assert!(err.is_conflict());
    match err {
        Error::PluginSystem(PluginSystemError::Conflict { name, sources }) => {
            assert_eq!(name, "Twin");
            assert_eq!(sources, vec![PluginSource::Project, PluginSource::Marketplace]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fs::read(fixture.uproject()).unwrap(), before);
}

#[test]
fn test_enable_refuses_conflicted_dependency() {
    let fixture = Fixture::empty();
    fixture.add_project_plugin("Foo", &plugin_json(false, &["Twin"]));
    fixture.add_engine_plugin("Twin", &plugin_json(false, &[]));
    fixture.add_marketplace_plugin("Twin", &plugin_json(false, &[]));
    let mut manager = fixture.manager().with_prompt(Box::new(AutoConfirm));

    let err = manager.enable("Foo", PluginSource::Project).unwrap_err();

    assert!(err.is_conflict());
    assert!(!manager.is_enabled("Foo", PluginSource::Project));
}

#[test]
fn test_disable_of_conflicted_plugin_is_allowed() {
    let fixture = Fixture::empty();
    fixture.add_project_plugin("Twin", &plugin_json(true, &[]));
    fixture.add_engine_plugin("Twin", &plugin_json(true, &[]));
    let mut manager = fixture.manager();

    manager.disable("Twin", PluginSource::Project).unwrap();

    assert!(!manager.is_enabled("Twin", PluginSource::Project));
    assert!(!manager.is_enabled("Twin", PluginSource::Engine));
}

#[test]
fn test_unknown_plugin_is_reported() {
    let fixture = Fixture::empty();
    let mut manager = fixture.manager();

    let err = manager.enable("Ghost", PluginSource::Engine).unwrap_err();
    assert!(matches!(
        err,
        Error::PluginSystem(PluginSystemError::PluginNotFound {
            location: PluginSource::Engine,
            ..
        })
    ));
}

#[test]
fn test_reset_to_default_scenario() {
    let fixture = Fixture::new(
        r#"{"EngineAssociation":"5.3","Plugins":[{"Name":"Foo","Enabled":false}]}"#,
    );
    fixture.add_project_plugin("Foo", &plugin_json(true, &[]));
    let mut manager = fixture.manager();
    assert!(!manager.is_enabled("Foo", PluginSource::Project));

    assert!(manager.reset_to_default("Foo", PluginSource::Project).unwrap());

    assert!(manager.is_enabled("Foo", PluginSource::Project));
    assert_eq!(project_override(&fixture, "Foo"), None);
    assert!(manager.project().disabled_plugins.is_empty());
    assert_eq!(fixture.uproject_json()["EngineAssociation"], "5.3");
}

#[test]
fn test_reset_without_override_is_noop() {
    let fixture = Fixture::new("{\"EngineAssociation\":\"5.3\",\"Plugins\":[],}");
    fixture.add_project_plugin("Foo", &plugin_json(true, &[]));
    let before = fs::read(fixture.uproject()).unwrap();
    let mut manager = fixture.manager();

    assert!(!manager.reset_to_default("Foo", PluginSource::Project).unwrap());
    assert_eq!(fs::read(fixture.uproject()).unwrap(), before);
}

#[test]
fn test_failed_first_write_leaves_registry_unchanged() {
    let fixture = Fixture::empty();
    fixture.add_project_plugin("Foo", &plugin_json(false, &[]));
    let mut manager = fixture.manager();
    fs::remove_file(fixture.uproject()).unwrap();

    let err = manager.enable("Foo", PluginSource::Project).unwrap_err();

    assert!(matches!(err, Error::StorageSystem(_)));
    assert_eq!(
        manager.registry().get("Foo", PluginSource::Project).unwrap().explicit_override,
        OverrideState::Unset
    );
}

#[test]
fn test_failed_later_write_keeps_earlier_writes() {
    let fixture = Fixture::empty();
    fixture.add_project_plugin("Foo", &plugin_json(false, &["Bar"]));
    fixture.add_engine_plugin("Bar", &plugin_json(false, &[]));
    let mut manager = fixture.manager();
    let change = manager.plan_enable("Foo", PluginSource::Project).unwrap();
    let project_file = manager.project_file();
    let mut calls = 0;

    let err = manager
        .write_batch_with(&change.write_order(), change.enable, |name, enabled| {
            calls += 1;
            if calls == 1 {
                project_file.set_plugin_override(name, enabled)
            } else {
                Err(Error::from("descriptor locked by the editor"))
            }
        })
        .unwrap_err();

    match err {
        Error::PluginSystem(PluginSystemError::BatchIncomplete {
            applied, failed, ..
        }) => {
            assert_eq!(applied, vec![PluginKey::new("Bar", PluginSource::Engine)]);
            assert_eq!(failed, PluginKey::new("Foo", PluginSource::Project));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(project_override(&fixture, "Bar"), Some(true));
    assert_eq!(
        manager.registry().get("Bar", PluginSource::Engine).unwrap().explicit_override,
        OverrideState::Enabled
    );
    assert_eq!(project_override(&fixture, "Foo"), None);
    assert_eq!(
        manager.registry().get("Foo", PluginSource::Project).unwrap().explicit_override,
        OverrideState::Unset
    );
}
