//! Scanner behavior against real directory fixtures.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use weave_model::{LinkError, PriorityTier};
use weave_scan::{
    DataFileRule, EntryPointRule, ItemDescriptor, MarkerPolicy, NameConstraint, ScanRules,
    is_identity_token, scan,
};

fn entry_rules() -> ScanRules {
    ScanRules {
        category: "routes",
        name_constraint: NameConstraint::MayBeToken,
        allow: MarkerPolicy::ALL,
        entry_point: Some(EntryPointRule {
            file_name: "page.mjs",
            required: true,
        }),
        data_files: None,
        access_verbs: &["view", "manage"],
        feature_defaults: &[("caching", true)],
    }
}

fn make_item(root: &Path, name: &str, files: &[&str]) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    for file in files {
        fs::write(dir.join(file), "").unwrap();
    }
}

fn collect(root: &Path, rules: &ScanRules) -> Vec<ItemDescriptor> {
    let mut items = Vec::new();
    scan(root, rules, &mut |item| {
        items.push(item);
        Ok(())
    })
    .unwrap();
    items
}

#[test]
fn items_arrive_in_lexicographic_order() {
    let dir = TempDir::new().unwrap();
    for name in ["charlie", "alpha", "bravo"] {
        make_item(dir.path(), name, &["page.mjs"]);
    }
    let names: Vec<String> = collect(dir.path(), &entry_rules())
        .into_iter()
        .map(|item| item.name)
        .collect();
    assert_eq!(names, ["alpha", "bravo", "charlie"]);
}

#[test]
fn hidden_and_underscore_entries_are_skipped() {
    let dir = TempDir::new().unwrap();
    make_item(dir.path(), "visible", &["page.mjs"]);
    make_item(dir.path(), ".hidden", &["page.mjs"]);
    make_item(dir.path(), "_draft", &["page.mjs"]);
    let items = collect(dir.path(), &entry_rules());
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "visible");
}

#[test]
fn missing_root_contributes_nothing() {
    let dir = TempDir::new().unwrap();
    let items = collect(&dir.path().join("absent"), &entry_rules());
    assert!(items.is_empty());
}

#[test]
fn placeholder_directory_gets_identity_and_stays_stable() {
    let dir = TempDir::new().unwrap();
    make_item(dir.path(), "_", &["page.mjs"]);

    let first = collect(dir.path(), &entry_rules());
    assert_eq!(first.len(), 1);
    let token = first[0].name.clone();
    assert!(is_identity_token(&token), "{token} should be a token");
    assert!(dir.path().join(&token).is_dir());
    assert!(!dir.path().join("_").exists());

    // Re-scan: same name, no further renames.
    let second = collect(dir.path(), &entry_rules());
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].name, token);
}

#[test]
fn priority_marker_is_decoded_and_canonicalized() {
    let dir = TempDir::new().unwrap();
    make_item(dir.path(), "home", &["page.mjs", "Very_High.priority"]);

    let items = collect(dir.path(), &entry_rules());
    assert_eq!(items[0].tier, PriorityTier::VeryHigh);
    let item_dir = dir.path().join("home");
    assert!(item_dir.join("very-high.priority").is_file());
    assert!(!item_dir.join("Very_High.priority").exists());
}

#[test]
fn unknown_tier_is_fatal_and_names_the_path() {
    let dir = TempDir::new().unwrap();
    make_item(dir.path(), "home", &["page.mjs", "urgent.priority"]);

    let err = scan(dir.path(), &entry_rules(), &mut |_| Ok(())).unwrap_err();
    match err {
        LinkError::UnknownTier { name, path } => {
            assert_eq!(name, "urgent");
            assert!(path.ends_with("home/urgent.priority"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn two_priority_markers_are_fatal() {
    let dir = TempDir::new().unwrap();
    make_item(dir.path(), "home", &["page.mjs", "high.priority", "low.priority"]);

    let err = scan(dir.path(), &entry_rules(), &mut |_| Ok(())).unwrap_err();
    assert!(matches!(
        err,
        LinkError::DuplicateMarker {
            kind: "priority",
            ..
        }
    ));
}

#[test]
fn conditions_group_by_access_verb() {
    let dir = TempDir::new().unwrap();
    make_item(
        dir.path(),
        "admin-panel",
        &["page.mjs", "ViewAdmin.cond", "view_member.cond", "manage-admin.cond"],
    );

    let items = collect(dir.path(), &entry_rules());
    let conditions = &items[0].conditions;
    let view: Vec<&str> = conditions
        .roles_for("view")
        .unwrap()
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(view, ["admin", "member"]);
    assert!(conditions.roles_for("manage").is_some());

    let item_dir = dir.path().join("admin-panel");
    assert!(item_dir.join("view-admin.cond").is_file());
    assert!(item_dir.join("view-member.cond").is_file());
    assert!(!item_dir.join("ViewAdmin.cond").exists());
}

#[test]
fn feature_markers_override_declared_defaults() {
    let dir = TempDir::new().unwrap();
    make_item(dir.path(), "with-default", &["page.mjs"]);
    make_item(dir.path(), "disabled", &["page.mjs", "caching.disable"]);

    let items = collect(dir.path(), &entry_rules());
    assert_eq!(items[0].features["caching"], false);
    assert_eq!(items[1].features["caching"], true);
}

#[test]
fn undeclared_feature_is_fatal() {
    let dir = TempDir::new().unwrap();
    make_item(dir.path(), "home", &["page.mjs", "telemetry.enable"]);

    let err = scan(dir.path(), &entry_rules(), &mut |_| Ok(())).unwrap_err();
    assert!(matches!(err, LinkError::UndeclaredFeature { name, .. } if name == "telemetry"));
}

#[test]
fn missing_entry_point_is_fatal() {
    let dir = TempDir::new().unwrap();
    make_item(dir.path(), "empty", &[]);

    let err = scan(dir.path(), &entry_rules(), &mut |_| Ok(())).unwrap_err();
    match err {
        LinkError::MissingEntryPoint { expected, path } => {
            assert_eq!(expected, "page.mjs");
            assert!(path.ends_with("empty"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn reference_marker_waives_the_entry_point() {
    let dir = TempDir::new().unwrap();
    make_item(dir.path(), "alias", &["dashboard.ref"]);

    let items = collect(dir.path(), &entry_rules());
    assert_eq!(items[0].reference.as_deref(), Some("dashboard"));
    assert!(items[0].entry_point.is_none());
}

#[test]
fn identity_placeholder_file_becomes_the_item_name() {
    let dir = TempDir::new().unwrap();
    make_item(dir.path(), "whatever", &["page.mjs", "_.myuid"]);

    let first = collect(dir.path(), &entry_rules());
    let token = first[0].name.clone();
    assert!(is_identity_token(&token));

    let item_dir = dir.path().join("whatever");
    assert!(item_dir.join(format!("{token}.myuid")).is_file());
    assert!(!item_dir.join("_.myuid").exists());

    // The human can rename the folder; the key stays.
    fs::rename(&item_dir, dir.path().join("renamed-by-hand")).unwrap();
    let second = collect(dir.path(), &entry_rules());
    assert_eq!(second[0].name, token);
}

#[test]
fn identity_mismatch_with_token_folder_is_fatal() {
    let dir = TempDir::new().unwrap();
    make_item(
        dir.path(),
        "u0123456789ab",
        &["page.mjs", "uffffffffffff.myuid"],
    );

    let err = scan(dir.path(), &entry_rules(), &mut |_| Ok(())).unwrap_err();
    assert!(matches!(err, LinkError::IdentityMismatch { .. }));
}

#[test]
fn name_constraint_must_not_be_token() {
    let dir = TempDir::new().unwrap();
    make_item(dir.path(), "u0123456789ab", &["page.mjs"]);

    let mut rules = entry_rules();
    rules.name_constraint = NameConstraint::MustNotBeToken;
    let err = scan(dir.path(), &rules, &mut |_| Ok(())).unwrap_err();
    assert!(matches!(err, LinkError::NameConstraint { .. }));
}

#[test]
fn disallowed_marker_kind_is_fatal() {
    let dir = TempDir::new().unwrap();
    make_item(dir.path(), "home", &["page.mjs", "high.priority"]);

    let mut rules = entry_rules();
    rules.allow = MarkerPolicy {
        priority: false,
        ..MarkerPolicy::ALL
    };
    let err = scan(dir.path(), &rules, &mut |_| Ok(())).unwrap_err();
    assert!(matches!(
        err,
        LinkError::MarkerNotAllowed {
            kind: "priority",
            ..
        }
    ));
}

#[test]
fn data_files_are_collected_sorted() {
    let dir = TempDir::new().unwrap();
    make_item(dir.path(), "common", &["fr.json", "en.json", "notes.txt"]);

    let rules = ScanRules {
        category: "translations",
        name_constraint: NameConstraint::MayBeToken,
        allow: MarkerPolicy {
            priority: true,
            identity: true,
            ..MarkerPolicy::NONE
        },
        entry_point: None,
        data_files: Some(DataFileRule { extension: "json" }),
        access_verbs: &[],
        feature_defaults: &[],
    };
    let items = collect(dir.path(), &rules);
    let names: Vec<String> = items[0]
        .data_files
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["en.json", "fr.json"]);
}
