//! Writer idempotence and installation-assembly rendering.

use std::fs;

use tempfile::TempDir;

use weave_emit::{InstallAssembly, InstallTarget, ModuleWriter};

#[test]
fn writes_both_trees_and_stub() {
    let out = TempDir::new().unwrap();
    let mut writer = ModuleWriter::new(out.path(), false);
    writer
        .write_module(
            "routes/home",
            "export {};\n",
            Some("module.exports = {};\n"),
            Some("export {};\n"),
        )
        .unwrap();

    assert_eq!(writer.written(), 3);
    assert!(out.path().join("modules/routes/home.mjs").is_file());
    assert!(out.path().join("runtime/routes/home.cjs").is_file());
    assert!(out.path().join("modules/routes/home.d.mts").is_file());
}

#[test]
fn second_identical_write_touches_nothing() {
    let out = TempDir::new().unwrap();
    let mut first = ModuleWriter::new(out.path(), false);
    first
        .write_module("routes/home", "export {};\n", Some("module.exports = {};\n"), None)
        .unwrap();
    assert_eq!(first.written(), 2);

    let mut second = ModuleWriter::new(out.path(), false);
    second
        .write_module("routes/home", "export {};\n", Some("module.exports = {};\n"), None)
        .unwrap();
    assert_eq!(second.written(), 0);
    assert_eq!(second.unchanged(), 2);
}

#[test]
fn changed_content_is_rewritten() {
    let out = TempDir::new().unwrap();
    let mut first = ModuleWriter::new(out.path(), false);
    first.write_module("a", "one\n", None, None).unwrap();

    let mut second = ModuleWriter::new(out.path(), false);
    second.write_module("a", "two\n", None, None).unwrap();
    assert_eq!(second.written(), 1);
    assert_eq!(
        fs::read_to_string(out.path().join("modules/a.mjs")).unwrap(),
        "two\n"
    );
}

#[test]
fn dry_run_counts_but_does_not_write() {
    let out = TempDir::new().unwrap();
    let mut writer = ModuleWriter::new(out.path(), true);
    writer.write_module("a", "one\n", None, None).unwrap();
    assert_eq!(writer.written(), 1);
    assert!(!out.path().join("modules/a.mjs").exists());
}

#[test]
fn install_assembly_applies_to_both_targets() {
    let out = TempDir::new().unwrap();
    let mut writer = ModuleWriter::new(out.path(), false);

    let mut assembly = InstallAssembly::new();
    assembly.push_import(InstallTarget::Server, "action_ping", "actions/ping");
    assembly.push_body(
        InstallTarget::Server,
        "context.register(\"actions\", \"ping\", action_ping);",
    );
    assembly.apply(&mut writer).unwrap();

    let server = fs::read_to_string(out.path().join("modules/install.server.mjs")).unwrap();
    insta::assert_snapshot!(server, @r#"
    // Generated by weave. Do not edit.
    import action_ping from "./actions/ping.mjs";

    export function install(context) {
      context.register("actions", "ping", action_ping);
    }
    "#);

    let runtime = fs::read_to_string(out.path().join("runtime/install.server.cjs")).unwrap();
    insta::assert_snapshot!(runtime, @r#"
    // Generated by weave. Do not edit.
    const action_ping = require("./actions/ping.cjs");

    module.exports.install = function install(context) {
      context.register("actions", "ping", action_ping);
    };
    "#);

    // The client entrypoint exists even when nothing registered into it.
    let client = fs::read_to_string(out.path().join("modules/install.client.mjs")).unwrap();
    insta::assert_snapshot!(client, @r#"
    // Generated by weave. Do not edit.

    export function install(context) {
    }
    "#);
}

#[test]
fn install_assembly_is_idempotent_across_passes() {
    let out = TempDir::new().unwrap();

    let mut assembly = InstallAssembly::new();
    assembly.push_import(InstallTarget::Client, "route_home", "routes/home");
    assembly.push_body(
        InstallTarget::Client,
        "context.register(\"routes\", \"home\", route_home);",
    );

    let mut first = ModuleWriter::new(out.path(), false);
    assembly.apply(&mut first).unwrap();
    assert_eq!(first.written(), 4);

    let mut second = ModuleWriter::new(out.path(), false);
    assembly.apply(&mut second).unwrap();
    assert_eq!(second.written(), 0);
    assert_eq!(second.unchanged(), 4);
}
