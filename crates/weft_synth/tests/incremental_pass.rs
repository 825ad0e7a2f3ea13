//! Integration tests for whole passes against an on-disk project cache.

use std::fs;

use tempfile::TempDir;
use weft_config::{load_config, CONFIG_FILE};
use weft_model::{ComponentSource, DirectiveKind, MemberSource, Program, ProgramSource, TypeRef};
use weft_synth::codes;
use weft_synth::{open_cache, run_pass, PassOutput, Slot, StaticViewHierarchy, SynthOptions};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn project(extra: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    configure(&dir, extra);
    dir
}

fn configure(dir: &TempDir, extra: &str) {
    let config = format!("[project]\nname = \"shop\"\n\n[cache]\ndir = \".weft\"\n{extra}");
    fs::write(dir.path().join(CONFIG_FILE), config).unwrap();
}

fn cart(methods: &[&str]) -> ComponentSource {
    methods.iter().fold(
        ComponentSource::new("com.shop.Cart").with_directive(DirectiveKind::External),
        |cart, name| {
            cart.with_member(
                MemberSource::method(*name, TypeRef::Void, vec![])
                    .public()
                    .with_directive(DirectiveKind::External),
            )
        },
    )
}

fn checkout(with_reference: bool) -> ComponentSource {
    let checkout = ComponentSource::new("com.shop.Checkout");
    if with_reference {
        checkout.with_member(
            MemberSource::field("cart", "com.shop.Cart").with_directive(DirectiveKind::External),
        )
    } else {
        checkout
    }
}

fn program(components: Vec<ComponentSource>) -> Program {
    let source = components
        .into_iter()
        .fold(ProgramSource::default(), |source, c| source.with_component(c));
    Program::from_source(source).unwrap()
}

fn pass(dir: &TempDir, program: &Program) -> PassOutput {
    pass_with(dir, program, &StaticViewHierarchy::new())
}

fn pass_with(dir: &TempDir, program: &Program, hierarchy: &StaticViewHierarchy) -> PassOutput {
    let config = load_config(dir.path()).unwrap();
    let options = SynthOptions::from_config(&config);
    let mut cache = open_cache(dir.path(), &config.cache, "test");
    run_pass(program, &options, hierarchy, &mut cache).unwrap()
}

fn counting_cart() -> ComponentSource {
    cart(&[]).with_member(
        MemberSource::method("total", "int", vec![])
            .public()
            .with_directive(DirectiveKind::External),
    )
}

fn detail() -> ComponentSource {
    ComponentSource::new("com.shop.Detail").with_member(
        MemberSource::field("item", "com.shop.Item").with_directive(DirectiveKind::Populate),
    )
}

// ===========================================================================
// Reuse and regeneration
// ===========================================================================

#[test]
fn cache_lands_in_configured_directory() {
    let dir = project("");
    let output = pass(&dir, &program(vec![cart(&["clear"]), checkout(true)]));
    assert!(!output.has_errors(), "{:?}", output.diagnostics);
    assert!(dir.path().join(".weft").join("manifest.json").exists());
    assert!(output.artifacts["com.shop.Checkout_"].contains("public void clear() {"));
}

#[test]
fn unrelated_component_keeps_reuse() {
    let dir = project("");
    pass(&dir, &program(vec![cart(&["clear"]), checkout(true)]));

    let receipt = ComponentSource::new("com.shop.Receipt");
    let output = pass(&dir, &program(vec![cart(&["clear"]), checkout(true), receipt]));
    assert_eq!(output.reused, 2);
    assert!(output.stale.is_empty());
}

#[test]
fn disabled_cache_regenerates_everything() {
    let dir = project("enabled = false\n");
    let program = program(vec![cart(&["clear"]), checkout(true)]);
    pass(&dir, &program);
    let output = pass(&dir, &program);
    assert_eq!(output.reused, 0);
    assert_eq!(output.generated, 2);
    assert!(!dir.path().join(".weft").exists());
}

#[test]
fn changed_options_regenerate() {
    let dir = project("");
    let program = program(vec![counting_cart(), checkout(true)]);
    let first = pass(&dir, &program);
    assert!(first.artifacts["com.shop.Checkout_"].contains("return cart.total();"));

    configure(&dir, "\n[delegation]\nexternal = \"fallback-after\"\n");
    let output = pass(&dir, &program);
    assert_eq!(output.reused, 0);
    assert_eq!(output.generated, 2);
    assert!(output.stale.is_empty());
    let checkout = &output.artifacts["com.shop.Checkout_"];
    assert!(!checkout.contains("return cart.total();"));
    assert!(checkout.contains("        cart.total();\n"));

    let output = pass(&dir, &program);
    assert_eq!(output.reused, 2);
}

#[test]
fn changed_bindings_regenerate() {
    let dir = project("");
    let program = program(vec![detail()]);
    let first = pass(&dir, &program);
    assert!(!first.artifacts["com.shop.Detail_"].contains("title.setText("));

    let mut hierarchy = StaticViewHierarchy::new();
    hierarchy.bind("com.shop.Detail", "item", "title", Slot::view("title", TypeRef::string()));
    let output = pass_with(&dir, &program, &hierarchy);
    assert_eq!(output.reused, 0);
    assert_eq!(output.generated, 1);
    assert!(output.artifacts["com.shop.Detail_"].contains("title.setText("));

    let output = pass_with(&dir, &program, &hierarchy);
    assert_eq!(output.reused, 1);
}

// ===========================================================================
// Invalidation
// ===========================================================================

#[test]
fn new_dependency_requires_rebuild() {
    let dir = project("");
    pass(&dir, &program(vec![cart(&["clear"]), checkout(false)]));

    let output = pass(&dir, &program(vec![cart(&["clear"]), checkout(true)]));
    assert_eq!(output.stale, ["com.shop.Checkout_"]);
    let added: Vec<_> = output
        .diagnostics
        .iter()
        .filter(|d| d.code == codes::DEPENDENCY_ADDED)
        .collect();
    assert_eq!(added.len(), 1);
    assert!(added[0].message.contains("com.shop.Cart_"));
}

#[test]
fn invalidation_is_sticky_until_full_rebuild() {
    let dir = project("");
    pass(&dir, &program(vec![cart(&["clear"]), checkout(true)]));

    let changed = program(vec![cart(&["clear", "reset"]), checkout(true)]);
    for _ in 0..3 {
        let output = pass(&dir, &changed);
        assert_eq!(output.stale, ["com.shop.Checkout_"]);
        assert!(output.has_errors());
    }

    let rebuild = project("full-rebuild = true\n");
    fs::copy(rebuild.path().join(CONFIG_FILE), dir.path().join(CONFIG_FILE)).unwrap();
    let output = pass(&dir, &changed);
    assert!(output.stale.is_empty());
    assert!(!output.has_errors(), "{:?}", output.diagnostics);
    assert!(output.artifacts["com.shop.Checkout_"].contains("cart.reset();"));
}

#[test]
fn vanished_upstream_invalidates_dependents() {
    let dir = project("");
    pass(&dir, &program(vec![cart(&["clear"]), checkout(true)]));

    let output = pass(&dir, &program(vec![checkout(true)]));
    assert_eq!(output.stale, ["com.shop.Checkout_"]);
    assert!(output
        .diagnostics
        .iter()
        .any(|d| d.code == codes::UPSTREAM_CHANGED && d.message.contains("no longer exists")));
}
