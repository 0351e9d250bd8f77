// ABOUTME: Integration tests for format resolution across the built-in entity kinds.
// ABOUTME: Tests alias expansion, quiet mode and custom registrations.

use lister::render::{Format, FormatResolver, JSON_FORMAT, KindFormats};

#[test]
fn table_alias_expands_per_kind() {
    let resolver = FormatResolver::builtin();
    assert_eq!(
        resolver.resolve("task", "table", false).as_str(),
        "table {{.ID}}\t{{.Name}}\t{{.Image}}\t{{.Node}}\t{{.DesiredState}}\t{{.CurrentState}}\t{{.Error}}\t{{.Ports}}"
    );
    assert_eq!(
        resolver.resolve("checkpoint", "table", false).as_str(),
        "table {{.Name}}"
    );
}

#[test]
fn empty_request_means_default_table() {
    let resolver = FormatResolver::builtin();
    assert_eq!(
        resolver.resolve("network", "", false),
        resolver.resolve("network", "table", false)
    );
}

#[test]
fn json_alias_is_the_same_for_every_kind() {
    let resolver = FormatResolver::builtin();
    for kind in ["network", "checkpoint", "task", "unregistered"] {
        assert_eq!(resolver.resolve(kind, "json", false).as_str(), JSON_FORMAT);
    }
}

#[test]
fn quiet_overrides_every_request_but_raw() {
    let resolver = FormatResolver::builtin();
    for requested in ["", "table", "table {{.Name}}", "json", "{{.Name}}"] {
        assert_eq!(resolver.resolve("network", requested, true).as_str(), "{{.ID}}");
        assert_eq!(resolver.resolve("checkpoint", requested, true).as_str(), "{{.Name}}");
    }
    assert_eq!(resolver.resolve("task", "raw", true).as_str(), "id: {{.ID}}");
    assert_eq!(
        resolver.resolve("checkpoint", "raw", true).as_str(),
        "checkpoint_name: {{.Name}}"
    );
}

#[test]
fn custom_templates_pass_through() {
    let resolver = FormatResolver::builtin();
    let format = resolver.resolve("network", "{{.Name}}\\t{{.Driver}}", false);
    assert!(!format.is_table());
    assert_eq!(format.template(), "{{.Name}}\t{{.Driver}}");
}

#[test]
fn registered_kinds_use_their_defaults() {
    let mut resolver = FormatResolver::new();
    resolver.register(
        "volume",
        KindFormats {
            table: "table {{.Name}}\t{{.Driver}}".to_string(),
            raw: "name: {{.Name}}\\n".to_string(),
            raw_quiet: "name: {{.Name}}".to_string(),
            quiet: "{{.Name}}".to_string(),
        },
    );
    assert_eq!(
        resolver.resolve("volume", "", false),
        Format::new("table {{.Name}}\t{{.Driver}}")
    );
    assert_eq!(resolver.resolve("volume", "raw", true).as_str(), "name: {{.Name}}");
    assert_eq!(resolver.formats("volume").quiet, "{{.Name}}");
}
