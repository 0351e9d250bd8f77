// ABOUTME: Integration tests rendering networks, checkpoints and tasks end to end.
// ABOUTME: Covers table alignment, quiet and raw layouts, JSON output and template errors.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use lister::models::{Checkpoint, Network, PortConfig, Protocol, Task, TaskState};
use lister::render::{FormatResolver, RenderContext, RenderErrorKind, header_titles};
use lister::types::{Labels, NetworkId, NodeId, ServiceId, TaskId};
use lister::views::{NetworkView, TaskNames, checkpoint, network, task};

fn render_networks(format: &str, quiet: bool, trunc: bool, networks: &[Network]) -> String {
    let mut ctx = RenderContext::new(Vec::new(), format)
        .truncate(trunc)
        .quiet(quiet);
    network::format_write(&mut ctx, networks).unwrap();
    String::from_utf8(ctx.into_inner()).unwrap()
}

fn sample_networks() -> Vec<Network> {
    vec![
        Network {
            id: NetworkId::new("networkID1"),
            name: "foobar_baz".to_string(),
            driver: "foo".to_string(),
            scope: "local".to_string(),
            created: Some(Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        },
        Network {
            id: NetworkId::new("networkID2"),
            name: "foobar_bar".to_string(),
            driver: "bar".to_string(),
            scope: "local".to_string(),
            created: Some(Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        },
    ]
}

mod networks {
    use super::*;

    #[test]
    fn default_table_is_aligned() {
        let format = FormatResolver::builtin().resolve(network::KIND, "table", false);
        let out = render_networks(format.as_str(), false, true, &sample_networks());
        assert_eq!(
            out,
            "NETWORK ID   NAME         DRIVER    SCOPE\n\
             networkID1   foobar_baz   foo       local\n\
             networkID2   foobar_bar   bar       local\n"
        );
    }

    #[test]
    fn quiet_lists_identifiers_only() {
        let format = FormatResolver::builtin().resolve(network::KIND, "table", true);
        let out = render_networks(format.as_str(), true, true, &sample_networks());
        assert_eq!(out, "networkID1\nnetworkID2\n");
    }

    #[test]
    fn raw_records_end_with_a_blank_line() {
        let format = FormatResolver::builtin().resolve(network::KIND, "raw", false);
        let out = render_networks(format.as_str(), false, true, &sample_networks());
        assert_eq!(
            out,
            "network_id: networkID1\nname: foobar_baz\ndriver: foo\nscope: local\n\n\
             network_id: networkID2\nname: foobar_bar\ndriver: bar\nscope: local\n\n"
        );
    }

    #[test]
    fn raw_quiet_keeps_the_label() {
        let format = FormatResolver::builtin().resolve(network::KIND, "raw", true);
        let out = render_networks(format.as_str(), true, true, &sample_networks());
        assert_eq!(out, "network_id: networkID1\nnetwork_id: networkID2\n");
    }

    #[test]
    fn custom_template_shows_creation_time() {
        let out = render_networks("{{.Name}} {{.CreatedAt}}", false, true, &sample_networks());
        assert_eq!(
            out,
            "foobar_baz 2016-01-01 00:00:00 +0000 UTC\n\
             foobar_bar 2017-01-01 00:00:00 +0000 UTC\n"
        );
    }

    #[test]
    fn custom_table_only_shows_referenced_headers() {
        let out = render_networks("table {{.Name}}\t{{.Internal}}", false, true, &sample_networks());
        assert_eq!(
            out,
            "NAME         INTERNAL\nfoobar_baz   false\nfoobar_bar   false\n"
        );
    }

    #[test]
    fn empty_list_still_gets_a_header() {
        assert_eq!(render_networks("table {{.ID}}", false, true, &[]), "NETWORK ID\n");
        assert_eq!(render_networks("table {{.ID}}", true, true, &[]), "");
        assert_eq!(render_networks("{{.ID}}", false, true, &[]), "");
    }

    #[test]
    fn long_ids_are_shortened_unless_quiet() {
        let networks = vec![Network {
            id: NetworkId::new("sha256:4f1f8c6bd51c1a0b9f7e0a3c2e1d4b5a6c7d8e9f"),
            ..Default::default()
        }];
        assert_eq!(render_networks("{{.ID}}", false, true, &networks), "4f1f8c6bd51c\n");
        assert_eq!(
            render_networks("{{.ID}}", true, true, &networks),
            "sha256:4f1f8c6bd51c1a0b9f7e0a3c2e1d4b5a6c7d8e9f\n"
        );
    }

    #[test]
    fn labels_keep_engine_order() {
        let networks = vec![Network {
            labels: Labels::from_iter([("label2", "value2"), ("label1", "value1")]),
            ..Default::default()
        }];
        assert_eq!(
            render_networks("{{.Labels}}", false, true, &networks),
            "label2=value2,label1=value1\n"
        );
    }
}

mod json {
    use super::*;

    #[test]
    fn json_alias_emits_one_sorted_object_per_line() {
        let out = render_networks("json", false, true, &sample_networks());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"{"CreatedAt":"2016-01-01 00:00:00 +0000 UTC","Driver":"foo","ID":"networkID1","IPv4":"false","IPv6":"false","Internal":"false","Labels":"","Name":"foobar_baz","Scope":"local"}"#
        );
    }

    #[test]
    fn every_field_appears_as_a_json_key_with_its_display_value() {
        let networks = sample_networks();
        let out = render_networks("json", false, true, &networks[..1]);
        let object: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(out.trim_end()).unwrap();

        let fields = header_titles::<NetworkView>();
        assert_eq!(object.len(), fields.len());
        for (name, _) in fields {
            let shown = render_networks(&format!("{{{{.{name}}}}}"), false, true, &networks[..1]);
            assert_eq!(
                object[name],
                serde_json::Value::String(shown.trim_end_matches('\n').to_string()),
                "field {name}"
            );
        }
    }

    #[test]
    fn json_of_a_field_keeps_its_native_type() {
        let out = render_networks("{{json .IPv6}} {{json .Name}}", false, true, &sample_networks());
        assert_eq!(out, "false \"foobar_baz\"\nfalse \"foobar_bar\"\n");
    }

    #[test]
    fn html_characters_are_not_escaped() {
        let networks = vec![Network {
            name: "<a&b>".to_string(),
            ..Default::default()
        }];
        assert_eq!(
            render_networks("{{json .Name}}", false, true, &networks),
            "\"<a&b>\"\n"
        );
    }
}

mod errors {
    use super::*;

    fn failure(format: &str) -> (lister::render::RenderError, Vec<u8>) {
        let mut ctx = RenderContext::new(Vec::new(), format).truncate(true);
        let err = network::format_write(&mut ctx, &sample_networks()).unwrap_err();
        (err, ctx.into_inner())
    }

    #[test]
    fn unknown_function_fails_before_any_output() {
        let (err, out) = failure("{{InvalidFunction}}");
        assert_eq!(err.kind(), RenderErrorKind::TemplateParse);
        assert_eq!(
            err.to_string(),
            "template parsing error: template: :1: function \"InvalidFunction\" not defined"
        );
        assert!(out.is_empty());
    }

    #[test]
    fn nil_command_fails_at_execution() {
        let (err, out) = failure("{{nil}}");
        assert_eq!(err.kind(), RenderErrorKind::TemplateExecute);
        assert_eq!(
            err.to_string(),
            "template parsing error: template: :1:2: executing \"\" at <nil>: nil is not a command"
        );
        assert!(out.is_empty());
    }

    #[test]
    fn unknown_field_names_the_kind() {
        let (err, _) = failure("{{.Nope}}");
        assert!(
            err.to_string()
                .contains("can't evaluate field Nope in type network")
        );
    }
}

mod sink_and_streaming {
    use super::*;
    use lister::template::Value;
    use std::io;

    struct ClosedSink;

    impl io::Write for ClosedSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn reject_second(args: &[Value]) -> Result<Value, String> {
        match args.first().and_then(Value::as_str) {
            Some("networkID2") => Err("rejected networkID2".to_string()),
            Some(id) => Ok(Value::from(id)),
            None => Err("missing id".to_string()),
        }
    }

    #[test]
    fn write_failures_are_output_errors() {
        let mut ctx = RenderContext::new(ClosedSink, "{{.ID}}").truncate(true);
        let err = network::format_write(&mut ctx, &sample_networks()).unwrap_err();
        assert_eq!(err.kind(), RenderErrorKind::Output);
        assert_eq!(err.to_string(), "failed to write output: sink closed");
    }

    #[test]
    fn streamed_rows_before_a_failure_stay_written() {
        let mut ctx = RenderContext::new(Vec::new(), "{{.Name}} {{reject_second .ID}}").truncate(true);
        ctx.register_func("reject_second", reject_second);
        let err = network::format_write(&mut ctx, &sample_networks()).unwrap_err();
        assert_eq!(err.kind(), RenderErrorKind::TemplateExecute);
        assert!(err.to_string().contains("error calling reject_second: rejected networkID2"));
        assert_eq!(
            String::from_utf8(ctx.into_inner()).unwrap(),
            "foobar_baz networkID1\n"
        );
    }

    #[test]
    fn table_failures_write_nothing() {
        let mut ctx = RenderContext::new(Vec::new(), "table {{.Name}}\t{{reject_second .ID}}")
            .truncate(true);
        ctx.register_func("reject_second", reject_second);
        let err = network::format_write(&mut ctx, &sample_networks()).unwrap_err();
        assert_eq!(err.kind(), RenderErrorKind::TemplateExecute);
        assert!(ctx.into_inner().is_empty());
    }
}

mod checkpoints {
    use super::*;

    #[test]
    fn default_table_and_quiet() {
        let resolver = FormatResolver::builtin();
        let checkpoints = vec![
            Checkpoint {
                name: "checkpoint-1".to_string(),
            },
            Checkpoint {
                name: "checkpoint-2".to_string(),
            },
        ];

        let mut ctx = RenderContext::new(Vec::new(), resolver.resolve(checkpoint::KIND, "", false));
        checkpoint::format_write(&mut ctx, &checkpoints).unwrap();
        assert_eq!(
            String::from_utf8(ctx.into_inner()).unwrap(),
            "CHECKPOINT NAME\ncheckpoint-1\ncheckpoint-2\n"
        );

        let mut ctx = RenderContext::new(Vec::new(), resolver.resolve(checkpoint::KIND, "", true))
            .quiet(true);
        checkpoint::format_write(&mut ctx, &checkpoints).unwrap();
        assert_eq!(
            String::from_utf8(ctx.into_inner()).unwrap(),
            "checkpoint-1\ncheckpoint-2\n"
        );
    }
}

mod tasks {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn sample_task() -> Task {
        let mut t = Task {
            id: TaskId::new("x1y2z3a4b5c6d7e8f9g0"),
            service_id: ServiceId::new("web"),
            slot: 1,
            node_id: NodeId::new("node-a"),
            desired_state: TaskState::Running,
            ..Default::default()
        };
        t.status.state = TaskState::Running;
        t.status.timestamp = Some(now() - TimeDelta::minutes(2));
        t.status.port_status.ports = vec![PortConfig {
            protocol: Protocol::Tcp,
            target_port: 80,
            published_port: 8080,
            ..Default::default()
        }];
        t.spec.container_spec.image = "nginx:1.25@sha256:abcdef".to_string();
        t
    }

    fn render_tasks(format: &str, trunc: bool, tasks: &[Task]) -> String {
        let names = TaskNames::unresolved(tasks);
        let mut ctx = RenderContext::new(Vec::new(), format).truncate(trunc);
        task::format_write(&mut ctx, tasks, &names, now()).unwrap();
        String::from_utf8(ctx.into_inner()).unwrap()
    }

    #[test]
    fn raw_layout_lists_every_field() {
        let format = FormatResolver::builtin().resolve(task::KIND, "raw", false);
        let out = render_tasks(format.as_str(), true, &[sample_task()]);
        assert_eq!(
            out,
            "id: x1y2z3a4b5c6\nname: web.1\nimage: nginx:1.25\nnode: node-a\n\
             desired_state: Running\ncurrent_state: Running 2 minutes ago\n\
             error: \nports: *:8080->80/tcp\n\n"
        );
    }

    #[test]
    fn untruncated_output_keeps_full_values() {
        let mut t = sample_task();
        t.status.err = "task: non-zero exit (137): container killed".to_string();
        let out = render_tasks("{{.ID}}|{{.Image}}|{{.Error}}", false, &[t]);
        assert_eq!(
            out,
            "x1y2z3a4b5c6d7e8f9g0|nginx:1.25@sha256:abcdef|\"task: non-zero exit (137): container killed\"\n"
        );
    }

    #[test]
    fn table_with_older_attempts_indents_names() {
        let mut older = sample_task();
        older.id = TaskId::new("older");
        older.desired_state = TaskState::Shutdown;
        let out = render_tasks(
            "table {{.Name}}\t{{.DesiredState}}",
            true,
            &[sample_task(), older],
        );
        assert_eq!(
            out,
            "NAME        DESIRED STATE\nweb.1       Running\n \\_ web.1   Shutdown\n"
        );
    }

    #[test]
    fn quiet_shows_full_task_ids() {
        let format = FormatResolver::builtin().resolve(task::KIND, "", true);
        let names = TaskNames::new();
        let mut ctx = RenderContext::new(Vec::new(), format)
            .truncate(true)
            .quiet(true);
        task::format_write(&mut ctx, &[sample_task()], &names, now()).unwrap();
        assert_eq!(
            String::from_utf8(ctx.into_inner()).unwrap(),
            "x1y2z3a4b5c6d7e8f9g0\n"
        );
    }
}
