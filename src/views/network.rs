// ABOUTME: Entity view for networks: ID, name, driver, scope, IP flags, labels, creation time.
// ABOUTME: Registers the network table/raw/quiet defaults with the format resolver.

use crate::models::Network;
use crate::render::text::{format_timestamp, zero_time};
use crate::render::{EntityView, Field, KindFormats, RenderContext, RenderError};
use crate::template::Value;
use std::io::Write;

pub const KIND: &str = "network";

const DEFAULT_TABLE_FORMAT: &str = "table {{.ID}}\t{{.Name}}\t{{.Driver}}\t{{.Scope}}";
const RAW_FORMAT: &str =
    "network_id: {{.ID}}\\nname: {{.Name}}\\ndriver: {{.Driver}}\\nscope: {{.Scope}}\\n";
const RAW_QUIET_FORMAT: &str = "network_id: {{.ID}}";

const NETWORK_ID_HEADER: &str = "NETWORK ID";
const IPV4_HEADER: &str = "IPV4";
const IPV6_HEADER: &str = "IPV6";
const INTERNAL_HEADER: &str = "INTERNAL";

pub fn formats() -> KindFormats {
    KindFormats {
        table: DEFAULT_TABLE_FORMAT.to_string(),
        raw: RAW_FORMAT.to_string(),
        raw_quiet: RAW_QUIET_FORMAT.to_string(),
        ..KindFormats::default()
    }
}

/// Write `networks` using the context's format.
pub fn format_write<W: Write>(
    ctx: &mut RenderContext<W>,
    networks: &[Network],
) -> Result<(), RenderError> {
    let trunc = ctx.trunc();
    ctx.write(networks.iter().map(|n| NetworkView::new(n, trunc)))
}

pub struct NetworkView<'a> {
    network: &'a Network,
    trunc: bool,
}

impl<'a> NetworkView<'a> {
    pub fn new(network: &'a Network, trunc: bool) -> Self {
        Self { network, trunc }
    }

    fn id(&self) -> Value {
        if self.trunc {
            Value::from(self.network.id.short())
        } else {
            Value::from(self.network.id.as_str())
        }
    }

    fn name(&self) -> Value {
        Value::from(self.network.name.as_str())
    }

    fn driver(&self) -> Value {
        Value::from(self.network.driver.as_str())
    }

    fn scope(&self) -> Value {
        Value::from(self.network.scope.as_str())
    }

    fn ipv4(&self) -> Value {
        Value::Bool(self.network.enable_ipv4)
    }

    fn ipv6(&self) -> Value {
        Value::Bool(self.network.enable_ipv6)
    }

    fn internal(&self) -> Value {
        Value::Bool(self.network.internal)
    }

    fn labels(&self) -> Value {
        Value::Str(self.network.labels.to_string())
    }

    fn created_at(&self) -> Value {
        Value::Str(format_timestamp(
            self.network.created.unwrap_or_else(zero_time),
        ))
    }
}

impl EntityView for NetworkView<'_> {
    const KIND: &'static str = KIND;

    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::new("ID", NETWORK_ID_HEADER, Self::id),
            Field::new("Name", "NAME", Self::name),
            Field::new("Driver", "DRIVER", Self::driver),
            Field::new("Scope", "SCOPE", Self::scope),
            Field::new("IPv4", IPV4_HEADER, Self::ipv4),
            Field::new("IPv6", IPV6_HEADER, Self::ipv6),
            Field::new("Internal", INTERNAL_HEADER, Self::internal),
            Field::new("Labels", "LABELS", Self::labels),
            Field::new("CreatedAt", "CREATED AT", Self::created_at),
        ]
    }
}
