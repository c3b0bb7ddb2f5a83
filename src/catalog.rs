//! The schema-field catalog and resource registry.
//!
//! Every wire field name used by the provider is declared exactly once in
//! [`field`], and every resource kind is a [`ResourceDef`] entry in
//! [`REGISTRY`] pointing at a table of [`FieldDef`]s. Adding a new check
//! type means adding one entry here; no per-resource code is duplicated.
//!
//! A [`FieldDef`] carries the field's semantic type, requiredness, default,
//! validation rule, and its wire encoding quirks (the service stores
//! booleans as `0`/`1` integers and chokes on single quotes in names and
//! descriptions).

use serde_json::Value;

/// Wire field names, declared once and shared by every resource kind.
pub mod field {
    /// Remote numeric identifier; stringified it becomes the durable handle.
    pub const ID: &str = "id";
    /// Human-readable name.
    pub const NAME: &str = "name";
    /// Free-form description.
    pub const DESCRIPTION: &str = "description";
    /// Enabled flag, stored as 0/1 on the wire.
    pub const ENABLED: &str = "enabled";
    /// Shared-with-other-groups flag, stored as 0/1 on the wire.
    pub const SHARED: &str = "shared";
    /// User group identifier.
    pub const GROUP_ID: &str = "group_id";

    /// Login name of a user.
    pub const USERNAME: &str = "username";
    /// E-mail address of a user.
    pub const EMAIL: &str = "email";
    /// Password or secret token.
    pub const PASSWORD: &str = "password";
    /// User identifier in a role binding.
    pub const USER_ID: &str = "user_id";
    /// Role identifier in a role binding.
    pub const ROLE_ID: &str = "role_id";

    /// Hostname of a managed server.
    pub const HOSTNAME: &str = "hostname";
    /// IP address or domain name.
    pub const IP: &str = "ip";
    /// TCP port.
    pub const PORT: &str = "port";

    /// Alert receiver kind (telegram, slack, mm, pd).
    pub const RECEIVER: &str = "receiver";
    /// Messenger API token.
    pub const TOKEN: &str = "token";
    /// Messenger channel name or identifier.
    pub const CHANNEL: &str = "channel";

    /// SSH private key material.
    pub const KEY: &str = "key";

    /// Server an agent is installed on.
    pub const SERVER_ID: &str = "server_id";
    /// Region an agent belongs to.
    pub const REGION_ID: &str = "region_id";
    /// Country a region belongs to.
    pub const COUNTRY_ID: &str = "country_id";

    /// Check group the check belongs to.
    pub const CHECK_GROUP: &str = "check_group";
    /// Where the check runs: all, country, region or agent.
    pub const PLACE: &str = "place";
    /// Entity identifiers the check is placed on.
    pub const ENTITIES: &str = "entities";
    /// Seconds between check runs.
    pub const INTERVAL: &str = "interval";
    /// Answer timeout in seconds.
    pub const CHECK_TIMEOUT: &str = "check_timeout";
    /// Telegram channel for alerts.
    pub const TELEGRAM_CHANNEL_ID: &str = "telegram_channel_id";
    /// Slack channel for alerts.
    pub const SLACK_CHANNEL_ID: &str = "slack_channel_id";
    /// Mattermost channel for alerts.
    pub const MM_CHANNEL_ID: &str = "mm_channel_id";
    /// PagerDuty channel for alerts.
    pub const PD_CHANNEL_ID: &str = "pd_channel_id";
    /// Retries before a check is marked down.
    pub const RETRIES: &str = "retries";
    /// Runbook URL attached to alerts.
    pub const RUNBOOK: &str = "runbook";

    /// ICMP packet size for ping checks.
    pub const PACKET_SIZE: &str = "packet_size";
    /// DNS server that resolves the query.
    pub const RESOLVER: &str = "resolver";
    /// DNS record type.
    pub const RECORD_TYPE: &str = "record_type";
    /// URL checked by HTTP checks.
    pub const URL: &str = "url";
    /// HTTP method used by HTTP checks.
    pub const HTTP_METHOD: &str = "http_method";
    /// Ignore TLS/SSL errors flag, stored as 0/1 on the wire.
    pub const IGNORE_SSL_ERROR: &str = "ignore_ssl_error";
    /// Expected HTTP status code.
    pub const ACCEPTED_STATUS_CODES: &str = "accepted_status_codes";
    /// Expected response body substring.
    pub const BODY: &str = "body";
    /// JSON body sent with the check request.
    pub const BODY_REQUEST: &str = "body_req";
    /// JSON headers sent with the check request.
    pub const HEADER_REQUEST: &str = "header_req";
    /// RabbitMQ virtual host.
    pub const VHOST: &str = "vhost";

    /// Flag set on update when a network binding changed.
    pub const RECONFIGURE: &str = "reconfigure";
}

/// The semantic type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A string value.
    Str,
    /// A 64-bit integer.
    Int,
    /// A boolean.
    Bool,
    /// A list of integers.
    IntList,
}

/// Declarative validation rule attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Any value of the field's type.
    Any,
    /// The string must be one of the listed values.
    OneOf(&'static [&'static str]),
    /// The integer must be a valid TCP/UDP port (1-65535).
    PortNumber,
    /// The integer must be at least the given value.
    IntAtLeast(i64),
    /// The integer must lie within the inclusive range.
    IntBetween(i64, i64),
    /// The string must parse as an http/https URL.
    HttpUrl,
    /// The string must parse as JSON.
    JsonString,
}

/// Default applied when the configuration omits an optional field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    /// Integer default.
    Int(i64),
    /// String default.
    Str(&'static str),
    /// Boolean default.
    Bool(bool),
}

impl DefaultValue {
    /// Render the default as a JSON value.
    pub fn to_value(self) -> Value {
        match self {
            Self::Int(n) => Value::from(n),
            Self::Str(s) => Value::from(s),
            Self::Bool(b) => Value::from(b),
        }
    }
}

/// A single schema field: name, type, constraints and wire quirks.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Wire name of the field.
    pub name: &'static str,
    /// Semantic type.
    pub kind: FieldKind,
    /// Whether configuration must supply the field.
    pub required: bool,
    /// Whether the value must be hidden in logs and UI.
    pub sensitive: bool,
    /// The wire stores this boolean as a 0/1 integer.
    pub bool_as_int: bool,
    /// Single quotes are stripped before sending and after reading.
    pub strip_quotes: bool,
    /// Default used when the configuration omits the field.
    pub default: Option<DefaultValue>,
    /// Validation rule.
    pub rule: Rule,
}

impl FieldDef {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            sensitive: false,
            bool_as_int: false,
            strip_quotes: false,
            default: None,
            rule: Rule::Any,
        }
    }

    /// An optional string field.
    pub const fn str(name: &'static str) -> Self {
        Self::new(name, FieldKind::Str)
    }

    /// An optional integer field.
    pub const fn int(name: &'static str) -> Self {
        Self::new(name, FieldKind::Int)
    }

    /// An optional boolean flag encoded as 0/1 on the wire.
    pub const fn flag(name: &'static str) -> Self {
        let mut def = Self::new(name, FieldKind::Bool);
        def.bool_as_int = true;
        def
    }

    /// An optional list-of-integers field.
    pub const fn int_list(name: &'static str) -> Self {
        Self::new(name, FieldKind::IntList)
    }

    /// Mark the field required.
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the field sensitive.
    pub const fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Strip single quotes on the way in and out.
    pub const fn stripped(mut self) -> Self {
        self.strip_quotes = true;
        self
    }

    /// Attach a validation rule.
    pub const fn rule(mut self, rule: Rule) -> Self {
        self.rule = rule;
        self
    }

    /// Attach a default value.
    pub const fn default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }
}

/// A resource kind: its type name, API path, and field tables.
///
/// `base` holds the field block shared by every check kind; standalone
/// resources leave it empty. [`ResourceDef::fields`] iterates both.
#[derive(Debug, Clone, Copy)]
pub struct ResourceDef {
    /// Terraform-facing type name, e.g. `rmon_check_tcp`.
    pub type_name: &'static str,
    /// URL path relative to the base URL, without the trailing id.
    pub path: &'static str,
    /// Shared field block (the common check fields), possibly empty.
    pub base: &'static [FieldDef],
    /// Fields specific to this kind.
    pub own: &'static [FieldDef],
}

impl ResourceDef {
    /// Iterate all fields of the resource, shared block first.
    pub fn fields(&self) -> impl Iterator<Item = &'static FieldDef> {
        self.base.iter().chain(self.own.iter())
    }

    /// Look up a field definition by wire name.
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields().find(|f| f.name == name)
    }

    /// Whether this kind carries the given field.
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

/// Places a check can run.
pub const PLACES: &[&str] = &["all", "country", "region", "agent"];

/// DNS record types the service accepts.
pub const RECORD_TYPES: &[&str] = &[
    "a", "aaa", "caa", "cname", "mx", "ns", "ptr", "sao", "src", "txt",
];

/// HTTP methods the service accepts for HTTP checks.
pub const HTTP_METHODS: &[&str] = &["get", "post", "put", "delete", "options", "head"];

/// Alert receiver kinds.
pub const RECEIVERS: &[&str] = &["telegram", "slack", "mm", "pd"];

/// Field block shared by every check kind.
const CHECK_COMMON: &[FieldDef] = &[
    FieldDef::str(field::NAME).required().stripped(),
    FieldDef::str(field::DESCRIPTION).stripped(),
    FieldDef::flag(field::ENABLED),
    FieldDef::str(field::CHECK_GROUP),
    FieldDef::str(field::PLACE).required().rule(Rule::OneOf(PLACES)),
    FieldDef::int_list(field::ENTITIES).required(),
    FieldDef::int(field::INTERVAL),
    FieldDef::int(field::CHECK_TIMEOUT),
    FieldDef::int(field::TELEGRAM_CHANNEL_ID),
    FieldDef::int(field::SLACK_CHANNEL_ID),
    FieldDef::int(field::MM_CHANNEL_ID),
    FieldDef::int(field::PD_CHANNEL_ID),
];

const GROUP: ResourceDef = ResourceDef {
    type_name: "rmon_group",
    path: "/api/v1.0/group",
    base: &[],
    own: &[
        FieldDef::str(field::NAME).required(),
        FieldDef::str(field::DESCRIPTION),
    ],
};

const USER: ResourceDef = ResourceDef {
    type_name: "rmon_user",
    path: "/api/v1.0/user",
    base: &[],
    own: &[
        FieldDef::str(field::USERNAME).required(),
        FieldDef::str(field::EMAIL),
        FieldDef::str(field::PASSWORD).required().sensitive(),
        FieldDef::flag(field::ENABLED),
        FieldDef::int(field::GROUP_ID),
    ],
};

const USER_ROLE_BINDING: ResourceDef = ResourceDef {
    type_name: "rmon_user_role_binding",
    path: "/api/v1.0/user/role",
    base: &[],
    own: &[
        FieldDef::int(field::USER_ID).required(),
        FieldDef::int(field::ROLE_ID).required(),
        FieldDef::int(field::GROUP_ID),
    ],
};

const SERVER: ResourceDef = ResourceDef {
    type_name: "rmon_server",
    path: "/api/v1.0/server",
    base: &[],
    own: &[
        FieldDef::str(field::HOSTNAME).required(),
        FieldDef::str(field::IP).required(),
        FieldDef::int(field::PORT).required().rule(Rule::PortNumber),
        FieldDef::str(field::DESCRIPTION),
        FieldDef::flag(field::ENABLED),
        FieldDef::int(field::GROUP_ID),
    ],
};

const CHANNEL: ResourceDef = ResourceDef {
    type_name: "rmon_channel",
    path: "/api/v1.0/channel",
    base: &[],
    own: &[
        FieldDef::str(field::RECEIVER).required().rule(Rule::OneOf(RECEIVERS)),
        FieldDef::str(field::TOKEN).required().sensitive(),
        FieldDef::str(field::CHANNEL).required(),
        FieldDef::int(field::GROUP_ID),
    ],
};

const SSH_CREDENTIAL: ResourceDef = ResourceDef {
    type_name: "rmon_ssh_credential",
    path: "/api/v1.0/ssh-credential",
    base: &[],
    own: &[
        FieldDef::str(field::NAME).required(),
        FieldDef::str(field::USERNAME).required(),
        FieldDef::str(field::PASSWORD).sensitive(),
        FieldDef::str(field::KEY).sensitive(),
        FieldDef::int(field::GROUP_ID),
        FieldDef::flag(field::SHARED),
    ],
};

const AGENT: ResourceDef = ResourceDef {
    type_name: "rmon_agent",
    path: "/api/v1.0/rmon/agent",
    base: &[],
    own: &[
        FieldDef::str(field::NAME).required().stripped(),
        FieldDef::str(field::DESCRIPTION).stripped(),
        FieldDef::flag(field::ENABLED),
        FieldDef::flag(field::SHARED),
        FieldDef::int(field::SERVER_ID).required(),
        FieldDef::int(field::PORT).required().rule(Rule::PortNumber),
        FieldDef::int(field::REGION_ID),
    ],
};

const REGION: ResourceDef = ResourceDef {
    type_name: "rmon_region",
    path: "/api/v1.0/rmon/region",
    base: &[],
    own: &[
        FieldDef::str(field::NAME).required().stripped(),
        FieldDef::str(field::DESCRIPTION).stripped(),
        FieldDef::flag(field::ENABLED),
        FieldDef::flag(field::SHARED),
        FieldDef::int(field::COUNTRY_ID),
        FieldDef::int(field::GROUP_ID),
    ],
};

const COUNTRY: ResourceDef = ResourceDef {
    type_name: "rmon_country",
    path: "/api/v1.0/rmon/country",
    base: &[],
    own: &[
        FieldDef::str(field::NAME).required().stripped(),
        FieldDef::str(field::DESCRIPTION).stripped(),
        FieldDef::flag(field::ENABLED),
        FieldDef::flag(field::SHARED),
    ],
};

const CHECK_PING: ResourceDef = ResourceDef {
    type_name: "rmon_check_ping",
    path: "/api/v1.0/rmon/check/ping",
    base: CHECK_COMMON,
    own: &[
        FieldDef::str(field::IP),
        FieldDef::int(field::PACKET_SIZE).rule(Rule::IntAtLeast(17)),
    ],
};

const CHECK_TCP: ResourceDef = ResourceDef {
    type_name: "rmon_check_tcp",
    path: "/api/v1.0/rmon/check/tcp",
    base: CHECK_COMMON,
    own: &[
        FieldDef::str(field::IP).required(),
        FieldDef::int(field::PORT).required().rule(Rule::PortNumber),
        FieldDef::int(field::RETRIES)
            .rule(Rule::IntAtLeast(0))
            .default(DefaultValue::Int(3)),
        FieldDef::str(field::RUNBOOK),
    ],
};

const CHECK_DNS: ResourceDef = ResourceDef {
    type_name: "rmon_check_dns",
    path: "/api/v1.0/rmon/check/dns",
    base: CHECK_COMMON,
    own: &[
        FieldDef::str(field::IP),
        FieldDef::int(field::PORT).rule(Rule::PortNumber),
        FieldDef::str(field::RESOLVER),
        FieldDef::str(field::RECORD_TYPE).rule(Rule::OneOf(RECORD_TYPES)),
        FieldDef::int(field::RETRIES)
            .rule(Rule::IntAtLeast(0))
            .default(DefaultValue::Int(3)),
        FieldDef::str(field::RUNBOOK),
    ],
};

const CHECK_HTTP: ResourceDef = ResourceDef {
    type_name: "rmon_check_http",
    path: "/api/v1.0/rmon/check/http",
    base: CHECK_COMMON,
    own: &[
        FieldDef::str(field::URL).required().rule(Rule::HttpUrl),
        FieldDef::str(field::HTTP_METHOD)
            .required()
            .rule(Rule::OneOf(HTTP_METHODS)),
        FieldDef::flag(field::IGNORE_SSL_ERROR),
        FieldDef::int(field::ACCEPTED_STATUS_CODES).rule(Rule::IntBetween(100, 599)),
        FieldDef::str(field::BODY),
        FieldDef::str(field::BODY_REQUEST).rule(Rule::JsonString),
        FieldDef::str(field::HEADER_REQUEST).rule(Rule::JsonString),
    ],
};

const CHECK_SMTP: ResourceDef = ResourceDef {
    type_name: "rmon_check_smtp",
    path: "/api/v1.0/rmon/check/smtp",
    base: CHECK_COMMON,
    own: &[
        FieldDef::str(field::IP).required(),
        FieldDef::int(field::PORT)
            .rule(Rule::PortNumber)
            .default(DefaultValue::Int(587)),
        FieldDef::flag(field::IGNORE_SSL_ERROR),
        FieldDef::str(field::USERNAME).required(),
        FieldDef::str(field::PASSWORD).required().sensitive(),
    ],
};

const CHECK_RABBITMQ: ResourceDef = ResourceDef {
    type_name: "rmon_check_rabbitmq",
    path: "/api/v1.0/rmon/check/rabbitmq",
    base: CHECK_COMMON,
    own: &[
        FieldDef::str(field::IP).required(),
        FieldDef::int(field::PORT).rule(Rule::PortNumber),
        FieldDef::str(field::USERNAME).required(),
        FieldDef::str(field::PASSWORD).required().sensitive(),
        FieldDef::str(field::VHOST).required(),
        FieldDef::int(field::RETRIES)
            .rule(Rule::IntAtLeast(0))
            .default(DefaultValue::Int(3)),
        FieldDef::str(field::RUNBOOK),
    ],
};

const CHECK_GROUP: ResourceDef = ResourceDef {
    type_name: "rmon_check_group",
    path: "/api/v1.0/rmon/check-group",
    base: &[],
    own: &[
        FieldDef::str(field::NAME).required(),
        FieldDef::int(field::GROUP_ID),
    ],
};

/// Every resource kind the provider manages.
pub const REGISTRY: &[ResourceDef] = &[
    GROUP,
    USER,
    USER_ROLE_BINDING,
    SERVER,
    CHANNEL,
    SSH_CREDENTIAL,
    AGENT,
    REGION,
    COUNTRY,
    CHECK_PING,
    CHECK_TCP,
    CHECK_DNS,
    CHECK_HTTP,
    CHECK_SMTP,
    CHECK_RABBITMQ,
    CHECK_GROUP,
];

/// Look up a resource kind by its type name.
pub fn lookup(type_name: &str) -> Option<&'static ResourceDef> {
    REGISTRY.iter().find(|def| def.type_name == type_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_covers_every_kind() {
        assert_eq!(REGISTRY.len(), 16);
        assert!(lookup("rmon_check_tcp").is_some());
        assert!(lookup("rmon_check_icmp").is_none());
    }

    #[test]
    fn test_type_names_and_paths_are_unique_and_nonempty() {
        let mut names = HashSet::new();
        let mut paths = HashSet::new();
        for def in REGISTRY {
            assert!(!def.type_name.is_empty());
            assert!(def.path.starts_with("/api/v1.0/"), "{}", def.type_name);
            assert!(names.insert(def.type_name), "duplicate {}", def.type_name);
            assert!(paths.insert(def.path), "duplicate {}", def.path);
        }
    }

    #[test]
    fn test_field_names_unique_within_each_kind() {
        for def in REGISTRY {
            let mut seen = HashSet::new();
            for f in def.fields() {
                assert!(
                    seen.insert(f.name),
                    "{} declares {} twice",
                    def.type_name,
                    f.name
                );
                assert_ne!(f.name, field::ID, "id is computed, never declared");
            }
        }
    }

    #[test]
    fn test_checks_share_the_common_block() {
        for def in REGISTRY {
            if def.type_name.starts_with("rmon_check_") && def.type_name != "rmon_check_group" {
                assert!(def.has_field(field::PLACE), "{}", def.type_name);
                assert!(def.has_field(field::ENTITIES), "{}", def.type_name);
                assert!(def.has_field(field::CHECK_TIMEOUT), "{}", def.type_name);
            }
        }
    }

    #[test]
    fn test_bool_fields_encode_as_int() {
        for def in REGISTRY {
            for f in def.fields() {
                if f.kind == FieldKind::Bool {
                    assert!(f.bool_as_int, "{}.{}", def.type_name, f.name);
                }
            }
        }
    }

    #[test]
    fn test_sensitive_fields_marked() {
        let smtp = lookup("rmon_check_smtp").unwrap();
        assert!(smtp.field(field::PASSWORD).unwrap().sensitive);
        let channel = lookup("rmon_channel").unwrap();
        assert!(channel.field(field::TOKEN).unwrap().sensitive);
    }

    #[test]
    fn test_defaults() {
        let tcp = lookup("rmon_check_tcp").unwrap();
        assert_eq!(
            tcp.field(field::RETRIES).unwrap().default,
            Some(DefaultValue::Int(3))
        );
        let smtp = lookup("rmon_check_smtp").unwrap();
        assert_eq!(
            smtp.field(field::PORT).unwrap().default,
            Some(DefaultValue::Int(587))
        );
    }
}
