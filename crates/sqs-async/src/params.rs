//! Request options and query-string canonicalization.
//!
//! Operations collect their arguments in a [`RequestOptions`] value. Right
//! before signing, the options are flattened over the protocol defaults into
//! a single name/value map, which is then rendered as the canonical query
//! string:
//!
//! 1. compound values expand into ordinally indexed parameters
//!    (`AttributeName.1`, `AWSAccountId.2`, ...);
//! 2. snake_case keys are normalized to the wire's CamelCase;
//! 3. caller values are merged over the defaults, last write wins;
//! 4. entries are sorted byte-wise by name;
//! 5. names and values are percent-encoded, leaving only `A-Z a-z 0-9 - _ . ~`
//!    untouched, and joined as `name=value&...`.

use crate::response::{Message, Queue};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use std::collections::BTreeMap;
use tracing::warn;

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;

/// Characters that pass through the query encoding unchanged.
///
/// Everything outside the unreserved set, including space, `+`, `*` and `/`,
/// is percent-encoded with uppercase hex digits.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Protocol parameters that take part in every signature.
const PROTECTED_PARAMETERS: [&str; 5] = [
    "Version",
    "SignatureVersion",
    "SignatureMethod",
    "AWSAccessKeyId",
    "Expires",
];

/// Percent-encode a parameter name or value for the query string.
pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_ENCODE_SET).to_string()
}

/// Normalize an option key to the wire's casing convention.
///
/// `queue_name_prefix` becomes `QueueNamePrefix`. Keys that already contain
/// an uppercase letter are taken as wire names and returned unchanged.
pub fn wire_name(key: &str) -> String {
    if key.chars().any(|c| c.is_ascii_uppercase()) {
        return key.to_string();
    }

    key.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// A grant of one action on a queue to one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub label: String,
    pub account_id: String,
    pub action: String,
}

impl Permission {
    pub fn new(
        label: impl Into<String>,
        account_id: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            account_id: account_id.into(),
            action: action.into(),
        }
    }

    /// Expand this grant into the indexed parameters for position `ordinal`.
    ///
    /// `Label` carries no index, so when several grants are expanded the last
    /// one's label wins.
    pub fn to_params(&self, ordinal: usize) -> Vec<(String, String)> {
        vec![
            ("Label".to_string(), self.label.clone()),
            (format!("AWSAccountId.{ordinal}"), self.account_id.clone()),
            (format!("ActionName.{ordinal}"), self.action.clone()),
        ]
    }
}

/// Value of a single request option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// A single parameter
    Text(String),
    /// Expands to `Name.1`, `Name.2`, ...
    List(Vec<String>),
    /// Expands each grant with [`Permission::to_params`]; the option's own
    /// name does not appear on the wire
    Permissions(Vec<Permission>),
}

impl OptionValue {
    fn expand_into(&self, name: &str, out: &mut Vec<(String, String)>) {
        match self {
            Self::Text(value) => out.push((name.to_string(), value.clone())),
            Self::List(values) => {
                for (index, value) in values.iter().enumerate() {
                    out.push((format!("{}.{}", name, index + 1), value.clone()));
                }
            }
            Self::Permissions(grants) => {
                for (index, grant) in grants.iter().enumerate() {
                    out.extend(grant.to_params(index + 1));
                }
            }
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Text(_) => false,
            Self::List(values) => values.is_empty(),
            Self::Permissions(grants) => grants.is_empty(),
        }
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

impl From<Vec<Permission>> for OptionValue {
    fn from(grants: Vec<Permission>) -> Self {
        Self::Permissions(grants)
    }
}

/// Arguments for a single operation.
///
/// Besides the query parameters, the options carry a few out-of-band values
/// that are consumed by the operation or the dispatcher and never reach the
/// query string: the target queue, a host override, a received message and a
/// queue URL filter.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    params: BTreeMap<String, OptionValue>,
    pub(crate) queue: Option<Queue>,
    pub(crate) host: Option<String>,
    pub(crate) message: Option<Message>,
    pub(crate) pattern: Option<Regex>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any key that normalizes to the same wire name.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Target an existing queue; requests go to its URL instead of the region host.
    pub fn queue(mut self, queue: Queue) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Send this request to `host` instead of the configured endpoint.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn queue_name(self, name: impl Into<String>) -> Self {
        self.with("queue_name", name.into())
    }

    /// Only list queues whose name starts with `prefix`.
    pub fn prefix(self, prefix: impl Into<String>) -> Self {
        self.with("queue_name_prefix", prefix.into())
    }

    /// Keep only listed queues whose URL path matches `pattern`.
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn permissions(self, grants: Vec<Permission>) -> Self {
        self.with("permissions", grants)
    }

    /// The received message a `DeleteMessage` call refers to.
    pub fn message(mut self, message: Message) -> Self {
        self.message = Some(message);
        self
    }

    pub fn attribute_names(self, names: Vec<String>) -> Self {
        self.with("attribute_name", names)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        let key = key.into();
        let wire = wire_name(&key);
        self.params.retain(|existing, _| wire_name(existing) != wire);
        self.params.insert(key, value.into());
    }

    /// Set a parameter only when the caller has not supplied it.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        let key = key.into();
        if self.get(&key).is_none() {
            self.params.insert(key, value.into());
        }
    }

    /// Look a parameter up by any key that normalizes to the same wire name.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        let wire = wire_name(key);
        self.params
            .iter()
            .find(|(existing, _)| wire_name(existing) == wire)
            .map(|(_, value)| value)
    }

    /// Whether a parameter is present and carries at least one value.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| !value.is_empty())
    }

    pub(crate) fn params(&self) -> &BTreeMap<String, OptionValue> {
        &self.params
    }
}

/// Flatten `options` over `defaults` into the wire parameter set.
///
/// Compound values are expanded before the merge so their indexed names sort
/// with everything else. A caller value that replaces one of the signed
/// protocol parameters is honored but logged, since the service rejects
/// requests whose protocol parameters it does not expect.
pub fn merge_parameters(
    defaults: &BTreeMap<String, String>,
    options: &BTreeMap<String, OptionValue>,
) -> BTreeMap<String, String> {
    let mut merged = defaults.clone();
    let mut expanded = Vec::new();

    for (key, value) in options {
        value.expand_into(&wire_name(key), &mut expanded);
    }

    for (name, value) in expanded {
        if let Some(default) = defaults.get(&name) {
            if PROTECTED_PARAMETERS.contains(&name.as_str()) && *default != value {
                warn!(
                    parameter = %name,
                    default = %default,
                    value = %value,
                    "Request overrides a signed protocol parameter"
                );
            }
        }
        merged.insert(name, value);
    }

    merged
}

/// Render parameters as the sorted, percent-encoded `name=value&...` string.
pub fn canonical_query_string(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(name, value)| format!("{}={}", encode(name), encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}
