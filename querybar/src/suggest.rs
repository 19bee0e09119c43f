//! Filter-key and value suggestions.
//!
//! Providers sit at an I/O boundary and may fail. The editor never sees
//! those failures: [`tag_values_or_empty`] and [`filter_keys_or_empty`]
//! log them and hand back an empty list.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::query::Operator;
use crate::Result;

/// Kind of thing a filter key refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Field,
    Tag,
    Measurement,
    Function,
    Breakdowns,
}

/// Type of the values a filter key takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Date,
    Duration,
    Size,
    Percentage,
}

/// A filter key offered in the key dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterKeyDescriptor {
    pub key: String,
    pub name: String,
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "known_operators"
    )]
    pub allowed_operators: Option<Vec<Operator>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

/// Read an operator list, skipping entries this build does not know.
fn known_operators<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<Operator>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(names) = Option::<Vec<String>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let operators = names
        .iter()
        .filter_map(|name| match name.parse::<Operator>() {
            Ok(op) => Some(op),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unknown operator");
                None
            }
        })
        .collect();
    Ok(Some(operators))
}

impl FilterKeyDescriptor {
    pub fn new(key: impl Into<String>, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            kind,
            value_type: None,
            allowed_operators: None,
            description: None,
            deprecated: false,
        }
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn with_operators(mut self, operators: &[Operator]) -> Self {
        self.allowed_operators = Some(operators.to_vec());
        self
    }

    /// Operators the operator dropdown should offer for this key.
    pub fn operators(&self) -> Vec<Operator> {
        match &self.allowed_operators {
            Some(ops) => ops.clone(),
            None => Operator::ALL.to_vec(),
        }
    }

    /// Case-insensitive substring match on key or display name.
    pub fn matches(&self, search: &str) -> bool {
        let needle = search.to_lowercase();
        self.key.to_lowercase().contains(&needle) || self.name.to_lowercase().contains(&needle)
    }
}

/// Source of dropdown suggestions.
pub trait SuggestionProvider: Send + Sync {
    /// Known values for a key, optionally narrowed by typed text.
    fn tag_values(&self, key: &str, query: Option<&str>) -> Result<Vec<String>>;

    /// All filter keys the user may pick from.
    fn filter_key_suggestions(&self) -> Result<Vec<FilterKeyDescriptor>>;
}

/// Values for `key`, or an empty list if the provider fails.
pub fn tag_values_or_empty(
    provider: &dyn SuggestionProvider,
    key: &str,
    query: Option<&str>,
) -> Vec<String> {
    provider.tag_values(key, query).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "Failed to fetch tag values");
        Vec::new()
    })
}

/// Filter keys, or an empty list if the provider fails.
pub fn filter_keys_or_empty(provider: &dyn SuggestionProvider) -> Vec<FilterKeyDescriptor> {
    provider.filter_key_suggestions().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to fetch filter keys");
        Vec::new()
    })
}

/// Keys whose key or name contains `search`, in catalogue order.
pub fn filter_keys_matching<'a>(
    keys: &'a [FilterKeyDescriptor],
    search: &str,
) -> Vec<&'a FilterKeyDescriptor> {
    keys.iter().filter(|k| k.matches(search)).collect()
}

/// Values containing `search`, case-insensitive.
pub fn values_matching(values: &[String], search: &str) -> Vec<String> {
    let needle = search.to_lowercase();
    values
        .iter()
        .filter(|v| v.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// A labelled group in the filter-key dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySection {
    pub key: &'static str,
    pub label: &'static str,
    pub items: Vec<FilterKeyDescriptor>,
}

/// Dropdown sections: recently used keys, then every matching key.
///
/// Recent keys only appear while they are still in `keys`.
pub fn key_sections(
    keys: &[FilterKeyDescriptor],
    recent: &[FilterKeyDescriptor],
    search: &str,
) -> Vec<KeySection> {
    let recent_items = recent
        .iter()
        .filter(|r| r.matches(search) && keys.iter().any(|k| k.key == r.key))
        .cloned()
        .collect();

    let all_items = filter_keys_matching(keys, search)
        .into_iter()
        .cloned()
        .collect();

    vec![
        KeySection {
            key: "recent",
            label: "Recent",
            items: recent_items,
        },
        KeySection {
            key: "all",
            label: "All",
            items: all_items,
        },
    ]
}

/// In-memory provider backed by a fixed catalogue.
#[derive(Debug, Clone, Default)]
pub struct StaticSuggestions {
    keys: Vec<FilterKeyDescriptor>,
    values: HashMap<String, Vec<String>>,
}

impl StaticSuggestions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter key with its known values.
    pub fn with_key(mut self, descriptor: FilterKeyDescriptor, values: &[&str]) -> Self {
        self.values.insert(
            descriptor.key.clone(),
            values.iter().map(|v| v.to_string()).collect(),
        );
        self.keys.push(descriptor);
        self
    }

    /// Sample catalogue of common issue-search keys.
    pub fn sample() -> Self {
        use FieldKind::{Field, Measurement, Tag};
        use Operator::{Contains, Eq, Gt, Gte, Lt, Lte, NotEq, StartsWith};

        Self::new()
            .with_key(
                FilterKeyDescriptor::new("browser.name", "Browser Name", Field)
                    .with_value_type(ValueType::String)
                    .with_operators(&[Eq, NotEq, Contains, StartsWith]),
                &["Chrome", "Firefox", "Safari", "Edge"],
            )
            .with_key(
                FilterKeyDescriptor::new("user.email", "User Email", Field)
                    .with_value_type(ValueType::String)
                    .with_operators(&[Eq, NotEq, Contains]),
                &["user1@example.com", "user2@example.com", "admin@example.com"],
            )
            .with_key(
                FilterKeyDescriptor::new("environment", "Environment", Tag)
                    .with_value_type(ValueType::String)
                    .with_operators(&[Eq, NotEq]),
                &["production", "staging", "development"],
            )
            .with_key(
                FilterKeyDescriptor::new("release", "Release", Tag)
                    .with_value_type(ValueType::String)
                    .with_operators(&[Eq, NotEq, Contains]),
                &["1.0.0", "1.1.0", "1.2.0", "2.0.0"],
            )
            .with_key(
                FilterKeyDescriptor::new("level", "Level", Field)
                    .with_value_type(ValueType::String)
                    .with_operators(&[Eq, NotEq]),
                &["error", "warning", "info", "debug"],
            )
            .with_key(
                FilterKeyDescriptor::new("status", "Status", Field)
                    .with_value_type(ValueType::String)
                    .with_operators(&[Eq, NotEq]),
                &["resolved", "unresolved", "ignored"],
            )
            .with_key(
                FilterKeyDescriptor::new("count", "Count", Measurement)
                    .with_value_type(ValueType::Number)
                    .with_operators(&[Gt, Lt, Gte, Lte, Eq, NotEq]),
                &[],
            )
            .with_key(
                FilterKeyDescriptor::new("timestamp", "Timestamp", Field)
                    .with_value_type(ValueType::Date)
                    .with_operators(&[Gt, Lt, Gte, Lte, Eq]),
                &[],
            )
    }
}

impl SuggestionProvider for StaticSuggestions {
    fn tag_values(&self, key: &str, query: Option<&str>) -> Result<Vec<String>> {
        let values = self.values.get(key).map(Vec::as_slice).unwrap_or_default();
        Ok(match query {
            Some(q) if !q.is_empty() => values_matching(values, q),
            _ => values.to_vec(),
        })
    }

    fn filter_key_suggestions(&self) -> Result<Vec<FilterKeyDescriptor>> {
        Ok(self.keys.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct FailingProvider;

    impl SuggestionProvider for FailingProvider {
        fn tag_values(&self, _key: &str, _query: Option<&str>) -> Result<Vec<String>> {
            Err(Error::Suggestion("HTTP error! status: 500".to_string()))
        }

        fn filter_key_suggestions(&self) -> Result<Vec<FilterKeyDescriptor>> {
            Err(Error::Suggestion("timeout".to_string()))
        }
    }

    fn key(k: &str, name: &str) -> FilterKeyDescriptor {
        FilterKeyDescriptor::new(k, name, FieldKind::Field)
    }

    #[test]
    fn test_static_values_filtered_by_query() {
        let provider = StaticSuggestions::sample();
        assert_eq!(
            provider.tag_values("browser.name", Some("fi")).unwrap(),
            vec!["Firefox"]
        );
        assert_eq!(provider.tag_values("browser.name", None).unwrap().len(), 4);
        assert!(provider.tag_values("nope", None).unwrap().is_empty());
    }

    #[test]
    fn test_failures_become_empty_lists() {
        assert!(tag_values_or_empty(&FailingProvider, "status", None).is_empty());
        assert!(filter_keys_or_empty(&FailingProvider).is_empty());
    }

    #[test]
    fn test_filter_keys_matching_key_or_name() {
        let keys = vec![key("browser.name", "Browser Name"), key("level", "Severity")];
        let found: Vec<&str> = filter_keys_matching(&keys, "SEV")
            .iter()
            .map(|k| k.key.as_str())
            .collect();
        assert_eq!(found, vec!["level"]);
        assert_eq!(filter_keys_matching(&keys, "").len(), 2);
    }

    #[test]
    fn test_key_sections_hide_stale_recent_keys() {
        let keys = vec![key("a", "Alpha"), key("b", "Beta")];
        let recent = vec![key("gone", "Gone"), key("b", "Beta")];

        let sections = key_sections(&keys, &recent, "");
        assert_eq!(sections[0].label, "Recent");
        assert_eq!(sections[0].items, vec![key("b", "Beta")]);
        assert_eq!(sections[1].items.len(), 2);

        let sections = key_sections(&keys, &recent, "alp");
        assert!(sections[0].items.is_empty());
        assert_eq!(sections[1].items, vec![key("a", "Alpha")]);
    }

    #[test]
    fn test_descriptor_operators_default_to_all() {
        assert_eq!(key("a", "A").operators().len(), Operator::ALL.len());
        let numeric = key("n", "N").with_operators(&[Operator::Gt]);
        assert_eq!(numeric.operators(), vec![Operator::Gt]);
    }

    #[test]
    fn test_descriptor_json() {
        let json = r#"{"key":"count","name":"Count","kind":"measurement","value_type":"number","allowed_operators":[">","<="]}"#;
        let d: FilterKeyDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.kind, FieldKind::Measurement);
        assert_eq!(d.value_type, Some(ValueType::Number));
        assert_eq!(d.allowed_operators, Some(vec![Operator::Gt, Operator::Lte]));
        assert!(!d.deprecated);
    }

    #[test]
    fn test_descriptor_json_skips_unknown_operators() {
        let json = r#"{"key":"count","name":"Count","kind":"measurement","allowed_operators":["=","bogus",">"]}"#;
        let d: FilterKeyDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.key, "count");
        assert_eq!(d.allowed_operators, Some(vec![Operator::Eq, Operator::Gt]));

        let json = r#"{"key":"a","name":"A","kind":"tag","allowed_operators":null}"#;
        let d: FilterKeyDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d.allowed_operators, None);
    }
}
