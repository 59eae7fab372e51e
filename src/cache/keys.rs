//! Cache Key Conventions
//!
//! Pure builders for namespaced cache keys and the invalidation patterns that
//! cover them.
//!
//! Layout:
//! - `<scope>:<id>:<resource>` for scoped data (`workspace`, `user`, `file`, `org`)
//! - `global:<resource>` for data shared by every tenant
//! - `list:<resource>:<filters>` for filtered list queries, where `<filters>` is
//!   canonical JSON with object keys sorted at every depth
//!
//! `:` and `%` inside an id or resource name are percent-encoded, so a segment
//! can never spill into its neighbour. Callers may append further
//! `:`-separated segments (record ids, pages) to any key; namespace patterns
//! still cover them.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::cache::KeyPattern;
use crate::error::Result;

const GLOBAL_PREFIX: &str = "global";
const LIST_PREFIX: &str = "list";

// == Scope ==
/// Ownership scope of a cached resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Workspace,
    User,
    File,
    Organization,
}

impl Scope {
    /// Leading key segment for this scope.
    pub fn prefix(self) -> &'static str {
        match self {
            Scope::Workspace => "workspace",
            Scope::User => "user",
            Scope::File => "file",
            Scope::Organization => "org",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

// == Segment Encoding ==
/// Percent-encodes the separator (and the escape character itself) in one key
/// segment. Segments without either are returned as-is.
pub fn encode_segment(segment: &str) -> Cow<'_, str> {
    if !segment.contains([':', '%']) {
        return Cow::Borrowed(segment);
    }

    let mut encoded = String::with_capacity(segment.len() + 4);
    for ch in segment.chars() {
        match ch {
            '%' => encoded.push_str("%25"),
            ':' => encoded.push_str("%3A"),
            other => encoded.push(other),
        }
    }
    Cow::Owned(encoded)
}

// == Key Builders ==
pub fn scoped_key(scope: Scope, id: &str, resource: &str) -> String {
    format!(
        "{}:{}:{}",
        scope.prefix(),
        encode_segment(id),
        encode_segment(resource)
    )
}

pub fn workspace_key(workspace_id: &str, resource: &str) -> String {
    scoped_key(Scope::Workspace, workspace_id, resource)
}

pub fn user_key(user_id: &str, resource: &str) -> String {
    scoped_key(Scope::User, user_id, resource)
}

pub fn file_key(file_id: &str, resource: &str) -> String {
    scoped_key(Scope::File, file_id, resource)
}

pub fn organization_key(organization_id: &str, resource: &str) -> String {
    scoped_key(Scope::Organization, organization_id, resource)
}

pub fn global_key(resource: &str) -> String {
    format!("{GLOBAL_PREFIX}:{}", encode_segment(resource))
}

/// Builds the key for a filtered list query.
///
/// Filter sets that differ only in property order produce the same key.
/// Fails only if `filters` cannot be represented as JSON.
pub fn list_key<F: Serialize + ?Sized>(resource: &str, filters: &F) -> Result<String> {
    let filters = serde_json::to_value(filters)?;
    Ok(format!(
        "{}:{}",
        list_prefix(resource),
        canonical_json(&filters)
    ))
}

// == Canonical JSON ==
/// Serializes a JSON value with object keys sorted at every depth.
///
/// Does not rely on the map ordering `serde_json` happens to be compiled with.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<(&String, &Value)> = map.iter().collect();
            fields.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, field)) in fields.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_scalar(&Value::String(key.clone()), out);
                out.push(':');
                write_canonical(field, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => write_scalar(scalar, out),
    }
}

fn write_scalar(value: &Value, out: &mut String) {
    // Display for scalars is compact JSON with proper string escaping
    out.push_str(&value.to_string());
}

// == Namespace Patterns ==
/// Everything cached for `resource` inside one workspace.
pub fn workspace_namespace(workspace_id: &str, resource: &str) -> KeyPattern {
    KeyPattern::namespace(workspace_key(workspace_id, resource))
}

/// Everything cached for `resource` on behalf of one user.
pub fn user_namespace(user_id: &str, resource: &str) -> KeyPattern {
    KeyPattern::namespace(user_key(user_id, resource))
}

pub fn global_namespace(resource: &str) -> KeyPattern {
    KeyPattern::namespace(global_key(resource))
}

/// Every filtered list of `resource`, whatever its filters.
pub fn list_namespace(resource: &str) -> KeyPattern {
    KeyPattern::namespace(list_prefix(resource))
}

fn list_prefix(resource: &str) -> String {
    format!("{LIST_PREFIX}:{}", encode_segment(resource))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_scoped_keys() {
        assert_eq!(workspace_key("ws1", "projects"), "workspace:ws1:projects");
        assert_eq!(user_key("u1", "notifications"), "user:u1:notifications");
        assert_eq!(file_key("f1", "versions"), "file:f1:versions");
        assert_eq!(organization_key("o1", "members"), "org:o1:members");
        assert_eq!(global_key("roles"), "global:roles");
    }

    #[test]
    fn test_scoped_key_matches_helpers() {
        assert_eq!(
            scoped_key(Scope::Organization, "o1", "members"),
            organization_key("o1", "members")
        );
        assert_eq!(Scope::Workspace.to_string(), "workspace");
    }

    #[test]
    fn test_list_key_is_order_independent() {
        let a = json!({"status": "active", "workspace_id": "ws1", "page": 2});
        let b = json!({"page": 2, "workspace_id": "ws1", "status": "active"});

        assert_eq!(list_key("tasks", &a).unwrap(), list_key("tasks", &b).unwrap());
    }

    #[test]
    fn test_list_key_sorts_nested_objects() {
        let mut first = HashMap::new();
        first.insert("z", json!({"b": 1, "a": [ {"y": 1, "x": 2} ]}));
        first.insert("a", json!(null));

        let key = list_key("assets", &first).unwrap();
        assert_eq!(key, r#"list:assets:{"a":null,"z":{"a":[{"x":2,"y":1}],"b":1}}"#);
    }

    #[test]
    fn test_list_key_escapes_strings() {
        let key = list_key("files", &json!({"name": "a\"b"})).unwrap();
        assert_eq!(key, r#"list:files:{"name":"a\"b"}"#);
    }

    #[test]
    fn test_list_key_differs_by_value() {
        let a = list_key("tasks", &json!({"status": "open"})).unwrap();
        let b = list_key("tasks", &json!({"status": "done"})).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_separator_in_segment_cannot_collide() {
        assert_ne!(workspace_key("a:b", "c"), workspace_key("a", "b:c"));
        assert_ne!(
            workspace_key("acme:tasks", "budgets"),
            workspace_key("acme", "tasks:budgets")
        );
        assert_eq!(workspace_key("acme:tasks", "budgets"), "workspace:acme%3Atasks:budgets");
        assert_ne!(global_key("a:b"), global_key("a%3Ab"));
        assert_eq!(global_key("a%3Ab"), "global:a%253Ab");
    }

    #[test]
    fn test_namespace_of_encoded_id_stays_within_tenant() {
        let other_tenant = workspace_key("acme", "tasks:budgets");
        let own = workspace_key("acme:tasks", "budgets");

        assert!(workspace_namespace("acme:tasks", "budgets").matches(&own));
        assert!(!workspace_namespace("acme:tasks", "budgets").matches(&other_tenant));
        assert!(!workspace_namespace("acme", "tasks").matches(&own));
    }

    #[test]
    fn test_list_key_encodes_resource() {
        let key = list_key("a:b", &json!({})).unwrap();
        assert_eq!(key, "list:a%3Ab:{}");
        assert!(list_namespace("a:b").matches(&key));
        assert!(!list_namespace("a").matches(&key));
    }

    #[test]
    fn test_encode_segment_borrows_plain_input() {
        assert!(matches!(encode_segment("ws1"), Cow::Borrowed("ws1")));
        assert_eq!(encode_segment("100%:x"), "100%25%3Ax");
    }

    #[test]
    fn test_namespaces_cover_keys() {
        assert!(workspace_namespace("ws1", "tasks").matches(&workspace_key("ws1", "tasks")));
        assert!(user_namespace("u1", "tasks").matches("user:u1:tasks:page:2"));
        assert!(global_namespace("roles").matches(&global_key("roles")));
        let list = list_key("tasks", &json!({"status": "open"})).unwrap();
        assert!(list_namespace("tasks").matches(&list));
        assert!(!list_namespace("task").matches(&list));
    }
}
