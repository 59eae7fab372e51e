//! Invalidation Dispatcher
//!
//! Translates data-change notifications into namespace invalidations across
//! the registry. Notifications may arrive duplicated or out of order; every
//! invalidation is idempotent.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::cache::keys::{global_namespace, list_namespace, user_namespace, workspace_namespace};
use crate::cache::KeyPattern;
use crate::registry::CacheRegistry;

// == Change Kind ==
/// Kind of committed mutation behind a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    #[serde(alias = "INSERT")]
    Insert,
    #[default]
    #[serde(alias = "UPDATE")]
    Update,
    #[serde(alias = "DELETE")]
    Delete,
}

// == Data Change ==
/// One committed create/update/delete on a record collection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataChange {
    /// Collection (table) name
    pub resource: String,
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub kind: ChangeKind,
}

impl DataChange {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            workspace_id: None,
            user_id: None,
            kind: ChangeKind::default(),
        }
    }

    pub fn in_workspace(mut self, workspace_id: impl Into<String>) -> Self {
        self.workspace_id = Some(workspace_id.into());
        self
    }

    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_kind(mut self, kind: ChangeKind) -> Self {
        self.kind = kind;
        self
    }

    // == Patterns ==
    /// Key patterns whose entries may be stale after this change.
    pub fn patterns(&self) -> Vec<KeyPattern> {
        let resource = self.resource.as_str();
        let mut patterns = Vec::with_capacity(4);

        if let Some(workspace_id) = self.workspace_id.as_deref() {
            patterns.push(workspace_namespace(workspace_id, resource));
        }
        if let Some(user_id) = self.user_id.as_deref() {
            patterns.push(user_namespace(user_id, resource));
        }
        patterns.push(global_namespace(resource));
        patterns.push(list_namespace(resource));

        patterns
    }
}

// == Invalidation Dispatcher ==
/// Applies data-change notifications to every cache in the registry.
#[derive(Debug, Clone)]
pub struct InvalidationDispatcher {
    registry: Arc<CacheRegistry>,
}

impl InvalidationDispatcher {
    pub fn new(registry: Arc<CacheRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<CacheRegistry> {
        &self.registry
    }

    /// Invalidates everything derived from `resource`, narrowed to the given
    /// workspace and user namespaces where supplied.
    pub async fn on_data_changed(
        &self,
        resource: &str,
        workspace_id: Option<&str>,
        user_id: Option<&str>,
    ) {
        let mut change = DataChange::new(resource);
        change.workspace_id = workspace_id.map(str::to_string);
        change.user_id = user_id.map(str::to_string);
        self.dispatch(&change).await;
    }

    // == Dispatch ==
    pub async fn dispatch(&self, change: &DataChange) {
        if change.resource.trim().is_empty() {
            warn!(?change, "ignoring data change without a resource name");
            return;
        }

        let patterns = change.patterns();
        let mut removed = 0;
        for (_, cache) in self.registry.iter() {
            for pattern in &patterns {
                removed += cache.invalidate_pattern(pattern).await;
            }
        }

        debug!(
            resource = %change.resource,
            workspace_id = change.workspace_id.as_deref(),
            user_id = change.user_id.as_deref(),
            kind = ?change.kind,
            removed,
            "data change dispatched"
        );
    }
}
