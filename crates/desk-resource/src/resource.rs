//! Declarative resource subscription over the request executor.

use crate::{ChangeBus, EntityChanged, ListPage};
use desk_client::{ApiClient, Payload, RequestOptions};
use desk_session::SessionManager;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::debug;

/// Options for one resource subscription.
#[derive(Debug, Clone)]
pub struct ResourceOptions {
    /// When false, loads are skipped entirely.
    pub enabled: bool,
    /// When true, loads are skipped unless the session is ready.
    pub require_auth: bool,
    /// Request options used for every load (method, headers, retries).
    pub request: RequestOptions,
}

impl Default for ResourceOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            require_auth: true,
            request: RequestOptions::get(),
        }
    }
}

impl ResourceOptions {
    /// A subscription that loads without a ready session (login screens,
    /// public knowledge base).
    pub fn public() -> Self {
        Self {
            require_auth: false,
            ..Self::default()
        }
    }
}

/// Snapshot of a subscription's state.
///
/// Loading, error, and empty are three distinct signals: a screen renders a
/// spinner while loading, an error banner on failure, and the empty-state
/// copy only when a load completed with no items.
#[derive(Debug, Clone, Default)]
pub struct ResourceState {
    pub data: Option<Payload>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl ResourceState {
    /// True when a load completed cleanly with zero items.
    pub fn is_empty(&self) -> bool {
        if self.is_loading || self.error.is_some() {
            return false;
        }
        match &self.data {
            Some(payload) => ListPage::from_payload(payload).is_empty(),
            None => false,
        }
    }
}

/// One screen's subscription to a path.
///
/// Created when the screen activates, dropped when it goes away. `load`
/// runs on activation; `reload` re-runs after a mutation or on a broadcast
/// event. Overlapping loads are last-write-wins.
pub struct Resource {
    client: Arc<ApiClient>,
    session: Arc<SessionManager>,
    path: String,
    options: ResourceOptions,
    state: Mutex<ResourceState>,
}

impl Resource {
    pub fn new(
        client: Arc<ApiClient>,
        session: Arc<SessionManager>,
        path: &str,
        options: ResourceOptions,
    ) -> Arc<Self> {
        let is_loading = options.enabled;
        Arc::new(Self {
            client,
            session,
            path: path.to_string(),
            options,
            state: Mutex::new(ResourceState {
                data: None,
                is_loading,
                error: None,
            }),
        })
    }

    /// The subscribed path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ResourceState {
        self.state.lock().unwrap().clone()
    }

    /// The current data normalized as a list page.
    pub fn list(&self) -> ListPage {
        match &self.state.lock().unwrap().data {
            Some(payload) => ListPage::from_payload(payload),
            None => ListPage::empty(),
        }
    }

    /// Fetch the subscribed path, updating `{data, loading, error}`.
    ///
    /// Skipped (with the loading flag cleared) when the subscription is
    /// disabled or requires a session that is not ready. Existing data is
    /// kept on failure so a flaky reload does not blank the screen.
    pub async fn load(&self) {
        if !self.options.enabled {
            self.state.lock().unwrap().is_loading = false;
            return;
        }
        if self.options.require_auth && !self.session.status().is_authenticated() {
            debug!(path = %self.path, "Skipping load, session not ready");
            self.state.lock().unwrap().is_loading = false;
            return;
        }

        {
            let mut state = self.state.lock().unwrap();
            state.is_loading = true;
            state.error = None;
        }

        let result = self
            .client
            .execute(&self.path, self.options.request.clone())
            .await;

        let mut state = self.state.lock().unwrap();
        match result {
            Ok(payload) => {
                state.data = Some(payload);
            }
            Err(e) => {
                state.error = Some(e.to_string());
            }
        }
        state.is_loading = false;
    }

    /// Re-run the fetch on demand (after a mutation, or from a broadcast).
    pub async fn reload(&self) {
        self.load().await;
    }

    /// React to entity-changed events for the given entity type by
    /// reloading. Returns the handle of the spawned listener task; dropping
    /// the resource's last reference ends it at the next event.
    pub fn watch(self: &Arc<Self>, bus: &ChangeBus, entity_type: &str) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        let resource = Arc::clone(self);
        let entity_type = entity_type.to_string();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if resource.wants(&event, &entity_type) {
                            debug!(
                                path = %resource.path,
                                entity_type = %event.entity_type,
                                "Reloading on entity change"
                            );
                            resource.reload().await;
                        }
                    }
                    // Skipped events still mean data changed under us.
                    Err(RecvError::Lagged(_)) => resource.reload().await,
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    fn wants(&self, event: &EntityChanged, entity_type: &str) -> bool {
        event.entity_type == entity_type
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("path", &self.path)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
