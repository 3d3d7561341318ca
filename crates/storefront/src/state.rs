//! Application state shared across handlers.

use std::sync::Arc;

use moka::future::Cache;
use moka::notification::RemovalCause;
use moka::policy::EvictionPolicy;
use uuid::Uuid;

use crate::catalog::CatalogSource;
use crate::config::SessionConfig;
use crate::session::StorefrontSession;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog and the open page sessions.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: Arc<dyn CatalogSource>,
    sessions: SessionRegistry,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Catalog source shared by every session
    /// * `sessions` - Idle expiry and capacity of the session registry
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogSource>, sessions: SessionConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                catalog,
                sessions: SessionRegistry::new(sessions),
            }),
        }
    }

    /// Get the catalog source.
    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn CatalogSource> {
        &self.inner.catalog
    }

    /// Get the open page sessions.
    #[must_use]
    pub fn sessions(&self) -> &SessionRegistry {
        &self.inner.sessions
    }
}

/// Open page sessions keyed by id.
///
/// A session that sees no request for the idle period is evicted, which is
/// how an abandoned page's cart goes away.
///
/// At capacity the least recently used session is evicted and a warning is
/// logged. A new session is always admitted, so the id returned by
/// [`SessionRegistry::insert`] resolves until it idles out or becomes the
/// least recently used.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Cache<Uuid, Arc<StorefrontSession>>,
}

impl SessionRegistry {
    fn new(config: SessionConfig) -> Self {
        let max_sessions = config.max_sessions;
        Self {
            sessions: Cache::builder()
                .max_capacity(max_sessions)
                .time_to_idle(config.idle)
                .eviction_policy(EvictionPolicy::lru())
                .eviction_listener(move |id: Arc<Uuid>, _session, cause| {
                    if cause == RemovalCause::Size {
                        tracing::warn!(
                            session_id = %id,
                            max_sessions,
                            "session limit reached, evicted least recently used session"
                        );
                    }
                })
                .build(),
        }
    }

    /// Register a new session and return its id.
    pub async fn insert(&self, session: Arc<StorefrontSession>) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.insert(id, session).await;
        id
    }

    pub async fn get(&self, id: &Uuid) -> Option<Arc<StorefrontSession>> {
        self.sessions.get(id).await
    }

    /// Drop a session. Returns whether it existed.
    pub async fn remove(&self, id: &Uuid) -> bool {
        self.sessions.remove(id).await.is_some()
    }
}
