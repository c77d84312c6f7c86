//! Session and application context, passed explicitly to every container.
//!
//! The viewer's identity, display preferences, the shared cache, the remote
//! and the notifier travel together in an [`AppContext`]. Containers receive
//! it in their constructors; nothing is looked up ambiently.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::{Query, ResourceCache};
use crate::config::AppConfig;
use crate::notify::Notifier;
use crate::reconciler::Reconciler;
use crate::remote::Remote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// The signed-in viewer and their preferences.
#[derive(Debug, Clone, Default)]
pub struct Session {
    viewer_id: Option<String>,
    theme: Theme,
    variables: HashMap<String, String>,
}

impl Session {
    /// Create an anonymous session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for a signed-in viewer.
    pub fn for_viewer(viewer_id: impl Into<String>) -> Self {
        Self {
            viewer_id: Some(viewer_id.into()),
            ..Self::default()
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn viewer_id(&self) -> Option<&str> {
        self.viewer_id.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.viewer_id.is_some()
    }

    /// Whether the viewer is the given user.
    pub fn is_viewer(&self, user_id: &str) -> bool {
        self.viewer_id.as_deref() == Some(user_id)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Get a session variable by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(|v| v.as_str())
    }

    /// Set a session variable.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }
}

/// Everything a container needs, threaded explicitly.
pub struct AppContext<C, X> {
    session: Session,
    cache: C,
    remote: X,
    notifier: Arc<dyn Notifier>,
    config: AppConfig,
}

impl<C: ResourceCache, X: Remote> AppContext<C, X> {
    pub fn new(session: Session, cache: C, remote: X, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            session,
            cache,
            remote,
            notifier,
            config: AppConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn remote(&self) -> &X {
        &self.remote
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn reconciler(&self) -> Reconciler<'_, C, X> {
        Reconciler::new(
            &self.cache,
            &self.remote,
            self.notifier.as_ref(),
            self.config.reconcile,
        )
    }

    pub fn query(&self) -> Query<'_, C, X> {
        Query::new(&self.cache, &self.remote)
    }
}
