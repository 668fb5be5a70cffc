use std::sync::Arc;

use storage::{KeySpace, KeyValueStore, export_snapshot, import_snapshot};

use crate::identity::{IdentityGateway, SyncTrigger};

/// Best-effort bridge to the remote progress service.
///
/// Push and pull both no-op for unauthenticated visitors and swallow
/// failures: a missed sync costs freshness, never local progress. The one
/// caller that needs the result (gate re-evaluation after sign-in) awaits
/// [`SyncBridge::pull_if_authenticated`] and checks the returned flag.
pub struct SyncBridge {
    store: Arc<dyn KeyValueStore>,
    keys: KeySpace,
    identity: Arc<dyn IdentityGateway>,
}

impl SyncBridge {
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        keys: KeySpace,
        identity: Arc<dyn IdentityGateway>,
    ) -> Self {
        Self {
            store,
            keys,
            identity,
        }
    }

    /// Push a full local snapshot. Fire-and-forget: failures are logged and
    /// swallowed.
    pub async fn push_if_authenticated(&self, trigger: SyncTrigger) {
        if self.identity.current_user().is_none() {
            return;
        }

        let bundle = match export_snapshot(self.store.as_ref(), &self.keys) {
            Ok(bundle) => bundle,
            Err(err) => {
                tracing::debug!(error = %err, "snapshot export failed; skipping push");
                return;
            }
        };

        if let Err(err) = self.identity.sync_to_server(trigger, &bundle).await {
            tracing::debug!(
                error = %err,
                trigger = trigger.as_str(),
                "progress push failed"
            );
        }
    }

    /// Pull the server-held snapshot and merge it over local state.
    ///
    /// Returns whether a snapshot was applied, so gate re-evaluation knows
    /// server progress has superseded local guesses.
    pub async fn pull_if_authenticated(&self) -> bool {
        if self.identity.current_user().is_none() {
            return false;
        }

        match self.identity.sync_from_server().await {
            Ok(Some(bundle)) => match import_snapshot(self.store.as_ref(), &bundle) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(error = %err, "pulled snapshot could not be applied");
                    false
                }
            },
            Ok(None) => false,
            Err(err) => {
                tracing::debug!(error = %err, "progress pull failed");
                false
            }
        }
    }
}
