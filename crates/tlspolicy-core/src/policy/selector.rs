use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;

use crate::catalog::SuiteCatalog;
use crate::hello::ClientHelloSignal;
use crate::policy::classify::{classify, ClientClass};
use crate::policy::config::{materialize, ConfigSnapshot, ConfigTemplate, SnapshotSet};

/// Outcome of [`Selector::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    /// Use this snapshot for the connection.
    Override(&'a ConfigSnapshot),
    /// Keep the statically configured default.
    UseDefault,
}

/// Per-connection configuration selector.
///
/// Holds only immutable data, so `select` can be called from any number of
/// connection handlers at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    catalog: SuiteCatalog,
    snapshots: SnapshotSet,
}

impl Selector {
    /// Materialize `template` and build a selector over the result.
    pub fn new(catalog: SuiteCatalog, template: &ConfigTemplate) -> Self {
        let snapshots = materialize(&catalog, template);
        Self { catalog, snapshots }
    }

    /// Build a selector over snapshots that were materialized elsewhere.
    pub fn from_snapshots(catalog: SuiteCatalog, snapshots: SnapshotSet) -> Self {
        Self { catalog, snapshots }
    }

    pub fn catalog(&self) -> &SuiteCatalog {
        &self.catalog
    }

    pub fn snapshots(&self) -> &SnapshotSet {
        &self.snapshots
    }

    /// The configuration a handshake layer should install statically.
    pub fn default_config(&self) -> &ConfigSnapshot {
        &self.snapshots.default
    }

    pub fn classify(&self, signal: &ClientHelloSignal<'_>) -> ClientClass {
        classify(&self.catalog, signal)
    }

    /// ChaCha20 preference first, then the 3DES fallback, otherwise no
    /// override.
    pub fn select(&self, signal: &ClientHelloSignal<'_>) -> Selection<'_> {
        let class = self.classify(signal);
        debug!(
            "selected {:?} for {} offered suites, {} versions",
            class,
            signal.offered_suites.len(),
            signal.supported_versions.len()
        );
        match class {
            ClientClass::Default => Selection::UseDefault,
            other => Selection::Override(self.snapshots.for_class(other)),
        }
    }

    /// [`select`](Self::select) with `UseDefault` resolved to the default
    /// snapshot.
    pub fn resolve(&self, signal: &ClientHelloSignal<'_>) -> &ConfigSnapshot {
        match self.select(signal) {
            Selection::Override(snapshot) => snapshot,
            Selection::UseDefault => self.default_config(),
        }
    }
}

/// A selector that can be replaced while connections are being served.
///
/// Readers never lock; a reload publishes a whole new selector and
/// in-flight handshakes keep the one they loaded.
#[derive(Debug)]
pub struct ReloadableSelector {
    inner: ArcSwap<Selector>,
}

impl ReloadableSelector {
    pub fn new(selector: Selector) -> Self {
        Self {
            inner: ArcSwap::from_pointee(selector),
        }
    }

    pub fn current(&self) -> Arc<Selector> {
        self.inner.load_full()
    }

    pub fn reload(&self, selector: Selector) {
        self.inner.store(Arc::new(selector));
        debug!("selector reloaded");
    }
}
