use serde::Serialize;

use crate::catalog::{KnownVersion, SuiteCatalog};
use crate::hello::ClientHelloSignal;

/// Which precomputed configuration a client should receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientClass {
    /// First offered suite is a ChaCha20 suite.
    ChaCha20Preferred,
    /// Client cannot negotiate TLS 1.1 or newer.
    Legacy3Des,
    Default,
}

/// True iff the client's most preferred suite is a ChaCha20 suite.
///
/// An empty offer list has no preference.
pub fn prefers_chacha20(catalog: &SuiteCatalog, signal: &ClientHelloSignal<'_>) -> bool {
    signal
        .offered_suites
        .first()
        .is_some_and(|first| catalog.is_chacha20(*first))
}

/// True iff no supported version is TLS 1.1 or newer.
///
/// Vacuously true for an empty version list.
pub fn should_use_3des(catalog: &SuiteCatalog, signal: &ClientHelloSignal<'_>) -> bool {
    let tls11 = catalog.version(KnownVersion::Tls11);
    !signal.supported_versions.iter().any(|v| *v >= tls11)
}

/// Apply both predicates in priority order: ChaCha20 preference wins over
/// the legacy fallback.
pub fn classify(catalog: &SuiteCatalog, signal: &ClientHelloSignal<'_>) -> ClientClass {
    if prefers_chacha20(catalog, signal) {
        ClientClass::ChaCha20Preferred
    } else if should_use_3des(catalog, signal) {
        ClientClass::Legacy3Des
    } else {
        ClientClass::Default
    }
}
