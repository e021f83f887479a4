pub mod types;

use thiserror::Error;

pub use types::{CipherSuite, CurveId, KnownCurve, KnownSuite, KnownVersion, ProtocolVersion};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown cipher suite: {0}")]
    UnknownSuite(String),
    #[error("unknown protocol version: {0}")]
    UnknownVersion(String),
    #[error("unknown curve: {0}")]
    UnknownCurve(String),
    #[error("cipher suite {id} is already assigned to {existing}")]
    DuplicateSuite { id: CipherSuite, existing: &'static str },
    #[error("protocol version {id} is already assigned to {existing}")]
    DuplicateVersion { id: ProtocolVersion, existing: &'static str },
    #[error("protocol version {id} for {version} breaks the version ordering")]
    VersionOutOfOrder { id: ProtocolVersion, version: &'static str },
}

/// What the surrounding TLS stack is able to negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// TLS 1.3 and its cipher suites are available.
    pub tls13: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self { tls13: true }
    }
}

/// Table mapping the suites, versions and curves the policy refers to onto
/// the identifiers of the TLS stack in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteCatalog {
    suites: [CipherSuite; KnownSuite::COUNT],
    versions: [ProtocolVersion; KnownVersion::COUNT],
    curves: [CurveId; KnownCurve::COUNT],
    capabilities: Capabilities,
}

impl SuiteCatalog {
    /// Catalog populated from the IANA TLS registries.
    pub fn iana(capabilities: Capabilities) -> Self {
        Self {
            suites: KnownSuite::ALL.map(KnownSuite::iana_id),
            versions: KnownVersion::ALL.map(KnownVersion::wire_id),
            curves: KnownCurve::ALL.map(KnownCurve::iana_id),
            capabilities,
        }
    }

    /// Replace the identifier used for one suite role.
    ///
    /// Fails if another role already uses `id`, since preference lists must
    /// never contain duplicates.
    pub fn with_suite(mut self, suite: KnownSuite, id: CipherSuite) -> Result<Self, CatalogError> {
        if let Some(existing) = self.known_suite(id) {
            if existing != suite {
                return Err(CatalogError::DuplicateSuite {
                    id,
                    existing: existing.name(),
                });
            }
        }
        self.suites[suite.index()] = id;
        Ok(self)
    }

    /// Replace the identifier used for one protocol version.
    ///
    /// Versions are compared by identifier, so `id` must sort strictly
    /// between the identifiers of the neighbouring versions.
    pub fn with_version(mut self, version: KnownVersion, id: ProtocolVersion) -> Result<Self, CatalogError> {
        if let Some(existing) = self.known_version(id) {
            if existing != version {
                return Err(CatalogError::DuplicateVersion {
                    id,
                    existing: existing.name(),
                });
            }
        }
        let i = version.index();
        let above_prev = i == 0 || self.versions[i - 1] < id;
        let below_next = i + 1 == KnownVersion::COUNT || id < self.versions[i + 1];
        if !(above_prev && below_next) {
            return Err(CatalogError::VersionOutOfOrder {
                id,
                version: version.name(),
            });
        }
        self.versions[i] = id;
        Ok(self)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn suite(&self, suite: KnownSuite) -> CipherSuite {
        self.suites[suite.index()]
    }

    pub fn version(&self, version: KnownVersion) -> ProtocolVersion {
        self.versions[version.index()]
    }

    pub fn curve(&self, curve: KnownCurve) -> CurveId {
        self.curves[curve.index()]
    }

    /// The newest protocol version the environment can negotiate.
    pub fn latest_version(&self) -> ProtocolVersion {
        if self.capabilities.tls13 {
            self.version(KnownVersion::Tls13)
        } else {
            self.version(KnownVersion::Tls12)
        }
    }

    /// Reverse lookup of a suite role by identifier.
    pub fn known_suite(&self, id: CipherSuite) -> Option<KnownSuite> {
        KnownSuite::ALL.into_iter().find(|s| self.suite(*s) == id)
    }

    pub fn known_version(&self, id: ProtocolVersion) -> Option<KnownVersion> {
        KnownVersion::ALL.into_iter().find(|v| self.version(*v) == id)
    }

    /// True for the ECDHE ChaCha20-Poly1305 suites, and for the TLS 1.3
    /// ChaCha20 suite when TLS 1.3 is available.
    pub fn is_chacha20(&self, id: CipherSuite) -> bool {
        id == self.suite(KnownSuite::EcdheEcdsaChaCha20Poly1305)
            || id == self.suite(KnownSuite::EcdheRsaChaCha20Poly1305)
            || (self.capabilities.tls13 && id == self.suite(KnownSuite::Tls13ChaCha20Poly1305Sha256))
    }

    pub fn is_3des(&self, id: CipherSuite) -> bool {
        id == self.suite(KnownSuite::EcdheRsa3DesEdeCbcSha) || id == self.suite(KnownSuite::Rsa3DesEdeCbcSha)
    }

    /// Human readable name for diagnostics, falling back to the hex id.
    pub fn suite_name(&self, id: CipherSuite) -> String {
        match self.known_suite(id) {
            Some(s) => s.name().to_string(),
            None => id.to_string(),
        }
    }

    pub fn version_name(&self, id: ProtocolVersion) -> String {
        self.known_version(id)
            .map(|v| v.name().to_string())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn curve_name(&self, id: CurveId) -> String {
        KnownCurve::ALL
            .into_iter()
            .find(|c| self.curve(*c) == id)
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| id.to_string())
    }

    /// Resolve a suite by registry name or `0x`-prefixed hex id.
    pub fn resolve_suite(&self, name: &str) -> Result<CipherSuite, CatalogError> {
        if let Some(s) = KnownSuite::ALL.into_iter().find(|s| s.name().eq_ignore_ascii_case(name)) {
            return Ok(self.suite(s));
        }
        parse_hex_u16(name)
            .map(CipherSuite)
            .ok_or_else(|| CatalogError::UnknownSuite(name.to_string()))
    }

    /// Resolve a version by name (`"TLS1.2"`) or `0x`-prefixed hex id.
    pub fn resolve_version(&self, name: &str) -> Result<ProtocolVersion, CatalogError> {
        if let Some(v) = KnownVersion::ALL.into_iter().find(|v| v.name().eq_ignore_ascii_case(name)) {
            return Ok(self.version(v));
        }
        parse_hex_u16(name)
            .map(ProtocolVersion)
            .ok_or_else(|| CatalogError::UnknownVersion(name.to_string()))
    }

    /// Resolve a curve by name (`"X25519"`, `"P-256"`) or `0x`-prefixed hex id.
    pub fn resolve_curve(&self, name: &str) -> Result<CurveId, CatalogError> {
        if let Some(c) = KnownCurve::ALL.into_iter().find(|c| c.name().eq_ignore_ascii_case(name)) {
            return Ok(self.curve(c));
        }
        parse_hex_u16(name)
            .map(CurveId)
            .ok_or_else(|| CatalogError::UnknownCurve(name.to_string()))
    }
}

impl Default for SuiteCatalog {
    fn default() -> Self {
        Self::iana(Capabilities::default())
    }
}

fn parse_hex_u16(s: &str) -> Option<u16> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    u16::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iana_catalog_has_unique_suite_ids() {
        let catalog = SuiteCatalog::default();
        let mut ids: Vec<CipherSuite> = KnownSuite::ALL.iter().map(|s| catalog.suite(*s)).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), KnownSuite::COUNT);
    }

    #[test]
    fn latest_version_follows_capabilities() {
        let modern = SuiteCatalog::iana(Capabilities { tls13: true });
        let legacy = SuiteCatalog::iana(Capabilities { tls13: false });
        assert_eq!(modern.latest_version(), ProtocolVersion(0x0304));
        assert_eq!(legacy.latest_version(), ProtocolVersion(0x0303));
    }

    #[test]
    fn tls13_chacha20_counts_only_with_tls13() {
        let id = KnownSuite::Tls13ChaCha20Poly1305Sha256.iana_id();
        assert!(SuiteCatalog::iana(Capabilities { tls13: true }).is_chacha20(id));
        assert!(!SuiteCatalog::iana(Capabilities { tls13: false }).is_chacha20(id));
    }

    #[test]
    fn with_suite_overrides_id() {
        let catalog = SuiteCatalog::default()
            .with_suite(KnownSuite::Rsa3DesEdeCbcSha, CipherSuite(0xff01))
            .unwrap();
        assert_eq!(catalog.suite(KnownSuite::Rsa3DesEdeCbcSha), CipherSuite(0xff01));
        assert!(catalog.is_3des(CipherSuite(0xff01)));
        assert!(!catalog.is_3des(CipherSuite(0x000a)));
    }

    #[test]
    fn with_suite_rejects_duplicate_ids() {
        let err = SuiteCatalog::default()
            .with_suite(KnownSuite::Rsa3DesEdeCbcSha, CipherSuite(0xc02b))
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateSuite {
                id: CipherSuite(0xc02b),
                existing: "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256",
            }
        );
    }

    #[test]
    fn with_suite_accepts_same_role_twice() {
        let catalog = SuiteCatalog::default()
            .with_suite(KnownSuite::RsaAes128CbcSha, CipherSuite(0x002f))
            .unwrap();
        assert_eq!(catalog, SuiteCatalog::default());
    }

    #[test]
    fn with_version_moves_legacy_threshold() {
        use crate::hello::ClientHelloSignal;
        use crate::policy::classify::should_use_3des;

        let catalog = SuiteCatalog::default()
            .with_version(KnownVersion::Tls13, ProtocolVersion(0x7f1c))
            .unwrap()
            .with_version(KnownVersion::Tls12, ProtocolVersion(0x0320))
            .unwrap()
            .with_version(KnownVersion::Tls11, ProtocolVersion(0x0310))
            .unwrap();
        assert_eq!(catalog.latest_version(), ProtocolVersion(0x7f1c));
        assert_eq!(catalog.version_name(ProtocolVersion(0x0320)), "TLS1.2");
        assert_eq!(catalog.resolve_version("TLS1.1"), Ok(ProtocolVersion(0x0310)));

        let signal = ClientHelloSignal::new(&[], &[ProtocolVersion(0x0303)]);
        assert!(should_use_3des(&catalog, &signal));
        assert!(!should_use_3des(&SuiteCatalog::default(), &signal));
    }

    #[test]
    fn with_version_rejects_duplicate_ids() {
        let err = SuiteCatalog::default()
            .with_version(KnownVersion::Tls13, ProtocolVersion(0x0303))
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateVersion {
                id: ProtocolVersion(0x0303),
                existing: "TLS1.2",
            }
        );
    }

    #[test]
    fn with_version_rejects_reordering() {
        let err = SuiteCatalog::default()
            .with_version(KnownVersion::Tls11, ProtocolVersion(0x0310))
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::VersionOutOfOrder {
                id: ProtocolVersion(0x0310),
                version: "TLS1.1",
            }
        );
        assert!(SuiteCatalog::default()
            .with_version(KnownVersion::Ssl30, ProtocolVersion(0x0200))
            .is_ok());
    }

    #[test]
    fn resolve_by_name_and_hex() {
        let catalog = SuiteCatalog::default();
        assert_eq!(
            catalog.resolve_suite("TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256"),
            Ok(CipherSuite(0xc02f))
        );
        assert_eq!(catalog.resolve_suite("0x00ff"), Ok(CipherSuite(0x00ff)));
        assert_eq!(catalog.resolve_version("tls1.2"), Ok(ProtocolVersion(0x0303)));
        assert_eq!(catalog.resolve_curve("P-256"), Ok(CurveId(0x0017)));
        assert_eq!(
            catalog.resolve_suite("TLS_RSA_WITH_RC4_128_SHA"),
            Err(CatalogError::UnknownSuite("TLS_RSA_WITH_RC4_128_SHA".into()))
        );
        assert!(catalog.resolve_version("0xzz").is_err());
        assert!(catalog.resolve_curve("secp256k1").is_err());
    }

    #[test]
    fn names_fall_back_to_hex() {
        let catalog = SuiteCatalog::default();
        assert_eq!(catalog.suite_name(CipherSuite(0x1303)), "TLS_CHACHA20_POLY1305_SHA256");
        assert_eq!(catalog.suite_name(CipherSuite(0x00ff)), "0x00ff");
        assert_eq!(catalog.version_name(ProtocolVersion(0x0301)), "TLS1.0");
        assert_eq!(catalog.curve_name(CurveId(0x001d)), "X25519");
    }
}
