use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::{CipherSuite, CurveId, KnownCurve, KnownVersion, ProtocolVersion, SuiteCatalog};
use crate::policy::classify::ClientClass;
use crate::policy::preference::{PreferenceList, PreferenceSet};

/// Renegotiation support. Materialized snapshots always use `Never`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Renegotiation {
    #[default]
    Never,
    OnceAsClient,
    FreelyAsClient,
}

/// Which set of defaults to fill unset fields with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Broad client compatibility.
    #[default]
    Standard,
    /// Long-lived internal connections: AES-256-GCM and ChaCha20 only, no
    /// session resumption.
    Strict,
}

/// Caller-owned base configuration. `None` means "use the policy default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigTemplate {
    pub profile: Profile,
    pub cipher_suites: Option<Vec<CipherSuite>>,
    pub tls13_cipher_suites: Option<Vec<CipherSuite>>,
    pub prefer_server_cipher_suites: bool,
    pub curve_preferences: Option<Vec<CurveId>>,
    pub min_version: Option<ProtocolVersion>,
    pub max_version: Option<ProtocolVersion>,
    pub renegotiation: Renegotiation,
    pub session_resumption: Option<bool>,
}

/// Fully resolved, immutable configuration handed to the handshake layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    pub cipher_suites: PreferenceList,
    /// `None` when the catalog cannot negotiate TLS 1.3.
    pub tls13_cipher_suites: Option<PreferenceList>,
    pub prefer_server_cipher_suites: bool,
    pub curve_preferences: Vec<CurveId>,
    pub min_version: ProtocolVersion,
    pub max_version: ProtocolVersion,
    pub renegotiation: Renegotiation,
    pub session_resumption: bool,
}

/// The three snapshots the selector chooses between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSet {
    pub default: ConfigSnapshot,
    pub chacha20: ConfigSnapshot,
    pub three_des: ConfigSnapshot,
}

impl SnapshotSet {
    pub fn for_class(&self, class: ClientClass) -> &ConfigSnapshot {
        match class {
            ClientClass::ChaCha20Preferred => &self.chacha20,
            ClientClass::Legacy3Des => &self.three_des,
            ClientClass::Default => &self.default,
        }
    }
}

/// Resolve `template` into the default, ChaCha20 and 3DES snapshots.
///
/// Unset fields take the profile's defaults; caller values pass through
/// untouched, except renegotiation which is always `Never`. The ChaCha20
/// and 3DES snapshots differ from the default only in their suite lists,
/// and only when the caller did not supply those lists.
pub fn materialize(catalog: &SuiteCatalog, template: &ConfigTemplate) -> SnapshotSet {
    let lists = match template.profile {
        Profile::Standard => PreferenceSet::new(catalog),
        Profile::Strict => PreferenceSet::strict(catalog),
    };

    let mut prefer_server_cipher_suites = template.prefer_server_cipher_suites;
    let caller_suites = template
        .cipher_suites
        .as_ref()
        .map(|s| PreferenceList::from_suites(s.iter().copied()));
    if caller_suites.is_none() {
        prefer_server_cipher_suites = true;
    }

    let caller_tls13 = template
        .tls13_cipher_suites
        .as_ref()
        .map(|s| PreferenceList::from_suites(s.iter().copied()));
    let tls13 = |fallback: &PreferenceList| -> Option<PreferenceList> {
        if !catalog.capabilities().tls13 {
            return None;
        }
        Some(caller_tls13.clone().unwrap_or_else(|| fallback.clone()))
    };

    let min_version = template
        .min_version
        .unwrap_or_else(|| catalog.version(KnownVersion::Tls12));
    let max_version = template.max_version.unwrap_or_else(|| catalog.latest_version());
    if min_version > max_version {
        warn!(
            "min version {} above max version {}; passing through",
            min_version, max_version
        );
    }

    let curve_preferences = template
        .curve_preferences
        .clone()
        .unwrap_or_else(|| vec![catalog.curve(KnownCurve::X25519), catalog.curve(KnownCurve::P256)]);

    let session_resumption = match template.profile {
        Profile::Standard => template.session_resumption.unwrap_or(true),
        Profile::Strict => false,
    };

    let default = ConfigSnapshot {
        cipher_suites: caller_suites.clone().unwrap_or_else(|| lists.default.clone()),
        tls13_cipher_suites: tls13(&lists.tls13),
        prefer_server_cipher_suites,
        curve_preferences,
        min_version,
        max_version,
        renegotiation: Renegotiation::Never,
        session_resumption,
    };

    let chacha20 = ConfigSnapshot {
        cipher_suites: caller_suites
            .clone()
            .unwrap_or_else(|| lists.chacha20_first.clone()),
        tls13_cipher_suites: tls13(&lists.tls13_chacha20_first),
        ..default.clone()
    };

    let three_des = ConfigSnapshot {
        cipher_suites: caller_suites.unwrap_or_else(|| lists.with_3des.clone()),
        ..default.clone()
    };

    info!(
        "materialized {:?} snapshots: {} suites, versions {}..={}",
        template.profile,
        default.cipher_suites.len(),
        catalog.version_name(default.min_version),
        catalog.version_name(default.max_version),
    );

    SnapshotSet {
        default,
        chacha20,
        three_des,
    }
}
