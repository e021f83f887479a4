use std::ops::Deref;

use crate::catalog::{CipherSuite, KnownSuite, SuiteCatalog};

/// Toggles for [`build_preference_list`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreferencePolicy {
    /// Rank ECDHE ChaCha20-Poly1305 above ECDHE AES-GCM.
    pub chacha20_first: bool,
    /// Append the two 3DES suites as the last resort.
    pub include_3des: bool,
}

/// Ordered, duplicate-free list of cipher suites, most preferred first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceList(Vec<CipherSuite>);

impl PreferenceList {
    /// Build a list from caller-supplied suites, dropping repeated entries
    /// after their first occurrence.
    pub fn from_suites(suites: impl IntoIterator<Item = CipherSuite>) -> Self {
        let mut out: Vec<CipherSuite> = Vec::new();
        for s in suites {
            if !out.contains(&s) {
                out.push(s);
            }
        }
        Self(out)
    }

    pub fn as_slice(&self) -> &[CipherSuite] {
        &self.0
    }

    pub fn contains(&self, id: CipherSuite) -> bool {
        self.0.contains(&id)
    }
}

impl Deref for PreferenceList {
    type Target = [CipherSuite];

    fn deref(&self) -> &[CipherSuite] {
        &self.0
    }
}

const CHACHA20: [KnownSuite; 2] = [
    KnownSuite::EcdheEcdsaChaCha20Poly1305,
    KnownSuite::EcdheRsaChaCha20Poly1305,
];

const ECDHE_GCM: [KnownSuite; 4] = [
    KnownSuite::EcdheEcdsaAes128GcmSha256,
    KnownSuite::EcdheEcdsaAes256GcmSha384,
    KnownSuite::EcdheRsaAes128GcmSha256,
    KnownSuite::EcdheRsaAes256GcmSha384,
];

const ECDHE_CBC: [KnownSuite; 4] = [
    KnownSuite::EcdheEcdsaAes128CbcSha,
    KnownSuite::EcdheEcdsaAes256CbcSha,
    KnownSuite::EcdheRsaAes128CbcSha,
    KnownSuite::EcdheRsaAes256CbcSha,
];

// No forward secrecy: GCM then CBC.
const RSA_KX: [KnownSuite; 4] = [
    KnownSuite::RsaAes128GcmSha256,
    KnownSuite::RsaAes256GcmSha384,
    KnownSuite::RsaAes128CbcSha,
    KnownSuite::RsaAes256CbcSha,
];

const TRIPLE_DES: [KnownSuite; 2] = [KnownSuite::EcdheRsa3DesEdeCbcSha, KnownSuite::Rsa3DesEdeCbcSha];

const STRICT_GCM: [KnownSuite; 2] = [
    KnownSuite::EcdheEcdsaAes256GcmSha384,
    KnownSuite::EcdheRsaAes256GcmSha384,
];

/// Build the TLS 1.2-and-below suite list for `policy`.
///
/// ECDHE AES-GCM and ChaCha20 (in the order the policy asks for) rank above
/// ECDHE AES-CBC, which ranks above static RSA key exchange. 3DES, when
/// included, is always the final two entries.
pub fn build_preference_list(catalog: &SuiteCatalog, policy: PreferencePolicy) -> PreferenceList {
    let mut roles: Vec<KnownSuite> = Vec::with_capacity(16);

    if policy.chacha20_first {
        roles.extend(CHACHA20);
    }
    roles.extend(ECDHE_GCM);
    if !policy.chacha20_first {
        roles.extend(CHACHA20);
    }
    roles.extend(ECDHE_CBC);
    roles.extend(RSA_KX);
    if policy.include_3des {
        roles.extend(TRIPLE_DES);
    }

    PreferenceList(roles.into_iter().map(|r| catalog.suite(r)).collect())
}

/// The three TLS 1.3 suites, AES-GCM first unless `chacha20_first`.
pub fn tls13_suites(catalog: &SuiteCatalog, chacha20_first: bool) -> PreferenceList {
    let roles = if chacha20_first {
        [
            KnownSuite::Tls13ChaCha20Poly1305Sha256,
            KnownSuite::Tls13Aes128GcmSha256,
            KnownSuite::Tls13Aes256GcmSha384,
        ]
    } else {
        [
            KnownSuite::Tls13Aes128GcmSha256,
            KnownSuite::Tls13Aes256GcmSha384,
            KnownSuite::Tls13ChaCha20Poly1305Sha256,
        ]
    };
    PreferenceList(roles.into_iter().map(|r| catalog.suite(r)).collect())
}

/// AES-256-GCM and ChaCha20 only, for the strict profile.
pub fn strict_suites(catalog: &SuiteCatalog, chacha20_first: bool) -> PreferenceList {
    let roles: Vec<KnownSuite> = if chacha20_first {
        CHACHA20.into_iter().chain(STRICT_GCM).collect()
    } else {
        STRICT_GCM.into_iter().chain(CHACHA20).collect()
    };
    PreferenceList(roles.into_iter().map(|r| catalog.suite(r)).collect())
}

pub fn strict_tls13_suites(catalog: &SuiteCatalog, chacha20_first: bool) -> PreferenceList {
    let mut roles = [
        KnownSuite::Tls13Aes256GcmSha384,
        KnownSuite::Tls13ChaCha20Poly1305Sha256,
    ];
    if chacha20_first {
        roles.reverse();
    }
    PreferenceList(roles.into_iter().map(|r| catalog.suite(r)).collect())
}

/// The published lists for one catalog, built once and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceSet {
    pub default: PreferenceList,
    pub chacha20_first: PreferenceList,
    pub with_3des: PreferenceList,
    pub tls13: PreferenceList,
    pub tls13_chacha20_first: PreferenceList,
}

impl PreferenceSet {
    pub fn new(catalog: &SuiteCatalog) -> Self {
        Self {
            default: build_preference_list(catalog, PreferencePolicy::default()),
            chacha20_first: build_preference_list(
                catalog,
                PreferencePolicy {
                    chacha20_first: true,
                    include_3des: false,
                },
            ),
            with_3des: build_preference_list(
                catalog,
                PreferencePolicy {
                    chacha20_first: false,
                    include_3des: true,
                },
            ),
            tls13: tls13_suites(catalog, false),
            tls13_chacha20_first: tls13_suites(catalog, true),
        }
    }

    /// The strict profile's counterpart; it never carries 3DES, so
    /// `with_3des` equals `default`.
    pub fn strict(catalog: &SuiteCatalog) -> Self {
        let default = strict_suites(catalog, false);
        Self {
            with_3des: default.clone(),
            default,
            chacha20_first: strict_suites(catalog, true),
            tls13: strict_tls13_suites(catalog, false),
            tls13_chacha20_first: strict_tls13_suites(catalog, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Capabilities;
    use std::collections::HashSet;

    fn catalog() -> SuiteCatalog {
        SuiteCatalog::iana(Capabilities::default())
    }

    fn all_policies() -> Vec<PreferencePolicy> {
        let mut out = Vec::new();
        for chacha20_first in [false, true] {
            for include_3des in [false, true] {
                out.push(PreferencePolicy {
                    chacha20_first,
                    include_3des,
                });
            }
        }
        out
    }

    fn ids(catalog: &SuiteCatalog, roles: &[KnownSuite]) -> Vec<CipherSuite> {
        roles.iter().map(|r| catalog.suite(*r)).collect()
    }

    #[test]
    fn no_duplicates_for_any_policy() {
        let catalog = catalog();
        for policy in all_policies() {
            let list = build_preference_list(&catalog, policy);
            let unique: HashSet<_> = list.iter().collect();
            assert_eq!(unique.len(), list.len(), "{:?}", policy);
            assert_eq!(list.len(), if policy.include_3des { 16 } else { 14 });
        }
    }

    #[test]
    fn deterministic() {
        let catalog = catalog();
        for policy in all_policies() {
            assert_eq!(
                build_preference_list(&catalog, policy),
                build_preference_list(&catalog, policy)
            );
        }
    }

    #[test]
    fn chacha20_first_layout() {
        let catalog = catalog();
        let list = build_preference_list(
            &catalog,
            PreferencePolicy {
                chacha20_first: true,
                include_3des: false,
            },
        );
        assert_eq!(list.len(), 14);
        assert_eq!(&list[0..2], ids(&catalog, &CHACHA20).as_slice());
        assert_eq!(&list[2..6], ids(&catalog, &ECDHE_GCM).as_slice());
        assert_eq!(&list[6..10], ids(&catalog, &ECDHE_CBC).as_slice());
        assert_eq!(&list[10..14], ids(&catalog, &RSA_KX).as_slice());
        assert!(!list.iter().any(|s| catalog.is_3des(*s)));
    }

    #[test]
    fn default_places_chacha20_after_gcm() {
        let catalog = catalog();
        let set = PreferenceSet::new(&catalog);
        assert_eq!(&set.default[0..4], ids(&catalog, &ECDHE_GCM).as_slice());
        assert_eq!(&set.default[4..6], ids(&catalog, &CHACHA20).as_slice());

        let a: HashSet<_> = set.default.iter().collect();
        let b: HashSet<_> = set.chacha20_first.iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn with_3des_appends_exactly_two() {
        let catalog = catalog();
        let set = PreferenceSet::new(&catalog);
        assert_eq!(set.with_3des.len(), set.default.len() + 2);
        assert_eq!(&set.with_3des[..set.default.len()], set.default.as_slice());
        assert_eq!(
            &set.with_3des[set.default.len()..],
            ids(&catalog, &TRIPLE_DES).as_slice()
        );
        assert!(!set.default.iter().any(|s| catalog.is_3des(*s)));
        assert!(!set.chacha20_first.iter().any(|s| catalog.is_3des(*s)));
    }

    #[test]
    fn tls13_orderings() {
        let catalog = catalog();
        assert_eq!(
            tls13_suites(&catalog, false).as_slice(),
            &[CipherSuite(0x1301), CipherSuite(0x1302), CipherSuite(0x1303)]
        );
        assert_eq!(
            tls13_suites(&catalog, true).as_slice(),
            &[CipherSuite(0x1303), CipherSuite(0x1301), CipherSuite(0x1302)]
        );
    }

    #[test]
    fn strict_lists() {
        let catalog = catalog();
        let strict = PreferenceSet::strict(&catalog);
        assert_eq!(
            strict.default.as_slice(),
            &[
                CipherSuite(0xc02c),
                CipherSuite(0xc030),
                CipherSuite(0xcca9),
                CipherSuite(0xcca8)
            ]
        );
        assert_eq!(&strict.chacha20_first[0..2], ids(&catalog, &CHACHA20).as_slice());
        assert_eq!(strict.with_3des, strict.default);
        assert_eq!(
            strict.tls13_chacha20_first.as_slice(),
            &[CipherSuite(0x1303), CipherSuite(0x1302)]
        );
    }

    #[test]
    fn lists_follow_injected_catalog() {
        let catalog = catalog()
            .with_suite(KnownSuite::EcdheRsaChaCha20Poly1305, CipherSuite(0xfe01))
            .unwrap();
        let list = build_preference_list(
            &catalog,
            PreferencePolicy {
                chacha20_first: true,
                include_3des: false,
            },
        );
        assert_eq!(list[1], CipherSuite(0xfe01));
        assert!(!list.contains(CipherSuite(0xcca8)));
    }

    #[test]
    fn from_suites_drops_repeats() {
        let list = PreferenceList::from_suites([CipherSuite(1), CipherSuite(2), CipherSuite(1)]);
        assert_eq!(list.as_slice(), &[CipherSuite(1), CipherSuite(2)]);
    }
}
