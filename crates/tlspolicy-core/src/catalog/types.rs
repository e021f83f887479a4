use std::fmt;

/// A 16-bit cipher suite identifier as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CipherSuite(pub u16);

/// A protocol version identifier. Only the ordering is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtocolVersion(pub u16);

/// A named group (elliptic curve) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurveId(pub u16);

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

/// Cipher suites the policy refers to by role.
///
/// The numeric value of each role is supplied by a [`SuiteCatalog`](super::SuiteCatalog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownSuite {
    EcdheEcdsaChaCha20Poly1305,
    EcdheRsaChaCha20Poly1305,
    EcdheEcdsaAes128GcmSha256,
    EcdheEcdsaAes256GcmSha384,
    EcdheRsaAes128GcmSha256,
    EcdheRsaAes256GcmSha384,
    EcdheEcdsaAes128CbcSha,
    EcdheEcdsaAes256CbcSha,
    EcdheRsaAes128CbcSha,
    EcdheRsaAes256CbcSha,
    RsaAes128GcmSha256,
    RsaAes256GcmSha384,
    RsaAes128CbcSha,
    RsaAes256CbcSha,
    EcdheRsa3DesEdeCbcSha,
    Rsa3DesEdeCbcSha,
    Tls13Aes128GcmSha256,
    Tls13Aes256GcmSha384,
    Tls13ChaCha20Poly1305Sha256,
}

impl KnownSuite {
    pub const COUNT: usize = 19;

    /// Every role, in declaration order.
    pub const ALL: [KnownSuite; Self::COUNT] = [
        Self::EcdheEcdsaChaCha20Poly1305,
        Self::EcdheRsaChaCha20Poly1305,
        Self::EcdheEcdsaAes128GcmSha256,
        Self::EcdheEcdsaAes256GcmSha384,
        Self::EcdheRsaAes128GcmSha256,
        Self::EcdheRsaAes256GcmSha384,
        Self::EcdheEcdsaAes128CbcSha,
        Self::EcdheEcdsaAes256CbcSha,
        Self::EcdheRsaAes128CbcSha,
        Self::EcdheRsaAes256CbcSha,
        Self::RsaAes128GcmSha256,
        Self::RsaAes256GcmSha384,
        Self::RsaAes128CbcSha,
        Self::RsaAes256CbcSha,
        Self::EcdheRsa3DesEdeCbcSha,
        Self::Rsa3DesEdeCbcSha,
        Self::Tls13Aes128GcmSha256,
        Self::Tls13Aes256GcmSha384,
        Self::Tls13ChaCha20Poly1305Sha256,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// IANA registry name.
    pub fn name(self) -> &'static str {
        match self {
            Self::EcdheEcdsaChaCha20Poly1305 => "TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256",
            Self::EcdheRsaChaCha20Poly1305 => "TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256",
            Self::EcdheEcdsaAes128GcmSha256 => "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256",
            Self::EcdheEcdsaAes256GcmSha384 => "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384",
            Self::EcdheRsaAes128GcmSha256 => "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256",
            Self::EcdheRsaAes256GcmSha384 => "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384",
            Self::EcdheEcdsaAes128CbcSha => "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA",
            Self::EcdheEcdsaAes256CbcSha => "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA",
            Self::EcdheRsaAes128CbcSha => "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA",
            Self::EcdheRsaAes256CbcSha => "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA",
            Self::RsaAes128GcmSha256 => "TLS_RSA_WITH_AES_128_GCM_SHA256",
            Self::RsaAes256GcmSha384 => "TLS_RSA_WITH_AES_256_GCM_SHA384",
            Self::RsaAes128CbcSha => "TLS_RSA_WITH_AES_128_CBC_SHA",
            Self::RsaAes256CbcSha => "TLS_RSA_WITH_AES_256_CBC_SHA",
            Self::EcdheRsa3DesEdeCbcSha => "TLS_ECDHE_RSA_WITH_3DES_EDE_CBC_SHA",
            Self::Rsa3DesEdeCbcSha => "TLS_RSA_WITH_3DES_EDE_CBC_SHA",
            Self::Tls13Aes128GcmSha256 => "TLS_AES_128_GCM_SHA256",
            Self::Tls13Aes256GcmSha384 => "TLS_AES_256_GCM_SHA384",
            Self::Tls13ChaCha20Poly1305Sha256 => "TLS_CHACHA20_POLY1305_SHA256",
        }
    }

    /// IANA registry value.
    pub fn iana_id(self) -> CipherSuite {
        CipherSuite(match self {
            Self::EcdheEcdsaChaCha20Poly1305 => 0xcca9,
            Self::EcdheRsaChaCha20Poly1305 => 0xcca8,
            Self::EcdheEcdsaAes128GcmSha256 => 0xc02b,
            Self::EcdheEcdsaAes256GcmSha384 => 0xc02c,
            Self::EcdheRsaAes128GcmSha256 => 0xc02f,
            Self::EcdheRsaAes256GcmSha384 => 0xc030,
            Self::EcdheEcdsaAes128CbcSha => 0xc009,
            Self::EcdheEcdsaAes256CbcSha => 0xc00a,
            Self::EcdheRsaAes128CbcSha => 0xc013,
            Self::EcdheRsaAes256CbcSha => 0xc014,
            Self::RsaAes128GcmSha256 => 0x009c,
            Self::RsaAes256GcmSha384 => 0x009d,
            Self::RsaAes128CbcSha => 0x002f,
            Self::RsaAes256CbcSha => 0x0035,
            Self::EcdheRsa3DesEdeCbcSha => 0xc012,
            Self::Rsa3DesEdeCbcSha => 0x000a,
            Self::Tls13Aes128GcmSha256 => 0x1301,
            Self::Tls13Aes256GcmSha384 => 0x1302,
            Self::Tls13ChaCha20Poly1305Sha256 => 0x1303,
        })
    }
}

/// Protocol versions the policy refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownVersion {
    Ssl30,
    Tls10,
    Tls11,
    Tls12,
    Tls13,
}

impl KnownVersion {
    pub const COUNT: usize = 5;

    pub const ALL: [KnownVersion; Self::COUNT] = [
        Self::Ssl30,
        Self::Tls10,
        Self::Tls11,
        Self::Tls12,
        Self::Tls13,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ssl30 => "SSL3.0",
            Self::Tls10 => "TLS1.0",
            Self::Tls11 => "TLS1.1",
            Self::Tls12 => "TLS1.2",
            Self::Tls13 => "TLS1.3",
        }
    }

    pub fn wire_id(self) -> ProtocolVersion {
        ProtocolVersion(match self {
            Self::Ssl30 => 0x0300,
            Self::Tls10 => 0x0301,
            Self::Tls11 => 0x0302,
            Self::Tls12 => 0x0303,
            Self::Tls13 => 0x0304,
        })
    }
}

/// Named groups the policy refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownCurve {
    X25519,
    P256,
    P384,
    P521,
}

impl KnownCurve {
    pub const COUNT: usize = 4;

    pub const ALL: [KnownCurve; Self::COUNT] = [Self::X25519, Self::P256, Self::P384, Self::P521];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::X25519 => "X25519",
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    pub fn iana_id(self) -> CurveId {
        CurveId(match self {
            Self::X25519 => 0x001d,
            Self::P256 => 0x0017,
            Self::P384 => 0x0018,
            Self::P521 => 0x0019,
        })
    }
}
