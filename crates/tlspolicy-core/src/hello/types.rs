use crate::catalog::{CipherSuite, ProtocolVersion};

/// Decoded ClientHello fields relevant to suite and version policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHello {
    /// Legacy version field from the ClientHello body (e.g., 0x0303 for TLS 1.2)
    pub legacy_version: ProtocolVersion,
    /// Offered cipher suites in client preference order, GREASE removed
    pub offered_suites: Vec<CipherSuite>,
    /// Versions the client supports, GREASE removed
    pub supported_versions: Vec<ProtocolVersion>,
    /// Server Name Indication
    pub server_name: Option<String>,
}

impl ClientHello {
    /// Borrow the policy view of this hello.
    pub fn signal(&self) -> ClientHelloSignal<'_> {
        ClientHelloSignal {
            offered_suites: &self.offered_suites,
            supported_versions: &self.supported_versions,
        }
    }
}

/// Read-only view of one connection attempt.
///
/// `offered_suites[0]` is the client's most preferred suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientHelloSignal<'a> {
    pub offered_suites: &'a [CipherSuite],
    pub supported_versions: &'a [ProtocolVersion],
}

impl<'a> ClientHelloSignal<'a> {
    pub fn new(offered_suites: &'a [CipherSuite], supported_versions: &'a [ProtocolVersion]) -> Self {
        Self {
            offered_suites,
            supported_versions,
        }
    }
}
