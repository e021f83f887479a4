use tls_parser::nom::Err as NomErr;
use tls_parser::{
    parse_tls_extensions, parse_tls_plaintext, TlsExtension, TlsMessage, TlsMessageHandshake,
    TlsRecordType,
};

use crate::catalog::{CipherSuite, KnownVersion, ProtocolVersion};
use crate::hello::grease::strip_grease;
use crate::hello::types::ClientHello;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("not enough data: need at least {0} bytes")]
    NotEnoughData(usize),
    #[error("not a TLS handshake record")]
    NotHandshake,
    #[error("not a ClientHello message")]
    NotClientHello,
    #[error("TLS parse error: {0}")]
    TlsParseError(String),
}

/// Parse raw bytes from a TCP stream into a `ClientHello`.
///
/// The input should be the raw bytes peeked from a TCP connection,
/// starting with the TLS record header.
pub fn parse_client_hello(raw: &[u8]) -> Result<ClientHello, ParseError> {
    if raw.len() < 5 {
        return Err(ParseError::NotEnoughData(5));
    }

    // Content type 0x16
    if raw[0] != 0x16 {
        return Err(ParseError::NotHandshake);
    }

    let (_, record) = parse_tls_plaintext(raw).map_err(|e| match e {
        NomErr::Incomplete(needed) => {
            let n = match needed {
                tls_parser::nom::Needed::Size(s) => s.get(),
                tls_parser::nom::Needed::Unknown => 0,
            };
            ParseError::NotEnoughData(raw.len() + n)
        }
        _ => ParseError::TlsParseError(format!("{}", e)),
    })?;

    if record.hdr.record_type != TlsRecordType::Handshake {
        return Err(ParseError::NotHandshake);
    }

    for msg in &record.msg {
        if let TlsMessage::Handshake(TlsMessageHandshake::ClientHello(ch)) = msg {
            let legacy_version = ProtocolVersion(ch.version.0);
            let mut hello = ClientHello {
                legacy_version,
                offered_suites: strip_grease(ch.ciphers.iter().map(|c| c.0), CipherSuite),
                supported_versions: Vec::new(),
                server_name: None,
            };
            let mut saw_supported_versions = false;

            if let Some(ext_data) = ch.ext {
                let (_, extensions) = parse_tls_extensions(ext_data)
                    .map_err(|e| ParseError::TlsParseError(format!("extensions: {}", e)))?;
                for ext in &extensions {
                    match ext {
                        TlsExtension::SNI(sni_list) => {
                            for (_, name_bytes) in sni_list {
                                if let Ok(name) = std::str::from_utf8(name_bytes) {
                                    hello.server_name = Some(name.to_string());
                                }
                            }
                        }
                        TlsExtension::SupportedVersions(versions) => {
                            saw_supported_versions = true;
                            hello.supported_versions =
                                strip_grease(versions.iter().map(|v| v.0), ProtocolVersion);
                        }
                        _ => {}
                    }
                }
            }

            if !saw_supported_versions {
                hello.supported_versions = versions_up_to(legacy_version);
            }

            return Ok(hello);
        }
    }

    Err(ParseError::NotClientHello)
}

/// Clients without the supported_versions extension support every version
/// up to the one in the legacy version field.
fn versions_up_to(max: ProtocolVersion) -> Vec<ProtocolVersion> {
    KnownVersion::ALL
        .into_iter()
        .map(KnownVersion::wire_id)
        .filter(|v| *v <= max)
        .collect()
}
