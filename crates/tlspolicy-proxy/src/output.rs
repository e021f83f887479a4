use std::net::SocketAddr;

use serde::Serialize;

use tlspolicy_core::catalog::{CipherSuite, SuiteCatalog};
use tlspolicy_core::hello::ClientHello;
use tlspolicy_core::policy::classify::ClientClass;
use tlspolicy_core::policy::config::ConfigSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Invalid output format '{}'. Expected 'text' or 'json'.", s),
        }
    }
}

/// One handshake decision.
pub struct Decision<'a> {
    pub peer: SocketAddr,
    pub hello: &'a ClientHello,
    pub class: ClientClass,
    pub snapshot: &'a ConfigSnapshot,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    timestamp: String,
    peer: String,
    sni: Option<&'a str>,
    legacy_version: String,
    supported_versions: Vec<String>,
    offered_suites: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_suite: Option<String>,
    class: ClientClass,
    cipher_suites: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tls13_cipher_suites: Option<Vec<String>>,
    min_version: String,
    max_version: String,
}

pub fn print_decision(
    decision: &Decision<'_>,
    catalog: &SuiteCatalog,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print_text(decision, catalog),
        OutputFormat::Json => print_json(decision, catalog)?,
    }
    Ok(())
}

fn suite_names(catalog: &SuiteCatalog, suites: &[CipherSuite]) -> Vec<String> {
    suites.iter().map(|s| catalog.suite_name(*s)).collect()
}

fn print_text(decision: &Decision<'_>, catalog: &SuiteCatalog) {
    let hello = decision.hello;
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Client:     {}", decision.peer);
    println!("  SNI:        {}", hello.server_name.as_deref().unwrap_or("(none)"));
    println!("  TLS ver:    {}", catalog.version_name(hello.legacy_version));
    if !hello.supported_versions.is_empty() {
        let vers: Vec<String> = hello
            .supported_versions
            .iter()
            .map(|v| catalog.version_name(*v))
            .collect();
        println!("  Sup. vers:  {}", vers.join(", "));
    }
    println!("  Ciphers:    {} suites", hello.offered_suites.len());
    if let Some(first) = hello.offered_suites.first() {
        println!("  Preferred:  {}", catalog.suite_name(*first));
    }
    println!("  ──────────────────────────────────────────────────");
    println!("  Class:      {:?}", decision.class);
    println!(
        "  Versions:   {} - {}",
        catalog.version_name(decision.snapshot.min_version),
        catalog.version_name(decision.snapshot.max_version)
    );
    for (i, name) in suite_names(catalog, &decision.snapshot.cipher_suites).iter().enumerate() {
        println!("  {:>2}.        {}", i + 1, name);
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}

/// One NDJSON line for `decision`.
fn json_line(decision: &Decision<'_>, catalog: &SuiteCatalog) -> serde_json::Result<String> {
    let hello = decision.hello;
    let snapshot = decision.snapshot;
    let record = JsonRecord {
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        peer: decision.peer.to_string(),
        sni: hello.server_name.as_deref(),
        legacy_version: catalog.version_name(hello.legacy_version),
        supported_versions: hello
            .supported_versions
            .iter()
            .map(|v| catalog.version_name(*v))
            .collect(),
        offered_suites: hello.offered_suites.len(),
        first_suite: hello.offered_suites.first().map(|s| catalog.suite_name(*s)),
        class: decision.class,
        cipher_suites: suite_names(catalog, &snapshot.cipher_suites),
        tls13_cipher_suites: snapshot
            .tls13_cipher_suites
            .as_ref()
            .map(|l| suite_names(catalog, l)),
        min_version: catalog.version_name(snapshot.min_version),
        max_version: catalog.version_name(snapshot.max_version),
    };

    serde_json::to_string(&record)
}

fn print_json(decision: &Decision<'_>, catalog: &SuiteCatalog) -> anyhow::Result<()> {
    println!("{}", json_line(decision, catalog)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formats() {
        assert_eq!(OutputFormat::parse("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("json").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::parse("yaml").is_err());
    }

    #[test]
    fn json_line_is_a_single_object() {
        use tlspolicy_core::catalog::ProtocolVersion;
        use tlspolicy_core::policy::config::{materialize, ConfigTemplate};

        let catalog = SuiteCatalog::default();
        let snapshots = materialize(&catalog, &ConfigTemplate::default());
        let hello = ClientHello {
            legacy_version: ProtocolVersion(0x0303),
            offered_suites: vec![CipherSuite(0xcca8)],
            supported_versions: vec![ProtocolVersion(0x0304), ProtocolVersion(0x0303)],
            server_name: Some("example.com".into()),
        };
        let decision = Decision {
            peer: "127.0.0.1:50000".parse().unwrap(),
            hello: &hello,
            class: ClientClass::ChaCha20Preferred,
            snapshot: &snapshots.chacha20,
        };

        let line = json_line(&decision, &catalog).unwrap();
        assert!(!line.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["class"], "cha_cha20_preferred");
        assert_eq!(value["sni"], "example.com");
        assert_eq!(value["first_suite"], "TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256");
        assert_eq!(value["supported_versions"][0], "TLS1.3");
    }
}
