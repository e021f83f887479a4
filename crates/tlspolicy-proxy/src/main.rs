use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use tlspolicy_core::catalog::{Capabilities, SuiteCatalog};
use tlspolicy_core::hello::parse_client_hello;
use tlspolicy_core::policy::selector::{ReloadableSelector, Selector};
use tlspolicy_core::policy::template::{default_template_path, load_template_or_default};

mod output;

use output::{Decision, OutputFormat};

#[derive(Parser)]
#[command(name = "tlspolicy-proxy")]
#[command(about = "Reads ClientHellos from incoming connections and reports the configuration the policy selects")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8443)]
    port: u16,

    /// Path to the configuration template
    /// [default: ~/.config/tlspolicy/template.json]
    #[arg(long)]
    template: Option<PathBuf>,

    /// Treat the environment as unable to negotiate TLS 1.3
    #[arg(long, default_value_t = false)]
    no_tls13: bool,

    /// Output format: "text" (human-readable) or "json" (NDJSON, one object per line)
    #[arg(short, long, default_value = "text")]
    output: String,
}

const MAX_RECORD_LEN: usize = 16384;

/// Read one TLS handshake record, header included.
async fn read_record<R: AsyncRead + Unpin>(stream: &mut R) -> Result<Vec<u8>> {
    // content_type(1) + version(2) + length(2)
    let mut header = [0u8; 5];
    stream
        .read_exact(&mut header)
        .await
        .context("failed to read TLS header")?;

    if header[0] != 0x16 {
        anyhow::bail!("not a TLS handshake (got 0x{:02x})", header[0]);
    }

    let record_len = u16::from_be_bytes([header[3], header[4]]) as usize;
    if record_len > MAX_RECORD_LEN {
        anyhow::bail!("record too large: {} bytes", record_len);
    }

    let mut record = Vec::with_capacity(header.len() + record_len);
    record.extend_from_slice(&header);
    record.resize(header.len() + record_len, 0);
    stream
        .read_exact(&mut record[header.len()..])
        .await
        .context("failed to read record body")?;
    Ok(record)
}

fn build_selector(path: &Path, catalog: &SuiteCatalog) -> Result<Selector> {
    let template = load_template_or_default(path, catalog)
        .with_context(|| format!("Failed to load template {}", path.display()))?;
    Ok(Selector::new(catalog.clone(), &template))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let format = OutputFormat::parse(&cli.output)?;
    let catalog = SuiteCatalog::iana(Capabilities { tls13: !cli.no_tls13 });
    let template_path = cli.template.unwrap_or_else(default_template_path);
    let selector = Arc::new(ReloadableSelector::new(build_selector(&template_path, &catalog)?));

    #[cfg(unix)]
    {
        let selector = Arc::clone(&selector);
        let catalog = catalog.clone();
        let path = template_path.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            let mut hup = match signal(SignalKind::hangup()) {
                Ok(s) => s,
                Err(e) => {
                    warn!("SIGHUP reload unavailable: {}", e);
                    return;
                }
            };
            while hup.recv().await.is_some() {
                match build_selector(&path, &catalog) {
                    Ok(next) => {
                        selector.reload(next);
                        info!("Reloaded template {}", path.display());
                    }
                    Err(e) => error!("Reload failed, keeping current policy: {:#}", e),
                }
            }
        });
    }

    let addr: SocketAddr = ([0, 0, 0, 0], cli.port).into();
    let listener = TcpListener::bind(addr).await?;

    info!("tlspolicy proxy listening on {}", addr);
    info!("Test with: curl -k https://localhost:{}", cli.port);
    info!("Press Ctrl+C to stop\n");

    loop {
        let (mut stream, peer) = listener.accept().await?;
        let selector = selector.current();

        tokio::spawn(async move {
            let full = match read_record(&mut stream).await {
                Ok(record) => record,
                Err(e) => {
                    warn!("[{}] {:#}", peer, e);
                    return;
                }
            };

            match parse_client_hello(&full) {
                Ok(hello) => {
                    let signal = hello.signal();
                    let class = selector.classify(&signal);
                    let decision = Decision {
                        peer,
                        hello: &hello,
                        class,
                        snapshot: selector.snapshots().for_class(class),
                    };
                    if let Err(e) = output::print_decision(&decision, selector.catalog(), format) {
                        error!("[{}] failed to print decision: {}", peer, e);
                    }
                }
                Err(e) => {
                    error!("[{}] parse error: {}", peer, e);
                }
            }

            // No handshake is completed; the client sees the connection drop.
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(content_type: u8, len: u16, body: &[u8]) -> Vec<u8> {
        let mut raw = vec![content_type, 0x03, 0x01];
        raw.extend_from_slice(&len.to_be_bytes());
        raw.extend_from_slice(body);
        raw
    }

    #[tokio::test]
    async fn reads_exactly_one_record() {
        let mut raw = record(0x16, 3, &[1, 2, 3]);
        raw.extend_from_slice(&[0x17, 0x03]);
        let mut input = raw.as_slice();
        let got = read_record(&mut input).await.unwrap();
        assert_eq!(got, record(0x16, 3, &[1, 2, 3]));
        assert_eq!(input, &[0x17, 0x03]);
    }

    #[tokio::test]
    async fn accepts_maximum_record_length() {
        let body = vec![0u8; MAX_RECORD_LEN];
        let raw = record(0x16, MAX_RECORD_LEN as u16, &body);
        let got = read_record(&mut raw.as_slice()).await.unwrap();
        assert_eq!(got.len(), 5 + MAX_RECORD_LEN);
    }

    #[tokio::test]
    async fn rejects_oversized_record() {
        let raw = record(0x16, MAX_RECORD_LEN as u16 + 1, &[]);
        let err = read_record(&mut raw.as_slice()).await.unwrap_err();
        assert!(err.to_string().contains("record too large"), "{:#}", err);
    }

    #[tokio::test]
    async fn rejects_non_handshake_and_short_body() {
        let raw = record(0x17, 1, &[0]);
        let err = read_record(&mut raw.as_slice()).await.unwrap_err();
        assert!(err.to_string().contains("not a TLS handshake"), "{:#}", err);

        let raw = record(0x16, 8, &[1, 2]);
        let err = read_record(&mut raw.as_slice()).await.unwrap_err();
        assert!(err.to_string().contains("record body"), "{:#}", err);
    }
}
