use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use tlspolicy_core::catalog::{Capabilities, CipherSuite, SuiteCatalog};
use tlspolicy_core::hello::parse_client_hello;
use tlspolicy_core::policy::config::{ConfigSnapshot, Profile, Renegotiation};
use tlspolicy_core::policy::preference::PreferenceSet;
use tlspolicy_core::policy::selector::{Selection, Selector};
use tlspolicy_core::policy::template::{default_template_path, load_template_or_default};

#[derive(Parser)]
#[command(name = "tlspolicy-ctl")]
#[command(about = "Inspect the TLS policy: preference lists, snapshots, client classification")]
struct Cli {
    /// Path to the configuration template
    /// [default: ~/.config/tlspolicy/template.json]
    #[arg(long, global = true)]
    template: Option<PathBuf>,

    /// Treat the environment as unable to negotiate TLS 1.3
    #[arg(long, global = true, default_value_t = false)]
    no_tls13: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the published cipher suite preference lists
    Lists {
        /// Print the strict profile's lists instead
        #[arg(long)]
        strict: bool,
    },

    /// Print the default, ChaCha20 and 3DES snapshots for the template as JSON
    Materialize,

    /// Classify a raw ClientHello record and print the selected configuration
    Classify {
        /// File holding the TLS record bytes, starting at the record header
        file: PathBuf,
    },
}

#[derive(Serialize)]
struct SnapshotView {
    cipher_suites: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tls13_cipher_suites: Option<Vec<String>>,
    prefer_server_cipher_suites: bool,
    curve_preferences: Vec<String>,
    min_version: String,
    max_version: String,
    renegotiation: Renegotiation,
    session_resumption: bool,
}

impl SnapshotView {
    fn new(snapshot: &ConfigSnapshot, catalog: &SuiteCatalog) -> Self {
        Self {
            cipher_suites: names(catalog, &snapshot.cipher_suites),
            tls13_cipher_suites: snapshot
                .tls13_cipher_suites
                .as_ref()
                .map(|l| names(catalog, l)),
            prefer_server_cipher_suites: snapshot.prefer_server_cipher_suites,
            curve_preferences: snapshot
                .curve_preferences
                .iter()
                .map(|c| catalog.curve_name(*c))
                .collect(),
            min_version: catalog.version_name(snapshot.min_version),
            max_version: catalog.version_name(snapshot.max_version),
            renegotiation: snapshot.renegotiation,
            session_resumption: snapshot.session_resumption,
        }
    }
}

fn names(catalog: &SuiteCatalog, suites: &[CipherSuite]) -> Vec<String> {
    suites.iter().map(|s| catalog.suite_name(*s)).collect()
}

#[derive(Serialize)]
struct SnapshotViews {
    default: SnapshotView,
    chacha20: SnapshotView,
    three_des: SnapshotView,
}

/// Pretty JSON of the three snapshots, the only thing `materialize` writes to
/// stdout.
fn render_snapshots(selector: &Selector) -> serde_json::Result<String> {
    let snapshots = selector.snapshots();
    let catalog = selector.catalog();
    serde_json::to_string_pretty(&SnapshotViews {
        default: SnapshotView::new(&snapshots.default, catalog),
        chacha20: SnapshotView::new(&snapshots.chacha20, catalog),
        three_des: SnapshotView::new(&snapshots.three_des, catalog),
    })
}

fn print_list(title: &str, catalog: &SuiteCatalog, suites: &[CipherSuite]) {
    println!("{} ({} suites)", title, suites.len());
    for (i, s) in suites.iter().enumerate() {
        println!("  {:>2}. {}  {}", i + 1, s, catalog.suite_name(*s));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let catalog = SuiteCatalog::iana(Capabilities { tls13: !cli.no_tls13 });
    let template_path = cli.template.unwrap_or_else(default_template_path);

    match cli.command {
        Commands::Lists { strict } => {
            let (profile, lists) = if strict {
                (Profile::Strict, PreferenceSet::strict(&catalog))
            } else {
                (Profile::Standard, PreferenceSet::new(&catalog))
            };
            println!("Profile: {:?}", profile);
            print_list("Default", &catalog, &lists.default);
            print_list("ChaCha20 first", &catalog, &lists.chacha20_first);
            print_list("With 3DES", &catalog, &lists.with_3des);
            print_list("TLS 1.3", &catalog, &lists.tls13);
            print_list("TLS 1.3 ChaCha20 first", &catalog, &lists.tls13_chacha20_first);
        }

        Commands::Materialize => {
            let template = load_template_or_default(&template_path, &catalog)
                .with_context(|| format!("Failed to load template {}", template_path.display()))?;
            let selector = Selector::new(catalog, &template);
            println!("{}", render_snapshots(&selector)?);
        }

        Commands::Classify { file } => {
            let template = load_template_or_default(&template_path, &catalog)
                .with_context(|| format!("Failed to load template {}", template_path.display()))?;
            let selector = Selector::new(catalog, &template);

            let raw = std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let hello = parse_client_hello(&raw)
                .with_context(|| format!("Failed to parse ClientHello in {}", file.display()))?;
            let signal = hello.signal();

            println!("Class: {:?}", selector.classify(&signal));
            match selector.select(&signal) {
                Selection::Override(snapshot) => {
                    println!("Selection: override");
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&SnapshotView::new(snapshot, selector.catalog()))?
                    );
                }
                Selection::UseDefault => println!("Selection: use default"),
            }
        }
    }

    Ok(())
}
