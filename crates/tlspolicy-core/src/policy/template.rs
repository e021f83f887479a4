use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::catalog::{CatalogError, CipherSuite, SuiteCatalog};
use crate::policy::config::{ConfigTemplate, Profile, Renegotiation};
use crate::policy::PolicyError;

/// On-disk template. Suites, versions and curves are referred to by name
/// (`"TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256"`, `"TLS1.2"`, `"X25519"`) or
/// by `0x`-prefixed hex id.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateFile {
    pub profile: Profile,
    pub cipher_suites: Option<Vec<String>>,
    pub tls13_cipher_suites: Option<Vec<String>>,
    pub prefer_server_cipher_suites: bool,
    pub curve_preferences: Option<Vec<String>>,
    pub min_version: Option<String>,
    pub max_version: Option<String>,
    pub renegotiation: Renegotiation,
    pub session_resumption: Option<bool>,
}

impl TemplateFile {
    pub fn from_json(json: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolve every name against `catalog`.
    pub fn resolve(&self, catalog: &SuiteCatalog) -> Result<ConfigTemplate, PolicyError> {
        let suites = |names: &Option<Vec<String>>| -> Result<Option<Vec<CipherSuite>>, CatalogError> {
            names
                .as_ref()
                .map(|names| names.iter().map(|n| catalog.resolve_suite(n)).collect())
                .transpose()
        };

        Ok(ConfigTemplate {
            profile: self.profile,
            cipher_suites: suites(&self.cipher_suites)?,
            tls13_cipher_suites: suites(&self.tls13_cipher_suites)?,
            prefer_server_cipher_suites: self.prefer_server_cipher_suites,
            curve_preferences: self
                .curve_preferences
                .as_ref()
                .map(|names| {
                    names
                        .iter()
                        .map(|n| catalog.resolve_curve(n))
                        .collect::<Result<Vec<_>, CatalogError>>()
                })
                .transpose()?,
            min_version: self
                .min_version
                .as_deref()
                .map(|n| catalog.resolve_version(n))
                .transpose()?,
            max_version: self
                .max_version
                .as_deref()
                .map(|n| catalog.resolve_version(n))
                .transpose()?,
            renegotiation: self.renegotiation,
            session_resumption: self.session_resumption,
        })
    }
}

/// Load and resolve a JSON template file.
pub fn load_template(path: &Path, catalog: &SuiteCatalog) -> Result<ConfigTemplate, PolicyError> {
    let file = std::fs::File::open(path).map_err(|e| PolicyError::Template {
        path: path.to_path_buf(),
        source: e,
    })?;
    let parsed: TemplateFile = serde_json::from_reader(BufReader::new(file))?;
    info!("loaded template {}", path.display());
    parsed.resolve(catalog)
}

/// Like [`load_template`], but a missing file yields the empty template.
pub fn load_template_or_default(
    path: &Path,
    catalog: &SuiteCatalog,
) -> Result<ConfigTemplate, PolicyError> {
    match load_template(path, catalog) {
        Err(PolicyError::Template { source, .. }) if source.kind() == ErrorKind::NotFound => {
            info!("no template at {}, using policy defaults", path.display());
            Ok(ConfigTemplate::default())
        }
        other => other,
    }
}

/// Default template path: `~/.config/tlspolicy/template.json`
pub fn default_template_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home).join(".config"),
            Err(_) => PathBuf::from("."),
        });
    base.join("tlspolicy/template.json")
}
