//! Handshake-time TLS policy: cipher suite preference lists, client hello
//! classification and per-connection configuration selection.
//!
//! ```
//! use tlspolicy_core::catalog::SuiteCatalog;
//! use tlspolicy_core::hello::ClientHelloSignal;
//! use tlspolicy_core::policy::config::ConfigTemplate;
//! use tlspolicy_core::policy::selector::{Selection, Selector};
//! use tlspolicy_core::catalog::{CipherSuite, ProtocolVersion};
//!
//! let selector = Selector::new(SuiteCatalog::default(), &ConfigTemplate::default());
//! let offered = [CipherSuite(0xcca8)];
//! let versions = [ProtocolVersion(0x0303)];
//! let signal = ClientHelloSignal::new(&offered, &versions);
//! assert!(matches!(selector.select(&signal), Selection::Override(_)));
//! ```

pub mod catalog;
pub mod hello;
pub mod policy;
