//! Decoding of the client's first flight into the signal the policy reads.

pub mod clienthello;
pub mod grease;
pub mod types;

pub use clienthello::{parse_client_hello, ParseError};
pub use types::{ClientHello, ClientHelloSignal};
