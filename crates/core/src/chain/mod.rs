//! Certificate chain model and assembly.
//!
//! A stored chain is only an identity (fingerprint + sequence ID). The
//! `ChainAssembler` turns it into the ordered certificate list a CT log
//! expects: the end-entity certificate first, intermediates after it.

mod assembler;
mod types;

pub use assembler::{AssembleError, ChainAssembler, ValidationError};
pub use types::{AssembledChain, CertRecord, CertReport, ChainIdentity, Fingerprint};
