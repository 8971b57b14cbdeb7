// Library exports for the biopsies-extractor crate
// This allows tests and the binary to use the modules

pub mod attachment_writer;
pub mod config;
pub mod destination;
pub mod error;
pub mod gmail_client;
pub mod mail;
pub mod pipeline;

// Subject line decomposition (identifier + category)
pub mod subject;
