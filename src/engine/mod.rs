//! Connection to the external search engine: line protocol, blocking client,
//! protocol sequencing, and the background worker the UI talks to.

mod client;
#[cfg(test)]
pub(crate) mod fake;
pub mod protocol;
mod session;
mod worker;

pub use client::{EngineClient, EngineTransport, ProcessTransport};
pub use session::{AppliedMove, EngineSession};
pub use worker::{EngineJob, EngineWorker, JobId, JobOutcome, JobSink};
