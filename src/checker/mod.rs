// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - http: probes external URLs per domain (throttle, retries, backoff)
// - links: sorts page links into external/internal/file and checks them
//
// Link *extraction* lives with the document parser (content::links); this
// module only consumes the extracted links through the hierarchy.
// =============================================================================

pub mod http;
pub mod links;

pub use http::{DomainClient, ProbeResult, ReqwestTransport, Sleeper, TokioSleeper, Transport};
pub use links::{
    check_links, classify_link, BrokenLink, DomainReport, ExternalFailure, LinkKind, LinkReport,
    LinkSets,
};
