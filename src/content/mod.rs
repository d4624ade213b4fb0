// src/content/mod.rs
// =============================================================================
// Everything about a single document: reading it and judging it.
//
// Sub-modules, leaf first:
// - front_matter: `+++` block splitting and key/value reading
// - sections:     body -> named sections
// - shortcode:    time / badge / youtube markers -> videos
// - body:         Default / Index / Practice bodies and state derivation
// - slug:         title -> expected slug
// - links:        link destinations with their positions
// - document:     all of the above glued into a `Content`
// =============================================================================

pub mod body;
pub mod document;
pub mod front_matter;
pub mod links;
pub mod sections;
pub mod shortcode;
pub mod slug;

pub use body::{Body, DefaultBody, IndexBody, PracticeBody, State};
pub use document::{parse_document, Content};
pub use links::{LinkPosition, Links};
pub use sections::{Section, Sections};
