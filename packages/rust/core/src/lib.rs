//! Answer pipeline orchestration and chat handling for planbot.
//!
//! This crate ties the extracted corpus, the Gemini client, and the
//! segmenter together into the per-question flow: route → prompt →
//! generate → segment → deliver.

pub mod context;
pub mod delivery;
pub mod pipeline;
pub mod router;

pub use context::AppContext;
pub use delivery::{ChatTransport, DeliveryOptions, deliver};
pub use router::{Incoming, handle_message, route};
