//! Quote-builder core for TV mounting jobs: the selection under construction,
//! the committed cart, catalog pricing, the rendered summary, and the
//! write-through session that persists it all.

pub mod cart;
pub mod format;
pub mod persistence;
pub mod pricing;
pub mod reducer;
pub mod selection;
pub mod session;
pub mod submission;
pub mod validation;
pub mod view;

pub use cart::{Committed, Proceeded, QuoteCart, QuoteState};
pub use persistence::{KeyValueStore, MemoryStore, PersistenceAdapter};
pub use reducer::{reduce, Action};
pub use selection::Selection;
pub use session::QuoteSession;
pub use submission::{IntakeClient, MediaHost, MissingQuoteSubmitter, QuoteSubmitter};
pub use view::QuoteView;
