//! Producer side of the implementor index.
//!
//! Turns analyzer facts ("type X implements trait Y") into [`implindex::Fragment`]s and
//! writes them as per-capability unit files under `implementors/`, merging with what
//! other packages already wrote there.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`ImplFact`] | One analyzer fact, before rendering. |
//! | [`FragmentBuilder`] | Renders facts into records and enforces the fragment contract. |
//! | [`DocLinks`] | Resolves item paths to documentation hrefs and unit file locations. |
//! | [`UnitWriter`] | Rewrites unit files for one package's fragment. |

pub mod builder;
pub mod config;
pub mod error;
pub mod links;
pub mod render;
pub mod writer;

pub use builder::{FragmentBuilder, ImplFact};
pub use config::EmitConfig;
pub use error::EmitError;
pub use links::DocLinks;
pub use writer::{UnitWriter, WriteReport};
