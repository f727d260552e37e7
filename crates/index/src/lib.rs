//! Implementor index for documentation pages.
//!
//! # Purpose
//!
//! Every documented package emits one [`Fragment`] listing the capability (trait)
//! implementations its build discovered. Pages load those fragments independently and
//! in any order; this crate merges them into a [`Registry`] that answers "who implements
//! this capability" for the page being rendered.
//!
//! # Mental Model
//!
//! 1. **Emission:** a producer builds an ordered list of [`ImplementorRecord`]s per package
//!    and ships them inside a [`TransmissionUnit`] (JSON or self-executing script form).
//! 2. **Delivery:** each unit is handed to a [`PageContext`]. If a registry is bound the
//!    fragments are ingested immediately, otherwise they wait in the pending buffer.
//! 3. **Binding:** constructing the registry binds it to the context and drains whatever
//!    arrived early, atomically with respect to further deliveries.
//! 4. **Query:** the renderer calls [`Registry::lookup`] once the page is ready.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`ImplementorRecord`] | Immutable "type implements capability" fact with render metadata. |
//! | [`Fragment`] | One package's complete, emission-ordered record list. |
//! | [`TransmissionUnit`] | Package identity to fragment mapping as delivered to a page. |
//! | [`Registry`] | Snapshot-published merge of all ingested fragments. |
//! | [`PageContext`] | The hook slot and pending buffer handshake. |
//!
//! # Invariants
//!
//! - Must not lose a fragment regardless of delivery order relative to binding.
//!   - Enforced in: [`PageContext::deliver`], [`PageContext::bind`].
//! - Must ingest each delivered fragment once; redelivery for a package overwrites it.
//!   - Enforced in: [`Registry::ingest_all`], [`delivery::PendingBuffer::append`].
//! - Lookup order is fragment ingestion order, then emission order within a fragment.
//!   - Enforced in: [`registry::Snapshot::lookup`].

pub mod config;
pub mod delivery;
pub mod error;
pub mod model;
pub mod registry;
pub mod unit;

pub use config::{LookupStrategy, RegistryConfig};
pub use delivery::{Delivery, DeliveryTarget, PageContext, page};
pub use error::{ConfigError, DeliveryError, FragmentError, UnitError};
pub use model::{Fragment, ImplementorRecord, ItemKind, ItemPath, PackageId};
pub use registry::Registry;
pub use unit::{RejectReason, Rejection, TransmissionUnit, UnitFormat, UnitReport};
