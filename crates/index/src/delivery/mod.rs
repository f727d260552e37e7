//! Deferred registration handshake between transmission units and the registry.
//!
//! # Purpose
//!
//! Units load independently of the page code that constructs the [`Registry`], so a
//! unit may run before anyone is listening. Each [`PageContext`] holds two slots:
//!
//! * the hook slot, a [`DeliveryTarget`] that is either [`DeliveryTarget::NoRegistryYet`]
//!   or [`DeliveryTarget::Registry`];
//! * the pending buffer, where fragments wait while no registry is bound.
//!
//! # Protocol
//!
//! 1. [`PageContext::deliver`] inspects the hook slot once. Bound: the unit goes straight
//!    to [`Registry::register_implementors`]. Unbound: its fragments are appended to the
//!    pending buffer.
//! 2. [`PageContext::bind`] fills the hook slot, drains the pending buffer into the
//!    registry in arrival order, and leaves the buffer empty.
//!
//! Both steps run under the context's lock, so no delivery can observe a bound hook with
//! a non-empty buffer. Every delivered fragment ends up ingested exactly once, or is
//! superseded by a later fragment for the same package before ingestion, which leaves
//! the registry in the same state.

use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::config::RegistryConfig;
use crate::error::{DeliveryError, UnitError};
use crate::model::{Fragment, PackageId};
use crate::registry::Registry;
use crate::unit::{TransmissionUnit, UnitFormat};

#[cfg(test)]
mod tests;

/// Contents of the hook slot.
#[derive(Debug, Clone, Default)]
pub enum DeliveryTarget {
	/// Nobody is listening yet; deliveries are buffered.
	#[default]
	NoRegistryYet,
	/// Deliveries go straight to this registry.
	Registry(Arc<Registry>),
}

/// Fragments that arrived before a registry was bound, in arrival order.
#[derive(Debug, Default)]
pub struct PendingBuffer {
	fragments: IndexMap<PackageId, Fragment>,
}

impl PendingBuffer {
	/// Appends a unit's fragments. Earlier entries for other packages are kept; a package
	/// that is already pending is replaced and moves to the end, as a second ingest would.
	pub fn append(&mut self, unit: TransmissionUnit) {
		for (package, fragment) in unit {
			self.fragments.shift_remove(&package);
			self.fragments.insert(package, fragment);
		}
	}

	pub fn len(&self) -> usize {
		self.fragments.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fragments.is_empty()
	}

	pub fn packages(&self) -> impl Iterator<Item = &PackageId> {
		self.fragments.keys()
	}
}

impl IntoIterator for PendingBuffer {
	type Item = (PackageId, Fragment);
	type IntoIter = indexmap::map::IntoIter<PackageId, Fragment>;

	fn into_iter(self) -> Self::IntoIter {
		self.fragments.into_iter()
	}
}

/// Which path a delivery took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
	/// Handed to the bound registry.
	Direct { packages: usize },
	/// Parked in the pending buffer.
	Buffered { packages: usize },
}

#[derive(Debug, Default)]
struct Slots {
	hook: DeliveryTarget,
	pending: PendingBuffer,
}

/// The well-known slots of one page: registration hook plus pending buffer.
///
/// A context lives as long as the page it models and is discarded with it; there is
/// no teardown step.
#[derive(Debug, Default)]
pub struct PageContext {
	slots: Mutex<Slots>,
}

impl PageContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Runs the delivery algorithm for one transmission unit.
	pub fn deliver(&self, unit: TransmissionUnit) -> Delivery {
		let packages = unit.len();
		let mut guard = self.slots.lock();
		let slots = &mut *guard;
		match &slots.hook {
			DeliveryTarget::Registry(registry) => {
				registry.register_implementors(unit);
				Delivery::Direct { packages }
			}
			DeliveryTarget::NoRegistryYet => {
				slots.pending.append(unit);
				tracing::debug!(packages, pending = slots.pending.len(), "buffered implementors until a registry binds");
				Delivery::Buffered { packages }
			}
		}
	}

	/// Decodes an encoded unit and delivers whatever part of it is well formed.
	///
	/// Malformed package entries are logged and skipped; only an unusable unit errors.
	pub fn deliver_encoded(&self, content: &str, format: UnitFormat) -> Result<Delivery, UnitError> {
		let report = format.decode(content)?;
		Ok(self.deliver(report.unit))
	}

	/// Binds `registry` to the hook slot and drains the pending buffer into it.
	///
	/// Returns how many buffered fragments were ingested.
	pub fn bind(&self, registry: Arc<Registry>) -> Result<usize, DeliveryError> {
		let mut guard = self.slots.lock();
		let slots = &mut *guard;
		if matches!(slots.hook, DeliveryTarget::Registry(_)) {
			return Err(DeliveryError::AlreadyBound);
		}

		slots.hook = DeliveryTarget::Registry(Arc::clone(&registry));
		let pending = std::mem::take(&mut slots.pending);
		let drained = pending.len();
		registry.ingest_all(pending);

		tracing::debug!(registry = registry.label(), drained, "registry bound to page");
		Ok(drained)
	}

	/// Constructs a registry from `config` and binds it.
	pub fn init_registry(&self, config: &RegistryConfig) -> Result<Arc<Registry>, DeliveryError> {
		let registry = Arc::new(Registry::new(config));
		self.bind(Arc::clone(&registry))?;
		Ok(registry)
	}

	/// Current contents of the hook slot.
	pub fn target(&self) -> DeliveryTarget {
		self.slots.lock().hook.clone()
	}

	/// The bound registry, if any.
	pub fn registry(&self) -> Option<Arc<Registry>> {
		match &self.slots.lock().hook {
			DeliveryTarget::Registry(registry) => Some(Arc::clone(registry)),
			DeliveryTarget::NoRegistryYet => None,
		}
	}

	/// Number of fragments waiting for a registry.
	pub fn pending_len(&self) -> usize {
		self.slots.lock().pending.len()
	}
}

static PAGE: LazyLock<PageContext> = LazyLock::new(PageContext::new);

/// Process-wide page context for hosts that model a single page per process.
pub fn page() -> &'static PageContext {
	&PAGE
}
