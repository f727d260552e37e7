use std::collections::BTreeSet;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::{Delivery, DeliveryTarget, PageContext};
use crate::config::RegistryConfig;
use crate::error::DeliveryError;
use crate::model::{Fragment, ImplementorRecord, ItemKind};
use crate::registry::Registry;
use crate::unit::{TransmissionUnit, UnitFormat};

fn unit(package: &str, implementors: &[&str]) -> TransmissionUnit {
	let fragment = implementors
		.iter()
		.map(|imp| ImplementorRecord::new("Copy", *imp, ItemKind::Struct))
		.collect::<Fragment>();
	TransmissionUnit::single(package, fragment)
}

fn implementors(registry: &Registry, capability: &str) -> Vec<String> {
	registry
		.lookup(capability)
		.iter()
		.map(|r| r.implementor().to_string())
		.collect()
}

// The only test that touches the process-wide context; it stays unbound until here.
#[test]
fn test_process_wide_page_buffers_until_bound() {
	let context = crate::page();
	assert!(std::ptr::eq(context, crate::page()));
	assert!(matches!(context.target(), DeliveryTarget::NoRegistryYet));

	assert_eq!(context.deliver(unit("global_early", &["Early"])), Delivery::Buffered { packages: 1 });
	let registry = context.init_registry(&RegistryConfig::default()).unwrap();
	assert_eq!(context.pending_len(), 0);
	assert_eq!(context.deliver(unit("global_late", &["Late"])), Delivery::Direct { packages: 1 });

	assert_eq!(implementors(&registry, "Copy"), ["Early", "Late"]);
	assert!(Arc::ptr_eq(&context.registry().unwrap(), &registry));
}

#[test]
fn test_buffered_then_direct() {
	let page = PageContext::new();

	assert_eq!(page.deliver(unit("pkgA", &["Foo"])), Delivery::Buffered { packages: 1 });
	assert_eq!(page.pending_len(), 1);

	let registry = page.init_registry(&RegistryConfig::default()).unwrap();
	assert_eq!(page.pending_len(), 0);

	assert_eq!(page.deliver(unit("pkgB", &["Bar"])), Delivery::Direct { packages: 1 });
	assert_eq!(implementors(&registry, "Copy"), ["Foo", "Bar"]);
}

#[test]
fn test_second_delivery_for_package_wins() {
	let page = PageContext::new();
	let registry = page.init_registry(&RegistryConfig::default()).unwrap();

	page.deliver(unit("pkgA", &["First1", "First2"]));
	page.deliver(unit("pkgA", &["Second"]));

	assert_eq!(implementors(&registry, "Copy"), ["Second"]);
}

#[test]
fn test_pending_buffer_appends_and_last_write_wins() {
	let page = PageContext::new();
	page.deliver(unit("a", &["A1"]));
	page.deliver(unit("b", &["B1"]));
	page.deliver(unit("a", &["A2"]));
	assert_eq!(page.pending_len(), 2);

	let registry = page.init_registry(&RegistryConfig::default()).unwrap();
	assert_eq!(implementors(&registry, "Copy"), ["B1", "A2"]);
}

#[test]
fn test_bind_reports_drained_count() {
	let page = PageContext::new();
	let mut multi = unit("x", &["X"]);
	multi.insert("y".into(), Fragment::new(vec![ImplementorRecord::new("Copy", "Y", ItemKind::Enum)]));
	page.deliver(multi);
	page.deliver(unit("z", &["Z"]));

	let registry = Arc::new(Registry::default());
	assert_eq!(page.bind(Arc::clone(&registry)).unwrap(), 3);
	assert_eq!(implementors(&registry, "Copy"), ["X", "Y", "Z"]);
}

#[test]
fn test_bind_twice_is_rejected() {
	let page = PageContext::new();
	let first = page.init_registry(&RegistryConfig::default()).unwrap();
	let err = page.bind(Arc::new(Registry::default())).unwrap_err();
	assert_eq!(err, DeliveryError::AlreadyBound);

	let bound = page.registry().unwrap();
	assert!(Arc::ptr_eq(&first, &bound));
}

#[test]
fn test_target_states() {
	let page = PageContext::new();
	assert!(matches!(page.target(), DeliveryTarget::NoRegistryYet));
	assert!(page.registry().is_none());

	page.init_registry(&RegistryConfig::default()).unwrap();
	assert!(matches!(page.target(), DeliveryTarget::Registry(_)));
}

#[test]
fn test_deliver_encoded_skips_malformed_packages() {
	let page = PageContext::new();
	let registry = page.init_registry(&RegistryConfig::default()).unwrap();
	let content = r#"{
		"ok": [{"capability":"Copy","implementor":"ok::A","kind":"struct","display":"A"}],
		"broken": "not a list"
	}"#;

	let delivery = page.deliver_encoded(content, UnitFormat::Json).unwrap();
	assert_eq!(delivery, Delivery::Direct { packages: 1 });
	assert_eq!(registry.packages().len(), 1);
	assert_eq!(implementors(&registry, "Copy"), ["ok::A"]);
}

#[test]
fn test_deliver_encoded_script_before_bind() {
	let page = PageContext::new();
	let script = unit("pkg", &["pkg::Ty"]).to_script().unwrap();

	assert_eq!(page.deliver_encoded(&script, UnitFormat::Script).unwrap(), Delivery::Buffered { packages: 1 });
	let registry = page.init_registry(&RegistryConfig::default()).unwrap();
	assert_eq!(implementors(&registry, "Copy"), ["pkg::Ty"]);
}

#[test]
fn test_concurrent_deliveries_around_bind() {
	let page = PageContext::new();
	std::thread::scope(|s| {
		for t in 0..4 {
			let page = &page;
			s.spawn(move || {
				for i in 0..50 {
					page.deliver(unit(&format!("p{t}_{i}"), &[format!("T{t}_{i}").as_str()]));
				}
			});
		}
		s.spawn(|| page.init_registry(&RegistryConfig::default()).unwrap());
	});

	let registry = page.registry().unwrap();
	assert_eq!(page.pending_len(), 0);
	assert_eq!(registry.len(), 200);
	assert_eq!(registry.lookup("Copy").len(), 200);
}

#[derive(Debug, Clone)]
enum Step {
	Deliver(usize),
	Bind,
}

/// A shuffled sequence of deliveries for `n` distinct packages with one bind somewhere.
fn schedule() -> impl Strategy<Value = (usize, Vec<Step>)> {
	(1usize..12).prop_flat_map(|n| {
		(0..=n).prop_flat_map(move |bind_at| {
			Just((0..n).collect::<Vec<_>>()).prop_shuffle().prop_map(move |order| {
				let mut steps: Vec<Step> = order.into_iter().map(Step::Deliver).collect();
				steps.insert(bind_at, Step::Bind);
				(n, steps)
			})
		})
	})
}

fn run(steps: &[Step]) -> (Arc<Registry>, Vec<String>) {
	let page = PageContext::new();
	let mut registry = None;
	let mut delivered = Vec::new();
	for step in steps {
		match step {
			Step::Deliver(i) => {
				page.deliver(unit(&format!("pkg{i}"), &[format!("Ty{i}a").as_str(), format!("Ty{i}b").as_str()]));
				delivered.push(format!("pkg{i}"));
			}
			Step::Bind => registry = Some(page.init_registry(&RegistryConfig::default()).unwrap()),
		}
	}
	(registry.unwrap(), delivered)
}

proptest! {
	#[test]
	fn prop_no_loss_any_interleaving((n, steps) in schedule()) {
		let (registry, delivered) = run(&steps);

		let ingested: BTreeSet<String> = registry.packages().iter().map(ToString::to_string).collect();
		let expected: BTreeSet<String> = (0..n).map(|i| format!("pkg{i}")).collect();
		prop_assert_eq!(ingested, expected);

		// Buffered fragments drain in arrival order and direct ones follow, so lookup
		// order always matches delivery order.
		let expected_order: Vec<String> = delivered
			.iter()
			.flat_map(|pkg| {
				let i = pkg.trim_start_matches("pkg");
				[format!("Ty{i}a"), format!("Ty{i}b")]
			})
			.collect();
		prop_assert_eq!(implementors(&registry, "Copy"), expected_order);
	}

	#[test]
	fn prop_redelivery_leaves_only_latest((n, steps) in schedule()) {
		let (registry, _) = run(&steps);
		let page = PageContext::new();
		page.bind(Arc::clone(&registry)).unwrap();
		for i in 0..n {
			page.deliver(unit(&format!("pkg{i}"), &[format!("Latest{i}").as_str()]));
		}

		let got: BTreeSet<String> = implementors(&registry, "Copy").into_iter().collect();
		let expected: BTreeSet<String> = (0..n).map(|i| format!("Latest{i}")).collect();
		prop_assert_eq!(got, expected);
		prop_assert_eq!(registry.len(), n);
	}
}
