//! Display markup for implementor records.
//!
//! Labels are rendered once at build time and stored in the record; pages insert them
//! verbatim.

use implindex::ItemPath;

use crate::builder::ImplFact;
use crate::links::DocLinks;

/// Renders `impl[<generics>] <a ..>Trait</a> for <a ..>Type</a>[<args>]`.
pub fn impl_label(links: &DocLinks, fact: &ImplFact) -> String {
	let mut out = String::from("impl");
	if let Some(generics) = &fact.generics {
		push_escaped(&mut out, generics);
	}
	out.push(' ');
	anchor(&mut out, "trait", &links.trait_href(&fact.capability), &fact.capability);
	out.push_str(" for ");
	let public = fact.public_path();
	anchor(&mut out, fact.kind.as_str(), &links.type_href(public, fact.kind), public);
	if let Some(args) = &fact.type_args {
		push_escaped(&mut out, args);
	}
	out
}

fn anchor(out: &mut String, class: &str, href: &str, path: &ItemPath) {
	out.push_str("<a class=\"");
	out.push_str(class);
	out.push_str("\" href=\"");
	push_escaped(out, href);
	out.push_str("\" title=\"");
	out.push_str(class);
	out.push(' ');
	push_escaped(out, path.as_str());
	out.push_str("\">");
	push_escaped(out, path.name());
	out.push_str("</a>");
}

/// HTML-escapes text and attribute values.
pub fn push_escaped(out: &mut String, text: &str) {
	for ch in text.chars() {
		match ch {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			_ => out.push(ch),
		}
	}
}
