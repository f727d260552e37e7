use crate::model::ItemPath;

/// Structural contract violations inside a single package's record list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FragmentError {
	/// A record carries an empty capability or implementor path.
	#[error("record {index} has an empty {field} path")]
	EmptyPath { index: usize, field: &'static str },
	/// The same implementor is listed twice for one capability.
	#[error("duplicate implementor: {implementor} already listed for {capability}")]
	DuplicatePair { capability: ItemPath, implementor: ItemPath },
}

/// Errors that invalidate a whole transmission unit.
///
/// Per-package problems never surface here; they are reported as
/// [`crate::unit::Rejection`]s next to the packages that decoded cleanly.
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
	#[error("malformed unit: {0}")]
	Json(#[from] serde_json::Error),

	#[error("malformed unit script at line {line}: {reason}")]
	Script { line: usize, reason: &'static str },
}

/// Handshake misuse on a page context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
	#[error("a registry is already bound to this page context")]
	AlreadyBound,
}

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read config: {0}")]
	Io(#[from] std::io::Error),

	#[error("invalid config: {0}")]
	Toml(#[from] toml::de::Error),
}
