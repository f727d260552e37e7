//! Index data model: identities, records, and per-package fragments.

mod fragment;
mod path;
mod record;

pub use fragment::Fragment;
pub use path::{ItemPath, PackageId};
pub use record::{ImplementorRecord, ItemKind};
