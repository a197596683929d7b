//! The process-wide globals table patched by `with_global`.

use std::sync::LazyLock;

use suitewrap_core::Table;

static GLOBALS: LazyLock<Table> = LazyLock::new(Table::new);

/// Shared handle to the process-wide globals table.
///
/// Clones share storage, so writes through any handle are visible to all.
pub fn globals() -> Table {
	GLOBALS.clone()
}
