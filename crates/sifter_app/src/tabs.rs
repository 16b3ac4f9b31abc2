//! Tab identity for preference keys and command routing.

use sifter_core::TabId;

/// Resolves the tab the controller is working for. The lookup can fail; a
/// controller without a tab neither sends commands nor touches preferences.
pub trait TabResolver {
    fn active_tab(&self) -> Option<TabId>;
}

/// A resolver pinned to one known tab.
pub struct FixedTab(pub TabId);

impl TabResolver for FixedTab {
    fn active_tab(&self) -> Option<TabId> {
        Some(self.0)
    }
}
