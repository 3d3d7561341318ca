//! Mobile navigation menu visibility.

use serde::Serialize;

/// Open/closed state of the mobile navigation dropdown.
///
/// The hamburger icon shows while closed and the close (X) icon while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MenuVisibility {
    open: bool,
}

impl MenuVisibility {
    #[must_use]
    pub const fn new() -> Self {
        Self { open: false }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Hamburger button pressed.
    pub const fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// X icon, a menu link, or a click outside the menu.
    pub const fn close(&mut self) {
        self.open = false;
    }

    /// Escape key. Returns whether the menu was closed by it.
    pub const fn handle_escape(&mut self) -> bool {
        let was_open = self.open;
        self.open = false;
        was_open
    }
}
