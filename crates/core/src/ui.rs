//! Overlay panel visibility.
//!
//! The cart drawer, mobile menu and search overlay are mutually exclusive:
//! opening one closes the other two. The exit-intent popup is tracked
//! independently and never touched by the others.

use serde::Serialize;

/// Which overlays are currently open. Session-scoped, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub is_cart_open: bool,
    pub is_exit_popup_open: bool,
    pub is_mobile_menu_open: bool,
    pub is_search_open: bool,
}

impl UiState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cart drawer to `open`, or flip it when `None`.
    pub fn toggle_cart(&mut self, open: Option<bool>) {
        self.is_cart_open = open.unwrap_or(!self.is_cart_open);
        if self.is_cart_open {
            self.is_mobile_menu_open = false;
            self.is_search_open = false;
        }
    }

    /// Set the mobile menu to `open`, or flip it when `None`.
    pub fn toggle_mobile_menu(&mut self, open: Option<bool>) {
        self.is_mobile_menu_open = open.unwrap_or(!self.is_mobile_menu_open);
        if self.is_mobile_menu_open {
            self.is_cart_open = false;
            self.is_search_open = false;
        }
    }

    /// Set the search overlay to `open`, or flip it when `None`.
    pub fn toggle_search(&mut self, open: Option<bool>) {
        self.is_search_open = open.unwrap_or(!self.is_search_open);
        if self.is_search_open {
            self.is_cart_open = false;
            self.is_mobile_menu_open = false;
        }
    }

    pub const fn show_exit_popup(&mut self, open: bool) {
        self.is_exit_popup_open = open;
    }

    /// Close the cart, mobile menu and search. The exit popup stays as is.
    pub const fn close_all(&mut self) {
        self.is_cart_open = false;
        self.is_mobile_menu_open = false;
        self.is_search_open = false;
    }

    /// Number of panels open within the mutually exclusive trio.
    #[must_use]
    pub fn open_panels(&self) -> usize {
        [self.is_cart_open, self.is_mobile_menu_open, self.is_search_open]
            .into_iter()
            .filter(|open| *open)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_without_argument() {
        let mut ui = UiState::new();
        ui.toggle_cart(None);
        assert!(ui.is_cart_open);
        ui.toggle_cart(None);
        assert!(!ui.is_cart_open);
    }

    #[test]
    fn test_opening_one_closes_the_others() {
        let mut ui = UiState::new();
        ui.toggle_cart(Some(true));
        ui.toggle_search(Some(true));
        assert!(ui.is_search_open);
        assert!(!ui.is_cart_open);

        ui.toggle_mobile_menu(None);
        assert!(ui.is_mobile_menu_open);
        assert!(!ui.is_search_open);
        assert_eq!(ui.open_panels(), 1);
    }

    #[test]
    fn test_closing_leaves_others_alone() {
        let mut ui = UiState::new();
        ui.toggle_search(Some(true));
        ui.toggle_cart(Some(false));
        assert!(ui.is_search_open);
    }

    #[test]
    fn test_exit_popup_is_independent() {
        let mut ui = UiState::new();
        ui.show_exit_popup(true);
        ui.toggle_cart(Some(true));
        ui.toggle_search(Some(true));
        ui.toggle_mobile_menu(Some(true));
        assert!(ui.is_exit_popup_open);

        ui.close_all();
        assert_eq!(ui.open_panels(), 0);
        assert!(ui.is_exit_popup_open);
    }

    #[test]
    fn test_every_action_sequence_keeps_at_most_one_panel_open() {
        let mut ui = UiState::new();
        let actions: [fn(&mut UiState); 6] = [
            |ui| ui.toggle_cart(None),
            |ui| ui.toggle_search(Some(true)),
            |ui| ui.toggle_mobile_menu(None),
            |ui| ui.show_exit_popup(true),
            |ui| ui.toggle_cart(Some(true)),
            UiState::close_all,
        ];
        for round in 0..36 {
            actions[round % 6](&mut ui);
            actions[(round * 5 + 1) % 6](&mut ui);
            assert!(ui.open_panels() <= 1);
        }
    }
}
