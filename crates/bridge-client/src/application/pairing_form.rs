//! Input state of the pairing page.
//!
//! Mirrors the text field: at most six characters can be typed, and the
//! submit button is only enabled when exactly six are present.  The form
//! does not talk to the bridge; the shell passes [`PairingForm::code`] to
//! `AuthService::submit_pairing_code`.

use bridge_core::domain::session::PAIRING_CODE_LEN;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingForm {
    code: String,
}

impl PairingForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the field content, keeping at most six characters.
    pub fn set_code(&mut self, input: &str) {
        self.code = input.chars().take(PAIRING_CODE_LEN).collect();
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn can_submit(&self) -> bool {
        self.code.chars().count() == PAIRING_CODE_LEN
    }

    pub fn clear(&mut self) {
        self.code.clear();
    }
}
