//! The pairing page.

use std::fmt::Write;

use bridge_client::application::auth::AuthSnapshot;
use bridge_client::application::pairing_form::PairingForm;
use bridge_core::domain::session::PAIRING_CODE_LEN;

pub fn render(form: &PairingForm, auth: &AuthSnapshot) -> String {
    let mut out = String::from("Pair with the bridge\n\n");
    out.push_str("1. Type `request-code` to show a code on the bridge screen.\n");
    out.push_str("2. Type `code <code>` to enter it, then `submit`.\n\n");

    let _ = writeln!(out, "Code:   [{}]", code_cells(form.code()));
    let submit = if form.can_submit() {
        "enabled"
    } else {
        "disabled"
    };
    let _ = writeln!(out, "Submit: {submit}");

    if let Some(error) = &auth.error_message {
        let _ = writeln!(out, "\nError: {error}");
    }
    out
}

/// `123` becomes `1 2 3 _ _ _`.
fn code_cells(code: &str) -> String {
    let missing = PAIRING_CODE_LEN.saturating_sub(code.chars().count());
    code.chars()
        .map(|c| c.to_string())
        .chain(std::iter::repeat("_".to_string()).take(missing))
        .collect::<Vec<_>>()
        .join(" ")
}
