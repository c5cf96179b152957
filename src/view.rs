// Copyright (c) 2024 PostFinance AG
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::config::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use crate::password::CharacterClass;
use crate::widget::PasswordWidget;

pub(crate) const COPY_LABEL: &str = "[Copy]";
pub(crate) const COPIED_LABEL: &str = "[Copied]";

/// Renders the form and the password list as plain text.
pub(crate) fn render(widget: &PasswordWidget) -> String {
    let values = widget.values();
    let mut out = String::from("Password generator\n");

    out.push_str(&format!(
        "Length: {} ({MIN_PASSWORD_LENGTH}-{MAX_PASSWORD_LENGTH})\n",
        values.password_length.get()
    ));
    for class in CharacterClass::ALL {
        let mark = if values.is_enabled(class) { 'x' } else { ' ' };
        out.push_str(&format!("[{mark}] {}\n", class.label()));
    }
    out.push_str("[Generate]\n\n");

    for (position, password) in widget.passwords().iter().enumerate() {
        let button = if widget.is_copied(password) {
            COPIED_LABEL
        } else {
            COPY_LABEL
        };
        out.push_str(&format!("{}. {password} {button}\n", position + 1));
    }

    if let Some(notice) = widget.notice() {
        out.push_str(&format!("\n! {notice}\n"));
    }

    out
}
