// Copyright (c) 2024 PostFinance AG
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use log::{debug, info, warn};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::clipboard::{Clipboard, ClipboardError};
use crate::config::{ConfigError, PasswordConfig};
use crate::copy_state::{CopyEvent, CopyTracker, COPIED_RESET_DELAY};
use crate::form::{Form, FormEvent, Subscription};
use crate::password::{generate_passwords, CharacterClass, PasswordBatch, PasswordError};

#[derive(Error, Debug)]
pub(crate) enum WidgetError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
    #[error("There is no password at position {0}")]
    NoSuchPassword(usize),
}

/// The password generator form together with its current batch and copy markers.
///
/// The widget subscribes to its own form when mounted and regenerates the whole batch
/// from the current form values on every change or submit.
pub(crate) struct PasswordWidget {
    form: Form,
    subscription: Option<Subscription>,
    form_events: UnboundedReceiver<FormEvent>,
    passwords: PasswordBatch,
    copies: CopyTracker,
    copy_events: UnboundedReceiver<CopyEvent>,
    clipboard: Box<dyn Clipboard>,
    notice: Option<String>,
}

impl PasswordWidget {
    pub(crate) fn mount(
        defaults: PasswordConfig,
        clipboard: Box<dyn Clipboard>,
    ) -> Result<PasswordWidget, WidgetError> {
        let mut form = Form::new(defaults)?;
        let (subscription, form_events) = form.watch();
        let passwords = generate_passwords(&form.values())?;
        let (copies, copy_events) = CopyTracker::new(COPIED_RESET_DELAY);

        info!("Mounted password widget with {defaults:?}");

        Ok(PasswordWidget {
            form,
            subscription: Some(subscription),
            form_events,
            passwords,
            copies,
            copy_events,
            clipboard,
            notice: None,
        })
    }

    pub(crate) fn values(&self) -> PasswordConfig {
        self.form.values()
    }

    pub(crate) fn passwords(&self) -> &PasswordBatch {
        &self.passwords
    }

    pub(crate) fn is_copied(&self, password: &str) -> bool {
        self.copies.is_copied(password)
    }

    /// Message about the last refused or adjusted action, if any.
    pub(crate) fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub(crate) fn set_length(&mut self, value: i64) -> Result<(), WidgetError> {
        let applied = self.form.set_length(value);
        self.notice = (applied.get() as i64 != value).then(|| {
            format!(
                "Length {value} is out of range, using {} instead",
                applied.get()
            )
        });
        self.process_form_events()
    }

    pub(crate) fn set_class(
        &mut self,
        class: CharacterClass,
        enabled: bool,
    ) -> Result<(), WidgetError> {
        self.notice = None;
        self.form.set_class(class, enabled)?;
        self.process_form_events()
    }

    pub(crate) fn toggle_class(&mut self, class: CharacterClass) -> Result<(), WidgetError> {
        self.notice = None;
        self.form.toggle_class(class)?;
        self.process_form_events()
    }

    pub(crate) fn submit(&mut self) -> Result<(), WidgetError> {
        self.notice = None;
        self.form.submit()?;
        self.process_form_events()
    }

    /// Copies the password shown at list `position`, counting from 1.
    pub(crate) fn copy(&mut self, position: usize) -> Result<(), WidgetError> {
        self.notice = None;
        let password = position
            .checked_sub(1)
            .and_then(|index| self.passwords.get(index))
            .ok_or(WidgetError::NoSuchPassword(position))?;

        if let Err(e) = self.copies.copy(self.clipboard.as_mut(), password) {
            warn!("Copy failed: {e}");
            return Err(e.into());
        }
        Ok(())
    }

    /// Waits until a copy marker expires and returns the affected password.
    pub(crate) async fn copy_reverted(&mut self) -> Option<String> {
        self.copy_events
            .recv()
            .await
            .map(|CopyEvent::Reverted(password)| password)
    }

    /// Records an error as the user-visible notice.
    pub(crate) fn report(&mut self, error: &WidgetError) {
        debug!("Reporting: {error}");
        self.notice = Some(error.to_string());
    }

    pub(crate) fn teardown(self) {
        info!("Tearing down password widget");
    }

    fn process_form_events(&mut self) -> Result<(), WidgetError> {
        while let Ok(event) = self.form_events.try_recv() {
            debug!("Handling {event:?}");
            self.passwords = generate_passwords(&self.form.values())?;
        }
        Ok(())
    }
}

impl Drop for PasswordWidget {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.form.unsubscribe(subscription);
        }
        self.copies.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::testing::RecordingClipboard;
    use crate::config::PasswordLength;
    use crate::password::PASSWORDS_PER_BATCH;

    fn mount() -> (PasswordWidget, RecordingClipboard) {
        let clipboard = RecordingClipboard::default();
        let widget =
            PasswordWidget::mount(PasswordConfig::default(), Box::new(clipboard.clone())).unwrap();
        (widget, clipboard)
    }

    fn batch(widget: &PasswordWidget) -> Vec<String> {
        widget.passwords().iter().map(String::from).collect()
    }

    #[test]
    fn mount_generates_default_batch() {
        let (widget, _) = mount();

        assert_eq!(widget.passwords().len(), PASSWORDS_PER_BATCH);
        for password in widget.passwords().iter() {
            assert_eq!(password.len(), 16);
            assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn mount_rejects_empty_alphabet() {
        let defaults = PasswordConfig {
            use_lower_case: false,
            use_upper_case: false,
            use_digits: false,
            use_special: false,
            password_length: PasswordLength::default(),
        };

        let result = PasswordWidget::mount(defaults, Box::new(RecordingClipboard::default()));

        assert!(matches!(
            result,
            Err(WidgetError::Config(ConfigError::NoCharacterClass))
        ));
    }

    #[test]
    fn length_change_regenerates_with_full_snapshot() {
        let (mut widget, _) = mount();
        widget.set_class(CharacterClass::Special, true).unwrap();

        widget.set_length(32).unwrap();

        assert!(widget.notice().is_none());
        for password in widget.passwords().iter() {
            assert_eq!(password.len(), 32);
        }
        assert!(widget.values().use_special);
    }

    #[test]
    fn out_of_range_length_is_clamped_with_notice() {
        let (mut widget, _) = mount();

        widget.set_length(7).unwrap();

        assert_eq!(widget.values().password_length.get(), 8);
        assert!(widget.passwords().iter().all(|p| p.len() == 8));
        assert_eq!(
            widget.notice(),
            Some("Length 7 is out of range, using 8 instead")
        );
    }

    #[test]
    fn enabling_special_extends_alphabet() {
        let (mut widget, _) = mount();
        widget.set_length(32).unwrap();
        let special = CharacterClass::Special.symbols();
        assert!(!widget.passwords().iter().any(|p| p.contains(|c: char| special.contains(c))));
        let before = batch(&widget);

        widget.set_class(CharacterClass::Special, true).unwrap();
        assert!(widget.values().use_special);
        assert_ne!(batch(&widget), before);

        widget.set_class(CharacterClass::LowerCase, false).unwrap();
        widget.set_class(CharacterClass::UpperCase, false).unwrap();
        widget.set_class(CharacterClass::Digits, false).unwrap();

        for password in widget.passwords().iter() {
            assert!(password.chars().all(|c| special.contains(c)));
        }
    }

    #[test]
    fn disabling_last_class_is_refused() {
        let (mut widget, _) = mount();
        widget.set_class(CharacterClass::LowerCase, false).unwrap();
        widget.set_class(CharacterClass::UpperCase, false).unwrap();
        let before = batch(&widget);

        let result = widget.toggle_class(CharacterClass::Digits);

        assert!(matches!(
            result,
            Err(WidgetError::Config(ConfigError::NoCharacterClass))
        ));
        assert!(widget.values().use_digits);
        assert_eq!(batch(&widget), before);
    }

    #[test]
    fn submit_replaces_batch() {
        let (mut widget, _) = mount();
        widget.set_length(32).unwrap();
        let before = batch(&widget);

        widget.submit().unwrap();

        let after = batch(&widget);
        assert_eq!(after.len(), PASSWORDS_PER_BATCH);
        // 62^32 candidates per slot: a collision means the batch was not replaced
        assert_ne!(after, before);
    }

    #[tokio::test(start_paused = true)]
    async fn copy_marks_and_reverts() {
        let (mut widget, clipboard) = mount();
        let first = batch(&widget)[0].clone();

        widget.copy(1).unwrap();

        assert_eq!(*clipboard.writes.borrow(), vec![first.clone()]);
        assert!(widget.is_copied(&first));

        assert_eq!(widget.copy_reverted().await, Some(first.clone()));
        assert!(!widget.is_copied(&first));
    }

    #[tokio::test(start_paused = true)]
    async fn copy_out_of_range_is_reported() {
        let (mut widget, clipboard) = mount();

        let error = widget.copy(PASSWORDS_PER_BATCH + 1).unwrap_err();
        widget.report(&error);

        assert_eq!(widget.notice(), Some("There is no password at position 6"));
        assert!(clipboard.writes.borrow().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn denied_clipboard_does_not_mark() {
        let mut widget = PasswordWidget::mount(
            PasswordConfig::default(),
            Box::new(RecordingClipboard::denied()),
        )
        .unwrap();
        let first = batch(&widget)[0].clone();

        let error = widget.copy(1).unwrap_err();

        assert!(matches!(
            error,
            WidgetError::Clipboard(ClipboardError::Unavailable(_))
        ));
        assert!(!widget.is_copied(&first));
    }
}
