// Copyright (c) 2024 PostFinance AG
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use log::debug;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::config::{ConfigError, PasswordConfig, PasswordLength};
use crate::password::CharacterClass;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Field {
    PasswordLength,
    Class(CharacterClass),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FormEvent {
    Changed(Field),
    Submitted,
}

/// Handle returned by [`Form::watch`]; hand it back to [`Form::unsubscribe`].
#[derive(Debug)]
pub(crate) struct Subscription {
    id: u64,
}

/// Field values of the generator form plus its change watchers.
///
/// Every mutation notifies all watchers, whether or not the value actually changed.
/// A mutation that would leave no character class enabled is refused.
pub(crate) struct Form {
    values: PasswordConfig,
    watchers: Vec<(u64, UnboundedSender<FormEvent>)>,
    next_subscription: u64,
}

impl Form {
    pub(crate) fn new(defaults: PasswordConfig) -> Result<Form, ConfigError> {
        defaults.validate()?;

        Ok(Form {
            values: defaults,
            watchers: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Snapshot of all current field values.
    pub(crate) fn values(&self) -> PasswordConfig {
        self.values
    }

    pub(crate) fn watch(&mut self) -> (Subscription, UnboundedReceiver<FormEvent>) {
        let (tx, rx) = unbounded_channel();
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.watchers.push((id, tx));

        debug!("Form watcher {id} subscribed");
        (Subscription { id }, rx)
    }

    pub(crate) fn unsubscribe(&mut self, subscription: Subscription) {
        self.watchers.retain(|(id, _)| *id != subscription.id);
        debug!("Form watcher {} unsubscribed", subscription.id);
    }

    /// Sets the length, clamping it into bounds. Returns the applied value.
    pub(crate) fn set_length(&mut self, value: i64) -> PasswordLength {
        let length = PasswordLength::clamped(value);
        self.values.password_length = length;
        self.notify(FormEvent::Changed(Field::PasswordLength));
        length
    }

    pub(crate) fn set_class(
        &mut self,
        class: CharacterClass,
        enabled: bool,
    ) -> Result<(), ConfigError> {
        let mut candidate = self.values;
        candidate.set_enabled(class, enabled);
        candidate.validate()?;

        self.values = candidate;
        self.notify(FormEvent::Changed(Field::Class(class)));
        Ok(())
    }

    /// Flips a checkbox. Returns whether the class is now enabled.
    pub(crate) fn toggle_class(&mut self, class: CharacterClass) -> Result<bool, ConfigError> {
        let enabled = !self.values.is_enabled(class);
        self.set_class(class, enabled)?;
        Ok(enabled)
    }

    pub(crate) fn submit(&mut self) -> Result<(), ConfigError> {
        self.values.validate()?;
        self.notify(FormEvent::Submitted);
        Ok(())
    }

    fn notify(&mut self, event: FormEvent) {
        // Drop watchers whose receiver is gone
        self.watchers.retain(|(_, tx)| tx.send(event).is_ok());
    }
}
