// Copyright (c) 2024 PostFinance AG
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::password::CharacterClass;

pub(crate) const MIN_PASSWORD_LENGTH: u8 = 8;
pub(crate) const MAX_PASSWORD_LENGTH: u8 = 32;
pub(crate) const DEFAULT_PASSWORD_LENGTH: u8 = 16;

#[derive(Error, Debug, PartialEq, Eq)]
pub(crate) enum ConfigError {
    #[error(
        "Password length {0} is outside of the allowed range {min}..={max}",
        min = MIN_PASSWORD_LENGTH,
        max = MAX_PASSWORD_LENGTH
    )]
    OutOfRangeLength(i64),
    #[error("At least one character class must be enabled")]
    NoCharacterClass,
}

#[derive(Error, Debug)]
pub(crate) enum LoadError {
    #[error("Failed to read configuration file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse configuration: {0}")]
    Deserialize(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// A password length that is known to be within bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub(crate) struct PasswordLength(u8);

impl PasswordLength {
    pub(crate) fn new(value: i64) -> Result<PasswordLength, ConfigError> {
        if value < i64::from(MIN_PASSWORD_LENGTH) || value > i64::from(MAX_PASSWORD_LENGTH) {
            return Err(ConfigError::OutOfRangeLength(value));
        }
        Ok(PasswordLength(value as u8))
    }

    /// Coerces any value into bounds, the way a range input does.
    pub(crate) fn clamped(value: i64) -> PasswordLength {
        let value = value.clamp(
            i64::from(MIN_PASSWORD_LENGTH),
            i64::from(MAX_PASSWORD_LENGTH),
        );
        PasswordLength(value as u8)
    }

    pub(crate) fn get(self) -> usize {
        usize::from(self.0)
    }
}

impl Default for PasswordLength {
    fn default() -> Self {
        PasswordLength(DEFAULT_PASSWORD_LENGTH)
    }
}

impl TryFrom<i64> for PasswordLength {
    type Error = ConfigError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        PasswordLength::new(value)
    }
}

impl From<PasswordLength> for u8 {
    fn from(length: PasswordLength) -> Self {
        length.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PasswordConfig {
    pub(crate) password_length: PasswordLength,
    pub(crate) use_lower_case: bool,
    pub(crate) use_upper_case: bool,
    pub(crate) use_digits: bool,
    pub(crate) use_special: bool,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        PasswordConfig {
            password_length: PasswordLength::default(),
            use_lower_case: true,
            use_upper_case: true,
            use_digits: true,
            use_special: false,
        }
    }
}

impl PasswordConfig {
    pub(crate) fn is_enabled(&self, class: CharacterClass) -> bool {
        match class {
            CharacterClass::LowerCase => self.use_lower_case,
            CharacterClass::UpperCase => self.use_upper_case,
            CharacterClass::Digits => self.use_digits,
            CharacterClass::Special => self.use_special,
        }
    }

    pub(crate) fn set_enabled(&mut self, class: CharacterClass, enabled: bool) {
        let flag = match class {
            CharacterClass::LowerCase => &mut self.use_lower_case,
            CharacterClass::UpperCase => &mut self.use_upper_case,
            CharacterClass::Digits => &mut self.use_digits,
            CharacterClass::Special => &mut self.use_special,
        };
        *flag = enabled;
    }

    /// Enabled classes in alphabet order.
    pub(crate) fn enabled_classes(&self) -> impl Iterator<Item = CharacterClass> + '_ {
        CharacterClass::ALL
            .into_iter()
            .filter(|class| self.is_enabled(*class))
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled_classes().next().is_none() {
            return Err(ConfigError::NoCharacterClass);
        }
        Ok(())
    }
}

/// Initial form values requested on the command line, layered over a preset.
#[derive(Debug, Default)]
pub(crate) struct ConfigOverrides {
    pub(crate) password_length: Option<u8>,
    pub(crate) use_lower_case: Option<bool>,
    pub(crate) use_upper_case: Option<bool>,
    pub(crate) use_digits: Option<bool>,
    pub(crate) use_special: Option<bool>,
}

impl ConfigOverrides {
    pub(crate) fn apply(&self, mut config: PasswordConfig) -> Result<PasswordConfig, ConfigError> {
        if let Some(length) = self.password_length {
            config.password_length = PasswordLength::new(i64::from(length))?;
        }

        let flags = [
            (CharacterClass::LowerCase, self.use_lower_case),
            (CharacterClass::UpperCase, self.use_upper_case),
            (CharacterClass::Digits, self.use_digits),
            (CharacterClass::Special, self.use_special),
        ];
        for (class, enabled) in flags {
            if let Some(enabled) = enabled {
                config.set_enabled(class, enabled);
            }
        }

        config.validate()?;
        Ok(config)
    }
}

pub(crate) fn read_config(config_path: &Path) -> Result<PasswordConfig, LoadError> {
    let path_string = config_path.display().to_string();
    debug!("Reading preset at: {path_string}");

    let config_data = std::fs::read_to_string(config_path).map_err(|source| LoadError::ReadFile {
        path: path_string,
        source,
    })?;

    let config: PasswordConfig = serde_yaml::from_str(&config_data)?;
    config.validate()?;

    Ok(config)
}

pub(crate) fn resolve_config(
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<PasswordConfig, LoadError> {
    let base = match config_path {
        Some(path) => read_config(path)?,
        None => PasswordConfig::default(),
    };

    Ok(overrides.apply(base)?)
}
