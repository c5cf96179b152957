// Copyright (c) 2024 PostFinance AG
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use log::trace;
use rand::Rng;
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;

use crate::config::PasswordConfig;

/// Number of candidates produced by every generation.
pub(crate) const PASSWORDS_PER_BATCH: usize = 5;

const LOWER_CASE_SYMBOLS: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPER_CASE_SYMBOLS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGIT_SYMBOLS: &str = "0123456789";
const SPECIAL_SYMBOLS: &str = r"!@#$%^&*()_+=-|\/{}[]<>";

#[derive(Error, Debug, PartialEq, Eq)]
pub(crate) enum PasswordError {
    #[error("Cannot generate passwords without any enabled character class")]
    EmptyAlphabet,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown character class '{0}' - expected one of: lower, upper, digits, special")]
pub(crate) struct UnknownCharacterClass(String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum CharacterClass {
    LowerCase,
    UpperCase,
    Digits,
    Special,
}

impl CharacterClass {
    /// Concatenation order of the alphabet.
    pub(crate) const ALL: [CharacterClass; 4] = [
        CharacterClass::LowerCase,
        CharacterClass::UpperCase,
        CharacterClass::Digits,
        CharacterClass::Special,
    ];

    pub(crate) fn symbols(self) -> &'static str {
        match self {
            CharacterClass::LowerCase => LOWER_CASE_SYMBOLS,
            CharacterClass::UpperCase => UPPER_CASE_SYMBOLS,
            CharacterClass::Digits => DIGIT_SYMBOLS,
            CharacterClass::Special => SPECIAL_SYMBOLS,
        }
    }

    pub(crate) fn label(self) -> String {
        match self {
            CharacterClass::LowerCase => String::from("Lower-case symbols: a-z"),
            CharacterClass::UpperCase => String::from("Upper-case symbols: A-Z"),
            CharacterClass::Digits => String::from("Digits: 0-9"),
            CharacterClass::Special => format!("Special symbols: {SPECIAL_SYMBOLS}"),
        }
    }
}

impl FromStr for CharacterClass {
    type Err = UnknownCharacterClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lower" | "lowercase" | "lower-case" => Ok(CharacterClass::LowerCase),
            "upper" | "uppercase" | "upper-case" => Ok(CharacterClass::UpperCase),
            "digit" | "digits" => Ok(CharacterClass::Digits),
            "special" | "symbols" => Ok(CharacterClass::Special),
            _ => Err(UnknownCharacterClass(s.to_string())),
        }
    }
}

/// Symbols eligible for sampling. Never empty.
#[derive(Debug)]
pub(crate) struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    pub(crate) fn for_config(config: &PasswordConfig) -> Result<Alphabet, PasswordError> {
        let symbols: Vec<char> = config
            .enabled_classes()
            .flat_map(|class| class.symbols().chars())
            .collect();

        if symbols.is_empty() {
            return Err(PasswordError::EmptyAlphabet);
        }

        Ok(Alphabet { symbols })
    }

    fn sample_string<R: Rng + ?Sized>(&self, rng: &mut R, length: usize) -> String {
        (0..length)
            .map(|_| self.symbols[rng.random_range(0..self.symbols.len())])
            .collect()
    }
}

/// One full set of password candidates, always replaced as a whole.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub(crate) struct PasswordBatch(Vec<String>);

impl PasswordBatch {
    pub(crate) fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

pub(crate) fn generate_passwords(config: &PasswordConfig) -> Result<PasswordBatch, PasswordError> {
    trace!("Generating {PASSWORDS_PER_BATCH} random passwords for {config:?}");

    let alphabet = Alphabet::for_config(config)?;
    let length = config.password_length.get();

    let mut rng = rand::rng();
    let passwords = (0..PASSWORDS_PER_BATCH)
        .map(|_| alphabet.sample_string(&mut rng, length))
        .collect();

    Ok(PasswordBatch(passwords))
}
