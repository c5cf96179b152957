// Copyright (c) 2024 PostFinance AG
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use log::{debug, info};
use std::io::Write;
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::password::{CharacterClass, UnknownCharacterClass};
use crate::view::render;
use crate::widget::PasswordWidget;

pub(crate) const HELP: &str = "\
Commands:
  length <n>        set the password length (8-32)
  toggle <class>    flip a character class (lower, upper, digits, special)
  enable <class>    enable a character class
  disable <class>   disable a character class
  generate          generate a new batch
  copy <n>          copy password n to the clipboard
  show              redraw the form
  help              show this message
  quit              leave";

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Length(i64),
    Toggle(CharacterClass),
    Set(CharacterClass, bool),
    Generate,
    Copy(usize),
    Show,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub(crate) enum CommandError {
    #[error("Unknown command '{0}' - type 'help' for a list of commands")]
    Unknown(String),
    #[error("'{0}' expects an argument")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("'{0}' is not a valid position")]
    InvalidPosition(String),
    #[error(transparent)]
    Class(#[from] UnknownCharacterClass),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(Command::Show);
        };
        let argument = words.next();

        let number = |command: &'static str| -> Result<i64, CommandError> {
            let value = argument.ok_or(CommandError::MissingArgument(command))?;
            // Integers beyond i64 saturate and are clamped by the form like any other
            value.parse().or_else(|e: ParseIntError| match e.kind() {
                IntErrorKind::PosOverflow => Ok(i64::MAX),
                IntErrorKind::NegOverflow => Ok(i64::MIN),
                _ => Err(CommandError::NotANumber(value.to_string())),
            })
        };
        let class = |command: &'static str| -> Result<CharacterClass, CommandError> {
            Ok(argument
                .ok_or(CommandError::MissingArgument(command))?
                .parse::<CharacterClass>()?)
        };

        match name.to_ascii_lowercase().as_str() {
            "length" | "len" => Ok(Command::Length(number("length")?)),
            "toggle" => Ok(Command::Toggle(class("toggle")?)),
            "enable" => Ok(Command::Set(class("enable")?, true)),
            "disable" => Ok(Command::Set(class("disable")?, false)),
            "generate" | "gen" => Ok(Command::Generate),
            "copy" => {
                let value = argument.ok_or(CommandError::MissingArgument("copy"))?;
                let position = value
                    .parse()
                    .map_err(|_| CommandError::InvalidPosition(value.to_string()))?;
                Ok(Command::Copy(position))
            }
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Drives the widget from line commands until `quit` or end of input.
///
/// The form is redrawn after every command and whenever a copy marker expires.
pub(crate) async fn run<R, W>(
    mut widget: PasswordWidget,
    input: R,
    output: &mut W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    write!(output, "{}", render(&widget))?;
    output.flush()?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    break;
                };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => writeln!(output, "{HELP}")?,
                    Ok(command) => {
                        apply(&mut widget, command);
                        write!(output, "{}", render(&widget))?;
                    }
                    Err(e) => writeln!(output, "! {e}")?,
                }
            }
            Some(password) = widget.copy_reverted() => {
                debug!("Copy marker expired for one password");
                if widget.passwords().iter().any(|p| p == password) {
                    write!(output, "{}", render(&widget))?;
                }
            }
        }
        output.flush()?;
    }

    info!("Leaving interactive session");
    widget.teardown();
    Ok(())
}

fn apply(widget: &mut PasswordWidget, command: Command) {
    let result = match command {
        Command::Length(value) => widget.set_length(value),
        Command::Toggle(class) => widget.toggle_class(class),
        Command::Set(class, enabled) => widget.set_class(class, enabled),
        Command::Generate => widget.submit(),
        Command::Copy(position) => widget.copy(position),
        Command::Show | Command::Help | Command::Quit => Ok(()),
    };

    if let Err(e) = result {
        widget.report(&e);
    }
}
