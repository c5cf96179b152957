use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{ConfigOverrides, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

/// passform - Random password candidates, five at a time.
///
/// Choose a length and the character classes to draw from, get a batch of passwords and copy the one you like.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))] // Require at least one subcommand
#[command(propagate_version = true)] // Display version in subcommand help
pub(crate) struct CliArgs {
    #[clap(subcommand)]
    pub(crate) command: Command,

    /// Log informational messages to stderr.
    #[clap(short, long, global = true)]
    pub(crate) verbose: bool,

    /// Log debug messages to stderr.
    #[clap(short, long, global = true)]
    pub(crate) debug: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Print one batch of passwords and exit.
    ///
    /// The batch is generated from the defaults, an optional preset file and the given flags.
    Generate(GenerateArgs),

    /// Open the password form in the terminal.
    ///
    /// Change the length or character classes, regenerate and copy passwords to the clipboard.
    Interactive(InteractiveArgs),
}

/// Base arguments describing the initial form values.
#[derive(Parser, Debug)]
pub(crate) struct BaseArgs {
    /// Path to a YAML preset with initial form values.
    #[clap(short, long)]
    pub(crate) config_path: Option<std::path::PathBuf>,

    /// Length of every generated password
    #[clap(short, long, value_parser = clap::value_parser!(u8).range(i64::from(MIN_PASSWORD_LENGTH)..=i64::from(MAX_PASSWORD_LENGTH)))]
    pub(crate) length: Option<u8>,

    /// Use lower-case symbols: a-z
    #[clap(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub(crate) lower_case: Option<bool>,

    /// Use upper-case symbols: A-Z
    #[clap(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub(crate) upper_case: Option<bool>,

    /// Use digits: 0-9
    #[clap(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub(crate) digits: Option<bool>,

    /// Use special symbols
    #[clap(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub(crate) special: Option<bool>,
}

impl BaseArgs {
    pub(crate) fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            password_length: self.length,
            use_lower_case: self.lower_case,
            use_upper_case: self.upper_case,
            use_digits: self.digits,
            use_special: self.special,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum OutputFormat {
    /// One password per line
    Text,
    /// The effective configuration and the passwords as JSON
    Json,
}

/// Arguments specific to the `generate` subcommand.
#[derive(Parser, Debug)]
pub(crate) struct GenerateArgs {
    #[clap(flatten)] // Inherit arguments from BaseArgs
    pub(crate) base: BaseArgs,

    /// Output format
    #[clap(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) output: OutputFormat,
}

/// Arguments specific to the `interactive` subcommand.
#[derive(Parser, Debug)]
pub(crate) struct InteractiveArgs {
    #[clap(flatten)] // Inherit arguments from BaseArgs
    pub(crate) base: BaseArgs,
}
