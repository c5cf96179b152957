// Copyright (c) 2024 PostFinance AG
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use clap::Parser;
use env_logger::Env;
use log::{debug, error};
use serde_json::json;
use tokio::io::BufReader;
use tokio::runtime::Builder;

use crate::cli::{BaseArgs, CliArgs, Command, GenerateArgs, InteractiveArgs, OutputFormat};
use crate::clipboard::SystemClipboard;
use crate::config::{resolve_config, PasswordConfig};
use crate::widget::PasswordWidget;

mod cli;
mod clipboard;
mod config;
mod copy_state;
mod form;
mod password;
mod session;
mod view;
mod widget;

fn main() {
    let args: CliArgs = CliArgs::parse();

    let default_filter = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    debug!("Running with {args:?}");

    match args.command {
        Command::Generate(generate_args) => generate(generate_args),
        Command::Interactive(interactive_args) => interactive(interactive_args),
    }
}

fn load_config(base: &BaseArgs) -> PasswordConfig {
    resolve_config(base.config_path.as_deref(), &base.overrides()).unwrap_or_else(|e| {
        error!("{e}");
        eprintln!("🛑 {e}");
        std::process::exit(1);
    })
}

fn mount(config: PasswordConfig) -> PasswordWidget {
    PasswordWidget::mount(config, Box::new(SystemClipboard::default())).unwrap_or_else(|e| {
        eprintln!("🛑 Failed to set up the password form: {e}");
        std::process::exit(1);
    })
}

fn generate(generate_args: GenerateArgs) {
    let config = load_config(&generate_args.base);
    let widget = mount(config);

    match generate_args.output {
        OutputFormat::Text => {
            for password in widget.passwords().iter() {
                println!("{password}");
            }
        }
        OutputFormat::Json => {
            let document = json!({
                "config": widget.values(),
                "passwords": widget.passwords(),
            });
            println!("{document:#}");
        }
    }

    widget.teardown();
}

fn interactive(interactive_args: InteractiveArgs) {
    let config = load_config(&interactive_args.base);

    let rt = Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("🛑 Failed to start the event loop: {e}");
            std::process::exit(1);
        });

    let result = rt.block_on(async {
        let widget = mount(config);
        let input = BufReader::new(tokio::io::stdin());
        session::run(widget, input, &mut std::io::stdout()).await
    });
    // A pending stdin read must not keep the process alive
    rt.shutdown_background();

    if let Err(e) = result {
        eprintln!("🛑 Terminal session failed: {e}");
        std::process::exit(1);
    }
}
