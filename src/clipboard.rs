// Copyright (c) 2024 PostFinance AG
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use log::debug;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum ClipboardError {
    #[error("Clipboard is unavailable: {0}")]
    Unavailable(String),
    #[error("Failed to write to clipboard: {0}")]
    #[cfg_attr(not(feature = "system-clipboard"), allow(dead_code))]
    Write(String),
}

pub(crate) trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The OS clipboard. Opened on first use so that hosts without a display can still run.
#[derive(Default)]
pub(crate) struct SystemClipboard {
    #[cfg(feature = "system-clipboard")]
    context: Option<::clipboard::ClipboardContext>,
}

#[cfg(feature = "system-clipboard")]
impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        use ::clipboard::{ClipboardContext, ClipboardProvider};

        let context = match self.context.take() {
            Some(context) => context,
            None => {
                debug!("Opening system clipboard");
                ClipboardContext::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?
            }
        };

        self.context
            .insert(context)
            .set_contents(text.to_owned())
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}

#[cfg(not(feature = "system-clipboard"))]
impl Clipboard for SystemClipboard {
    fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
        debug!("Built without system clipboard support");
        Err(ClipboardError::Unavailable(String::from(
            "built without the 'system-clipboard' feature",
        )))
    }
}
