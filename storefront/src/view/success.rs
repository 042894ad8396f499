//! Order confirmation.

use super::card::Callback;
use super::dom::{Element, EventKind, ViewError};

/// Confirmation screen shown after an order is placed
#[derive(Clone, Debug)]
pub struct Success {
    container: Element,
    description: Element,
}

impl Success {
    /// Binds the screen; `on_close` runs when its close button is clicked
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::MissingElement`] if the description or close
    /// button is missing.
    pub fn new(container: Element, on_close: Callback) -> Result<Self, ViewError> {
        let description = container.ensure("order__success-description")?;
        let close = container.ensure("order__success-close")?;
        close.on(EventKind::Click, move |_| on_close());
        Ok(Self {
            container,
            description,
        })
    }

    /// Root element of the screen
    #[must_use]
    pub const fn container(&self) -> &Element {
        &self.container
    }

    /// Shows the charged amount
    pub fn set_total(&self, total: u64) {
        self.description.set_text(&format!("Charged {total} synapses"));
    }
}
