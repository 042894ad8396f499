//! Checkout forms.

use super::dom::{Element, EventKind, ViewError};
use crate::types::{OrderDraft, OrderField, PaymentMethod, StoreAction};
use storefront_runtime::Dispatcher;

const PAYMENT_ACTIVE: &str = "button_alt-active";

/// Shared form behaviour: input forwarding, submit, validity and errors
///
/// Every `input` event inside the form is forwarded to the store as
/// [`StoreAction::SetOrderField`], keyed by the input's `name` attribute.
/// Clicking the submit button submits the form; submitting dispatches the
/// form's submit action.
#[derive(Clone, Debug)]
pub struct Form {
    container: Element,
    submit: Element,
    errors: Element,
}

impl Form {
    /// Binds a form to an instantiated template
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::MissingElement`] if the error area or submit
    /// button is missing.
    pub fn new(
        container: Element,
        dispatcher: Dispatcher<StoreAction>,
        on_submit: StoreAction,
    ) -> Result<Self, ViewError> {
        let errors = container.ensure("form__errors")?;
        let submit = find_submit(&container).ok_or_else(|| ViewError::MissingElement {
            class: "button[type=submit]".to_string(),
        })?;

        let inputs = dispatcher.clone();
        container.on(EventKind::Input, move |event| {
            let target = event.target();
            let Some(name) = target.attribute("name") else {
                return;
            };
            match OrderField::from_name(&name) {
                Some(field) => {
                    inputs.dispatch(StoreAction::SetOrderField {
                        field,
                        value: target.value(),
                    });
                }
                None => tracing::trace!(name = %name, "Input without an order field"),
            }
        });

        container.on(EventKind::Submit, move |_| {
            dispatcher.dispatch(on_submit.clone());
        });

        let form = container.clone();
        submit.on(EventKind::Click, move |event| {
            event.stop_propagation();
            form.submit();
        });

        Ok(Self {
            container,
            submit,
            errors,
        })
    }

    /// Root element of the form
    #[must_use]
    pub const fn container(&self) -> &Element {
        &self.container
    }

    /// Enables or disables the submit button
    pub fn set_valid(&self, valid: bool) {
        self.submit.set_disabled(!valid);
    }

    /// Whether the submit button is enabled
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.submit.is_disabled()
    }

    /// Shows error text; empty text clears it
    pub fn set_errors(&self, errors: &str) {
        self.errors.set_text(errors);
    }

    /// Sets the value of the named input without dispatching `input`
    pub fn set_input(&self, name: &str, value: &str) {
        if let Some(input) = self
            .container
            .query_all("form__input")
            .into_iter()
            .find(|input| input.attribute("name").as_deref() == Some(name))
        {
            input.set_attribute("value", value);
        }
    }
}

fn find_submit(element: &Element) -> Option<Element> {
    element.children().into_iter().find_map(|child| {
        if child.tag() == "button" && child.attribute("type").as_deref() == Some("submit") {
            Some(child)
        } else {
            find_submit(&child)
        }
    })
}

/// Payment method and delivery address
#[derive(Clone, Debug)]
pub struct AddressForm {
    form: Form,
    card: Element,
    cash: Element,
}

impl AddressForm {
    /// Binds the address form; it submits [`StoreAction::SubmitAddress`]
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::MissingElement`] if a payment button, the error
    /// area or the submit button is missing.
    pub fn new(container: Element, dispatcher: Dispatcher<StoreAction>) -> Result<Self, ViewError> {
        let card = container.ensure("online")?;
        let cash = container.ensure("offline")?;
        let form = Form::new(container, dispatcher.clone(), StoreAction::SubmitAddress)?;

        let this = Self { form, card, cash };
        for (button, method) in [
            (&this.card, PaymentMethod::Card),
            (&this.cash, PaymentMethod::Cash),
        ] {
            let view = this.clone();
            let dispatcher = dispatcher.clone();
            button.on(EventKind::Click, move |event| {
                event.stop_propagation();
                view.set_payment(Some(method));
                dispatcher.dispatch(StoreAction::SetOrderField {
                    field: OrderField::Payment,
                    value: method.as_str().to_string(),
                });
            });
        }
        Ok(this)
    }

    /// The shared form behaviour
    #[must_use]
    pub const fn form(&self) -> &Form {
        &self.form
    }

    /// Highlights the selected payment button
    pub fn set_payment(&self, payment: Option<PaymentMethod>) {
        self.card
            .toggle_class(PAYMENT_ACTIVE, payment == Some(PaymentMethod::Card));
        self.cash
            .toggle_class(PAYMENT_ACTIVE, payment == Some(PaymentMethod::Cash));
    }

    /// Shows draft values
    pub fn render(&self, draft: &OrderDraft, ready: bool) {
        self.set_payment(draft.payment);
        self.form.set_input("address", &draft.address);
        self.form.set_errors("");
        self.form.set_valid(ready);
    }
}

/// Email and phone
#[derive(Clone, Debug)]
pub struct ContactsForm {
    form: Form,
}

impl ContactsForm {
    /// Binds the contact form; it submits [`StoreAction::SubmitContacts`]
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::MissingElement`] if the error area or submit
    /// button is missing.
    pub fn new(container: Element, dispatcher: Dispatcher<StoreAction>) -> Result<Self, ViewError> {
        let form = Form::new(container, dispatcher, StoreAction::SubmitContacts)?;
        Ok(Self { form })
    }

    /// The shared form behaviour
    #[must_use]
    pub const fn form(&self) -> &Form {
        &self.form
    }

    /// Shows draft values
    pub fn render(&self, draft: &OrderDraft, ready: bool) {
        self.form.set_input("email", &draft.email);
        self.form.set_input("phone", &draft.phone);
        self.form.set_errors("");
        self.form.set_valid(ready);
    }
}
