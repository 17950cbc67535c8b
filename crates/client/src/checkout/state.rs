//! Checkout transition table.
//!
//! [`WizardState`] is an immutable value; [`WizardState::reduce`] takes an
//! event and returns the next state plus, when the transition needs the
//! outside world, an [`Effect`] for the driver to carry out. Results of those
//! effects come back in as events. Nothing here touches the network, so the
//! whole table is testable without a gateway.

use eshop_core::{
    Address, AddressField, AddressForm, AddressId, OrderDraft, Price, Product, Quantity,
};

use super::{ADDRESSES_FAILED, ADDRESS_SAVE_FAILED, ORDER_FAILED, ORDER_SUCCESS};
use crate::navigation::{Navigation, Route};
use crate::validation::{ValidationError, validate_address};

/// Wizard stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Step {
    #[default]
    Address,
    Review,
    Confirmed,
}

impl Step {
    /// Zero-based position in the flow.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Address => 0,
            Self::Review => 1,
            Self::Confirmed => 2,
        }
    }

    /// Heading shown for the stage.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Address => "Address Details",
            Self::Review => "Order Details",
            Self::Confirmed => "Confirmation",
        }
    }
}

/// What the wizard was started with: the product and how many.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutEntry {
    pub product: Product,
    pub quantity: Quantity,
}

/// The request currently in flight, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    LoadAddresses,
    SaveAddress,
    PlaceOrder,
}

/// Everything that happens to the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    LoadAddresses,
    AddressesLoaded(Vec<Address>),
    AddressesFailed,
    SelectAddress(AddressId),
    EditAddress(AddressField, String),
    SaveAddress,
    AddressSaved(Address),
    AddressSaveFailed,
    Next,
    Back,
    OrderPlaced,
    OrderFailed,
}

/// Work the driver must do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchAddresses,
    CreateAddress(AddressForm),
    PlaceOrder(OrderDraft),
    ScheduleRedirect(Navigation),
}

/// Outcome of one [`WizardState::reduce`] call.
#[derive(Debug, Clone)]
#[must_use]
pub struct Reduced {
    pub state: WizardState,
    pub effect: Option<Effect>,
    /// Set when the event was refused by validation.
    pub rejected: Option<ValidationError>,
}

/// Read-only review of the order about to be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub product_name: String,
    pub quantity: Quantity,
    pub total: Price,
    pub shipping: Option<Address>,
}

/// Complete wizard state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    entry: CheckoutEntry,
    active_step: Step,
    selected_address_id: Option<AddressId>,
    addresses: Vec<Address>,
    new_address: AddressForm,
    order_placed: bool,
    pending: Option<Pending>,
    error: Option<String>,
    address_error: Option<ValidationError>,
}

impl WizardState {
    /// Fresh wizard on the address step.
    #[must_use]
    pub fn new(entry: CheckoutEntry) -> Self {
        Self {
            entry,
            active_step: Step::Address,
            selected_address_id: None,
            addresses: Vec::new(),
            new_address: AddressForm::default(),
            order_placed: false,
            pending: None,
            error: None,
            address_error: None,
        }
    }

    #[must_use]
    pub const fn entry(&self) -> &CheckoutEntry {
        &self.entry
    }

    #[must_use]
    pub const fn active_step(&self) -> Step {
        self.active_step
    }

    #[must_use]
    pub const fn selected_address_id(&self) -> Option<&AddressId> {
        self.selected_address_id.as_ref()
    }

    #[must_use]
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// The new-address working copy.
    #[must_use]
    pub const fn new_address(&self) -> &AddressForm {
        &self.new_address
    }

    #[must_use]
    pub const fn order_placed(&self) -> bool {
        self.order_placed
    }

    #[must_use]
    pub const fn pending(&self) -> Option<Pending> {
        self.pending
    }

    /// Flow-level error from the last failed request.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Field-level error on the address step.
    #[must_use]
    pub const fn address_error(&self) -> Option<&ValidationError> {
        self.address_error.as_ref()
    }

    /// The selected address, looked up by id.
    #[must_use]
    pub fn selected_address(&self) -> Option<&Address> {
        let id = self.selected_address_id.as_ref()?;
        self.addresses.iter().find(|a| &a.id == id)
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.entry.product.price.total_for(self.entry.quantity)
    }

    #[must_use]
    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            product_name: self.entry.product.name.clone(),
            quantity: self.entry.quantity,
            total: self.total_price(),
            shipping: self.selected_address().cloned(),
        }
    }

    /// Whether "back" would do anything right now.
    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.controls_enabled() && self.active_step == Step::Review
    }

    /// Whether "next" would do anything right now.
    #[must_use]
    pub fn can_go_next(&self) -> bool {
        self.controls_enabled() && self.active_step != Step::Confirmed
    }

    const fn controls_enabled(&self) -> bool {
        !self.order_placed && self.pending.is_none()
    }

    /// Apply `event` and return the resulting state.
    ///
    /// Events that make no sense in the current state (a second submit while
    /// one is in flight, a response nobody is waiting for, "back" after the
    /// order is placed) leave the state unchanged.
    pub fn reduce(&self, event: WizardEvent) -> Reduced {
        let mut next = self.clone();
        let mut effect = None;
        let mut rejected = None;

        match event {
            WizardEvent::LoadAddresses => {
                if self.pending.is_none() && !self.order_placed {
                    next.pending = Some(Pending::LoadAddresses);
                    effect = Some(Effect::FetchAddresses);
                }
            }
            WizardEvent::AddressesLoaded(addresses) => {
                if self.pending == Some(Pending::LoadAddresses) {
                    next.pending = None;
                    next.addresses = addresses;
                    next.error = None;
                }
            }
            WizardEvent::AddressesFailed => {
                if self.pending == Some(Pending::LoadAddresses) {
                    next.pending = None;
                    next.error = Some(ADDRESSES_FAILED.to_string());
                }
            }
            WizardEvent::SelectAddress(id) => {
                if self.editable_address_step() {
                    if let Some(address) = self.addresses.iter().find(|a| a.id == id) {
                        next.new_address = address.to_form();
                        next.selected_address_id = Some(id);
                        next.address_error = None;
                    } else {
                        tracing::debug!(address_id = %id, "Ignoring selection of unknown address");
                    }
                }
            }
            WizardEvent::EditAddress(field, value) => {
                if self.editable_address_step() {
                    next.new_address.set(field, value);
                }
            }
            WizardEvent::SaveAddress => {
                if self.editable_address_step() {
                    match validate_address(&self.new_address) {
                        Ok(()) => {
                            next.pending = Some(Pending::SaveAddress);
                            effect = Some(Effect::CreateAddress(self.new_address.clone()));
                        }
                        Err(e) => {
                            next.address_error = Some(e.clone());
                            rejected = Some(e);
                        }
                    }
                }
            }
            WizardEvent::AddressSaved(address) => {
                if self.pending == Some(Pending::SaveAddress) {
                    next.pending = None;
                    next.selected_address_id = Some(address.id.clone());
                    next.addresses.push(address);
                    next.new_address = AddressForm::default();
                    next.address_error = None;
                    next.error = None;
                }
            }
            WizardEvent::AddressSaveFailed => {
                if self.pending == Some(Pending::SaveAddress) {
                    next.pending = None;
                    next.error = Some(ADDRESS_SAVE_FAILED.to_string());
                }
            }
            WizardEvent::Next => {
                if self.can_go_next() {
                    match self.active_step {
                        Step::Address => match self.selected_address_id.as_ref() {
                            Some(id) if !id.is_empty() => {
                                next.address_error = None;
                                next.active_step = Step::Review;
                            }
                            _ => {
                                next.address_error = Some(ValidationError::NoAddressSelected);
                                rejected = Some(ValidationError::NoAddressSelected);
                            }
                        },
                        Step::Review => {
                            if let Some(address_id) = self.selected_address_id.clone() {
                                next.pending = Some(Pending::PlaceOrder);
                                effect = Some(Effect::PlaceOrder(OrderDraft {
                                    product_id: self.entry.product.id.clone(),
                                    quantity: self.entry.quantity,
                                    address_id,
                                }));
                            }
                        }
                        Step::Confirmed => {}
                    }
                }
            }
            WizardEvent::Back => {
                if self.can_go_back() {
                    next.active_step = Step::Address;
                }
            }
            WizardEvent::OrderPlaced => {
                if self.pending == Some(Pending::PlaceOrder) {
                    next.pending = None;
                    next.order_placed = true;
                    next.active_step = Step::Confirmed;
                    next.error = None;
                    effect = Some(Effect::ScheduleRedirect(Navigation::with_message(
                        Route::Products,
                        ORDER_SUCCESS,
                    )));
                }
            }
            WizardEvent::OrderFailed => {
                if self.pending == Some(Pending::PlaceOrder) {
                    next.pending = None;
                    next.error = Some(ORDER_FAILED.to_string());
                }
            }
        }

        Reduced {
            state: next,
            effect,
            rejected,
        }
    }

    fn editable_address_step(&self) -> bool {
        self.controls_enabled() && self.active_step == Step::Address
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use eshop_core::{Price, ProductId};

    use super::*;

    fn product(price_cents: i64, available: u32) -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "Lamp".to_string(),
            category: "Home".to_string(),
            price: Price::from_cents(price_cents),
            description: None,
            manufacturer: None,
            available_items: available,
            image_url: None,
            modified_at: None,
        }
    }

    fn address(id: &str) -> Address {
        Address {
            id: AddressId::new(id),
            name: None,
            contact_number: None,
            street: "Main".to_string(),
            city: "X".to_string(),
            state: "Y".to_string(),
            landmark: None,
            zip_code: "1".to_string(),
        }
    }

    fn wizard(quantity: u32) -> WizardState {
        WizardState::new(CheckoutEntry {
            product: product(1000, 10),
            quantity: Quantity::new(quantity).unwrap(),
        })
    }

    /// Apply a sequence of events, ignoring effects.
    fn run(state: WizardState, events: impl IntoIterator<Item = WizardEvent>) -> WizardState {
        events
            .into_iter()
            .fold(state, |state, event| state.reduce(event).state)
    }

    fn loaded(addresses: Vec<Address>) -> WizardState {
        run(
            wizard(3),
            [
                WizardEvent::LoadAddresses,
                WizardEvent::AddressesLoaded(addresses),
            ],
        )
    }

    #[test]
    fn test_next_without_selection_is_refused() {
        let state = loaded(vec![address("a1")]);
        let reduced = state.reduce(WizardEvent::Next);

        assert_eq!(reduced.state.active_step(), Step::Address);
        assert_eq!(reduced.effect, None);
        assert_eq!(
            reduced.rejected.as_ref().map(ToString::to_string).as_deref(),
            Some("Please select address!")
        );
        assert_eq!(
            reduced.state.address_error(),
            Some(&ValidationError::NoAddressSelected)
        );
    }

    #[test]
    fn test_select_then_next_advances_without_effect() {
        let state =
            loaded(vec![address("a1")]).reduce(WizardEvent::SelectAddress(AddressId::new("a1")));
        assert_eq!(state.state.new_address().street, "Main");

        let reduced = state.state.reduce(WizardEvent::Next);
        assert_eq!(reduced.state.active_step(), Step::Review);
        assert_eq!(reduced.effect, None);
        assert!(reduced.state.address_error().is_none());
    }

    #[test]
    fn test_selecting_unknown_address_is_ignored() {
        let state = loaded(vec![address("a1")]);
        let reduced = state.reduce(WizardEvent::SelectAddress(AddressId::new("nope")));
        assert_eq!(reduced.state, state);
    }

    #[test]
    fn test_incomplete_address_is_not_saved() {
        let state = run(
            loaded(vec![address("a1")]),
            [
                WizardEvent::EditAddress(AddressField::Street, "Elm".to_string()),
                WizardEvent::EditAddress(AddressField::City, "Z".to_string()),
            ],
        );
        let reduced = state.reduce(WizardEvent::SaveAddress);

        assert_eq!(reduced.effect, None);
        assert_eq!(reduced.state.addresses().len(), 1);
        assert_eq!(reduced.state.pending(), None);
        assert_eq!(
            reduced.rejected.map(|e| e.to_string()).as_deref(),
            Some("All address fields are required")
        );
    }

    #[test]
    fn test_saved_address_is_appended_and_selected() {
        let state = run(
            loaded(Vec::new()),
            [
                WizardEvent::EditAddress(AddressField::Street, "Elm".to_string()),
                WizardEvent::EditAddress(AddressField::City, "Z".to_string()),
                WizardEvent::EditAddress(AddressField::State, "W".to_string()),
                WizardEvent::EditAddress(AddressField::ZipCode, "9".to_string()),
            ],
        );
        let reduced = state.reduce(WizardEvent::SaveAddress);
        assert_eq!(
            reduced.effect,
            Some(Effect::CreateAddress(AddressForm::new("Elm", "Z", "W", "9")))
        );
        assert_eq!(reduced.state.pending(), Some(Pending::SaveAddress));

        let saved = reduced.state.reduce(WizardEvent::AddressSaved(address("a9")));
        assert_eq!(saved.state.addresses().len(), 1);
        assert_eq!(saved.state.selected_address_id(), Some(&AddressId::new("a9")));
        assert_eq!(saved.state.new_address(), &AddressForm::default());
        assert_eq!(saved.state.pending(), None);
    }

    #[test]
    fn test_review_next_emits_order_and_success_confirms() {
        let review = run(
            loaded(vec![address("a1")]),
            [
                WizardEvent::SelectAddress(AddressId::new("a1")),
                WizardEvent::Next,
            ],
        );
        assert_eq!(review.total_price().to_string(), "$30.00");
        assert_eq!(review.summary().shipping.map(|a| a.street).as_deref(), Some("Main"));

        let submitted = review.reduce(WizardEvent::Next);
        assert_eq!(
            submitted.effect,
            Some(Effect::PlaceOrder(OrderDraft {
                product_id: ProductId::new("p1"),
                quantity: Quantity::new(3).unwrap(),
                address_id: AddressId::new("a1"),
            }))
        );
        assert!(!submitted.state.can_go_next());
        assert!(!submitted.state.can_go_back());

        let confirmed = submitted.state.reduce(WizardEvent::OrderPlaced);
        assert_eq!(confirmed.state.active_step(), Step::Confirmed);
        assert!(confirmed.state.order_placed());
        assert_eq!(
            confirmed.effect,
            Some(Effect::ScheduleRedirect(Navigation::with_message(
                Route::Products,
                "Order placed successfully!"
            )))
        );
    }

    #[test]
    fn test_failed_order_stays_on_review() {
        let failed = run(
            loaded(vec![address("a1")]),
            [
                WizardEvent::SelectAddress(AddressId::new("a1")),
                WizardEvent::Next,
                WizardEvent::Next,
                WizardEvent::OrderFailed,
            ],
        );
        assert_eq!(failed.active_step(), Step::Review);
        assert!(!failed.order_placed());
        assert_eq!(failed.error(), Some("Failed to place order"));
        assert!(failed.can_go_next());
    }

    #[test]
    fn test_controls_are_dead_after_order_placed() {
        let confirmed = run(
            loaded(vec![address("a1")]),
            [
                WizardEvent::SelectAddress(AddressId::new("a1")),
                WizardEvent::Next,
                WizardEvent::Next,
                WizardEvent::OrderPlaced,
            ],
        );
        for event in [WizardEvent::Back, WizardEvent::Next, WizardEvent::OrderPlaced] {
            let reduced = confirmed.reduce(event);
            assert_eq!(reduced.state.active_step(), Step::Confirmed);
            assert_eq!(reduced.effect, None);
        }
    }

    #[test]
    fn test_back_returns_to_address_step_only_from_review() {
        let address_step = loaded(vec![address("a1")]);
        assert_eq!(address_step.reduce(WizardEvent::Back).state, address_step);

        let review = run(
            address_step,
            [
                WizardEvent::SelectAddress(AddressId::new("a1")),
                WizardEvent::Next,
            ],
        );
        let back = review.reduce(WizardEvent::Back).state;
        assert_eq!(back.active_step(), Step::Address);
        assert_eq!(back.selected_address_id(), Some(&AddressId::new("a1")));
    }

    #[test]
    fn test_stale_responses_are_ignored() {
        let state = loaded(vec![address("a1")]);
        for event in [
            WizardEvent::AddressSaved(address("zz")),
            WizardEvent::AddressSaveFailed,
            WizardEvent::OrderPlaced,
            WizardEvent::OrderFailed,
            WizardEvent::AddressesLoaded(Vec::new()),
        ] {
            assert_eq!(state.reduce(event).state, state);
        }
    }

    #[test]
    fn test_in_flight_request_blocks_other_actions() {
        let saving = run(
            loaded(Vec::new()),
            [
                WizardEvent::EditAddress(AddressField::Street, "a".to_string()),
                WizardEvent::EditAddress(AddressField::City, "b".to_string()),
                WizardEvent::EditAddress(AddressField::State, "c".to_string()),
                WizardEvent::EditAddress(AddressField::ZipCode, "d".to_string()),
                WizardEvent::SaveAddress,
            ],
        );
        let again = saving.reduce(WizardEvent::SaveAddress);
        assert_eq!(again.effect, None);
        assert_eq!(saving.reduce(WizardEvent::Next).state, saving);
    }

    #[test]
    fn test_failed_address_load_sets_error_and_success_clears_it() {
        let failed = run(wizard(1), [WizardEvent::LoadAddresses, WizardEvent::AddressesFailed]);
        assert_eq!(failed.error(), Some("Failed to fetch addresses"));
        assert!(failed.addresses().is_empty());

        let retried = run(
            failed,
            [
                WizardEvent::LoadAddresses,
                WizardEvent::AddressesLoaded(vec![address("a1")]),
            ],
        );
        assert_eq!(retried.error(), None);
    }

    #[test]
    fn test_total_is_price_times_quantity() {
        for q in 1..=10 {
            let state = WizardState::new(CheckoutEntry {
                product: product(1250, 10),
                quantity: Quantity::new(q).unwrap(),
            });
            assert_eq!(state.total_price(), Price::from_cents(1250 * i64::from(q)));
        }
    }
}
