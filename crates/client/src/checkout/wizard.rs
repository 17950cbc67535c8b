//! Async driver for the checkout state machine.

use eshop_core::{Address, AddressField, AddressId, OrderDraft};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use super::state::{CheckoutEntry, Effect, OrderSummary, Step, WizardEvent, WizardState};
use super::{REDIRECT_DELAY, WizardError};
use crate::api::{self, ApiError, ApiGateway, Auth, paths};
use crate::navigation::{self, Navigation, Navigator};

/// Runs a checkout against the remote API.
///
/// Operations take `&mut self`, so a wizard never has two requests in flight.
/// Dropping the wizard cancels a redirect that has not fired yet; a request
/// that was mid-flight is simply never observed.
pub struct CheckoutWizard<G> {
    gateway: G,
    state: WizardState,
    navigator: Navigator,
    redirect: Option<JoinHandle<()>>,
}

impl<G: ApiGateway> CheckoutWizard<G> {
    /// Start a checkout for `entry` on the address step.
    #[must_use]
    pub fn new(gateway: G, entry: CheckoutEntry, navigator: Navigator) -> Self {
        Self {
            gateway,
            state: WizardState::new(entry),
            navigator,
            redirect: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &WizardState {
        &self.state
    }

    #[must_use]
    pub fn summary(&self) -> OrderSummary {
        self.state.summary()
    }

    /// Whether the post-confirmation redirect is scheduled and has not fired.
    #[must_use]
    pub fn redirect_pending(&self) -> bool {
        self.redirect.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Fetch the shopper's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns `WizardError::FetchAddresses` if the request fails; the list
    /// stays as it was.
    pub async fn load_addresses(&mut self) -> Result<&[Address], WizardError> {
        self.drive(WizardEvent::LoadAddresses).await?;
        Ok(self.state.addresses())
    }

    /// Choose a saved address. Unknown ids are ignored.
    pub fn select_address(&mut self, id: AddressId) {
        self.apply(WizardEvent::SelectAddress(id));
    }

    /// Type into the new-address form.
    pub fn edit_address(&mut self, field: AddressField, value: impl Into<String>) {
        self.apply(WizardEvent::EditAddress(field, value.into()));
    }

    /// Save the new-address form and select the result.
    ///
    /// Returns the selected address afterwards; `None` only if the save was
    /// ignored (wrong step, order already placed) and nothing was selected.
    ///
    /// # Errors
    ///
    /// - `WizardError::Validation` if a required field is blank (no request is made)
    /// - `WizardError::SaveAddress` if the API call fails
    pub async fn save_address(&mut self) -> Result<Option<&Address>, WizardError> {
        self.drive(WizardEvent::SaveAddress).await?;
        // A saved address becomes the selection
        Ok(self.state.selected_address())
    }

    /// Advance one step. On the review step this places the order.
    ///
    /// Returns the step the wizard is on afterwards. Calling it once the
    /// order is placed does nothing.
    ///
    /// # Errors
    ///
    /// - `WizardError::Validation` if no address is selected
    /// - `WizardError::PlaceOrder` if the order request fails
    pub async fn next(&mut self) -> Result<Step, WizardError> {
        self.drive(WizardEvent::Next).await?;
        Ok(self.state.active_step())
    }

    /// Go back from review to the address step.
    pub fn back(&mut self) -> Step {
        self.apply(WizardEvent::Back);
        self.state.active_step()
    }

    /// Reduce an event that cannot produce network work.
    fn apply(&mut self, event: WizardEvent) {
        self.state = self.state.reduce(event).state;
    }

    /// Reduce an event and carry out any effects it (transitively) produces.
    async fn drive(&mut self, event: WizardEvent) -> Result<(), WizardError> {
        let reduced = self.state.reduce(event);
        self.state = reduced.state;
        if let Some(rejected) = reduced.rejected {
            return Err(rejected.into());
        }

        let mut effect = reduced.effect;
        while let Some(current) = effect {
            effect = self.perform(current).await?;
        }
        Ok(())
    }

    async fn perform(&mut self, effect: Effect) -> Result<Option<Effect>, WizardError> {
        match effect {
            Effect::FetchAddresses => match self.fetch_addresses().await {
                Ok(addresses) => Ok(self.feed(WizardEvent::AddressesLoaded(addresses))),
                Err(e) => {
                    warn!(error = %e, "Could not fetch addresses");
                    self.feed(WizardEvent::AddressesFailed);
                    Err(WizardError::FetchAddresses(e))
                }
            },
            Effect::CreateAddress(form) => {
                let result = match api::encode(&form) {
                    Ok(body) => self
                        .gateway
                        .post(paths::ADDRESSES, body, Auth::Token)
                        .await
                        .and_then(api::decode::<Address>),
                    Err(e) => Err(e),
                };
                match result {
                    Ok(address) => {
                        info!(address_id = %address.id, "Address saved");
                        Ok(self.feed(WizardEvent::AddressSaved(address)))
                    }
                    Err(e) => {
                        warn!(error = %e, "Could not save address");
                        self.feed(WizardEvent::AddressSaveFailed);
                        Err(WizardError::SaveAddress(e))
                    }
                }
            }
            Effect::PlaceOrder(draft) => match self.submit_order(&draft).await {
                Ok(()) => {
                    info!(
                        product_id = %draft.product_id,
                        quantity = %draft.quantity,
                        "Order placed"
                    );
                    Ok(self.feed(WizardEvent::OrderPlaced))
                }
                Err(e) => {
                    warn!(error = %e, "Could not place order");
                    self.feed(WizardEvent::OrderFailed);
                    Err(WizardError::PlaceOrder(e))
                }
            },
            Effect::ScheduleRedirect(navigation) => {
                self.schedule_redirect(navigation);
                Ok(None)
            }
        }
    }

    /// Reduce a response event and hand back whatever it asks for next.
    fn feed(&mut self, event: WizardEvent) -> Option<Effect> {
        let reduced = self.state.reduce(event);
        self.state = reduced.state;
        reduced.effect
    }

    #[instrument(skip(self))]
    async fn fetch_addresses(&self) -> Result<Vec<Address>, ApiError> {
        let body = self.gateway.get(paths::ADDRESSES, Auth::Token).await?;
        // Some deployments answer an empty list with an empty body
        if body.is_null() {
            return Ok(Vec::new());
        }
        api::decode(body)
    }

    #[instrument(skip(self))]
    async fn submit_order(&self, draft: &OrderDraft) -> Result<(), ApiError> {
        let body = api::encode(draft)?;
        self.gateway.post(paths::ORDERS, body, Auth::Token).await?;
        Ok(())
    }

    fn schedule_redirect(&mut self, navigation: Navigation) {
        if let Some(previous) = self.redirect.take() {
            previous.abort();
        }
        let navigator = self.navigator.clone();
        self.redirect = Some(tokio::spawn(async move {
            tokio::time::sleep(REDIRECT_DELAY).await;
            navigation::navigate(&navigator, navigation);
        }));
    }
}

impl<G> Drop for CheckoutWizard<G> {
    fn drop(&mut self) {
        if let Some(redirect) = self.redirect.take() {
            redirect.abort();
        }
    }
}
