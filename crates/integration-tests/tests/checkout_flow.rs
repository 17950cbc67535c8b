//! Full checkout against the stub API.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;

use eshop_client::catalog::{Catalog, buy_now};
use eshop_client::checkout::{CheckoutWizard, Step};
use eshop_client::navigation::{self, Navigation, Route};
use eshop_client::session::MemoryTokenStorage;
use eshop_core::{AddressField, AddressId, Credentials, Email, ProductId};
use eshop_integration_tests::{StubApi, StubClient};

async fn signed_in(api: &StubApi) -> StubClient {
    api.add_user("shopper@example.com", "password1");
    let client = api.client(MemoryTokenStorage::default());
    let credentials = Credentials {
        username: Email::parse("shopper@example.com").unwrap(),
        password: "password1".to_string(),
    };
    client.session.login(&client.gateway, &credentials).await.unwrap();
    client
}

fn main_street() -> serde_json::Value {
    json!({"id": "a1", "street": "Main", "city": "X", "state": "Y", "zipCode": "1"})
}

fn lamp(available: u32) -> serde_json::Value {
    json!({
        "id": "p1",
        "name": "Lamp",
        "category": "Home",
        "price": 10,
        "availableItems": available
    })
}

#[tokio::test]
async fn test_checkout_with_saved_address() {
    let api = StubApi::spawn().await;
    api.add_product(lamp(5));
    api.add_address(main_street());
    let client = signed_in(&api).await;

    let catalog = Catalog::new(client.gateway.clone());
    let product = catalog.product(&ProductId::new("p1")).await.unwrap();
    let entry = buy_now(product, 3).unwrap();

    let (navigator, mut inbox) = navigation::channel();
    let mut wizard = CheckoutWizard::new(client.gateway.clone(), entry, navigator);

    assert_eq!(wizard.load_addresses().await.unwrap().len(), 1);
    wizard.select_address(AddressId::new("a1"));
    assert_eq!(wizard.next().await.unwrap(), Step::Review);
    assert_eq!(wizard.summary().total.to_string(), "$30.00");
    assert_eq!(wizard.next().await.unwrap(), Step::Confirmed);

    assert_eq!(
        api.orders(),
        vec![json!({"productId": "p1", "quantity": 3, "addressId": "a1"})]
    );
    assert_eq!(api.products()[0]["availableItems"], 2);

    let handoff = tokio::time::timeout(Duration::from_secs(5), inbox.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        handoff,
        Navigation::with_message(Route::Products, "Order placed successfully!")
    );
}

#[tokio::test]
async fn test_checkout_with_new_address() {
    let api = StubApi::spawn().await;
    api.add_product(lamp(1));
    let client = signed_in(&api).await;

    let product = Catalog::new(client.gateway.clone())
        .product(&ProductId::new("p1"))
        .await
        .unwrap();
    let (navigator, _inbox) = navigation::channel();
    let entry = buy_now(product, 1).unwrap();
    let mut wizard = CheckoutWizard::new(client.gateway.clone(), entry, navigator);

    assert!(wizard.load_addresses().await.unwrap().is_empty());
    let err = wizard.next().await.unwrap_err();
    assert_eq!(err.to_string(), "Please select address!");

    for (field, value) in [
        (AddressField::Street, "Elm"),
        (AddressField::City, "Z"),
        (AddressField::State, "W"),
        (AddressField::ZipCode, "9"),
    ] {
        wizard.edit_address(field, value);
    }
    wizard.save_address().await.unwrap();
    assert_eq!(api.addresses().len(), 1);

    wizard.next().await.unwrap();
    assert_eq!(wizard.next().await.unwrap(), Step::Confirmed);
    assert_eq!(api.orders().len(), 1);
}

#[tokio::test]
async fn test_rejected_order_keeps_review_step() {
    let api = StubApi::spawn().await;
    api.add_product(lamp(5));
    api.add_address(main_street());
    let client = signed_in(&api).await;

    let product = Catalog::new(client.gateway.clone())
        .product(&ProductId::new("p1"))
        .await
        .unwrap();
    let entry = buy_now(product, 5).unwrap();
    let (navigator, mut inbox) = navigation::channel();
    let mut first = CheckoutWizard::new(client.gateway.clone(), entry.clone(), navigator.clone());
    let mut second = CheckoutWizard::new(client.gateway.clone(), entry, navigator);

    for wizard in [&mut first, &mut second] {
        wizard.load_addresses().await.unwrap();
        wizard.select_address(AddressId::new("a1"));
        wizard.next().await.unwrap();
    }
    // The first order takes all the stock
    assert_eq!(first.next().await.unwrap(), Step::Confirmed);

    let err = second.next().await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to place order");
    assert_eq!(second.state().active_step(), Step::Review);
    assert!(!second.redirect_pending());

    drop(first);
    drop(second);
    let closed = tokio::time::timeout(Duration::from_secs(5), inbox.recv())
        .await
        .unwrap();
    assert!(closed.is_none());
}
