//! Address book commands.

use eshop_client::addresses::AddressBook;

use super::{AddressArgs, CommandError, Context};

pub async fn list(ctx: &Context) -> Result<(), CommandError> {
    ctx.authenticated()?;
    let book = AddressBook::new(ctx.gateway.clone());

    let addresses = book.list().await?;
    if addresses.is_empty() {
        println!("No saved addresses");
    }
    for address in &addresses {
        println!("{:<26} {address}", address.id.as_str());
    }
    Ok(())
}

pub async fn add(ctx: &Context, fields: AddressArgs) -> Result<(), CommandError> {
    ctx.authenticated()?;
    let book = AddressBook::new(ctx.gateway.clone());

    let address = book.create(&fields.into_form()).await?;
    println!("Saved address {}: {address}", address.id);
    Ok(())
}
