//! `eshop checkout`: the three-step wizard on a terminal.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use eshop_client::catalog::{Catalog, buy_now};
use eshop_client::checkout::{CheckoutWizard, Step, WizardError};
use eshop_client::navigation;
use eshop_core::{AddressField, AddressId, ProductId};

use super::{CheckoutArgs, CommandError, Context};

fn heading(step: Step) -> String {
    let total = Step::Confirmed.index() + 1;
    format!("[{}/{total}] {}", step.index() + 1, step.label())
}

pub async fn run(ctx: &Context, args: CheckoutArgs) -> Result<(), CommandError> {
    ctx.authenticated()?;

    let catalog = Catalog::new(ctx.gateway.clone());
    let product = catalog.product(&ProductId::new(args.product)).await?;
    let entry = buy_now(product, args.quantity)?;

    let (navigator, mut inbox) = navigation::channel();
    let mut wizard = CheckoutWizard::new(ctx.gateway.clone(), entry, navigator);

    println!("{}", heading(Step::Address));
    let addresses = match wizard.load_addresses().await {
        Ok(addresses) => addresses.to_vec(),
        // A new address can still be saved, but a saved id cannot be checked
        Err(e @ WizardError::FetchAddresses(_)) if args.address.is_none() => {
            println!("{e}");
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(id) = args.address {
        let id = AddressId::new(id);
        if !addresses.iter().any(|a| a.id == id) {
            return Err(CommandError::InvalidArgument(format!("No saved address with id {id}")));
        }
        wizard.select_address(id);
    } else if args.new_address.is_given() {
        let form = args.new_address.into_form();
        for field in AddressField::REQUIRED {
            wizard.edit_address(field, form.get(field));
        }
        wizard.save_address().await?;
    } else {
        for address in &addresses {
            println!("  {:<26} {address}", address.id.as_str());
        }
    }

    // Refuses with "Please select address!" when nothing was chosen
    wizard.next().await?;

    let summary = wizard.summary();
    println!("{}", heading(Step::Review));
    println!("  Product:   {}", summary.product_name);
    println!("  Quantity:  {}", summary.quantity);
    println!("  Total:     {}", summary.total);
    if let Some(address) = &summary.shipping {
        println!("  Ship to:   {address}");
    }

    if !args.yes && !confirm("Place order? [y/N] ").await {
        println!("Order not placed");
        return Ok(());
    }

    wizard.next().await?;
    println!("{}", heading(Step::Confirmed));
    info!("Waiting for redirect");

    // The wizard must stay alive until the redirect fires; dropping it cancels
    if let Some(handoff) = inbox.recv().await {
        if let Some(message) = handoff.message {
            println!("{message}");
        }
        println!("-> {}", handoff.route);
    }
    drop(wizard);
    Ok(())
}

async fn confirm(prompt: &str) -> bool {
    let mut stdout = tokio::io::stdout();
    if stdout.write_all(prompt.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
        return false;
    }

    let mut line = String::new();
    match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
        Ok(_) => matches!(line.trim(), "y" | "Y" | "yes"),
        Err(_) => false,
    }
}
