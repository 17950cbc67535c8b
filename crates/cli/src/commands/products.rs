//! Catalog browsing and product admin commands.

use eshop_client::catalog::{Catalog, CategoryFilter, SortOption, arrange};
use eshop_core::{Price, Product, ProductDraft, ProductId};

use super::{CommandError, Context, ProductArgs};

fn print_row(product: &Product) {
    let stock = if product.in_stock() {
        format!("{} in stock", product.available_items)
    } else {
        "out of stock".to_string()
    };
    println!(
        "{:<26} {:<32} {:<14} {:>10}  {stock}",
        product.id.as_str(),
        product.name,
        product.category,
        product.price.to_string()
    );
}

pub async fn list(
    ctx: &Context,
    category: Option<&str>,
    sort: SortOption,
    search: Option<&str>,
) -> Result<(), CommandError> {
    ctx.authenticated()?;
    let catalog = Catalog::new(ctx.gateway.clone());

    let products = catalog.products(search).await?;
    let products = arrange(products, &CategoryFilter::parse(category), sort);
    if sort != SortOption::Default {
        println!("Sorted by {}", sort.label());
    }
    if products.is_empty() {
        println!("No products found");
    }
    for product in &products {
        print_row(product);
    }
    Ok(())
}

pub async fn categories(ctx: &Context) -> Result<(), CommandError> {
    ctx.authenticated()?;
    let catalog = Catalog::new(ctx.gateway.clone());
    for category in catalog.categories().await? {
        println!("{category}");
    }
    Ok(())
}

pub async fn show(ctx: &Context, id: &str) -> Result<(), CommandError> {
    ctx.authenticated()?;
    let catalog = Catalog::new(ctx.gateway.clone());
    let product = catalog.product(&ProductId::new(id)).await?;

    println!("{}", product.name);
    println!("  Category:     {}", product.category);
    println!("  Price:        {}", product.price);
    println!("  Available:    {}", product.available_items);
    if let Some(manufacturer) = &product.manufacturer {
        println!("  Manufacturer: {manufacturer}");
    }
    if let Some(description) = &product.description {
        println!();
        println!("{description}");
    }
    Ok(())
}

pub async fn add(ctx: &Context, fields: ProductArgs) -> Result<(), CommandError> {
    ctx.authenticated()?;
    let catalog = Catalog::new(ctx.gateway.clone());

    let draft = ProductDraft {
        name: fields.name.unwrap_or_default(),
        category: fields.category.unwrap_or_default(),
        price: fields.price.map(Price::new).unwrap_or_default(),
        description: fields.description.unwrap_or_default(),
        manufacturer: fields.manufacturer,
        available_items: fields.available_items.unwrap_or_default(),
        image_url: fields.image_url,
    };
    let navigation = catalog.create_product(&draft).await?;
    if let Some(message) = navigation.message {
        println!("{message}");
    }
    Ok(())
}

pub async fn update(ctx: &Context, id: &str, fields: ProductArgs) -> Result<(), CommandError> {
    ctx.authenticated()?;
    let catalog = Catalog::new(ctx.gateway.clone());
    let id = ProductId::new(id);

    // PUT replaces the whole product, so start from what is there now
    let mut draft = catalog.product(&id).await?.to_draft();
    if let Some(name) = fields.name {
        draft.name = name;
    }
    if let Some(category) = fields.category {
        draft.category = category;
    }
    if let Some(price) = fields.price {
        draft.price = Price::new(price);
    }
    if let Some(description) = fields.description {
        draft.description = description;
    }
    if let Some(available_items) = fields.available_items {
        draft.available_items = available_items;
    }
    draft.manufacturer = fields.manufacturer.or(draft.manufacturer);
    draft.image_url = fields.image_url.or(draft.image_url);

    let navigation = catalog.replace_product(&id, &draft).await?;
    if let Some(message) = navigation.message {
        println!("{message}");
    }
    Ok(())
}

pub async fn delete(ctx: &Context, id: &str) -> Result<(), CommandError> {
    ctx.authenticated()?;
    let catalog = Catalog::new(ctx.gateway.clone());

    let product = catalog.product(&ProductId::new(id)).await?;
    let navigation = catalog.delete_product(&product).await?;
    if let Some(message) = navigation.message {
        println!("{message}");
    }
    Ok(())
}
