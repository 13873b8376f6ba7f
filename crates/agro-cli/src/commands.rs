//! # Command Handlers
//!
//! Each subcommand runs against the API traits and writes human-readable
//! output, so the same code drives the real client and test fakes.

use crate::cli::{CheckoutArgs, ItemArg, OrderViewArgs};
use agro_core::{
    arrange_orders, format_rupees, submit_checkout, AdminApi, BuyerInfo, CartEvent, CartStore,
    NewProduct, Order, OrderStatus, Product, ProductCatalog, ProductId, StatusCounts,
    StorefrontApi,
};
use anyhow::{bail, Context};
use std::io::Write;
use std::path::Path;
use tracing::{info, instrument};

/// `agrofix products`
#[instrument(skip_all)]
pub async fn list_products<A, W>(api: &A, out: &mut W) -> anyhow::Result<()>
where
    A: StorefrontApi + ?Sized,
    W: Write,
{
    let catalog = ProductCatalog::new(api.list_products().await?);
    info!("Products loaded: {}", catalog.len());

    let mut shown = 0;
    for product in catalog.available_products() {
        write_product(out, product)?;
        shown += 1;
    }
    if shown == 0 {
        writeln!(out, "No products available right now.")?;
    }
    Ok(())
}

fn write_product<W: Write>(out: &mut W, product: &Product) -> std::io::Result<()> {
    writeln!(
        out,
        "{:>4}  {:<24} {:>10}/{:<5} stock {:>8}  min {}",
        product.id,
        product.name,
        format_rupees(product.price_per_unit),
        product.unit_type,
        product.stock.normalize(),
        product.min_order_quantity.normalize(),
    )
}

/// `agrofix orders --phone`
#[instrument(skip(api, out, view))]
pub async fn track_orders<A, W>(
    api: &A,
    phone: &str,
    view: &OrderViewArgs,
    out: &mut W,
) -> anyhow::Result<()>
where
    A: StorefrontApi + ?Sized,
    W: Write,
{
    if phone.trim().is_empty() {
        bail!("Please enter a phone number");
    }
    let orders = api.orders_for_phone(phone.trim()).await?;
    write_orders(out, &orders, view)
}

/// `agrofix admin orders`
pub async fn list_all_orders<A, W>(api: &A, view: &OrderViewArgs, out: &mut W) -> anyhow::Result<()>
where
    A: AdminApi + ?Sized,
    W: Write,
{
    let orders = api.list_all_orders().await?;
    write_orders(out, &orders, view)
}

fn write_orders<W: Write>(out: &mut W, orders: &[Order], view: &OrderViewArgs) -> anyhow::Result<()> {
    let counts = StatusCounts::tally(orders);
    writeln!(
        out,
        "all {} | pending {} | confirmed {} | delivered {}",
        counts.all, counts.pending, counts.confirmed, counts.delivered
    )?;

    let shown = arrange_orders(orders, &view.status, view.sort);
    if shown.is_empty() {
        writeln!(out, "No orders found.")?;
        return Ok(());
    }

    for order in shown {
        let placed = order
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "#{:<5} {:<10} {:>10}  {}  {} ({})",
            order.id,
            order.status,
            order.total_display(),
            placed,
            order.buyer_name,
            order.payment_method_label(),
        )?;
        for line in &order.cart_summary {
            writeln!(
                out,
                "         {} x {} {} = {}",
                line.product_name,
                line.quantity.normalize(),
                line.unit_label(),
                format_rupees(line.total_price),
            )?;
        }
    }
    Ok(())
}

/// Fill a cart from `ID=QTY` pairs against the live catalog
pub fn build_cart(catalog: &ProductCatalog, items: &[ItemArg]) -> anyhow::Result<CartStore> {
    let mut cart = CartStore::new();
    for item in items {
        let product = catalog
            .get(item.id)
            .with_context(|| format!("product {} not found in catalog", item.id))?;
        if !product.is_purchasable() {
            bail!("{} is currently unavailable", product.name);
        }
        cart.add_item(product, item.quantity);
    }
    Ok(cart)
}

/// `agrofix checkout`
#[instrument(skip_all, fields(items = args.items.len()))]
pub async fn checkout<A, W>(api: &A, args: &CheckoutArgs, out: &mut W) -> anyhow::Result<()>
where
    A: StorefrontApi + ?Sized,
    W: Write,
{
    let catalog = ProductCatalog::new(api.list_products().await?);
    let mut cart = build_cart(&catalog, &args.items)?;

    for line in cart.items() {
        // A repeated id keeps the last quantity given for it
        let requested = args
            .items
            .iter()
            .rev()
            .find(|item| item.id == line.product_id)
            .map(|item| item.quantity);
        if requested != Some(line.quantity) {
            writeln!(
                out,
                "Adjusted {} to {} {} (min {}, stock {})",
                line.name,
                line.quantity.normalize(),
                line.unit_type,
                line.min_order_quantity.normalize(),
                line.stock.normalize(),
            )?;
        }
    }

    for line in cart.items() {
        writeln!(
            out,
            "{:<24} {:>6} {:<5} {:>10}",
            line.name,
            line.quantity.normalize(),
            line.unit_type,
            format_rupees(line.total()),
        )?;
    }
    writeln!(out, "Total: {}", format_rupees(cart.total()))?;

    cart.subscribe(|event, _| {
        if let CartEvent::Cleared = event {
            info!("Cart cleared after order");
        }
    });

    let buyer = BuyerInfo::new(&args.name, &args.phone, &args.address, args.payment.label());
    match submit_checkout(api, &mut cart, &buyer).await {
        Ok(receipt) => {
            let message = receipt
                .message
                .unwrap_or_else(|| "Order placed successfully!".to_string());
            writeln!(out, "{}", message)?;
            Ok(())
        }
        Err(err) => bail!(err.user_message()),
    }
}

/// `agrofix admin add-product --file`
pub async fn add_product<A, W>(api: &A, file: &Path, out: &mut W) -> anyhow::Result<()>
where
    A: AdminApi + ?Sized,
    W: Write,
{
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;
    let product: NewProduct = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid product", file.display()))?;
    product.validate()?;

    api.add_product(&product).await?;
    writeln!(out, "Product \"{}\" added successfully!", product.name)?;
    Ok(())
}

/// `agrofix admin delete-product`
pub async fn delete_product<A, W>(api: &A, id: ProductId, out: &mut W) -> anyhow::Result<()>
where
    A: AdminApi + ?Sized,
    W: Write,
{
    api.delete_product(id).await?;
    writeln!(out, "Product {} deleted", id)?;
    Ok(())
}

/// `agrofix admin set-status`
pub async fn set_status<A, W>(
    api: &A,
    order_id: i64,
    status: &OrderStatus,
    out: &mut W,
) -> anyhow::Result<()>
where
    A: AdminApi + ?Sized,
    W: Write,
{
    api.update_order_status(order_id, status).await?;
    writeln!(out, "Order {} updated to \"{}\"", order_id, status)?;
    Ok(())
}
