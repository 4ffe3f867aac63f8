use anyhow::Result;

use crate::dto::orders::OrderDetail;
use crate::models::Product;

/// Spreadsheet tools only detect UTF-8 reliably when the byte-order marker
/// leads the file.
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

pub fn orders_to_csv(orders: &[OrderDetail]) -> Result<Vec<u8>> {
    let mut buf = Vec::from(UTF8_BOM);
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record([
            "Order ID", "Date", "Customer", "Email", "Phone", "Address", "Products", "Total",
            "Status", "Viewed",
        ])?;

        for detail in orders {
            let products = detail
                .items
                .iter()
                .map(|item| format!("{} x{}", item.product_name, item.quantity))
                .collect::<Vec<_>>()
                .join(" | ");

            writer.write_record([
                detail.order.id.to_string(),
                detail
                    .order
                    .created_at
                    .format("%d/%m/%Y %H:%M (UTC)")
                    .to_string(),
                detail.customer.full_name(),
                detail.customer.email.clone(),
                detail.customer.phone.clone(),
                detail.customer.address.clone(),
                products,
                detail.order.total.to_string(),
                detail.order.status.as_str().to_string(),
                if detail.order.viewed { "Yes" } else { "No" }.to_string(),
            ])?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

pub fn products_to_csv(products: &[Product]) -> Result<Vec<u8>> {
    let mut buf = Vec::from(UTF8_BOM);
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record([
            "ID",
            "Name",
            "Category",
            "Price",
            "Stock",
            "Description",
            "Created",
        ])?;

        for product in products {
            writer.write_record([
                product.id.to_string(),
                product.name.clone(),
                product.category.as_str().to_string(),
                product.price.to_string(),
                product.stock.to_string(),
                product.description.clone().unwrap_or_default(),
                product.created_at.format("%d/%m/%Y").to_string(),
            ])?;
        }
        writer.flush()?;
    }
    Ok(buf)
}
