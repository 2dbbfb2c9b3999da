//! Output formatting for products, cart, and orders (table, JSON, markdown, CSV).

use crate::catalog::Product;
use crate::checkout::Order;
use crate::config::OutputFormat;
use crate::pricing::{format_money, Discount, Totals};
use crate::store::LineItem;
use serde_json::json;

/// Formats storefront data for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a single product with its rating breakdown and reviews.
    pub fn format_product(&self, product: &Product) -> String {
        match self.format {
            OutputFormat::Json => self.json_single(product),
            OutputFormat::Table => self.table_single(product),
            OutputFormat::Markdown => self.markdown_single(product),
            OutputFormat::Csv => self.csv_products(&[product]),
        }
    }

    /// Formats a product listing.
    pub fn format_products(&self, products: &[&Product]) -> String {
        if products.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.csv_header(),
                _ => "No products found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json_products(products),
            OutputFormat::Table => self.table_products(products),
            OutputFormat::Markdown => self.markdown_products(products),
            OutputFormat::Csv => self.csv_products(products),
        }
    }

    /// Formats cart lines followed by the totals breakdown. Line numbers are
    /// 1-based, matching the `cart qty` and `cart remove` arguments.
    pub fn format_cart(&self, items: &[LineItem], totals: &Totals, discount: &Discount) -> String {
        let totals = totals.rounded();

        if self.format == OutputFormat::Json {
            let value = json!({
                "items": items,
                "totals": totals,
                "coupon": discount.code,
            });
            return serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string());
        }

        if items.is_empty() {
            return match self.format {
                OutputFormat::Csv => Self::csv_cart_header().to_string(),
                _ => "Your cart is empty.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Csv => self.csv_cart(items),
            OutputFormat::Markdown => self.markdown_cart(items, &totals, discount),
            _ => self.table_cart(items, &totals, discount),
        }
    }

    /// Formats order history, newest last.
    pub fn format_orders(&self, orders: &[Order]) -> String {
        if orders.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => "id,date,items,total".to_string(),
                _ => "No orders yet.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(orders).unwrap_or_else(|_| "[]".to_string())
            }
            OutputFormat::Table => {
                let mut lines = vec![
                    format!("{:<18}  {:<16}  {:>5}  {:>10}", "Order", "Date", "Items", "Total"),
                    format!("{:-<18}  {:-<16}  {:->5}  {:->10}", "", "", "", ""),
                ];
                for order in orders {
                    lines.push(format!(
                        "{:<18}  {:<16}  {:>5}  {:>10}",
                        order.id,
                        order.date.format("%Y-%m-%d %H:%M"),
                        order.item_count(),
                        order.total
                    ));
                }
                lines.join("\n")
            }
            OutputFormat::Markdown => {
                let mut lines = vec![
                    "| Order | Date | Items | Total |".to_string(),
                    "|-------|------|-------|-------|".to_string(),
                ];
                for order in orders {
                    lines.push(format!(
                        "| {} | {} | {} | {} |",
                        order.id,
                        order.date.format("%Y-%m-%d"),
                        order.item_count(),
                        order.total
                    ));
                }
                lines.join("\n")
            }
            OutputFormat::Csv => {
                let mut lines = vec!["id,date,items,total".to_string()];
                for order in orders {
                    lines.push(format!(
                        "{},{},{},{}",
                        order.id,
                        order.date.to_rfc3339(),
                        order.item_count(),
                        order.total
                    ));
                }
                lines.join("\n")
            }
        }
    }

    // JSON formatting

    fn json_single(&self, product: &Product) -> String {
        serde_json::to_string_pretty(product).unwrap_or_else(|_| "{}".to_string())
    }

    fn json_products(&self, products: &[&Product]) -> String {
        serde_json::to_string_pretty(products).unwrap_or_else(|_| "[]".to_string())
    }

    // Table formatting

    fn table_single(&self, product: &Product) -> String {
        let mut lines = vec![
            format!("ID:       {}", product.id),
            format!("Title:    {}", product.title),
            format!("Price:    {}", format_money(product.price)),
            format!("Category: {}", product.category),
            format!(
                "Rating:   {:.1}/5 ({} ratings)",
                product.rating.rate, product.rating.count
            ),
            format!("Source:   {}", product.source),
        ];

        if !product.description.is_empty() {
            lines.push(String::new());
            lines.push(product.description.clone());
        }

        lines.push(String::new());
        for stars in (1..=5u8).rev() {
            let percent = product.distribution.percent(stars);
            let filled = (percent / 5.0).round() as usize;
            lines.push(format!(
                "{} star  {:<20}  {:>5}",
                stars,
                "#".repeat(filled),
                product.distribution.count(stars)
            ));
        }

        if !product.reviews.is_empty() {
            lines.push(String::new());
            lines.push("Reviews:".to_string());
            for review in &product.reviews {
                lines.push(format!(
                    "  {} {} ({}): {}",
                    "*".repeat(usize::from(review.rating)),
                    review.reviewer,
                    review.date.format("%Y-%m-%d"),
                    review.comment
                ));
            }
        }

        lines.join("\n")
    }

    fn table_products(&self, products: &[&Product]) -> String {
        let id_width = 8;
        let price_width = 10;
        let rating_width = 6;
        let category_width = 18;
        let title_width = 50;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<id_width$}  {:<price_width$}  {:<rating_width$}  {:<category_width$}  {}",
            "ID", "Price", "Rating", "Category", "Title"
        ));
        lines.push(format!(
            "{:-<id_width$}  {:-<price_width$}  {:-<rating_width$}  {:-<category_width$}  {:-<title_width$}",
            "", "", "", "", ""
        ));

        for product in products {
            lines.push(format!(
                "{:<id_width$}  {:>price_width$}  {:>rating_width$}  {:<category_width$}  {}",
                product.id,
                format_money(product.price),
                format!("{:.1}", product.rating.rate),
                truncate(&product.category, category_width),
                truncate(&product.title, title_width)
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} products", products.len()));

        lines.join("\n")
    }

    fn table_cart(&self, items: &[LineItem], totals: &Totals, discount: &Discount) -> String {
        let mut lines = vec![
            format!("{:>3}  {:<8}  {:<4}  {:>3}  {:>10}  {}", "#", "ID", "Size", "Qty", "Line", "Title"),
            format!("{:->3}  {:-<8}  {:-<4}  {:->3}  {:->10}  {:-<40}", "", "", "", "", "", ""),
        ];

        for (i, item) in items.iter().enumerate() {
            lines.push(format!(
                "{:>3}  {:<8}  {:<4}  {:>3}  {:>10}  {}",
                i + 1,
                item.product_id,
                item.size,
                item.quantity,
                format_money(item.line_total()),
                truncate(&item.title, 40)
            ));
        }

        lines.push(String::new());
        lines.push(format!("Subtotal:  {:>10}", format_money(totals.subtotal)));
        lines.push(format!("Tax:       {:>10}", format_money(totals.tax)));
        lines.push(format!(
            "Shipping:  {:>10}",
            if totals.shipping == 0.0 { "FREE".to_string() } else { format_money(totals.shipping) }
        ));
        if let Some(code) = &discount.code {
            lines.push(format!("Discount:  {:>10}  ({})", format!("-{}", format_money(totals.discount)), code));
        }
        lines.push(format!("Total:     {:>10}", format_money(totals.total)));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_single(&self, product: &Product) -> String {
        let mut lines = vec![
            format!("## {}", product.title),
            String::new(),
            format!("- **ID:** {}", product.id),
            format!("- **Price:** {}", format_money(product.price)),
            format!("- **Category:** {}", product.category),
            format!(
                "- **Rating:** {:.1}/5 ({} ratings)",
                product.rating.rate, product.rating.count
            ),
            format!("- **Image:** ![{}]({})", product.title, product.image),
        ];

        lines.push(String::new());
        lines.push("| Stars | Share |".to_string());
        lines.push("|-------|-------|".to_string());
        for stars in (1..=5u8).rev() {
            lines.push(format!("| {} | {:.0}% |", stars, product.distribution.percent(stars)));
        }

        if !product.reviews.is_empty() {
            lines.push(String::new());
            lines.push("### Reviews".to_string());
            lines.push(String::new());
            for review in &product.reviews {
                lines.push(format!(
                    "- **{}** ({}/5, {}): {}",
                    review.reviewer,
                    review.rating,
                    review.date.format("%Y-%m-%d"),
                    review.comment
                ));
            }
        }

        lines.join("\n")
    }

    fn markdown_products(&self, products: &[&Product]) -> String {
        let mut lines = Vec::new();

        lines.push("| ID | Price | Rating | Category | Title |".to_string());
        lines.push("|----|-------|--------|----------|-------|".to_string());

        for product in products {
            lines.push(format!(
                "| {} | {} | {:.1} | {} | {} |",
                product.id,
                format_money(product.price),
                product.rating.rate,
                product.category,
                truncate(&product.title, 40)
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} products found*", products.len()));

        lines.join("\n")
    }

    fn markdown_cart(&self, items: &[LineItem], totals: &Totals, discount: &Discount) -> String {
        let mut lines = vec![
            "| # | Product | Size | Qty | Line |".to_string(),
            "|---|---------|------|-----|------|".to_string(),
        ];

        for (i, item) in items.iter().enumerate() {
            lines.push(format!(
                "| {} | {} | {} | {} | {} |",
                i + 1,
                item.title,
                item.size,
                item.quantity,
                format_money(item.line_total())
            ));
        }

        lines.push(String::new());
        lines.push(format!("- **Subtotal:** {}", format_money(totals.subtotal)));
        lines.push(format!("- **Tax:** {}", format_money(totals.tax)));
        lines.push(format!("- **Shipping:** {}", format_money(totals.shipping)));
        if let Some(code) = &discount.code {
            lines.push(format!("- **Discount ({}):** -{}", code, format_money(totals.discount)));
        }
        lines.push(format!("- **Total:** {}", format_money(totals.total)));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "id,title,price,category,rating,ratings,source,image".to_string()
    }

    fn csv_products(&self, products: &[&Product]) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_header());

        for product in products {
            lines.push(format!(
                "{},{},{:.2},{},{},{},{},{}",
                product.id,
                Self::csv_escape(&product.title),
                product.price,
                Self::csv_escape(&product.category),
                product.rating.rate,
                product.rating.count,
                product.source,
                product.image
            ));
        }

        lines.join("\n")
    }

    fn csv_cart_header() -> &'static str {
        "product_id,title,size,quantity,price,line_total"
    }

    fn csv_cart(&self, items: &[LineItem]) -> String {
        let mut lines = vec![Self::csv_cart_header().to_string()];

        for item in items {
            lines.push(format!(
                "{},{},{},{},{:.2},{:.2}",
                item.product_id,
                Self::csv_escape(&item.title),
                Self::csv_escape(&item.size),
                item.quantity,
                item.price,
                item.line_total()
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

/// Shortens to `width` characters, ending in `...` when cut.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let kept: String = s.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::synth::rating_distribution;
    use crate::catalog::Review;
    use crate::pricing::PricingRules;
    use crate::store::cart::tests::{make_item, make_product};
    use chrono::{TimeZone, Utc};

    fn detailed_product() -> Product {
        let mut product = make_product("dj-7", 29.99);
        product.title = "Essence Mascara Lash Princess".to_string();
        product.category = "Beauty".to_string();
        product.distribution = rating_distribution(4.6, 100);
        product.reviews = vec![Review {
            reviewer: "Priya S.".to_string(),
            rating: 5,
            comment: "Exactly as described.".to_string(),
            date: Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap(),
        }];
        product
    }

    fn make_order() -> Order {
        Order {
            id: "ORD-1760000000000".to_string(),
            date: Utc.with_ymd_and_hms(2026, 10, 9, 8, 53, 20).unwrap(),
            items: vec![make_item("fs-1", 120.0, 1)],
            total: "$126.00".to_string(),
        }
    }

    // Products

    #[test]
    fn test_table_single_product() {
        let output = Formatter::new(OutputFormat::Table).format_product(&detailed_product());

        assert!(output.contains("ID:       dj-7"));
        assert!(output.contains("Price:    $29.99"));
        assert!(output.contains("Category: Beauty"));
        assert!(output.contains("5 star  ##############"));
        assert!(output.contains("Priya S. (2026-03-14): Exactly as described."));
    }

    #[test]
    fn test_markdown_single_product() {
        let output = Formatter::new(OutputFormat::Markdown).format_product(&detailed_product());

        assert!(output.contains("## Essence Mascara Lash Princess"));
        assert!(output.contains("- **Price:** $29.99"));
        assert!(output.contains("| 5 | 70% |"));
        assert!(output.contains("### Reviews"));
    }

    #[test]
    fn test_json_single_product() {
        let output = Formatter::new(OutputFormat::Json).format_product(&detailed_product());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["id"], "dj-7");
        assert_eq!(value["reviews"][0]["reviewer"], "Priya S.");
    }

    #[test]
    fn test_table_products() {
        let a = make_product("fs-1", 109.95);
        let b = detailed_product();
        let output = Formatter::new(OutputFormat::Table).format_products(&[&a, &b]);

        assert!(output.contains("ID"));
        assert!(output.contains("--------"));
        assert!(output.contains("$109.95"));
        assert!(output.contains("Essence Mascara"));
        assert!(output.contains("Total: 2 products"));
    }

    #[test]
    fn test_truncation_is_char_safe() {
        let mut product = make_product("fs-1", 1.0);
        product.title = "Ünïcödé ".repeat(10);
        let output = Formatter::new(OutputFormat::Markdown).format_products(&[&product]);
        assert!(output.contains("..."));
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
    }

    #[test]
    fn test_empty_products() {
        assert_eq!(Formatter::new(OutputFormat::Json).format_products(&[]), "[]");
        assert_eq!(Formatter::new(OutputFormat::Table).format_products(&[]), "No products found.");
        assert!(Formatter::new(OutputFormat::Csv).format_products(&[]).starts_with("id,title"));
    }

    #[test]
    fn test_csv_products_escape() {
        let mut product = make_product("fs-3", 55.99);
        product.title = "Jacket, \"Winter\" edition".to_string();
        let output = Formatter::new(OutputFormat::Csv).format_products(&[&product]);

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("fs-3,\"Jacket, \"\"Winter\"\" edition\",55.99,"));
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(Formatter::csv_escape("simple"), "simple");
        assert_eq!(Formatter::csv_escape("with,comma"), "\"with,comma\"");
        assert_eq!(Formatter::csv_escape("with\"quote"), "\"with\"\"quote\"");
    }

    // Cart

    #[test]
    fn test_table_cart_with_discount() {
        let items = vec![make_item("dj-2", 50.0, 2)];
        let mut discount = Discount::default();
        discount.apply("WELCOME20").unwrap();
        let totals = Totals::compute(&items, discount.fraction, &PricingRules::default());

        let output = Formatter::new(OutputFormat::Table).format_cart(&items, &totals, &discount);
        assert!(output.contains("Subtotal:     $100.00"));
        assert!(output.contains("Shipping:      $15.00"));
        assert!(output.contains("-$20.00  (WELCOME20)"));
        assert!(output.contains("Total:        $100.00"));
    }

    #[test]
    fn test_table_cart_free_shipping() {
        let items = vec![make_item("fs-1", 120.0, 1)];
        let totals = Totals::compute(&items, 0.0, &PricingRules::default());

        let output =
            Formatter::new(OutputFormat::Table).format_cart(&items, &totals, &Discount::default());
        assert!(output.contains("FREE"));
        assert!(output.contains("$126.00"));
        assert!(!output.contains("Discount"));
    }

    #[test]
    fn test_json_cart() {
        let items = vec![make_item("fs-1", 120.0, 1)];
        let totals = Totals::compute(&items, 0.0, &PricingRules::default());

        let output =
            Formatter::new(OutputFormat::Json).format_cart(&items, &totals, &Discount::default());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["totals"]["total"], 126.0);
        assert_eq!(value["items"][0]["key"], "fs-1M");
        assert!(value["coupon"].is_null());
    }

    #[test]
    fn test_empty_cart() {
        let output = Formatter::new(OutputFormat::Table).format_cart(
            &[],
            &Totals::default(),
            &Discount::default(),
        );
        assert_eq!(output, "Your cart is empty.");
    }

    #[test]
    fn test_csv_cart() {
        let items = vec![make_item("fs-1", 12.5, 4)];
        let output = Formatter::new(OutputFormat::Csv).format_cart(
            &items,
            &Totals::default(),
            &Discount::default(),
        );
        assert_eq!(output.lines().nth(1), Some("fs-1,Product fs-1,M,4,12.50,50.00"));
    }

    // Orders

    #[test]
    fn test_orders_formats() {
        let orders = vec![make_order()];

        let table = Formatter::new(OutputFormat::Table).format_orders(&orders);
        assert!(table.contains("ORD-1760000000000"));
        assert!(table.contains("2026-10-09 08:53"));
        assert!(table.contains("$126.00"));

        let md = Formatter::new(OutputFormat::Markdown).format_orders(&orders);
        assert!(md.contains("| ORD-1760000000000 | 2026-10-09 | 1 | $126.00 |"));

        let csv = Formatter::new(OutputFormat::Csv).format_orders(&orders);
        assert_eq!(csv.lines().count(), 2);

        assert_eq!(Formatter::new(OutputFormat::Table).format_orders(&[]), "No orders yet.");
    }
}
