//! Plain-text quote summary submitted alongside the contact form.

use shared::catalog::PriceCatalog;

use crate::{
    cart::QuoteCart,
    pricing::{self, LineView},
    selection::Selection,
};

const ITEM_DIVIDER: &str = "\n\n--------------------------------------------------\n\n";
const TOTAL_RULE: &str = "==================================================";
const PENDING_HEADING: &str = "TV Selection (Cart)";

pub fn format_quote(
    catalog: &PriceCatalog,
    cart: &QuoteCart,
    selection: &Selection,
    grand_total: u32,
) -> String {
    let mut paragraphs: Vec<String> = pricing::cart_lines(cart, selection)
        .iter()
        .map(|line| paragraph(catalog, &format!("TV {}", line.index + 1), &line.view))
        .collect();

    if let Some(view) = pricing::pending_line(selection) {
        paragraphs.push(paragraph(catalog, PENDING_HEADING, &view));
    }

    let mut text = paragraphs.join(ITEM_DIVIDER);
    text.push_str(&format!(
        "\n\n{TOTAL_RULE}\nTOTAL ESTIMATE: ${grand_total}"
    ));
    text
}

fn paragraph(catalog: &PriceCatalog, heading: &str, view: &LineView<'_>) -> String {
    let (base, delta) = pricing::base_and_delta(catalog, view.size(), view.bracket());

    let mut text = format!("{heading}: {} (${base})", view.size_label());
    if !view.bracket().is_baseline() {
        text.push_str(&format!(", {} (+${delta})", view.bracket_label()));
    }
    text.push_str(&format!(", Wall: {}", view.wall_label()));

    if !view.addons().is_empty() {
        let addons = view
            .addons()
            .iter()
            .map(|&addon| {
                format!(
                    "{} (+${})",
                    addon.label(),
                    pricing::addon_amount(catalog, addon)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        text.push_str(&format!("\n   + Add-ons: {addons}"));
    }

    text.push_str(&format!("\n   Item Total: ${}", view.price(catalog)));
    text
}

#[cfg(test)]
#[path = "tests/format_tests.rs"]
mod tests;
