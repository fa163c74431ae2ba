//! Price derivation for cart slots and the running grand total.
//!
//! Committed items carry the price captured when they were committed. The slot
//! being edited and a complete, not-yet-committed selection are priced live
//! from the catalog. [`LineView`] makes that split explicit for every slot.

use std::{collections::BTreeSet, fmt};

use serde::Serialize;
use shared::{
    catalog::PriceCatalog,
    domain::{AddonKind, BracketType, LineItem, MountSpec, SizeClass, WallType},
    error::PriceLookupFailure,
};
use tracing::error;

use crate::{cart::QuoteCart, selection::Selection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Priced {
    pub total: u32,
    pub failures: Vec<PriceLookupFailure>,
}

impl Priced {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Bracket price for the size plus every add-on. Missing catalog entries count
/// as zero and are reported in [`Priced::failures`].
pub fn price_of(
    catalog: &PriceCatalog,
    size: SizeClass,
    bracket: BracketType,
    addons: &BTreeSet<AddonKind>,
) -> Priced {
    let mut failures = Vec::new();
    let mut total = or_zero(catalog.bracket_price(size, bracket), &mut failures);
    for &addon in addons {
        total = total.saturating_add(or_zero(catalog.addon_price(addon), &mut failures));
    }
    Priced { total, failures }
}

pub fn spec_price(catalog: &PriceCatalog, spec: &MountSpec) -> Priced {
    price_of(catalog, spec.size, spec.bracket, &spec.addons)
}

fn or_zero(lookup: Result<u32, PriceLookupFailure>, failures: &mut Vec<PriceLookupFailure>) -> u32 {
    match lookup {
        Ok(price) => price,
        Err(failure) => {
            error!(%failure, "pricing: catalog lookup failed; substituting zero");
            failures.push(failure);
            0
        }
    }
}

/// Base price of the size and the upgrade delta of the bracket on top of it.
pub(crate) fn base_and_delta(
    catalog: &PriceCatalog,
    size: SizeClass,
    bracket: BracketType,
) -> (u32, u32) {
    let mut failures = Vec::new();
    let base = or_zero(catalog.base_price(size), &mut failures);
    if bracket.is_baseline() {
        return (base, 0);
    }
    let bracket_price = or_zero(catalog.bracket_price(size, bracket), &mut failures);
    (base, bracket_price.saturating_sub(base))
}

pub(crate) fn addon_amount(catalog: &PriceCatalog, addon: AddonKind) -> u32 {
    or_zero(catalog.addon_price(addon), &mut Vec::new())
}

/// How a slot is priced and labelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineView<'a> {
    /// A committed item shown as it was committed.
    Stored(&'a LineItem),
    /// The live selection: the slot under edit, or the pending new item.
    Live(MountSpec),
}

impl LineView<'_> {
    pub fn size(&self) -> SizeClass {
        match self {
            LineView::Stored(item) => item.size,
            LineView::Live(spec) => spec.size,
        }
    }

    pub fn bracket(&self) -> BracketType {
        match self {
            LineView::Stored(item) => item.bracket,
            LineView::Live(spec) => spec.bracket,
        }
    }

    pub fn wall(&self) -> WallType {
        match self {
            LineView::Stored(item) => item.wall,
            LineView::Live(spec) => spec.wall,
        }
    }

    pub fn addons(&self) -> &BTreeSet<AddonKind> {
        match self {
            LineView::Stored(item) => &item.addons,
            LineView::Live(spec) => &spec.addons,
        }
    }

    pub fn size_label(&self) -> &str {
        match self {
            LineView::Stored(item) => item.size_label(),
            LineView::Live(spec) => spec.size.label(),
        }
    }

    pub fn bracket_label(&self) -> &str {
        match self {
            LineView::Stored(item) => item.bracket_label(),
            LineView::Live(spec) => spec.bracket.label(),
        }
    }

    pub fn wall_label(&self) -> &str {
        match self {
            LineView::Stored(item) => item.wall_label(),
            LineView::Live(spec) => spec.wall.label(),
        }
    }

    pub fn price(&self, catalog: &PriceCatalog) -> u32 {
        match self {
            LineView::Stored(item) => item.price,
            LineView::Live(spec) => spec_price(catalog, spec).total,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, LineView::Live(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine<'a> {
    pub index: usize,
    pub view: LineView<'a>,
}

/// One view per committed slot, with the slot under edit shown live.
pub fn cart_lines<'a>(cart: &'a QuoteCart, selection: &Selection) -> Vec<CartLine<'a>> {
    cart.items()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let view = match (selection.editing_index(), selection.spec()) {
                (Some(editing), Some(spec)) if editing == index => LineView::Live(spec),
                _ => LineView::Stored(item),
            };
            CartLine { index, view }
        })
        .collect()
}

/// A complete selection that is not editing a committed item.
pub fn pending_line(selection: &Selection) -> Option<LineView<'static>> {
    if selection.is_editing() {
        return None;
    }
    selection.spec().map(LineView::Live)
}

/// Sum of every slot plus the pending line, saturating at `u32::MAX`. Stored
/// prices are not range-checked on load.
pub fn grand_total(catalog: &PriceCatalog, cart: &QuoteCart, selection: &Selection) -> u32 {
    cart_lines(cart, selection)
        .iter()
        .map(|line| line.view.price(catalog))
        .chain(pending_line(selection).map(|view| view.price(catalog)))
        .fold(0u32, u32::saturating_add)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Base,
    BracketUpgrade,
    Wall,
    Addon,
    Subtotal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "amount", rename_all = "snake_case")]
pub enum RowAmount {
    Flat(u32),
    Delta(u32),
    Included,
}

impl fmt::Display for RowAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowAmount::Flat(amount) => write!(f, "${amount}"),
            RowAmount::Delta(amount) => write!(f, "+${amount}"),
            RowAmount::Included => f.write_str("Inc."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownRow {
    pub kind: RowKind,
    pub label: String,
    pub amount: RowAmount,
}

impl BreakdownRow {
    fn new(kind: RowKind, label: impl Into<String>, amount: RowAmount) -> Self {
        Self {
            kind,
            label: label.into(),
            amount,
        }
    }
}

/// Rows in fixed order: base, bracket upgrade (skipped for the customer's own
/// bracket), wall, one per add-on, subtotal.
pub fn breakdown_lines(catalog: &PriceCatalog, view: &LineView<'_>) -> Vec<BreakdownRow> {
    let (base, delta) = base_and_delta(catalog, view.size(), view.bracket());
    let mut rows = vec![BreakdownRow::new(
        RowKind::Base,
        format!("{} Base", view.size_label()),
        RowAmount::Flat(base),
    )];
    if !view.bracket().is_baseline() {
        rows.push(BreakdownRow::new(
            RowKind::BracketUpgrade,
            format!("+ {}", view.bracket_label()),
            RowAmount::Delta(delta),
        ));
    }
    rows.push(BreakdownRow::new(
        RowKind::Wall,
        format!("Wall: {}", view.wall_label()),
        RowAmount::Included,
    ));
    for &addon in view.addons() {
        rows.push(BreakdownRow::new(
            RowKind::Addon,
            format!("+ {}", addon.label()),
            RowAmount::Delta(addon_amount(catalog, addon)),
        ));
    }
    rows.push(BreakdownRow::new(
        RowKind::Subtotal,
        "Subtotal",
        RowAmount::Flat(view.price(catalog)),
    ));
    rows
}

#[cfg(test)]
#[path = "tests/pricing_tests.rs"]
mod tests;
