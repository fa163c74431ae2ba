use shared::{catalog::PriceCatalog, domain::LineItem, error::QuoteError};
use tracing::{debug, warn};

use crate::{pricing, selection::Selection};

/// Committed line items in insertion order, which is also display and
/// submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteCart {
    items: Vec<LineItem>,
}

impl QuoteCart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&LineItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push(&mut self, item: LineItem) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    fn ensure_index(&self, index: usize) -> Result<(), QuoteError> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(QuoteError::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }
}

impl From<Vec<LineItem>> for QuoteCart {
    fn from(items: Vec<LineItem>) -> Self {
        Self { items }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Committed {
    Appended(usize),
    Updated(usize),
}

impl Committed {
    pub fn index(self) -> usize {
        match self {
            Committed::Appended(index) | Committed::Updated(index) => index,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proceeded {
    pub committed: Option<Committed>,
}

/// Cart plus the item under construction; the unit the controller owns and
/// the persistence adapter snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteState {
    pub cart: QuoteCart,
    pub selection: Selection,
}

impl QuoteState {
    pub fn new(cart: QuoteCart, selection: Selection) -> Self {
        Self { cart, selection }
    }

    /// Appends the selection as a new item, or overwrites the item under edit.
    /// Leaves everything untouched when the selection is incomplete.
    pub fn commit(&mut self, catalog: &PriceCatalog) -> Result<Committed, QuoteError> {
        let Some(spec) = self.selection.spec() else {
            return Err(QuoteError::validation_gap(self.selection.missing_fields()));
        };
        let price = pricing::spec_price(catalog, &spec).total;
        let item = LineItem::snapshot(spec, price);

        let committed = match self.selection.editing_index() {
            Some(index) if index < self.cart.len() => {
                self.cart.items[index] = item;
                Committed::Updated(index)
            }
            Some(index) => {
                warn!(
                    index,
                    len = self.cart.len(),
                    "cart: editing index no longer in cart; appending instead"
                );
                Committed::Appended(self.cart.push(item))
            }
            None => Committed::Appended(self.cart.push(item)),
        };

        debug!(index = committed.index(), price, "cart: committed selection");
        self.selection.reset();
        Ok(committed)
    }

    pub fn remove(&mut self, index: usize) -> Result<LineItem, QuoteError> {
        self.cart.ensure_index(index)?;
        let removed = self.cart.items.remove(index);

        match self.selection.editing_index() {
            Some(editing) if editing == index => self.selection.reset(),
            Some(editing) if editing > index => {
                self.selection.set_editing_index(Some(editing - 1));
            }
            _ => {}
        }

        Ok(removed)
    }

    /// Loads a committed item into the selection for in-place editing.
    ///
    /// A complete selection that is not itself an edit is committed first so
    /// jumping to another item never discards finished work.
    pub fn begin_edit(&mut self, catalog: &PriceCatalog, index: usize) -> Result<(), QuoteError> {
        self.cart.ensure_index(index)?;

        if !self.selection.is_editing() && self.selection.is_complete() {
            self.commit(catalog)?;
        }

        let item = self.cart.items[index].clone();
        self.selection.load_item(&item, index);
        Ok(())
    }

    pub fn clear_all(&mut self) {
        self.cart.items.clear();
        self.selection.reset();
    }

    pub fn reset_selection(&mut self) {
        self.selection.reset();
    }

    /// Gate for moving on to the contact step.
    ///
    /// With an empty cart the selection must be complete. With items in the
    /// cart an empty selection is ignored and a partial one is rejected. A
    /// complete selection is committed before proceeding in both cases.
    pub fn proceed(&mut self, catalog: &PriceCatalog) -> Result<Proceeded, QuoteError> {
        if self.selection.is_partial() || (self.cart.is_empty() && self.selection.is_empty()) {
            return Err(QuoteError::validation_gap(self.selection.missing_fields()));
        }

        let committed = if self.selection.is_complete() {
            Some(self.commit(catalog)?)
        } else {
            None
        };
        Ok(Proceeded { committed })
    }
}

#[cfg(test)]
#[path = "tests/cart_tests.rs"]
mod tests;
