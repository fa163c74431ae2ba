use serde::Serialize;
use shared::catalog::PriceCatalog;

use crate::{
    cart::QuoteState,
    pricing::{self, BreakdownRow},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineSummary {
    pub index: usize,
    pub title: String,
    pub rows: Vec<BreakdownRow>,
    pub is_editing: bool,
}

/// Everything a renderer needs after a state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteView {
    pub lines: Vec<LineSummary>,
    pub pending_line: Option<Vec<BreakdownRow>>,
    pub grand_total: u32,
    pub can_add_more: bool,
    pub can_proceed: bool,
    pub can_clear: bool,
    pub commit_label: String,
}

pub fn build_view(catalog: &PriceCatalog, state: &QuoteState) -> QuoteView {
    let QuoteState { cart, selection } = state;

    let lines = pricing::cart_lines(cart, selection)
        .into_iter()
        .map(|line| {
            let is_editing = line.view.is_live();
            let title = if is_editing {
                format!("TV {} (Editing)", line.index + 1)
            } else {
                format!("TV {}", line.index + 1)
            };
            LineSummary {
                index: line.index,
                title,
                rows: pricing::breakdown_lines(catalog, &line.view),
                is_editing,
            }
        })
        .collect();

    let pending_line =
        pricing::pending_line(selection).map(|view| pricing::breakdown_lines(catalog, &view));

    let commit_label = match selection.editing_index() {
        Some(index) => format!("Update TV {}", index + 1),
        None => "Add Another TV".to_string(),
    };

    QuoteView {
        lines,
        pending_line,
        grand_total: pricing::grand_total(catalog, cart, selection),
        can_add_more: selection.is_complete(),
        can_proceed: selection.is_complete() || (!cart.is_empty() && selection.is_empty()),
        can_clear: !cart.is_empty() || !selection.is_empty(),
        commit_label,
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
