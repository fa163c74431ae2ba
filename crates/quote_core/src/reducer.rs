use shared::{
    catalog::PriceCatalog,
    domain::{AddonKind, BracketType, SizeClass, WallType},
    error::QuoteError,
};

use crate::cart::QuoteState;

/// User intents the quote builder reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SelectSize(SizeClass),
    SelectBracket(BracketType),
    SelectWall(WallType),
    ToggleAddon(AddonKind),
    Commit,
    BeginEdit(usize),
    Remove(usize),
    /// Drops the selection (and any in-place edit) without touching the cart.
    ResetSelection,
    ClearAll,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SelectSize(_) => "select_size",
            Action::SelectBracket(_) => "select_bracket",
            Action::SelectWall(_) => "select_wall",
            Action::ToggleAddon(_) => "toggle_addon",
            Action::Commit => "commit",
            Action::BeginEdit(_) => "begin_edit",
            Action::Remove(_) => "remove",
            Action::ResetSelection => "reset_selection",
            Action::ClearAll => "clear_all",
        }
    }
}

impl QuoteState {
    /// Applies one action in place. On error the state is unchanged.
    pub fn apply(&mut self, catalog: &PriceCatalog, action: Action) -> Result<(), QuoteError> {
        match action {
            Action::SelectSize(size) => self.selection.set_size(size),
            Action::SelectBracket(bracket) => self.selection.set_bracket(bracket),
            Action::SelectWall(wall) => self.selection.set_wall(wall),
            Action::ToggleAddon(addon) => {
                self.selection.toggle_addon(addon);
            }
            Action::Commit => {
                self.commit(catalog)?;
            }
            Action::BeginEdit(index) => self.begin_edit(catalog, index)?,
            Action::Remove(index) => {
                self.remove(index)?;
            }
            Action::ResetSelection => self.reset_selection(),
            Action::ClearAll => self.clear_all(),
        }
        Ok(())
    }
}

/// Pure transition: returns the next state, leaving `state` untouched.
pub fn reduce(
    state: &QuoteState,
    catalog: &PriceCatalog,
    action: Action,
) -> Result<QuoteState, QuoteError> {
    let mut next = state.clone();
    next.apply(catalog, action)?;
    Ok(next)
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
