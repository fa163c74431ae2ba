use shared::{
    catalog::PriceCatalog,
    error::QuoteError,
    protocol::{ContactForm, PhotoFile, QuoteSnapshot, SubmissionReceipt, SubmissionRequest},
};
use tracing::{info, warn};

use crate::{
    cart::{Proceeded, QuoteState},
    format::format_quote,
    persistence::{KeyValueStore, PersistenceAdapter},
    pricing,
    reducer::{reduce, Action},
    submission::QuoteSubmitter,
    validation,
    view::{build_view, QuoteView},
};

/// Single owner of the quote state. Every accepted action is applied in memory
/// first and then written through to the store in one save.
pub struct QuoteSession<S: KeyValueStore> {
    catalog: PriceCatalog,
    state: QuoteState,
    persistence: PersistenceAdapter<S>,
}

impl<S: KeyValueStore> QuoteSession<S> {
    pub async fn open(store: S, catalog: PriceCatalog) -> Self {
        let persistence = PersistenceAdapter::new(store);
        let state = persistence.load().await;
        info!(
            items = state.cart.len(),
            editing_index = ?state.selection.editing_index(),
            "session: restored quote"
        );
        Self {
            catalog,
            state,
            persistence,
        }
    }

    pub fn catalog(&self) -> &PriceCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &QuoteState {
        &self.state
    }

    pub fn store(&self) -> &S {
        self.persistence.store()
    }

    pub fn view(&self) -> QuoteView {
        build_view(&self.catalog, &self.state)
    }

    pub fn grand_total(&self) -> u32 {
        pricing::grand_total(&self.catalog, &self.state.cart, &self.state.selection)
    }

    pub fn quote_text(&self) -> String {
        format_quote(
            &self.catalog,
            &self.state.cart,
            &self.state.selection,
            self.grand_total(),
        )
    }

    pub async fn dispatch(&mut self, action: Action) -> Result<QuoteView, QuoteError> {
        match reduce(&self.state, &self.catalog, action) {
            Ok(next) => {
                self.state = next;
                self.persistence.save(&self.state).await;
                Ok(self.view())
            }
            Err(err) => {
                warn!(action = action.name(), error = %err, "session: action rejected");
                Err(err)
            }
        }
    }

    pub async fn proceed(&mut self) -> Result<Proceeded, QuoteError> {
        let proceeded = self.state.proceed(&self.catalog)?;
        self.persistence.save(&self.state).await;
        Ok(proceeded)
    }

    /// The quote as it would be submitted. A finished selection or edit is
    /// committed into a copy of the state first, so items, text and total all
    /// describe the same TVs. A partial selection is rejected. An untouched
    /// quote yields an empty snapshot (a general inquiry).
    pub fn snapshot(&self) -> Result<QuoteSnapshot, QuoteError> {
        let mut staged = self.state.clone();
        if !(staged.cart.is_empty() && staged.selection.is_empty()) {
            staged.proceed(&self.catalog)?;
        }

        let QuoteState { cart, selection } = &staged;
        let grand_total = pricing::grand_total(&self.catalog, cart, selection);
        Ok(QuoteSnapshot {
            items: cart.items().to_vec(),
            quote_text: format_quote(&self.catalog, cart, selection, grand_total),
            grand_total,
        })
    }

    /// Validates the form, hands an immutable snapshot to the submitter and,
    /// once it reports success, starts a fresh quote. On any failure the
    /// session state is left as it was.
    pub async fn submit<T>(
        &mut self,
        submitter: &T,
        contact: ContactForm,
        photos: Vec<PhotoFile>,
    ) -> Result<SubmissionReceipt, QuoteError>
    where
        T: QuoteSubmitter + ?Sized,
    {
        validation::validate_contact(&contact)?;
        validation::validate_photos(&photos)?;

        let request = SubmissionRequest {
            contact,
            snapshot: self.snapshot()?,
            photos,
        };
        let receipt = submitter.submit(request).await.map_err(|err| {
            warn!(error = %err, "session: quote submission failed");
            QuoteError::Submission(format!("{err:#}"))
        })?;

        self.state = QuoteState::default();
        self.persistence.save(&self.state).await;
        info!(
            photos = receipt.photo_urls.len(),
            "session: quote submitted; starting fresh"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
