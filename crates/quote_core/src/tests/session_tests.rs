use std::sync::Arc;

use super::*;
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use shared::domain::{AddonKind, BracketType, SizeClass, WallType};
use tokio::sync::Mutex;

use crate::{
    cart::Committed,
    persistence::{MemoryStore, CART_ITEMS_KEY, SELECTION_SIZE_KEY},
    submission::MissingQuoteSubmitter,
};

#[derive(Default)]
struct RecordingSubmitter {
    requests: Arc<Mutex<Vec<SubmissionRequest>>>,
    fail_with: Option<String>,
}

#[async_trait]
impl QuoteSubmitter for RecordingSubmitter {
    async fn submit(&self, request: SubmissionRequest) -> anyhow::Result<SubmissionReceipt> {
        if let Some(err) = &self.fail_with {
            return Err(anyhow!(err.clone()));
        }
        let photo_urls = request
            .photos
            .iter()
            .map(|photo| format!("https://media.test/{}", photo.filename))
            .collect();
        self.requests.lock().await.push(request);
        Ok(SubmissionReceipt {
            submitted_at: Utc::now(),
            photo_urls,
            photos_dropped: 0,
        })
    }
}

fn contact() -> ContactForm {
    ContactForm {
        name: "Robin Park".to_string(),
        email: "robin@example.com".to_string(),
        phone: "5551234567".to_string(),
        city: "Portland".to_string(),
        message: None,
    }
}

async fn open(store: &MemoryStore) -> QuoteSession<MemoryStore> {
    QuoteSession::open(store.clone(), PriceCatalog::standard()).await
}

async fn select(session: &mut QuoteSession<MemoryStore>, size: SizeClass, bracket: BracketType) {
    for action in [
        Action::SelectSize(size),
        Action::SelectBracket(bracket),
        Action::SelectWall(WallType::DrywallAboveFireplace),
    ] {
        session.dispatch(action).await.expect("select");
    }
}

#[tokio::test]
async fn dispatch_writes_through_to_store() {
    let store = MemoryStore::new();
    let mut session = open(&store).await;

    select(&mut session, SizeClass::From56To75, BracketType::Tilting).await;
    let view = session.dispatch(Action::Commit).await.expect("commit");

    assert_eq!(view.grand_total, 189);
    let entries = store.snapshot().await;
    assert!(entries[CART_ITEMS_KEY].contains("\"56-75\""));
    assert!(!entries.contains_key(SELECTION_SIZE_KEY));
}

#[tokio::test]
async fn reopening_restores_cart_and_selection() {
    let store = MemoryStore::new();
    {
        let mut session = open(&store).await;
        select(&mut session, SizeClass::UpTo55, BracketType::Own).await;
        session.dispatch(Action::Commit).await.expect("commit");
        session
            .dispatch(Action::SelectSize(SizeClass::Over75))
            .await
            .expect("size");
    }

    let session = open(&store).await;

    assert_eq!(session.state().cart.len(), 1);
    assert_eq!(session.state().selection.size(), Some(SizeClass::Over75));
    assert_eq!(session.grand_total(), 99);
}

#[tokio::test]
async fn rejected_action_is_not_saved() {
    let store = MemoryStore::new();
    let mut session = open(&store).await;

    let err = session
        .dispatch(Action::Remove(0))
        .await
        .expect_err("empty cart");

    assert_eq!(err, QuoteError::IndexOutOfRange { index: 0, len: 0 });
    assert!(store.snapshot().await.is_empty());
}

#[tokio::test]
async fn proceed_commits_and_persists() {
    let store = MemoryStore::new();
    let mut session = open(&store).await;
    select(&mut session, SizeClass::Over75, BracketType::FullMotion).await;

    let proceeded = session.proceed().await.expect("proceed");

    assert_eq!(proceeded.committed, Some(Committed::Appended(0)));
    assert_eq!(open(&store).await.state().cart.len(), 1);
}

#[tokio::test]
async fn submit_sends_snapshot_and_starts_fresh() {
    let store = MemoryStore::new();
    let mut session = open(&store).await;
    select(&mut session, SizeClass::UpTo55, BracketType::Tilting).await;
    session
        .dispatch(Action::ToggleAddon(AddonKind::Concealment))
        .await
        .expect("addon");
    session.dispatch(Action::Commit).await.expect("commit");
    let expected_text = session.quote_text();
    let submitter = RecordingSubmitter::default();

    let receipt = session
        .submit(&submitter, contact(), Vec::new())
        .await
        .expect("submit");

    assert!(receipt.photo_urls.is_empty());
    let requests = submitter.requests.lock().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].snapshot.grand_total, 298);
    assert_eq!(requests[0].snapshot.quote_text, expected_text);
    assert_eq!(requests[0].snapshot.items.len(), 1);

    assert_eq!(session.state(), &QuoteState::default());
    assert_eq!(open(&store).await.state(), &QuoteState::default());
}

#[tokio::test]
async fn invalid_contact_never_reaches_submitter() {
    let store = MemoryStore::new();
    let mut session = open(&store).await;
    let submitter = RecordingSubmitter::default();
    let mut form = contact();
    form.email = "robin".to_string();

    let err = session
        .submit(&submitter, form, Vec::new())
        .await
        .expect_err("invalid email");

    assert_eq!(err.code(), shared::error::ErrorCode::Validation);
    assert!(submitter.requests.lock().await.is_empty());
}

#[tokio::test]
async fn failed_submission_keeps_the_quote() {
    let store = MemoryStore::new();
    let mut session = open(&store).await;
    select(&mut session, SizeClass::UpTo55, BracketType::Own).await;
    session.dispatch(Action::Commit).await.expect("commit");
    let submitter = RecordingSubmitter {
        fail_with: Some("intake offline".to_string()),
        ..RecordingSubmitter::default()
    };

    let err = session
        .submit(&submitter, contact(), Vec::new())
        .await
        .expect_err("submitter fails");

    assert_eq!(err, QuoteError::Submission("intake offline".to_string()));
    assert_eq!(session.state().cart.len(), 1);
}

#[tokio::test]
async fn unconfigured_submitter_reports_upstream_error() {
    let mut session = open(&MemoryStore::new()).await;

    let err = session
        .submit(&MissingQuoteSubmitter, contact(), Vec::new())
        .await
        .expect_err("not configured");

    assert_eq!(err.code(), shared::error::ErrorCode::Upstream);
}

#[tokio::test]
async fn snapshot_mid_edit_commits_the_edit_into_items() {
    let store = MemoryStore::new();
    let mut session = open(&store).await;
    select(&mut session, SizeClass::UpTo55, BracketType::Own).await;
    session.dispatch(Action::Commit).await.expect("commit");
    session.dispatch(Action::BeginEdit(0)).await.expect("edit");
    session
        .dispatch(Action::SelectBracket(BracketType::FullMotion))
        .await
        .expect("bracket");
    let before = session.state().clone();

    let snapshot = session.snapshot().expect("snapshot");

    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.items[0].bracket, BracketType::FullMotion);
    assert_eq!(snapshot.items[0].price, 159);
    assert_eq!(snapshot.grand_total, 159);
    assert!(snapshot.quote_text.contains("Full-Motion (+$60)"));
    assert!(snapshot.quote_text.ends_with("TOTAL ESTIMATE: $159"));
    assert_eq!(session.state(), &before);
}

#[tokio::test]
async fn submit_mid_edit_sends_the_edited_item() {
    let store = MemoryStore::new();
    let mut session = open(&store).await;
    select(&mut session, SizeClass::UpTo55, BracketType::Own).await;
    session.dispatch(Action::Commit).await.expect("commit");
    session.dispatch(Action::BeginEdit(0)).await.expect("edit");
    session
        .dispatch(Action::ToggleAddon(AddonKind::Soundbar))
        .await
        .expect("addon");
    let submitter = RecordingSubmitter::default();

    session
        .submit(&submitter, contact(), Vec::new())
        .await
        .expect("submit");

    let requests = submitter.requests.lock().await;
    let snapshot = &requests[0].snapshot;
    let item_total: u32 = snapshot.items.iter().map(|item| item.price).sum();
    assert_eq!(snapshot.items[0].price, 99 + 49);
    assert_eq!(item_total, snapshot.grand_total);
    assert_eq!(session.state(), &QuoteState::default());
}

#[tokio::test]
async fn pending_selection_is_included_as_an_item() {
    let mut session = open(&MemoryStore::new()).await;
    select(&mut session, SizeClass::UpTo55, BracketType::Own).await;
    session.dispatch(Action::Commit).await.expect("commit");
    select(&mut session, SizeClass::Over75, BracketType::Tilting).await;

    let snapshot = session.snapshot().expect("snapshot");

    assert_eq!(snapshot.items.len(), 2);
    assert_eq!(snapshot.grand_total, 99 + 229);
    assert!(snapshot.quote_text.contains("TV 2: Over 75\""));
    assert!(!snapshot.quote_text.contains("TV Selection (Cart)"));
    assert_eq!(session.grand_total(), 99 + 229);
}

#[tokio::test]
async fn partial_selection_blocks_submission() {
    let mut session = open(&MemoryStore::new()).await;
    select(&mut session, SizeClass::UpTo55, BracketType::Own).await;
    session.dispatch(Action::Commit).await.expect("commit");
    session
        .dispatch(Action::SelectSize(SizeClass::Over75))
        .await
        .expect("size");
    let before = session.state().clone();
    let submitter = RecordingSubmitter::default();

    let err = session
        .submit(&submitter, contact(), Vec::new())
        .await
        .expect_err("partial selection");

    assert!(matches!(err, QuoteError::ValidationGap { .. }));
    assert!(submitter.requests.lock().await.is_empty());
    assert_eq!(session.state(), &before);
}

#[tokio::test]
async fn failed_submission_mid_edit_keeps_editing() {
    let mut session = open(&MemoryStore::new()).await;
    select(&mut session, SizeClass::UpTo55, BracketType::Own).await;
    session.dispatch(Action::Commit).await.expect("commit");
    session.dispatch(Action::BeginEdit(0)).await.expect("edit");
    let submitter = RecordingSubmitter {
        fail_with: Some("intake offline".to_string()),
        ..RecordingSubmitter::default()
    };

    session
        .submit(&submitter, contact(), Vec::new())
        .await
        .expect_err("submitter fails");

    assert_eq!(session.state().selection.editing_index(), Some(0));
}

#[tokio::test]
async fn untouched_quote_snapshots_as_general_inquiry() {
    let session = open(&MemoryStore::new()).await;

    let snapshot = session.snapshot().expect("snapshot");

    assert!(snapshot.items.is_empty());
    assert!(!snapshot.has_quote());
}
