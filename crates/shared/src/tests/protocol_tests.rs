use super::*;
use crate::domain::{BracketType, MountSpec, SizeClass, WallType};

fn item(price: u32) -> LineItem {
    LineItem::snapshot(
        MountSpec {
            size: SizeClass::UpTo55,
            bracket: BracketType::Own,
            wall: WallType::Plaster,
            addons: Default::default(),
        },
        price,
    )
}

fn contact() -> ContactForm {
    ContactForm {
        name: " Dana Reyes ".to_string(),
        email: "dana@example.com".to_string(),
        phone: "(909) 555-0100".to_string(),
        city: "Ontario".to_string(),
        message: None,
    }
}

#[test]
fn payload_defaults_message_and_photos() {
    let snapshot = QuoteSnapshot {
        items: vec![item(99), item(99)],
        quote_text: "TV 1: ...".to_string(),
        grand_total: 198,
    };
    let payload = IntakePayload::new(&contact(), &snapshot, &[]);

    assert_eq!(payload.name, "Dana Reyes");
    assert_eq!(payload.message, "-");
    assert_eq!(payload.total_estimate, "$198");
    assert_eq!(payload.service_type, "TV 1: ...");
    assert_eq!(payload.photo_urls, "No photos uploaded");
}

#[test]
fn payload_without_quote_is_a_general_inquiry() {
    let snapshot = QuoteSnapshot {
        items: Vec::new(),
        quote_text: String::new(),
        grand_total: 0,
    };
    let mut form = contact();
    form.message = Some("Need two TVs mounted".to_string());
    let urls = vec!["https://a/1.jpg".to_string(), "https://a/2.jpg".to_string()];
    let payload = IntakePayload::new(&form, &snapshot, &urls);

    assert_eq!(payload.service_type, "General Inquiry");
    assert_eq!(payload.total_estimate, "-");
    assert_eq!(payload.message, "Need two TVs mounted");
    assert_eq!(payload.photo_urls, "https://a/1.jpg\nhttps://a/2.jpg");
}

#[test]
fn payload_serializes_camel_case_keys() {
    let snapshot = QuoteSnapshot {
        items: vec![item(99)],
        quote_text: "q".to_string(),
        grand_total: 99,
    };
    let value = serde_json::to_value(IntakePayload::new(&contact(), &snapshot, &[]))
        .expect("serialize");
    assert_eq!(value["totalEstimate"], "$99");
    assert_eq!(value["serviceType"], "q");
    assert_eq!(value["photoUrls"], "No photos uploaded");
}

#[test]
fn snapshot_without_items_is_not_a_quote() {
    let empty = QuoteSnapshot {
        items: Vec::new(),
        quote_text: String::new(),
        grand_total: 0,
    };
    assert!(!empty.has_quote());

    let quoted = QuoteSnapshot {
        items: vec![item(0)],
        ..empty
    };
    assert!(quoted.has_quote());
}
