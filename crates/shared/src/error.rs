use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::{AddonKind, BracketType, SelectionField, SizeClass},
    protocol::ContactField,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    NotFound,
    Upstream,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Validation => "validation",
            ErrorCode::NotFound => "not_found",
            ErrorCode::Upstream => "upstream",
        }
    }
}

/// Conditions a quote operation reports back to the caller. Every variant is
/// recoverable: the quote state is left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("incomplete selection: missing {}", join_fields(.missing))]
    ValidationGap { missing: Vec<SelectionField> },
    #[error("no TV at position {index} (the quote has {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("{field}: {message}")]
    InvalidContact {
        field: ContactField,
        message: String,
    },
    #[error("{0}")]
    InvalidPhotos(String),
    #[error("submission failed: {0}")]
    Submission(String),
}

impl QuoteError {
    pub fn validation_gap(missing: Vec<SelectionField>) -> Self {
        Self::ValidationGap { missing }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            QuoteError::ValidationGap { .. }
            | QuoteError::InvalidContact { .. }
            | QuoteError::InvalidPhotos(_) => ErrorCode::Validation,
            QuoteError::IndexOutOfRange { .. } => ErrorCode::NotFound,
            QuoteError::Submission(_) => ErrorCode::Upstream,
        }
    }
}

fn join_fields(fields: &[SelectionField]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A price the catalog could not supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PriceLookupFailure {
    #[error("no {bracket} price for size {size}")]
    Bracket {
        size: SizeClass,
        bracket: BracketType,
    },
    #[error("no price for add-on {0}")]
    Addon(AddonKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("price catalog is incomplete: {}", join_failures(.missing))]
pub struct CatalogError {
    pub missing: Vec<PriceLookupFailure>,
}

fn join_failures(failures: &[PriceLookupFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownKey {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownKey {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
