// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

/// One field-level problem found while validating a fetched record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Zero-based index of the record in the fetched list.
    pub record: usize,
    pub field: &'static str,
    pub problem: String,
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "record {}: {} -- {}",
            self.record, self.field, self.problem
        )
    }
}

/// Everything that can go wrong fetching the vehicle catalog. Errors are
/// recovered at the store boundary; nothing propagates past becoming the
/// store's `error` value and one notification popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The response decoded but one or more records violated the vehicle
    /// schema. Carries field-level diagnostics for every violation found.
    Schema { violations: Vec<FieldViolation> },
    /// The fetch itself failed: unreachable catalog, non-success status,
    /// unreadable or undecodable body.
    Request { message: String },
}

impl FetchError {
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Structured detail payload; empty for request failures.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Schema { violations } => violations,
            Self::Request { .. } => &[],
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema { violations } => {
                write!(f, "invalid catalog response ({} violations)", violations.len())
            }
            Self::Request { message } => f.write_str(message),
        }
    }
}

impl std::error::Error for FetchError {}
