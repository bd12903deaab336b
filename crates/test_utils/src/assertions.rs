//! Custom assertion helpers for domain errors

use domain_invoicing::WorkflowError;

/// Asserts that a result failed with `InvalidTransition`
///
/// # Panics
///
/// Panics with a descriptive message on any other outcome.
pub fn assert_invalid_transition<T: std::fmt::Debug>(result: Result<T, WorkflowError>) {
    match result {
        Err(WorkflowError::InvalidTransition { .. }) => {}
        other => panic!("expected InvalidTransition, got {other:?}"),
    }
}

/// Asserts that a result failed with `NotFound`
pub fn assert_not_found<T: std::fmt::Debug>(result: Result<T, WorkflowError>) {
    match result {
        Err(WorkflowError::NotFound { .. }) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

/// Asserts that a result failed with `ProductNotFound`
pub fn assert_product_not_found<T: std::fmt::Debug>(result: Result<T, WorkflowError>) {
    match result {
        Err(WorkflowError::ProductNotFound) => {}
        other => panic!("expected ProductNotFound, got {other:?}"),
    }
}
