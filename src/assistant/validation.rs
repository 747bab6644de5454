//! Required-field gate between extraction and dispatch.

use super::catalog::Operation;
use super::extractor::ArgumentSet;

/// Required parameters of `operation` that `args` does not provide.
/// Empty means the call may be dispatched.
pub fn validate(operation: Operation, args: &ArgumentSet) -> Vec<&'static str> {
    operation
        .required_params()
        .filter(|name| !args.has(name))
        .collect()
}

/// An operation paired with arguments that passed [`validate`].
///
/// The dispatcher only accepts this type, so an incomplete argument set
/// cannot reach the persistence service.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCall {
    operation: Operation,
    arguments: ArgumentSet,
}

impl ValidatedCall {
    /// Returns the missing field names on failure.
    pub fn new(operation: Operation, arguments: ArgumentSet) -> Result<Self, Vec<&'static str>> {
        let missing = validate(operation, &arguments);
        if missing.is_empty() {
            Ok(Self {
                operation,
                arguments,
            })
        } else {
            Err(missing)
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn arguments(&self) -> &ArgumentSet {
        &self.arguments
    }
}
