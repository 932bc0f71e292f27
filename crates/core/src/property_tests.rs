// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property tests for the failure codec and retryability predicate.

use crate::error::{is_retryable, TimeoutKind, WorkflowError};
use crate::failure::{decode_failure, encode_error};
use crate::test_support::{chained_error, leaf_error};
use proptest::prelude::*;

proptest! {
    // Round trip preserves kind, message, flags, details, and cause chain.
    #[test]
    fn failure_codec_roundtrips(err in chained_error()) {
        let back = decode_failure(&encode_error(&err));
        prop_assert_eq!(back, err);
    }

    // Serializing the wire record and reading it back changes nothing.
    #[test]
    fn wire_record_serde_roundtrips(err in chained_error()) {
        let failure = encode_error(&err);
        let json = serde_json::to_string(&failure).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let back: crate::failure::Failure =
            serde_json::from_str(&json).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(back, failure);
    }

    // The retryability predicate matches its definition pointwise.
    #[test]
    fn retryability_matches_taxonomy(err in leaf_error(), listed in proptest::bool::ANY) {
        let types: Vec<String> = if listed { vec!["Listed".to_string()] } else { vec![] };
        let expected = match &err {
            WorkflowError::Canceled { .. }
            | WorkflowError::Terminated { .. }
            | WorkflowError::Panic { .. } => false,
            WorkflowError::Timeout { kind, .. } => {
                matches!(kind, TimeoutKind::StartToClose | TimeoutKind::Heartbeat)
            }
            WorkflowError::Server { non_retryable, .. } => !non_retryable,
            WorkflowError::Application { non_retryable, error_type, .. } => {
                !non_retryable && !types.iter().any(|t| t == error_type)
            }
            _ => true,
        };
        prop_assert_eq!(is_retryable(&err, &types), expected);
    }
}
