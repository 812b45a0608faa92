// Copyright (c) 2025-2026 Federico Hoerth <memparanoid@gmail.com>
// SPDX-License-Identifier: GPL-3.0-only
// See LICENSE in the repository root for full license text.

use crate::error::EntropyError;
use crate::support::test_utils::{MockEntropySource, MockEntropySourceBehaviour};
use crate::traits::EntropySource;

#[test]
fn test_mock_entropy_source_behaviour_none() {
    let mock = MockEntropySource::new(MockEntropySourceBehaviour::None);
    let mut buf = [0u8; 32];

    let result = mock.fill_bytes(&mut buf);

    assert!(result.is_ok());
}

#[test]
fn test_mock_entropy_source_behaviour_fail_always() {
    let mock = MockEntropySource::new(MockEntropySourceBehaviour::FailAlways);
    let mut buf = [0u8; 32];

    let result = mock.fill_bytes(&mut buf);

    assert!(matches!(result, Err(EntropyError::EntropyUnavailable)));
}

#[test]
fn test_mock_entropy_source_behaviour_fail_at_nth_third_call() {
    let mock = MockEntropySource::new(MockEntropySourceBehaviour::FailAtNthFillBytes(3));
    let mut buf = [0u8; 32];

    // First two calls succeed
    assert!(mock.fill_bytes(&mut buf).is_ok());
    assert!(mock.fill_bytes(&mut buf).is_ok());

    // Third call fails
    let result = mock.fill_bytes(&mut buf);
    assert!(matches!(result, Err(EntropyError::EntropyUnavailable)));

    // Fourth call succeeds
    assert!(mock.fill_bytes(&mut buf).is_ok());
}

#[test]
fn test_mock_entropy_source_behaviour_fixed() {
    let mock = MockEntropySource::new(MockEntropySourceBehaviour::Fixed(0x5A));
    let mut buf = [0u8; 16];

    mock.fill_bytes(&mut buf).expect("Failed to fill_bytes(..)");

    assert_eq!(buf, [0x5A; 16]);
    assert_eq!(mock.next_u32().expect("Failed to next_u32()"), 0x5A5A_5A5A);
    assert_eq!(
        mock.next_u64().expect("Failed to next_u64()"),
        0x5A5A_5A5A_5A5A_5A5A
    );
}

#[test]
fn test_mock_entropy_source_call_count() {
    let mock = MockEntropySource::new(MockEntropySourceBehaviour::None);
    let mut buf = [0u8; 32];

    assert_eq!(mock.call_count(), 0);

    mock.fill_bytes(&mut buf).expect("Failed to fill_bytes(..) (#0)");
    assert_eq!(mock.call_count(), 1);

    mock.fill_bytes(&mut buf).expect("Failed to fill_bytes(..) (#1)");
    assert_eq!(mock.call_count(), 2);

    mock.reset_count();
    assert_eq!(mock.call_count(), 0);
}

#[test]
fn test_mock_entropy_source_change_behaviour() {
    let mut mock = MockEntropySource::new(MockEntropySourceBehaviour::None);
    let mut bytes = [0u8; 32];

    assert!(mock.fill_bytes(&mut bytes).is_ok());

    mock.change_behaviour(MockEntropySourceBehaviour::FailAlways);
    assert!(mock.fill_bytes(&mut bytes).is_err());

    mock.change_behaviour(MockEntropySourceBehaviour::None);
    assert!(mock.fill_bytes(&mut bytes).is_ok());
}

#[test]
fn test_next_u32_propagates_failure() {
    let mock = MockEntropySource::new(MockEntropySourceBehaviour::FailAlways);

    assert!(matches!(
        mock.next_u32(),
        Err(EntropyError::EntropyUnavailable)
    ));
    assert!(matches!(
        mock.next_u64(),
        Err(EntropyError::EntropyUnavailable)
    ));
}
