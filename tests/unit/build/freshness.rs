use std::time::Duration;

use super::*;

fn t(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}

#[test]
fn missing_output_is_stale() {
    assert!(is_stale(None, &[]));
    assert!(is_stale(None, &[t(1)]));
}

#[test]
fn output_newer_than_all_inputs_is_fresh() {
    assert!(!is_stale(Some(t(10)), &[t(1), t(9)]));
    assert!(!is_stale(Some(t(10)), &[]));
}

#[test]
fn equal_timestamp_is_stale() {
    assert!(is_stale(Some(t(10)), &[t(1), t(10)]));
}

#[test]
fn touching_any_input_makes_stale() {
    let inputs = [t(3), t(4), t(5)];
    assert!(!is_stale(Some(t(6)), &inputs));
    for i in 0..inputs.len() {
        let mut touched = inputs;
        touched[i] = t(7);
        assert!(is_stale(Some(t(6)), &touched));
        // Rebuilding after the touch clears it.
        assert!(!is_stale(Some(t(8)), &touched));
    }
}

#[test]
fn absent_input_reads_as_epoch() {
    assert_eq!(or_epoch(None), SystemTime::UNIX_EPOCH);
    assert!(!is_stale(Some(t(1)), &[or_epoch(None)]));
}
