//! Property-based tests for the metadata layer.
//!
//! Uses proptest to verify that header parsing and the inspection helpers
//! are total over arbitrary byte slices and that the header round-trips.

use proptest::prelude::*;
use pulsejet_core::{
    check_sample, check_sample_version, sample_version_string, SampleHeader, HEADER_SIZE,
};

proptest! {
    /// The inspection helpers never panic, whatever bytes they are handed.
    #[test]
    fn inspection_is_total(input in proptest::collection::vec(any::<u8>(), 0..64)) {
        let _ = check_sample(&input);
        let _ = check_sample_version(&input);
        let _ = sample_version_string(&input);
        let _ = SampleHeader::read(&input);
    }

    /// Writing a header and reading it back preserves the frame count.
    #[test]
    fn header_round_trip(num_frames in any::<u16>()) {
        let header = SampleHeader { num_frames };
        let mut bytes = Vec::new();
        header.write(&mut bytes);

        prop_assert_eq!(bytes.len(), HEADER_SIZE);
        prop_assert_eq!(SampleHeader::read(&bytes).unwrap(), header);
    }

    /// Corrupting any tag byte makes the sample check fail.
    #[test]
    fn corrupted_tag_is_rejected(index in 0usize..4, corruption in 1u8..=255) {
        let mut bytes = Vec::new();
        SampleHeader { num_frames: 1 }.write(&mut bytes);
        bytes[index] = bytes[index].wrapping_add(corruption);

        prop_assert!(!check_sample(&bytes));
        prop_assert!(SampleHeader::read(&bytes).is_err());
    }
}
