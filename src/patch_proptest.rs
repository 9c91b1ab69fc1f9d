//! Property-based tests for patch creation and application.
//!
//! Inputs are built from a tiny line alphabet so that generated pairs share
//! many lines and produce interesting hunks.

#[cfg(test)]
mod proptest_tests {
    use crate::patch::{apply_patch, create_patch, patch_path_for, target_path_for};
    use proptest::prelude::*;
    use std::path::{Path, PathBuf};

    fn text() -> impl Strategy<Value = String> {
        (prop::collection::vec("[a-c]{0,3}", 0..12), any::<bool>()).prop_map(
            |(lines, trailing_newline)| {
                let mut text = lines.join("\n");
                if trailing_newline && !lines.is_empty() {
                    text.push('\n');
                }
                text
            },
        )
    }

    proptest! {
        /// Property: applying the diff of A against B to A yields B
        #[test]
        fn patch_round_trip(original in text(), modified in text()) {
            match create_patch(&original, &modified) {
                Some(patch) => {
                    let applied = apply_patch(&original, &patch, Path::new("f.txt")).unwrap();
                    prop_assert_eq!(applied, modified);
                }
                None => prop_assert_eq!(original, modified),
            }
        }

        /// Property: a text diffed against itself produces no patch
        #[test]
        fn identical_text_has_no_patch(original in text()) {
            prop_assert!(create_patch(&original, &original).is_none());
        }

        /// Property: patch artifact names map back to the file they patch
        #[test]
        fn patch_path_maps_back(segments in prop::collection::vec("[a-z][a-z0-9_.]{0,8}", 1..4)) {
            let relative: PathBuf = segments.iter().collect();
            prop_assert_eq!(target_path_for(&patch_path_for(&relative)), Some(relative));
        }
    }
}
