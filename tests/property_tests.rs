//! Property-based tests for blobsync
//!
//! Invariants that must hold for all inputs:
//! - Key resolution never panics, is idempotent, and never emits backslashes
//! - Charset suffixing applies to the HTML media type and nothing else
//! - Reserved configuration fields never leak into composed write options
//!
//! Run with: cargo test --test property_tests

use proptest::prelude::*;

mod key_tests {
    use super::*;
    use blobsync::key::resolve;

    proptest! {
        /// Invariant: resolution never panics on any relative path
        #[test]
        fn never_panics(path in ".*") {
            let _ = resolve(&path, None);
        }

        /// Invariant: a resolved key never contains a backslash
        #[test]
        fn no_backslashes(path in ".*") {
            let key = resolve(&path, None).unwrap();
            prop_assert!(!key.contains('\\'));
        }

        /// Invariant: resolving a resolved key changes nothing
        #[test]
        fn idempotent(path in ".*") {
            let once = resolve(&path, None).unwrap();
            let twice = resolve(&once, None).unwrap();
            prop_assert_eq!(once, twice);
        }

        /// Invariant: normalization also applies to transform output
        #[test]
        fn transform_output_is_normalized(path in "[a-z0-9./\\\\]{1,40}") {
            let transform = |rel: &str| format!("prefix\\{rel}");
            let key = resolve(&path, Some(&transform)).unwrap();
            prop_assert!(!key.contains('\\'));
            prop_assert!(key.starts_with("prefix/"));
        }
    }
}

mod content_tests {
    use super::*;
    use blobsync::content::{classify, mime_for_path, HTML_MIME};

    proptest! {
        /// Invariant: the charset suffix appears iff the type is text/html
        #[test]
        fn charset_iff_html(name in "[a-z0-9]{1,12}\\.[a-z0-9]{1,6}") {
            let desc = classify(&name, None, Some("utf-8"), None);
            let is_html = mime_for_path(&name) == HTML_MIME;
            prop_assert_eq!(desc.mime_type.contains(";charset=utf-8"), is_html);
        }

        /// Invariant: classification always yields a non-empty MIME type
        #[test]
        fn always_some_mime(name in ".*") {
            let desc = classify(&name, None, None, None);
            prop_assert!(!desc.mime_type.is_empty());
        }
    }
}

mod options_tests {
    use super::*;
    use blobsync::options::{compose, RESERVED_FIELDS};
    use blobsync::{ContentDescriptor, SyncConfig};

    proptest! {
        /// Invariant: reserved fields never appear in composed options, and
        /// arbitrary other fields pass through untouched
        #[test]
        fn reserved_fields_filtered(
            reserved_idx in 0..RESERVED_FIELDS.len(),
            passthrough in "[A-Z][a-zA-Z]{1,20}",
            value in "[ -~]{0,30}",
        ) {
            let reserved = RESERVED_FIELDS[reserved_idx];
            prop_assume!(passthrough != reserved);
            prop_assume!(!RESERVED_FIELDS.contains(&passthrough.as_str()));

            let mut config = SyncConfig::builder("bucket").build().unwrap();
            config.extra.insert(reserved.to_string(), value.clone());
            config.extra.insert(passthrough.clone(), value.clone());

            let descriptor = ContentDescriptor {
                mime_type: "text/plain".to_string(),
                content_encoding: None,
            };
            let options = compose(&config, "some/key.txt", &descriptor).unwrap();

            prop_assert!(!options.extra.contains_key(reserved));
            prop_assert_eq!(options.extra.get(&passthrough), Some(&value));
            prop_assert_eq!(&options.target, "bucket");
            prop_assert_eq!(&options.key, "some/key.txt");
        }
    }
}

mod digest_tests {
    use super::*;
    use blobsync::detect::quoted_digest;
    use blobsync::HashAlgorithm;

    proptest! {
        /// Invariant: digests are double-quoted lowercase hex of fixed width
        #[test]
        fn digest_shape(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let md5 = quoted_digest(HashAlgorithm::Md5, &bytes).unwrap();
            prop_assert_eq!(md5.len(), 34);
            prop_assert!(md5.starts_with('"') && md5.ends_with('"'));
            prop_assert!(md5[1..33].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

            let sha = quoted_digest(HashAlgorithm::Sha256, &bytes).unwrap();
            prop_assert_eq!(sha.len(), 66);

            prop_assert_eq!(quoted_digest(HashAlgorithm::None, &bytes), None);
        }

        /// Invariant: equal content means equal fingerprint
        #[test]
        fn deterministic(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(
                quoted_digest(HashAlgorithm::Md5, &bytes),
                quoted_digest(HashAlgorithm::Md5, &bytes)
            );
        }
    }
}
