//! Destination key resolution

use crate::error::{Result, SyncError};

/// Strategy mapping a relative path to a destination key.
///
/// Plain closures returning `String` implement this; implement the trait
/// directly when the transform can fail.
pub trait KeyTransform: Send + Sync {
    fn transform(&self, relative_path: &str) -> Result<String>;
}

impl<F> KeyTransform for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn transform(&self, relative_path: &str) -> Result<String> {
        Ok(self(relative_path))
    }
}

/// Derive the destination key for a file's relative path.
///
/// With a transform configured its return value is used verbatim (it may
/// rewrite directories, not just the filename); otherwise the relative path
/// maps to the key unchanged, preserving the file tree shape. Destination
/// keys are always slash-delimited, so backslashes are normalized last
/// regardless of how the key was produced.
pub fn resolve(relative_path: &str, transform: Option<&dyn KeyTransform>) -> Result<String> {
    let key = match transform {
        Some(transform) => transform
            .transform(relative_path)
            .map_err(|e| SyncError::Callback(format!("key transform for '{relative_path}': {e}")))?,
        None => relative_path.to_string(),
    };

    Ok(key.replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identity_preserves_tree_shape() {
        let key = resolve("assets/css/site.css", None).unwrap();
        assert_eq!(key, "assets/css/site.css");
    }

    #[test]
    fn transform_output_used_verbatim() {
        let upper = |rel: &str| format!("v2/{}", rel.to_uppercase());
        let key = resolve("a/b.js", Some(&upper)).unwrap();
        assert_eq!(key, "v2/A/B.JS");
    }

    #[test]
    fn backslashes_normalized_after_transform() {
        let windowsy = |rel: &str| format!("dist\\{rel}");
        let key = resolve("img\\logo.png", Some(&windowsy)).unwrap();
        assert_eq!(key, "dist/img/logo.png");
        assert!(!key.contains('\\'));
    }

    #[test]
    fn resolution_is_idempotent() {
        let first = resolve("a\\b\\c.txt", None).unwrap();
        let second = resolve(&first, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn failing_transform_is_a_callback_error() {
        struct Broken;
        impl KeyTransform for Broken {
            fn transform(&self, _: &str) -> Result<String> {
                Err(SyncError::Callback("boom".into()))
            }
        }
        let err = resolve("a.txt", Some(&Broken)).unwrap_err();
        assert!(matches!(err, SyncError::Callback(_)));
    }
}
