//! Output filename policies.
//!
//! Single downloads and inline lists get a marker inserted before the
//! extension (`icon.png` → `icon-processed.png`). Archive entries keep the
//! upload names.

use crate::config::PackagingMode;
use std::collections::HashSet;

/// Name used when an upload carries no usable filename.
pub const FALLBACK_NAME: &str = "image.png";

/// Rule for deriving an output name from an upload name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingPolicy {
    /// Insert the marker before the last `.`
    Suffix(String),
    /// Keep the upload name
    Identity,
}

impl NamingPolicy {
    /// Policy for a batch of `count` images packaged with `mode`.
    pub fn for_batch(count: usize, mode: PackagingMode, marker: &str) -> Self {
        match mode {
            PackagingMode::Archive if count > 1 => NamingPolicy::Identity,
            _ => NamingPolicy::Suffix(marker.to_string()),
        }
    }

    /// Derive the output name.
    pub fn apply(&self, name: &str) -> String {
        match self {
            NamingPolicy::Suffix(marker) => add_suffix(name, marker),
            NamingPolicy::Identity => name.to_string(),
        }
    }
}

/// Insert `marker` before the last `.`, or append it when there is none.
pub fn add_suffix(name: &str, marker: &str) -> String {
    match name.rfind('.') {
        Some(dot) => format!("{}{}{}", &name[..dot], marker, &name[dot..]),
        None => format!("{}{}", name, marker),
    }
}

/// Reduce a client-declared filename to a safe base name.
///
/// Browsers normally send a bare name, but some clients send full paths.
pub fn sanitize_upload_name(declared: Option<&str>) -> String {
    let base = declared
        .unwrap_or_default()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Rename repeats so every name is unique: the second `a.png` becomes
/// `a-2.png`, the third `a-3.png`. First occurrences are untouched.
pub fn disambiguate(names: &mut [String]) {
    let mut seen: HashSet<String> = HashSet::with_capacity(names.len());

    for name in names.iter_mut() {
        if seen.insert(name.clone()) {
            continue;
        }

        let mut n = 2;
        loop {
            let candidate = add_suffix(name, &format!("-{}", n));
            if seen.insert(candidate.clone()) {
                *name = candidate;
                break;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_suffix_before_extension() {
        assert_eq!(add_suffix("icon.png", "-processed"), "icon-processed.png");
    }

    #[test]
    fn test_suffix_without_extension() {
        assert_eq!(add_suffix("icon", "-processed"), "icon-processed");
    }

    #[test]
    fn test_suffix_uses_last_dot() {
        assert_eq!(add_suffix("logo.final.png", "-processed"), "logo.final-processed.png");
    }

    #[test]
    fn test_suffix_on_dotfile() {
        assert_eq!(add_suffix(".png", "-processed"), "-processed.png");
    }

    #[test]
    fn test_policy_per_shape() {
        assert_eq!(
            NamingPolicy::for_batch(1, PackagingMode::Archive, "-x"),
            NamingPolicy::Suffix("-x".to_string())
        );
        assert_eq!(
            NamingPolicy::for_batch(3, PackagingMode::Archive, "-x"),
            NamingPolicy::Identity
        );
        assert_eq!(
            NamingPolicy::for_batch(3, PackagingMode::Inline, "-x"),
            NamingPolicy::Suffix("-x".to_string())
        );
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_upload_name(Some("C:\\Users\\me\\icon.png")), "icon.png");
        assert_eq!(sanitize_upload_name(Some("assets/icons/icon.png")), "icon.png");
    }

    #[test]
    fn test_sanitize_fallbacks() {
        assert_eq!(sanitize_upload_name(None), FALLBACK_NAME);
        assert_eq!(sanitize_upload_name(Some("")), FALLBACK_NAME);
        assert_eq!(sanitize_upload_name(Some("dir/")), FALLBACK_NAME);
        assert_eq!(sanitize_upload_name(Some("..")), FALLBACK_NAME);
        assert_eq!(sanitize_upload_name(Some("  \t ")), FALLBACK_NAME);
    }

    #[test]
    fn test_sanitize_keeps_unicode() {
        assert_eq!(sanitize_upload_name(Some("图标.png")), "图标.png");
    }

    #[test]
    fn test_disambiguate() {
        let mut names = vec![
            "a.png".to_string(),
            "b.png".to_string(),
            "a.png".to_string(),
            "a.png".to_string(),
        ];
        disambiguate(&mut names);
        assert_eq!(names, ["a.png", "b.png", "a-2.png", "a-3.png"]);
    }

    #[test]
    fn test_disambiguate_avoids_existing_names() {
        let mut names = vec!["a.png".to_string(), "a-2.png".to_string(), "a.png".to_string()];
        disambiguate(&mut names);
        assert_eq!(names, ["a.png", "a-2.png", "a-3.png"]);
    }

    proptest! {
        #[test]
        fn prop_identity_keeps_name(name in "[a-zA-Z0-9 ._-]{1,40}") {
            prop_assert_eq!(NamingPolicy::Identity.apply(&name), name);
        }

        #[test]
        fn prop_suffix_keeps_extension(stem in "[a-z0-9_-]{1,20}", ext in "[a-z]{1,5}") {
            let name = format!("{}.{}", stem, ext);
            let renamed = add_suffix(&name, "-processed");
            prop_assert_eq!(renamed, format!("{}-processed.{}", stem, ext));
        }

        #[test]
        fn prop_disambiguated_names_are_unique(raw in proptest::collection::vec("[ab]\\.png|c", 1..12)) {
            let mut names = raw.clone();
            disambiguate(&mut names);
            let unique: HashSet<_> = names.iter().collect();
            prop_assert_eq!(unique.len(), names.len());
            prop_assert_eq!(names.len(), raw.len());
        }
    }
}
