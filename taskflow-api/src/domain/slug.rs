//! URL-safe slug derivation.
//!
//! Slugs are derived from a display name and kept unique by the database;
//! on a unique violation the caller retries with a fresh random suffix.

use rand::distributions::Alphanumeric;
use rand::Rng;

const SUFFIX_LEN: usize = 6;

/// Lowercase the input and collapse every non-alphanumeric run into a
/// single dash. Falls back to `"item"` when nothing survives.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_dash = true;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        "item".to_string()
    } else {
        slug
    }
}

/// `slugify` plus a random lowercase-alphanumeric suffix, for collision
/// retries.
pub fn slugify_with_suffix(input: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();

    format!("{}-{}", slugify(input), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_dashes() {
        assert_eq!(slugify("My First Project"), "my-first-project");
        assert_eq!(slugify("  Hello,   World!  "), "hello-world");
    }

    #[test]
    fn strips_leading_and_trailing_separators() {
        assert_eq!(slugify("--wat--"), "wat");
    }

    #[test]
    fn falls_back_when_nothing_survives() {
        assert_eq!(slugify("???"), "item");
        assert_eq!(slugify(""), "item");
    }

    #[test]
    fn suffix_preserves_base_and_adds_entropy() {
        let slug = slugify_with_suffix("My Project");
        assert!(slug.starts_with("my-project-"));
        assert_eq!(slug.len(), "my-project-".len() + SUFFIX_LEN);
        assert!(slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    }
}
