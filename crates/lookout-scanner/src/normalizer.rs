//! Post-processing over finished results.

use lookout_core::AggregateResult;
use url::Url;

/// Field keys that may hold an image URL.
pub const IMAGE_KEYS: [&str; 5] = ["image", "avatar", "picture", "photo", "profile_image"];

/// Collect image URLs from every probe result's fields.
///
/// Only absolute `http`/`https` URLs with a host are kept. Duplicates are
/// dropped; the first occurrence fixes the position.
#[must_use]
pub fn extract_images(result: &AggregateResult) -> Vec<String> {
    let mut images: Vec<String> = Vec::new();
    for probe_result in &result.probe_results {
        for (key, value) in probe_result.fields.iter() {
            if IMAGE_KEYS.contains(&key) && is_web_url(value) && !images.iter().any(|i| i == value)
            {
                images.push(value.to_string());
            }
        }
    }
    images
}

fn is_web_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false)
}
