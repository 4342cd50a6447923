//! Image reference normalization
//!
//! Turns the image references Docker reports for a container into the short
//! names the provider patterns are matched against.

/// Namespace Docker Hub applies to official images
const DEFAULT_NAMESPACE: &str = "library/";

/// Get the candidate names for a container
///
/// Tags are preferred; the raw image reference is used when the image has no
/// tags, and the container name when both are empty. Never returns an empty list.
pub fn container_names(tags: &[String], raw_image: &str, container_name: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for tag in tags {
        push_unique(&mut names, short_name(tag));
    }

    if names.is_empty() {
        push_unique(&mut names, short_name(raw_image));
    }

    if names.is_empty() {
        push_unique(&mut names, container_name.trim_start_matches('/').to_string());
    }

    names
}

/// Strip registry, tag and digest from an image reference
///
/// `docker.io/library/postgres:14-alpine` becomes `postgres` and
/// `ghcr.io/org/name:latest` becomes `org/name`.
pub fn short_name(reference: &str) -> String {
    let reference = reference.trim();

    // Digest first, it may contain a colon
    let without_digest = reference.split('@').next().unwrap_or_default();

    let repository = strip_registry(without_digest);

    // Anything after the first colon is the tag (registry ports are gone by now)
    let without_tag = repository.split(':').next().unwrap_or_default();

    without_tag
        .strip_prefix(DEFAULT_NAMESPACE)
        .unwrap_or(without_tag)
        .to_string()
}

/// Drop the leading registry host, if the reference has one
fn strip_registry(reference: &str) -> &str {
    match reference.split_once('/') {
        Some((first, rest)) if is_registry_host(first) => rest,
        _ => reference,
    }
}

fn is_registry_host(component: &str) -> bool {
    component.contains('.') || component.contains(':') || component == "localhost"
}

fn push_unique(names: &mut Vec<String>, name: String) {
    if !name.is_empty() && !names.contains(&name) {
        names.push(name);
    }
}
