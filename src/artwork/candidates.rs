/// Placeholder replaced with the channel name in artwork URL templates
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Candidate artwork URLs for a channel, in probe order
///
/// Raw-name expansions of every template come first, then the same templates
/// with the percent-escaped name. Duplicates (names that need no escaping)
/// appear once.
pub fn candidate_urls(templates: &[String], name: &str) -> Vec<String> {
    let escaped = urlencoding::encode(name);
    let mut candidates: Vec<String> = Vec::with_capacity(templates.len() * 2);

    let expansions = templates
        .iter()
        .map(|t| t.replace(NAME_PLACEHOLDER, name))
        .chain(templates.iter().map(|t| t.replace(NAME_PLACEHOLDER, &escaped)));
    for candidate in expansions {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}
