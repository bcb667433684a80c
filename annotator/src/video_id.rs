use regex::Regex;
use std::sync::LazyLock;

/// Length of a video identifier.
pub const VIDEO_ID_LEN: usize = 11;

static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtu\.be/|/v/|/u/\w+/|/embed/|watch\?v=|[?&]v=)([^#&?/]*)")
        .expect("video url pattern")
});

/// Extract the video identifier from a video-sharing URL.
///
/// Accepted shapes: `watch?v=<id>`, `&v=<id>`, `youtu.be/<id>`, `/v/<id>`,
/// `/embed/<id>` and `/u/<x>/<id>`. Returns `None` when no
/// eleven-character identifier follows the first recognized shape.
pub fn extract(url: &str) -> Option<String> {
    let captures = VIDEO_URL.captures(url.trim())?;
    let candidate = captures.get(1)?.as_str();
    if !is_valid(candidate) {
        return None;
    }

    Some(candidate.to_string())
}

/// Check that `id` has the shape of a video identifier.
pub fn is_valid(id: &str) -> bool {
    id.len() == VIDEO_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
