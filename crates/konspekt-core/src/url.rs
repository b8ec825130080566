/// Extract a YouTube video id from the URL shapes users actually paste:
/// watch links, short youtu.be links, embeds, shorts, mobile links, or a
/// bare 11-character id.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if looks_like_id(input) {
        return Some(input.to_string());
    }

    let rest = input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))
        .unwrap_or(input);
    let rest = rest
        .strip_prefix("www.")
        .or_else(|| rest.strip_prefix("m."))
        .unwrap_or(rest);

    if let Some(path) = rest.strip_prefix("youtu.be/") {
        return id_prefix(path);
    }

    let path = rest.strip_prefix("youtube.com/")?;
    if let Some(query) = path.strip_prefix("watch?") {
        return query
            .split('&')
            .find_map(|pair| pair.strip_prefix("v="))
            .and_then(id_prefix);
    }
    ["embed/", "shorts/", "live/"]
        .iter()
        .find_map(|prefix| path.strip_prefix(prefix))
        .and_then(id_prefix)
}

fn looks_like_id(s: &str) -> bool {
    s.len() == 11 && s.bytes().all(is_id_byte)
}

fn is_id_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

fn id_prefix(s: &str) -> Option<String> {
    let end = s
        .bytes()
        .position(|b| !is_id_byte(b))
        .unwrap_or(s.len());
    if end == 0 {
        None
    } else {
        Some(s[..end].to_string())
    }
}
