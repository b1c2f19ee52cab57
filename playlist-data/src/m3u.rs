//! M3U text codec.
//!
//! ```text
//! #EXTM3U
//! #EXTINF:-1 tvg-name="CNN" tvg-logo="https://logo.png" group-title="News",CNN
//! https://stream.example.com/cnn.m3u8
//! ```

use crate::channel::Channel;

/// Emit the playlist text form, one `#EXTINF` + URL pair per channel.
pub fn serialize(channels: &[Channel]) -> String {
    let mut out = String::from("#EXTM3U\n");

    for channel in channels {
        out.push_str("#EXTINF:-1");

        if let Some(tvg_id) = &channel.tvg_id {
            out.push_str(&format!(" tvg-id=\"{tvg_id}\""));
        }

        if !channel.group.is_empty() {
            out.push_str(&format!(" group-title=\"{}\"", channel.group));
        }

        if let Some(logo) = &channel.logo_url {
            out.push_str(&format!(" tvg-logo=\"{logo}\""));
        }

        out.push(',');
        out.push_str(&channel.name);
        out.push('\n');
        out.push_str(&channel.stream_url);
        out.push('\n');
    }

    out
}

/// Tolerant parse of M3U text into channels.
///
/// Blank and comment lines are skipped; the first non-comment line after an
/// `#EXTINF` is taken as that channel's URL. A channel whose stream URL
/// fails sanitization is silently dropped, valid siblings are kept.
pub fn parse(content: &str) -> Vec<Channel> {
    let mut channels = Vec::new();
    let lines: Vec<&str> = content.lines().collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();

        if line.starts_with("#EXTINF:") {
            let name = extract_attribute(line, "tvg-name")
                .or_else(|| extract_display_name(line))
                .unwrap_or_default();
            let logo_url = extract_attribute(line, "tvg-logo");
            let group = extract_attribute(line, "group-title").unwrap_or_default();
            let tvg_id = extract_attribute(line, "tvg-id");

            // Skip blank and comment lines up to the URL candidate; a new
            // metadata line discards the pending channel instead.
            i += 1;
            while i < lines.len() {
                let next = lines[i].trim();
                if next.is_empty() || (next.starts_with('#') && !next.starts_with("#EXTINF:")) {
                    i += 1;
                    continue;
                }
                break;
            }

            if i < lines.len() {
                let next = lines[i].trim();
                if !next.starts_with("#EXTINF:") {
                    if let Some(channel) =
                        Channel::from_untrusted(name, group, logo_url, next, tvg_id)
                    {
                        channels.push(channel);
                    }
                    i += 1;
                }
            }
            continue;
        }

        i += 1;
    }

    channels
}

/// Extract a quoted `key="value"` attribute from an EXTINF line.
fn extract_attribute(line: &str, key: &str) -> Option<String> {
    let search = format!("{key}=\"");
    let start = line.find(&search)?;
    let rest = &line[start + search.len()..];
    let end = rest.find('"')?;
    let value = &rest[..end];

    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

/// The display name after the last comma of an EXTINF line.
fn extract_display_name(line: &str) -> Option<String> {
    let comma = line.rfind(',')?;
    let name = line[comma + 1..].trim();

    if name.is_empty() {
        None
    } else {
        Some(name.to_owned())
    }
}
