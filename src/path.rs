//! Slash-separated namespace path helpers.
//!
//! All helpers work on segment boundaries: `/ab` is not a descendant of `/a`.

use crate::error::DescriptorError;

pub const ROOT: &str = "/";

/// Normalize a mount path announced by a provider source.
///
/// The path must be absolute and must not contain empty segments. A trailing
/// slash is dropped unless the path is the root.
pub fn normalize_mount_path(raw: &str) -> Result<String, DescriptorError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DescriptorError::EmptyPath);
    }
    if !trimmed.starts_with('/') {
        return Err(DescriptorError::RelativePath(trimmed.to_string()));
    }
    if trimmed == ROOT {
        return Ok(ROOT.to_string());
    }
    let without_trailing = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if without_trailing.contains("//") {
        return Err(DescriptorError::EmptySegment(trimmed.to_string()));
    }
    Ok(without_trailing.to_string())
}

/// Whether `path` equals `ancestor` or lies beneath it.
pub fn is_descendant_or_self(path: &str, ancestor: &str) -> bool {
    if ancestor == ROOT {
        return path.starts_with('/');
    }
    match path.strip_prefix(ancestor) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Split a property path into its owning node path and property name.
///
/// `/a/b/prop` yields `("/a/b", "prop")`; a property directly below the root
/// belongs to `/`. Returns `None` when there is no slash or no name.
pub fn split_property(path: &str) -> Option<(&str, &str)> {
    let idx = path.rfind('/')?;
    let name = &path[idx + 1..];
    if name.is_empty() {
        return None;
    }
    let node = if idx == 0 { ROOT } else { &path[..idx] };
    Some((node, name))
}

/// Longest common ancestor of two absolute paths.
fn common_ancestor<'a>(a: &'a str, b: &str) -> &'a str {
    let mut end = 0;
    let mut a_segments = a.split('/');
    let mut b_segments = b.split('/');
    // the leading empty segment of an absolute path always matches
    loop {
        match (a_segments.next(), b_segments.next()) {
            (Some(x), Some(y)) if x == y => {
                end += x.len() + 1;
            }
            _ => break,
        }
    }
    let end = end.saturating_sub(1).min(a.len());
    if end == 0 {
        ROOT
    } else {
        &a[..end]
    }
}

/// Longest common path prefix of every path in the set; `/` for an empty set.
pub fn longest_common_prefix<'a, I>(paths: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let mut iter = paths.into_iter();
    let Some(first) = iter.next() else {
        return ROOT.to_string();
    };
    let mut prefix: &str = first;
    for path in iter {
        prefix = common_ancestor(prefix, path);
        if prefix == ROOT {
            break;
        }
    }
    if prefix.is_empty() {
        ROOT.to_string()
    } else {
        prefix.to_string()
    }
}
