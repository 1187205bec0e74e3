//! Filename slugification.

/// Splits `name` into (stem, extension) at the last `.` of its final path segment.
///
/// Leading dots of the segment never start an extension, so `.hidden` has no
/// extension. The extension keeps its dot: `("photo", ".JPG")`.
pub fn split_extension(name: &str) -> (&str, &str) {
    let segment_start = name.rfind('/').map(|i| i + 1).unwrap_or(0);
    let segment = &name[segment_start..];
    let leading_dots = segment.len() - segment.trim_start_matches('.').len();
    match segment[leading_dots..].rfind('.') {
        Some(i) => name.split_at(segment_start + leading_dots + i),
        None => (name, ""),
    }
}

/// Longest file name Linux accepts, in bytes.
const NAME_MAX: usize = 255;

/// Cleans a filename for use on disk while keeping its extension.
///
/// The stem is lower-cased and keeps only alphanumerics, `_`, `-` and
/// whitespace (so it never contains a `.`). It is trimmed, every run of
/// whitespace, `_` and `-` becomes one `-`, and it is cut to fit `NAME_MAX`
/// together with the extension. The extension is reattached unchanged.
///
/// A stem that cleans away entirely leaves the extension's own text as the
/// name (`"!.png"` gives `"png"`), so the result never starts with a dot and
/// `slugify(slugify(x)) == slugify(x)`.
pub fn slugify(filename: &str) -> String {
    let (stem, ext) = split_extension(filename);

    let mut out = clean_stem(stem);
    if out.is_empty() {
        let mut bare = clean_stem(ext.trim_start_matches('.'));
        truncate_at_char(&mut bare, NAME_MAX);
        return bare;
    }

    truncate_at_char(&mut out, NAME_MAX.saturating_sub(ext.len()));
    out.push_str(ext);
    out
}

fn clean_stem(stem: &str) -> String {
    let kept: String = stem
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut out = String::with_capacity(kept.len());
    let mut prev_sep = false;
    for c in kept.trim().chars() {
        if c.is_whitespace() || c == '_' || c == '-' {
            if !prev_sep {
                out.push('-');
            }
            prev_sep = true;
        } else {
            out.push(c);
            prev_sep = false;
        }
    }
    out
}

/// Cuts `s` to at most `max` bytes on a char boundary, keeping at least one char.
fn truncate_at_char(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut take = max;
    while take > 0 && !s.is_char_boundary(take) {
        take -= 1;
    }
    if take == 0 {
        take = s.chars().next().map_or(0, char::len_utf8);
    }
    s.truncate(take);
}
