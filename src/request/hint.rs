use strum::{EnumIter, IntoEnumIterator};
use url::form_urlencoded;

use crate::event::RequestRecord;

/// A filename shorthand for one of the predefined widths.
///
/// `cat_m.png` is served as `cat.png?w=300`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter)]
pub enum SizeHint {
    Tiny,
    Small,
    Medium,
    Large,
}

impl SizeHint {
    pub fn width(&self) -> u32 {
        match self {
            Self::Tiny => 100,
            Self::Small => 200,
            Self::Medium => 300,
            Self::Large => 400,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Tiny => "_t",
            Self::Small => "_s",
            Self::Medium => "_m",
            Self::Large => "_l",
        }
    }

    /// Matches a two character suffix, ignoring case.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::iter().find(|hint| hint.suffix().eq_ignore_ascii_case(suffix))
    }
}

/// Moves a filename size hint into the query string.
///
/// The suffix is stripped from the URI, `w` is set to the hinted width and
/// any `h` is dropped since a hint always means a proportional resize
/// anchored on the width. Requests without a hint come back unchanged.
pub fn take_resizing_hint(request: &RequestRecord) -> RequestRecord {
    let (uri, hint) = match split_hint(&request.uri) {
        Some(found) => found,
        None => return request.clone(),
    };

    let querystring = rewrite_query(&request.querystring, hint);
    debug!(
        from = %request.uri,
        to = %uri,
        width = hint.width(),
        "took resizing hint from uri"
    );

    RequestRecord {
        uri,
        querystring,
        ..request.clone()
    }
}

/// Splits `<dir>/<stem><hint>.<ext>` into the un-hinted uri and the hint.
///
/// A uri without a `/` or without an extension never carries a hint.
fn split_hint(uri: &str) -> Option<(String, SizeHint)> {
    let (dir, file) = uri.rsplit_once('/')?;
    let (stem, ext) = file.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }

    let split = stem.len().checked_sub(2)?;
    if split == 0 || !stem.is_char_boundary(split) {
        return None;
    }

    let (base, suffix) = stem.split_at(split);
    let hint = SizeHint::from_suffix(suffix)?;

    Some((format!("{}/{}.{}", dir, base, ext), hint))
}

/// Rewrites the raw query string piece by piece.
///
/// Only keys are decoded. Every other parameter keeps its original text.
fn rewrite_query(querystring: &str, hint: SizeHint) -> String {
    let width = format!("w={}", hint.width());
    let mut pieces = Vec::new();
    let mut width_written = false;

    for piece in querystring.split('&').filter(|p| !p.is_empty()) {
        let key = form_urlencoded::parse(piece.as_bytes())
            .next()
            .map(|(key, _)| key)
            .unwrap_or_default();

        match key.as_ref() {
            "h" => continue,
            "w" if width_written => continue,
            "w" => {
                pieces.push(width.as_str());
                width_written = true;
            },
            _ => pieces.push(piece),
        }
    }

    if !width_written {
        pieces.push(width.as_str());
    }

    pieces.join("&")
}
