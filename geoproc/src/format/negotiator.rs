//! Format selection against a declared-supported set.

use super::types::Format;

/// Resolves a requested format against a supported set and a default.
///
/// Each axis is treated independently: where `requested` specifies a
/// value, a supported format must match it case-insensitively to remain a
/// candidate; unspecified axes are unconstrained. Ties are broken by
/// first-declared order in `supported`.
///
/// A fully-unspecified request short-circuits to `default` without
/// consulting `supported` at all.
///
/// Returns `None` when no supported format satisfies the request; the
/// caller raises `InvalidParameterValue` in that case.
pub fn select(requested: &Format, default: &Format, supported: &[Format]) -> Option<Format> {
    if requested.is_unspecified() {
        return Some(default.clone());
    }

    supported
        .iter()
        .find(|candidate| requested.matches(candidate))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supported() -> Vec<Format> {
        vec![
            Format::new(Some("text/xml"), None::<String>, Some("http://example.com/gml")),
            Format::new(Some("image/tiff"), Some("base64"), None::<String>),
            Format::new(Some("image/tiff"), None::<String>, None::<String>),
        ]
    }

    #[test]
    fn unspecified_request_returns_default() {
        let default = Format::mime("text/xml");
        let got = select(&Format::unspecified(), &default, &supported());
        assert_eq!(got, Some(default));
    }

    #[test]
    fn unspecified_request_ignores_supported_set() {
        // The default does not have to appear in the supported list.
        let default = Format::mime("application/zip");
        let got = select(&Format::unspecified(), &default, &[]);
        assert_eq!(got, Some(default));
    }

    #[test]
    fn mime_only_request_acts_as_wildcard() {
        let got = select(&Format::mime("IMAGE/tiff"), &Format::unspecified(), &supported());
        // First-declared tiff entry wins the tie.
        assert_eq!(got, Some(Format::new(Some("image/tiff"), Some("base64"), None::<String>)));
    }

    #[test]
    fn fully_specified_request_must_match_all_axes() {
        let requested = Format::new(Some("image/tiff"), Some("BASE64"), None::<String>);
        let got = select(&requested, &Format::unspecified(), &supported());
        assert_eq!(got, Some(Format::new(Some("image/tiff"), Some("base64"), None::<String>)));
    }

    #[test]
    fn unsupported_request_returns_none() {
        let got = select(&Format::mime("application/pdf"), &Format::unspecified(), &supported());
        assert_eq!(got, None);
    }

    #[test]
    fn selection_is_deterministic() {
        let requested = Format::mime("image/tiff");
        let default = Format::unspecified();
        let sup = supported();
        let first = select(&requested, &default, &sup);
        for _ in 0..10 {
            assert_eq!(select(&requested, &default, &sup), first);
        }
    }

    #[test]
    fn encoding_only_request_filters_on_that_axis() {
        let requested = Format::new(None::<String>, Some("base64"), None::<String>);
        let got = select(&requested, &Format::unspecified(), &supported());
        assert_eq!(got, Some(Format::new(Some("image/tiff"), Some("base64"), None::<String>)));
    }
}
