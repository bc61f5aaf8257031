//! Reference descriptions and resolved input streams.

/// HTTP method declared on an input reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceMethod {
    #[default]
    Get,
    Post,
}

/// A remote input as declared in an Execute request.
#[derive(Debug, Clone, Default)]
pub struct InputReference {
    /// Location of the payload.
    pub href: String,
    /// Declared method; GET unless POST is forced by a body.
    pub method: ReferenceMethod,
    /// Headers attached verbatim to the outgoing request.
    pub headers: Vec<(String, String)>,
    /// Literal request body, forcing a POST.
    pub body: Option<String>,
    /// Location of a request body to fetch first (nested GET), forcing a
    /// POST.
    pub body_reference: Option<String>,
    /// Mime type the caller expects the payload in.
    pub mime_type: Option<String>,
}

impl InputReference {
    pub fn get(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }

    /// True when the reference must be fetched with a POST: an explicit
    /// POST method, a literal body, or a body reference.
    pub fn wants_post(&self) -> bool {
        self.method == ReferenceMethod::Post
            || self.body.is_some()
            || self.body_reference.is_some()
    }
}

/// A resolved remote input: payload bytes plus what the transport told us
/// about them. Consumed once by the parser that follows it.
#[derive(Debug)]
pub struct ReferenceInputStream {
    pub bytes: Vec<u8>,
    /// Mime type detected from the response, if any.
    pub mime_type: Option<String>,
    /// Character encoding detected from the response, if any.
    pub encoding: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_get_does_not_want_post() {
        assert!(!InputReference::get("http://example.com/data").wants_post());
    }

    #[test]
    fn body_forces_post() {
        let mut r = InputReference::get("http://example.com");
        r.body = Some("<query/>".to_string());
        assert!(r.wants_post());
    }

    #[test]
    fn body_reference_forces_post() {
        let mut r = InputReference::get("http://example.com");
        r.body_reference = Some("http://example.com/body".to_string());
        assert!(r.wants_post());
    }

    #[test]
    fn explicit_method_forces_post() {
        let mut r = InputReference::get("http://example.com");
        r.method = ReferenceMethod::Post;
        assert!(r.wants_post());
    }
}
