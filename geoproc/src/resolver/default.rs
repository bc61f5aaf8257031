//! Default HTTP reference strategy.

use super::chain::ReferenceStrategy;
use super::http::{AsyncHttpClient, HttpError};
use super::types::{InputReference, ReferenceInputStream};
use crate::error::ServiceException;
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

/// Fetches references over plain HTTP(S).
///
/// GET by default; POST when the reference declares a literal body, a
/// body-reference (fetched first via a nested GET), or an explicit POST
/// method. Declared headers are attached verbatim; when the caller
/// declared an expected mime type and no `Accept` header was set, one is
/// added.
pub struct DefaultReferenceStrategy<C: AsyncHttpClient> {
    client: C,
    /// Responses larger than this fail with `FileSizeExceeded`.
    max_body_bytes: usize,
}

impl<C: AsyncHttpClient> DefaultReferenceStrategy<C> {
    pub fn new(client: C, max_body_bytes: usize) -> Self {
        Self {
            client,
            max_body_bytes,
        }
    }

    /// Headers for the outgoing request: declared headers verbatim, plus
    /// an `Accept` derived from the expected mime type if none was set.
    fn request_headers(reference: &InputReference) -> Vec<(String, String)> {
        let mut headers = reference.headers.clone();
        let has_accept = headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("accept"));
        if !has_accept {
            if let Some(mime) = &reference.mime_type {
                headers.push(("Accept".to_string(), mime.clone()));
            }
        }
        headers
    }

    async fn fetch(
        &self,
        reference: &InputReference,
    ) -> Result<ReferenceInputStream, ServiceException> {
        let headers = Self::request_headers(reference);

        let response = if reference.wants_post() {
            let body = match (&reference.body, &reference.body_reference) {
                (Some(body), _) => body.clone().into_bytes(),
                (None, Some(body_href)) => {
                    debug!(href = %body_href, "Fetching referenced request body");
                    let body_response = self
                        .client
                        .get(body_href, &[])
                        .await
                        .map_err(|e| map_http_error(e, "bodyReference"))?;
                    body_response.bytes
                }
                (None, None) => Vec::new(),
            };
            self.client.post(&reference.href, &headers, body).await
        } else {
            self.client.get(&reference.href, &headers).await
        }
        .map_err(|e| map_http_error(e, "href"))?;

        if response.bytes.len() > self.max_body_bytes {
            return Err(ServiceException::FileSizeExceeded {
                message: format!(
                    "referenced payload of {} bytes exceeds the {} byte cap",
                    response.bytes.len(),
                    self.max_body_bytes
                ),
                locator: Some("href".to_string()),
            });
        }

        Ok(ReferenceInputStream {
            bytes: response.bytes,
            mime_type: response.content_type,
            encoding: response.charset,
        })
    }
}

/// Maps transport failures onto the protocol taxonomy: malformed URLs and
/// network/IO failures are the client's problem (`InvalidParameterValue`,
/// cause attached); anything else while building the request is
/// `NoApplicableCode`.
fn map_http_error(error: HttpError, locator: &str) -> ServiceException {
    match &error {
        HttpError::MalformedUrl(url) => {
            ServiceException::invalid_parameter(format!("malformed reference URL: {}", url), locator)
        }
        HttpError::Transport(_) | HttpError::Status { .. } => {
            ServiceException::invalid_parameter_caused_by(
                "failed to fetch referenced input",
                locator,
                error.clone(),
            )
        }
    }
}

impl<C: AsyncHttpClient> ReferenceStrategy for DefaultReferenceStrategy<C> {
    fn name(&self) -> &str {
        "http-default"
    }

    fn is_applicable(&self, reference: &InputReference) -> bool {
        let href = reference.href.to_ascii_lowercase();
        href.starts_with("http://") || href.starts_with("https://")
    }

    fn resolve<'a>(
        &'a self,
        reference: &'a InputReference,
    ) -> Pin<Box<dyn Future<Output = Result<ReferenceInputStream, ServiceException>> + Send + 'a>>
    {
        Box::pin(self.fetch(reference))
    }
}
