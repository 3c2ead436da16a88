use async_trait::async_trait;

use crate::pipeline::{Next, Stage};
use crate::{Result, SturdyError};

/// Truncation limit for response-body summaries attached to HTTP errors.
const SUMMARY_LIMIT: usize = 250;

/// Translates non-success statuses into [`SturdyError::Http`] failures.
///
/// 2xx and 3xx responses pass through untouched. For 4xx/5xx the body is
/// consumed and its first 250 bytes are kept as the error summary.
pub struct HttpErrorStage;

#[async_trait]
impl Stage for HttpErrorStage {
    async fn handle(&self, request: reqwest::Request, next: Next<'_>) -> Result<reqwest::Response> {
        let response = next.run(request).await?;
        let status = response.status();
        if status.as_u16() < 400 {
            return Ok(response);
        }

        let body = response.text().await.map_err(SturdyError::from_reqwest)?;
        Err(SturdyError::Http {
            status: status.as_u16(),
            summary: summarize(&body),
        })
    }
}

/// First [`SUMMARY_LIMIT`] bytes of the body, truncated on a char boundary.
fn summarize(body: &str) -> String {
    if body.len() <= SUMMARY_LIMIT {
        return body.to_owned();
    }
    let mut end = SUMMARY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body[..end].to_owned()
}

#[cfg(test)]
mod tests {
    use super::{summarize, SUMMARY_LIMIT};

    #[test]
    fn short_bodies_are_kept_whole() {
        assert_eq!(summarize("service unavailable"), "service unavailable");
    }

    #[test]
    fn long_bodies_are_truncated_to_the_limit() {
        let body = "x".repeat(SUMMARY_LIMIT * 3);
        let summary = summarize(&body);
        assert_eq!(summary.len(), SUMMARY_LIMIT);
        assert!(body.starts_with(&summary));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 'é' is two bytes; the leading ASCII byte puts the limit mid-character.
        let body = format!("x{}", "é".repeat(SUMMARY_LIMIT));
        let summary = summarize(&body);
        assert_eq!(summary.len(), SUMMARY_LIMIT - 1);
        assert!(body.starts_with(&summary));
    }
}
