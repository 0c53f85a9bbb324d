//! Content length extraction utilities.

use reqwest::header::CONTENT_RANGE;
use reqwest::Response;

/// Expected size of the body of `response`, used to size the progress bar.
///
/// The total from a `Content-Range` header wins over `Content-Length`.
pub fn expected_size(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_RANGE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_content_range_total)
        .or_else(|| response.content_length())
}

/// Parse Content-Range header to extract total size.
///
/// Content-Range header format: "bytes start-end/total"
///
/// ```rust
/// use toolstash::utils::parse_content_range_total;
///
/// assert_eq!(parse_content_range_total("bytes 0-1023/2048"), Some(2048));
/// assert_eq!(parse_content_range_total("bytes 0-1023/*"), None);
/// ```
pub fn parse_content_range_total(content_range: &str) -> Option<u64> {
    content_range
        .split_once('/')
        .and_then(|(_, size)| size.trim().parse::<u64>().ok())
}
