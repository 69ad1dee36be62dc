//! NCBI QBLAST client
//!
//! Speaks the BLAST URL API: a `Put` request queues the search and returns a
//! request id (RID), then `Get` requests poll that RID until the XML report is
//! ready. Everything is blocking; `submit` returns only when the service has
//! finished or failed.

use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};

use super::{AlignmentRequest, RequestId, SubmitError, SubmitResult, Submitter};

/// Public NCBI BLAST endpoint
pub const NCBI_BLAST_URL: &str = "https://blast.ncbi.nlm.nih.gov/Blast.cgi";

const USER_AGENT: &str = concat!("blasthits/", env!("CARGO_PKG_VERSION"));

/// Connection and search options for [`QblastClient`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QblastOptions {
    /// URL of the Blast.cgi endpoint
    pub endpoint: String,

    /// Seconds to wait between queueing a search and the first poll
    pub initial_delay_secs: u64,

    /// Seconds to wait between later polls. NCBI asks for at most one poll per
    /// minute for any single RID.
    pub poll_interval_secs: u64,

    /// Number of database sequences to report
    pub hitlist_size: u32,

    /// Expectation value threshold
    pub expect: f64,

    /// Use the megablast algorithm (blastn only)
    pub megablast: bool,

    /// Low-complexity filter string passed through as FILTER
    pub filter: Option<String>,

    /// Tool name reported to NCBI
    pub tool: Option<String>,

    /// Contact address reported to NCBI
    pub email: Option<String>,

    /// Give up after this many polls; unlimited when unset. Must be at least 1.
    pub max_polls: Option<u32>,

    /// Per-HTTP-request timeout in seconds; none when unset
    pub request_timeout_secs: Option<u64>,
}

impl Default for QblastOptions {
    fn default() -> Self {
        Self {
            endpoint: NCBI_BLAST_URL.to_string(),
            initial_delay_secs: 20,
            poll_interval_secs: 60,
            hitlist_size: 50,
            expect: 10.0,
            megablast: false,
            filter: None,
            tool: None,
            email: None,
            max_polls: None,
            request_timeout_secs: None,
        }
    }
}

impl QblastOptions {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Point the client at another endpoint, e.g. a local stub
    pub fn with_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Poll without waiting
    pub fn without_delays(mut self) -> Self {
        self.initial_delay_secs = 0;
        self.poll_interval_secs = 0;
        self
    }
}

/// State of a queued search as reported by a `Get` response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchStatus<'a> {
    /// Search finished; the body is the report
    Ready,
    /// Still queued or running
    Waiting,
    Failed,
    Unknown,
    Other(&'a str),
}

/// Blocking client for the QBLAST URL API
pub struct QblastClient {
    http: Client,
    options: QblastOptions,
}

impl QblastClient {
    /// Client for the public NCBI service with default options
    pub fn new() -> SubmitResult<Self> {
        Self::with_options(QblastOptions::default())
    }

    pub fn with_options(options: QblastOptions) -> SubmitResult<Self> {
        if options.max_polls == Some(0) {
            return Err(SubmitError::InvalidOptions(
                "max_polls must be at least 1".to_string(),
            ));
        }

        let timeout = options.request_timeout_secs.map(Duration::from_secs);
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self { http, options })
    }

    pub fn options(&self) -> &QblastOptions {
        &self.options
    }

    /// Queue a search and return its request id
    pub fn put(&self, request: &AlignmentRequest) -> SubmitResult<RequestId> {
        let form = self.put_params(request);
        log::debug!("PUT {} ({} parameters)", self.options.endpoint, form.len());

        let response = self
            .http
            .post(&self.options.endpoint)
            .form(&form)
            .send()?;
        let page = read_body(response)?;

        parse_put_response(&page)
    }

    /// Poll a queued search until the report is available and return it
    pub fn fetch(&self, rid: &str) -> SubmitResult<String> {
        let query = [
            ("CMD", "Get"),
            ("RID", rid),
            ("FORMAT_TYPE", "XML"),
            ("FORMAT_OBJECT", "Alignment"),
            ("ALIGNMENT_VIEW", "Pairwise"),
            ("ALIGNMENTS", "500"),
            ("DESCRIPTIONS", "500"),
        ];

        let mut delay = self.options.initial_delay();
        let mut polls = 0u32;

        loop {
            if let Some(max_polls) = self.options.max_polls {
                if polls >= max_polls {
                    return Err(SubmitError::PollLimit {
                        rid: rid.to_string(),
                        polls,
                    });
                }
            }

            if !delay.is_zero() {
                log::debug!("Waiting {}s before polling {}", delay.as_secs(), rid);
                thread::sleep(delay);
            }
            delay = self.options.poll_interval();
            polls += 1;

            let response = self
                .http
                .get(&self.options.endpoint)
                .query(&query)
                .send()?;
            let body = read_body(response)?;

            match search_status(&body) {
                SearchStatus::Ready => {
                    log::debug!("Search {} ready after {} polls", rid, polls);
                    return Ok(body);
                }
                SearchStatus::Waiting => {
                    log::debug!("Search {} still waiting (poll {})", rid, polls);
                }
                SearchStatus::Failed => {
                    return Err(SubmitError::SearchFailed { rid: rid.to_string() });
                }
                SearchStatus::Unknown => {
                    return Err(SubmitError::Expired { rid: rid.to_string() });
                }
                SearchStatus::Other(status) => {
                    return Err(SubmitError::MalformedResponse(format!(
                        "unexpected status '{}' for search {}",
                        status, rid
                    )));
                }
            }
        }
    }

    fn put_params(&self, request: &AlignmentRequest) -> Vec<(&'static str, String)> {
        let options = &self.options;
        let mut params = vec![
            ("CMD", "Put".to_string()),
            ("PROGRAM", request.program.clone()),
            ("DATABASE", request.database.clone()),
            ("QUERY", request.sequence.clone()),
            ("HITLIST_SIZE", options.hitlist_size.to_string()),
            ("EXPECT", options.expect.to_string()),
        ];

        if options.megablast {
            params.push(("MEGABLAST", "on".to_string()));
        }
        if let Some(filter) = &options.filter {
            params.push(("FILTER", filter.clone()));
        }
        if let Some(tool) = &options.tool {
            params.push(("TOOL", tool.clone()));
        }
        if let Some(email) = &options.email {
            params.push(("EMAIL", email.clone()));
        }

        params
    }
}

impl Submitter for QblastClient {
    fn submit(&self, request: &AlignmentRequest) -> SubmitResult<String> {
        let started = Instant::now();
        log::info!("Submitting {} to {}", request, self.options.endpoint);

        let id = self.put(request)?;
        match id.estimated_seconds {
            Some(rtoe) => log::info!("Queued search {} (estimated {}s)", id.rid, rtoe),
            None => log::info!("Queued search {}", id.rid),
        }

        let body = self.fetch(&id.rid)?;
        log::info!(
            "Search {} finished in {:.1}s ({} bytes)",
            id.rid,
            started.elapsed().as_secs_f64(),
            body.len()
        );

        Ok(body)
    }

    fn name(&self) -> &'static str {
        "qblast"
    }
}

fn read_body(response: Response) -> SubmitResult<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(SubmitError::Http {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }
    Ok(response.text()?)
}

/// Extract RID and RTOE from the page returned by `CMD=Put`
fn parse_put_response(page: &str) -> SubmitResult<RequestId> {
    let rid = match info_value(page, "RID") {
        Some(rid) => rid.to_string(),
        None => {
            return Err(match service_error(page) {
                Some(message) => SubmitError::Rejected(message),
                None => SubmitError::MalformedResponse("no RID in submission response".to_string()),
            });
        }
    };

    let estimated_seconds = info_value(page, "RTOE").and_then(|v| v.parse().ok());

    Ok(RequestId { rid, estimated_seconds })
}

/// Value of a `KEY = value` line inside the QBlastInfo block
fn info_value<'a>(page: &'a str, key: &str) -> Option<&'a str> {
    page.lines().find_map(|line| {
        let value = line.trim().strip_prefix(key)?.trim_start().strip_prefix('=')?.trim();
        (!value.is_empty()).then_some(value)
    })
}

/// Error text the service embeds in a rejected submission page
fn service_error(page: &str) -> Option<String> {
    const MARKERS: [&str; 2] = ["<p class=\"error\">", "<div class=\"error msInf\">"];

    for marker in MARKERS {
        if let Some(start) = page.find(marker) {
            let message = text_until_tag(&page[start + marker.len()..]);
            if !message.is_empty() {
                return Some(message);
            }
        }
    }

    let start = page.find("Message ID#")?;
    let message = text_until_tag(&page[start..]);
    (!message.is_empty()).then_some(message)
}

fn text_until_tag(text: &str) -> String {
    let end = text.find('<').unwrap_or(text.len());
    text[..end].split_whitespace().collect::<Vec<_>>().join(" ")
}

fn search_status(body: &str) -> SearchStatus<'_> {
    // Blank page while the report is being built
    if body == "\n\n" {
        return SearchStatus::Waiting;
    }
    if body.trim_start().starts_with("<?xml") {
        return SearchStatus::Ready;
    }

    let Some(start) = body.find("Status=") else {
        return SearchStatus::Ready;
    };
    let rest = &body[start + "Status=".len()..];
    let status = rest[..rest.find('\n').unwrap_or(rest.len())].trim();

    match status.to_ascii_uppercase().as_str() {
        "READY" => SearchStatus::Ready,
        "WAITING" => SearchStatus::Waiting,
        "FAILED" => SearchStatus::Failed,
        "UNKNOWN" => SearchStatus::Unknown,
        _ => SearchStatus::Other(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUT_PAGE: &str = "<html>\n<!--QBlastInfoBegin\n    RID = 8XKZ3N6Y016\n    RTOE = 27\nQBlastInfoEnd\n-->\n</html>\n";

    #[test]
    fn test_parse_put_response() {
        let id = parse_put_response(PUT_PAGE).unwrap();
        assert_eq!(id.rid, "8XKZ3N6Y016");
        assert_eq!(id.estimated_seconds, Some(27));
    }

    #[test]
    fn test_parse_put_response_without_rtoe() {
        let id = parse_put_response("QBlastInfoBegin\n RID = ABC\nQBlastInfoEnd\n").unwrap();
        assert_eq!(id.rid, "ABC");
        assert_eq!(id.estimated_seconds, None);
    }

    #[test]
    fn test_rejected_submission_reports_service_message() {
        let page = "<html><body><p class=\"error\">\n  Error: Database nope was not found\n</p></body></html>";
        match parse_put_response(page) {
            Err(SubmitError::Rejected(message)) => {
                assert_eq!(message, "Error: Database nope was not found");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_rejected_submission_ms_info_block() {
        let page = "<div class=\"error msInf\">Program bogus is not supported</div>";
        assert!(matches!(
            parse_put_response(page),
            Err(SubmitError::Rejected(ref m)) if m == "Program bogus is not supported"
        ));
    }

    #[test]
    fn test_rejected_submission_message_id() {
        let page = "<p>Message ID#24 Error: Failed to read the Blast query</p>";
        assert!(matches!(
            parse_put_response(page),
            Err(SubmitError::Rejected(ref m)) if m == "Message ID#24 Error: Failed to read the Blast query"
        ));
    }

    #[test]
    fn test_submission_page_without_rid_or_error() {
        assert!(matches!(
            parse_put_response("<html></html>"),
            Err(SubmitError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_search_status() {
        assert_eq!(search_status("\n\n"), SearchStatus::Waiting);
        assert_eq!(search_status("QBlastInfoBegin\n\tStatus=WAITING\nQBlastInfoEnd"), SearchStatus::Waiting);
        assert_eq!(search_status("QBlastInfoBegin\n\tStatus=FAILED\n"), SearchStatus::Failed);
        assert_eq!(search_status("QBlastInfoBegin\n\tStatus=UNKNOWN\n"), SearchStatus::Unknown);
        assert_eq!(search_status("QBlastInfoBegin\n\tStatus=READY\n"), SearchStatus::Ready);
        assert_eq!(search_status("Status=PAUSED\n"), SearchStatus::Other("PAUSED"));
        assert_eq!(search_status("<?xml version=\"1.0\"?>\n<BlastOutput/>"), SearchStatus::Ready);
    }

    #[test]
    fn test_put_params_include_optional_fields() {
        let options = QblastOptions {
            megablast: true,
            tool: Some("blasthits".to_string()),
            email: Some("someone@example.org".to_string()),
            ..Default::default()
        };
        let client = QblastClient::with_options(options).unwrap();
        let params = client.put_params(&AlignmentRequest::new("ACGT", "blastn", "nt"));

        assert!(params.contains(&("CMD", "Put".to_string())));
        assert!(params.contains(&("QUERY", "ACGT".to_string())));
        assert!(params.contains(&("HITLIST_SIZE", "50".to_string())));
        assert!(params.contains(&("EXPECT", "10".to_string())));
        assert!(params.contains(&("MEGABLAST", "on".to_string())));
        assert!(params.contains(&("TOOL", "blasthits".to_string())));
        assert!(params.contains(&("EMAIL", "someone@example.org".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "FILTER"));
    }

    #[test]
    fn test_zero_poll_limit_is_rejected() {
        let options = QblastOptions {
            max_polls: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            QblastClient::with_options(options),
            Err(SubmitError::InvalidOptions(_))
        ));

        let options = QblastOptions {
            max_polls: Some(1),
            ..Default::default()
        };
        assert!(QblastClient::with_options(options).is_ok());
    }

    #[test]
    fn test_default_options() {
        let options = QblastOptions::default();
        assert_eq!(options.endpoint, NCBI_BLAST_URL);
        assert_eq!(options.initial_delay(), Duration::from_secs(20));
        assert_eq!(options.poll_interval(), Duration::from_secs(60));
        assert_eq!(options.max_polls, None);

        let stub = options.with_endpoint("http://127.0.0.1:1/Blast.cgi").without_delays();
        assert!(stub.initial_delay().is_zero());
        assert!(stub.poll_interval().is_zero());
    }
}
