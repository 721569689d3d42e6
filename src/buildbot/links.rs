use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::types::StepUrl;

/// Link label that always renders as a plain link, whatever its target.
pub const LAST_SUCCESSFUL_BUILD: &str = "Last successful build";

const FILE_STORE_PREFIX: &str = "file-store/";

static BUILDREQUEST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#/?buildrequests/(\d+)$").expect("Invalid regex")
});

static BUILDNUM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#/?builders/(\d+)/builds/(\d+)$").expect("Invalid regex")
});

/// Step link pointing at a build request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestUrl {
    #[serde(flatten)]
    pub link: StepUrl,
    pub reqid: u64,
}

/// Step link pointing at a specific build of a builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildUrl {
    #[serde(flatten)]
    pub link: StepUrl,
    /// Composite `"{builderid}-{number}"` key.
    pub bnum: String,
    pub builderid: u64,
    pub number: u64,
}

impl BuildUrl {
    /// In-app route of the linked build (e.g. `/builders/42/builds/7`).
    pub fn route(&self) -> String {
        format!("/builders/{}/builds/{}", self.builderid, self.number)
    }
}

/// A step link tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StepLink {
    Request(RequestUrl),
    Build(BuildUrl),
    Other(StepUrl),
}

/// Step links partitioned by kind, each bucket in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassifiedUrls {
    pub requests: Vec<RequestUrl>,
    pub builds: Vec<BuildUrl>,
    pub other: Vec<StepUrl>,
}

impl ClassifiedUrls {
    pub fn len(&self) -> usize {
        self.requests.len() + self.builds.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, link: StepLink) {
        match link {
            StepLink::Request(req) => self.requests.push(req),
            StepLink::Build(build) => self.builds.push(build),
            StepLink::Other(other) => self.other.push(other),
        }
    }
}

/// Classifies a single step link.
///
/// Rules are tried in order and the first one that applies wins:
///
/// 1. A link labelled [`LAST_SUCCESSFUL_BUILD`] is always `Other`.
/// 2. A URL containing `buildrequests/` and ending in `#buildrequests/<id>`
///    (or `#/buildrequests/<id>`) is a `Request`.
/// 3. Otherwise a URL containing `builders/` and ending in
///    `#builders/<id>/builds/<number>` (or `#/builders/<id>/builds/<number>`)
///    is a `Build`.
/// 4. Anything else is `Other`; a `file-store/` URL gains a leading `/`.
///
/// A URL that contains `buildrequests/` but does not match the request
/// pattern is not tried against the build pattern.
pub fn classify(link: StepUrl) -> StepLink {
    if link.name == LAST_SUCCESSFUL_BUILD {
        return StepLink::Other(link);
    }

    if link.url.contains("buildrequests/") {
        if let Some(reqid) = match_request(&link.url) {
            return StepLink::Request(RequestUrl { link, reqid });
        }
    } else if link.url.contains("builders/") {
        if let Some((builderid, number)) = match_build(&link.url) {
            return StepLink::Build(BuildUrl {
                link,
                bnum: format!("{builderid}-{number}"),
                builderid,
                number,
            });
        }
    }

    StepLink::Other(normalize_file_store(link))
}

/// Partitions step links into request, build and other buckets.
///
/// # Arguments
///
/// * `urls` - Step links as received from the server
///
/// # Returns
///
/// Buckets holding every input link exactly once, each in input order.
pub fn classify_step_urls(urls: impl IntoIterator<Item = StepUrl>) -> ClassifiedUrls {
    let mut classified = ClassifiedUrls::default();
    for link in urls {
        classified.push(classify(link));
    }
    classified
}

fn match_request(url: &str) -> Option<u64> {
    let caps = BUILDREQUEST_RE.captures(url)?;
    caps[1].parse().ok()
}

fn match_build(url: &str) -> Option<(u64, u64)> {
    let caps = BUILDNUM_RE.captures(url)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

fn normalize_file_store(mut link: StepUrl) -> StepUrl {
    if link.url.starts_with(FILE_STORE_PREFIX) {
        link.url.insert(0, '/');
    }
    link
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(name: &str, url: &str) -> StepUrl {
        StepUrl::new(name, url)
    }

    #[test]
    fn test_build_url_extracts_ids() {
        let classified = classify_step_urls(vec![url("child", "#builders/42/builds/7")]);

        assert_eq!(classified.builds.len(), 1);
        let build = &classified.builds[0];
        assert_eq!(build.builderid, 42);
        assert_eq!(build.number, 7);
        assert_eq!(build.bnum, "42-7");
        assert_eq!(build.link.url, "#builders/42/builds/7");
        assert_eq!(build.route(), "/builders/42/builds/7");
    }

    #[test]
    fn test_request_url_extracts_id() {
        let classified = classify_step_urls(vec![url("req", "#buildrequests/123")]);

        assert_eq!(classified.requests.len(), 1);
        assert_eq!(classified.requests[0].reqid, 123);
        assert!(classified.builds.is_empty());
        assert!(classified.other.is_empty());
    }

    #[test]
    fn test_slash_variants_match() {
        let classified = classify_step_urls(vec![
            url("a", "#/buildrequests/5"),
            url("b", "/#builders/1/builds/2"),
            url("c", "http://ci.example.com/#/builders/3/builds/4"),
        ]);

        assert_eq!(classified.requests[0].reqid, 5);
        assert_eq!(classified.builds[0].bnum, "1-2");
        assert_eq!(classified.builds[1].bnum, "3-4");
    }

    #[test]
    fn test_file_store_is_made_absolute() {
        let classified = classify_step_urls(vec![url("log", "file-store/logs/a.txt")]);

        assert_eq!(classified.other.len(), 1);
        assert_eq!(classified.other[0].url, "/file-store/logs/a.txt");
    }

    #[test]
    fn test_absolute_file_store_untouched() {
        let classified = classify_step_urls(vec![url("log", "/file-store/logs/a.txt")]);
        assert_eq!(classified.other[0].url, "/file-store/logs/a.txt");
    }

    #[test]
    fn test_last_successful_build_always_other() {
        let classified = classify_step_urls(vec![
            url(LAST_SUCCESSFUL_BUILD, "#builders/42/builds/7"),
            url(LAST_SUCCESSFUL_BUILD, "#buildrequests/1"),
        ]);

        assert!(classified.builds.is_empty());
        assert!(classified.requests.is_empty());
        assert_eq!(classified.other.len(), 2);
        assert_eq!(classified.other[0].url, "#builders/42/builds/7");
    }

    #[test]
    fn test_trailing_text_falls_through() {
        let classified = classify_step_urls(vec![
            url("a", "#buildrequests/12/extra"),
            url("b", "#builders/1/builds/2?tab=logs"),
            url("c", "#buildrequests/"),
        ]);

        assert!(classified.requests.is_empty());
        assert!(classified.builds.is_empty());
        assert_eq!(classified.other.len(), 3);
    }

    #[test]
    fn test_unmatched_request_url_skips_build_pattern() {
        // Contains both substrings; the request rule claims it and fails.
        let link = url("x", "#buildrequests/x/builders/1/builds/2");
        assert_eq!(classify(link.clone()), StepLink::Other(link));
    }

    #[test]
    fn test_ids_beyond_32_bits_match() {
        let classified = classify_step_urls(vec![
            url("big", "#buildrequests/99999999999"),
            url("big build", "#builders/5000000000/builds/4294967296"),
        ]);

        assert_eq!(classified.requests[0].reqid, 99_999_999_999);
        assert_eq!(classified.builds[0].bnum, "5000000000-4294967296");
        assert!(classified.other.is_empty());
    }

    #[test]
    fn test_overflowing_id_is_not_a_match() {
        let classified =
            classify_step_urls(vec![url("huge", "#buildrequests/99999999999999999999999")]);
        assert!(classified.requests.is_empty());
        assert_eq!(classified.other.len(), 1);
    }

    #[test]
    fn test_buckets_partition_input_in_order() {
        let input = vec![
            url("b1", "#builders/1/builds/1"),
            url("o1", "https://example.com/report"),
            url("r1", "#buildrequests/10"),
            url("b2", "#builders/2/builds/5"),
            url("o2", "file-store/x"),
            url("r2", "#buildrequests/11"),
        ];
        let total = input.len();

        let classified = classify_step_urls(input);

        assert_eq!(classified.len(), total);
        let build_names: Vec<_> = classified.builds.iter().map(|b| b.link.name.as_str()).collect();
        let request_ids: Vec<_> = classified.requests.iter().map(|r| r.reqid).collect();
        let other_names: Vec<_> = classified.other.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(build_names, ["b1", "b2"]);
        assert_eq!(request_ids, [10, 11]);
        assert_eq!(other_names, ["o1", "o2"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(classify_step_urls(Vec::new()).is_empty());
    }

    #[test]
    fn test_step_link_serializes_with_kind_tag() {
        let link = classify(url("child", "#builders/42/builds/7"));
        let value = serde_json::to_value(&link).unwrap();

        assert_eq!(value["kind"], "build");
        assert_eq!(value["name"], "child");
        assert_eq!(value["bnum"], "42-7");
    }
}
