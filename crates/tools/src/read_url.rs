//! `read_url_clean`: fetch a page and reduce it to its readable text.
//!
//! Script, style and navigation blocks are dropped, remaining tags are
//! stripped, entities decoded and whitespace collapsed to one line per block.

use async_trait::async_trait;
use scoutclaw_core::error::ToolError;
use scoutclaw_core::tool::{Tool, ToolArgs, ToolResult, optional_u64, required_str};
use std::time::Duration;
use tracing::debug;

const DEFAULT_MAX_CHARS: u64 = 4000;

/// Elements whose content is never readable text.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "svg", "template", "nav", "footer", "iframe",
];

/// Elements that start a new line of text.
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "br", "div", "li", "ul", "ol", "tr", "td", "th", "h1", "h2", "h3", "h4", "h5", "h6",
    "section", "article", "header", "main", "blockquote", "pre", "title", "table", "hr",
];

pub struct ReadUrlCleanTool {
    client: reqwest::Client,
}

impl ReadUrlCleanTool {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
        }
    }
}

pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("scoutclaw/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
}

/// Read the required `url` argument, which must be http(s).
pub(crate) fn http_url_arg(args: &ToolArgs) -> Result<&str, ToolError> {
    let url = required_str(args, "url")?;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ToolError::InvalidArguments(format!(
            "'url' must be http(s), got '{url}'"
        )));
    }
    Ok(url)
}

/// Download `url` and extract its readable text. Failures come back as the
/// envelope to return.
pub(crate) async fn fetch_clean_text(client: &reqwest::Client, url: &str) -> Result<String, ToolResult> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ToolResult::failure(format!("could not download URL: {e}")))?;
    if !response.status().is_success() {
        return Err(ToolResult::failure(format!(
            "could not download URL: status {}",
            response.status().as_u16()
        )));
    }
    let body = response
        .text()
        .await
        .map_err(|e| ToolResult::failure(format!("could not read body: {e}")))?;

    let text = html_to_text(&body);
    if text.is_empty() {
        return Err(ToolResult::failure("could not extract text"));
    }
    Ok(text)
}

#[async_trait]
impl Tool for ReadUrlCleanTool {
    fn name(&self) -> &str {
        "read_url_clean"
    }

    fn description(&self) -> &str {
        "Download a URL and return its main text, markup removed."
    }

    fn example_args(&self) -> serde_json::Value {
        serde_json::json!({"url": "https://...", "max_chars": DEFAULT_MAX_CHARS})
    }

    async fn execute(&self, args: &ToolArgs) -> Result<ToolResult, ToolError> {
        let url = http_url_arg(args)?;
        let max_chars = optional_u64(args, "max_chars", DEFAULT_MAX_CHARS) as usize;

        debug!(url = %url, max_chars, "read_url_clean");

        let text = match fetch_clean_text(&self.client, url).await {
            Ok(text) => text,
            Err(failure) => return Ok(failure),
        };

        Ok(ToolResult::success(serde_json::json!({
            "text": truncate_chars(&text, max_chars)
        })))
    }
}

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Reduce an HTML document to plain text.
pub fn html_to_text(html: &str) -> String {
    let mut raw = String::with_capacity(html.len() / 2);
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        raw.push_str(&rest[..open]);
        let tail = &rest[open..];

        if let Some(comment) = tail.strip_prefix("<!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
            continue;
        }

        let Some(close) = tail.find('>') else {
            rest = "";
            break;
        };
        let inner = &tail[1..close];
        rest = &tail[close + 1..];

        let closing = inner.starts_with('/');
        let name = element_name(inner);

        if !closing && SKIPPED_ELEMENTS.contains(&name.as_str()) && !inner.ends_with('/') {
            rest = skip_past_closing(rest, &name);
            continue;
        }
        if BLOCK_ELEMENTS.contains(&name.as_str()) {
            raw.push('\n');
        }
    }
    raw.push_str(rest);

    decode_entities(&raw)
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn element_name(inner: &str) -> String {
    inner
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Skip to just after `</name ...>`, matching case-insensitively.
fn skip_past_closing<'a>(rest: &'a str, name: &str) -> &'a str {
    let needle = format!("</{name}");
    // ASCII lowercasing keeps byte offsets valid for `rest`.
    let Some(start) = rest.to_ascii_lowercase().find(&needle) else {
        return "";
    };
    let after = &rest[start..];
    after.find('>').map_or("", |end| &after[end + 1..])
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .get(1..tail.len().min(12))
            .and_then(|window| window.find(';'))
            .and_then(|semi| decode_entity(&tail[1..semi + 1]).map(|c| (c, semi + 2)));
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(num) = entity.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }
    Some(match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "hellip" => '\u{2026}',
        "rsquo" => '\u{2019}',
        "lsquo" => '\u{2018}',
        "rdquo" => '\u{201d}',
        "ldquo" => '\u{201c}',
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_markup_and_scripts() {
        let html = r#"<html><head><title>Mamba 2</title>
            <style>body { color: red }</style>
            <script type="text/javascript">var x = "<p>not text</p>";</script></head>
            <body><nav><a href="/">Home</a></nav>
            <h1>State space models</h1>
            <p>They scale <b>linearly</b> with   sequence length.</p>
            <!-- hidden comment -->
            <footer>Copyright</footer></body></html>"#;
        let text = html_to_text(html);
        assert_eq!(
            text,
            "Mamba 2\nState space models\nThey scale linearly with sequence length."
        );
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(
            html_to_text("<p>Fish &amp; chips &lt;3 &#39;yes&#39; &#x41;&nbsp;B</p>"),
            "Fish & chips <3 'yes' A B"
        );
        assert_eq!(html_to_text("AT&T &bogus; & more"), "AT&T &bogus; & more");
    }

    #[test]
    fn uppercase_skipped_elements() {
        assert_eq!(html_to_text("a<SCRIPT>evil()</SCRIPT>b"), "ab");
    }

    #[test]
    fn unterminated_tag_drops_tail() {
        assert_eq!(html_to_text("hello <p unterminated"), "hello");
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("ñandú", 3), "ñan");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[tokio::test]
    async fn non_http_url_is_rejected() {
        let tool = ReadUrlCleanTool::new(Duration::from_secs(1));
        let args = json!({"url": "file:///etc/passwd"}).as_object().cloned().unwrap();
        let err = tool.execute(&args).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_failing_envelope() {
        let tool = ReadUrlCleanTool::new(Duration::from_millis(500));
        let args = json!({"url": "http://127.0.0.1:9/"}).as_object().cloned().unwrap();
        let result = tool.execute(&args).await.unwrap();
        assert!(!result.ok);
        assert!(result.error.starts_with("could not download URL"));
    }
}
