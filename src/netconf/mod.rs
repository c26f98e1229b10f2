//! NETCONF message codec for Junos devices.
//!
//! Builds the RPC envelopes the provider sends (CLI commands, set-format
//! configuration loads, lock/unlock, commit, discard) and parses
//! `rpc-reply` documents into a [`NetconfResponse`]. Replies are small and
//! flat, so parsing is plain tag search rather than a full XML tree.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::connection::{ConnectionError, ConnectionResult};

// ============================================================================
// NETCONF Constants
// ============================================================================

/// NETCONF 1.0 message delimiter (RFC 6242 end-of-message framing)
pub const NETCONF_1_0_DELIMITER: &str = "]]>]]>";

/// NETCONF SSH subsystem name
pub const NETCONF_SUBSYSTEM: &str = "netconf";

/// NETCONF base namespace (RFC 6241)
pub const NETCONF_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// Capability naming the candidate datastore
const CANDIDATE_CAPABILITY: &str = "urn:ietf:params:netconf:capability:candidate:1.0";

/// Message ID counter for NETCONF RPC operations
static MESSAGE_ID_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Get the next message ID for NETCONF operations
fn next_message_id() -> u32 {
    MESSAGE_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

// ============================================================================
// Session Setup
// ============================================================================

/// Build the client hello message (unframed)
pub fn client_hello() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<hello xmlns="{}">
  <capabilities>
    <capability>urn:ietf:params:netconf:base:1.0</capability>
    <capability>urn:ietf:params:netconf:capability:candidate:1.0</capability>
  </capabilities>
</hello>"#,
        NETCONF_NS
    )
}

/// Parsed server hello
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerHello {
    /// Session ID assigned by the device
    pub session_id: Option<u32>,
    /// NETCONF capabilities announced by the device
    pub capabilities: Vec<String>,
}

impl ServerHello {
    /// Parse the device hello message
    pub fn parse(message: &str) -> ConnectionResult<Self> {
        if !message.contains("<hello") {
            return Err(ConnectionError::Protocol(
                "expected <hello> from device".to_string(),
            ));
        }

        let session_id = extract_element(message, "session-id").and_then(|id| id.parse().ok());
        let capabilities = extract_all(message, "capability");

        Ok(Self {
            session_id,
            capabilities,
        })
    }

    /// Check if a capability is announced
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c.contains(capability))
    }

    /// Fail unless the device offers a candidate datastore to lock and commit
    pub fn require_candidate(&self) -> ConnectionResult<()> {
        if self.has_capability(CANDIDATE_CAPABILITY) {
            Ok(())
        } else {
            Err(ConnectionError::Protocol(
                "device does not announce the candidate configuration capability".to_string(),
            ))
        }
    }
}

// ============================================================================
// RPC Builders
// ============================================================================

/// Wrap an operation in an `<rpc>` envelope, returning the message ID used
pub fn rpc(operation: &str) -> (u32, String) {
    let message_id = next_message_id();
    let message = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rpc xmlns="{}" message-id="{}">
{}
</rpc>"#,
        NETCONF_NS, message_id, operation
    );
    (message_id, message)
}

/// Run a CLI command and return its text output
pub fn command(cli: &str) -> String {
    format!(r#"<command format="text">{}</command>"#, escape_xml(cli))
}

/// Load `set`/`delete` lines into the candidate datastore
pub fn load_set(lines: &[String]) -> String {
    format!(
        r#"<load-configuration action="set" format="text"><configuration-set>{}</configuration-set></load-configuration>"#,
        escape_xml(&lines.join("\n"))
    )
}

/// Lock the candidate configuration
pub fn lock_candidate() -> &'static str {
    "<lock><target><candidate/></target></lock>"
}

/// Unlock the candidate configuration
pub fn unlock_candidate() -> &'static str {
    "<unlock><target><candidate/></target></unlock>"
}

/// Commit the candidate configuration with a log message
pub fn commit(log: &str) -> String {
    format!(
        "<commit-configuration><log>{}</log></commit-configuration>",
        escape_xml(log)
    )
}

/// Discard candidate configuration changes
pub fn discard_changes() -> &'static str {
    "<discard-changes/>"
}

/// Read platform facts
pub fn get_system_information() -> &'static str {
    "<get-system-information/>"
}

/// Close the NETCONF session
pub fn close_session() -> &'static str {
    "<close-session/>"
}

// ============================================================================
// NETCONF Response
// ============================================================================

/// Parsed NETCONF RPC response
#[derive(Debug, Clone, Default)]
pub struct NetconfResponse {
    /// Message ID echoed by the device
    pub message_id: Option<u32>,
    /// Whether the reply carries `<ok/>`
    pub ok: bool,
    /// Every `rpc-error` in the reply, whatever its severity
    pub errors: Vec<NetconfError>,
    /// Reply body with `rpc-error` blocks and `<ok/>` removed
    pub data: Option<String>,
}

impl NetconfResponse {
    /// Parse an `rpc-reply` document (unframed)
    pub fn parse(reply: &str) -> ConnectionResult<Self> {
        let open = reply.find("<rpc-reply").ok_or_else(|| {
            ConnectionError::Protocol(format!("expected <rpc-reply>, got: {}", truncate(reply)))
        })?;
        let tag_end = reply[open..]
            .find('>')
            .map(|i| open + i)
            .ok_or_else(|| ConnectionError::Protocol("unterminated <rpc-reply> tag".to_string()))?;
        let tag = &reply[open..=tag_end];

        let message_id = extract_attribute(tag, "message-id").and_then(|id| id.parse().ok());

        if tag.ends_with("/>") {
            return Ok(Self {
                message_id,
                ..Self::default()
            });
        }

        let body_end = reply.rfind("</rpc-reply>").unwrap_or(reply.len());
        let body = if tag_end + 1 <= body_end {
            &reply[tag_end + 1..body_end]
        } else {
            ""
        };

        let errors = Self::parse_errors(body);
        let ok = body.contains("<ok/>") || body.contains("<ok />");

        let stripped = strip_blocks(body, "rpc-error")
            .replace("<ok/>", "")
            .replace("<ok />", "");
        let data = Some(stripped.trim().to_string()).filter(|d| !d.is_empty());

        Ok(Self {
            message_id,
            ok,
            errors,
            data,
        })
    }

    /// Parse RPC errors from a reply body
    fn parse_errors(body: &str) -> Vec<NetconfError> {
        blocks(body, "rpc-error")
            .into_iter()
            .map(NetconfError::parse)
            .collect()
    }

    /// `rpc-error` entries with severity error
    pub fn error_list(&self) -> Vec<NetconfError> {
        self.errors.iter().filter(|e| !e.is_warning()).cloned().collect()
    }

    /// `rpc-error` entries with severity warning
    pub fn warnings(&self) -> Vec<NetconfError> {
        self.errors.iter().filter(|e| e.is_warning()).cloned().collect()
    }

    /// Whether any entry has severity error
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|e| !e.is_warning())
    }
}

/// NETCONF RPC error
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetconfError {
    /// Error type (protocol, application, etc.)
    pub error_type: String,
    /// Error tag (e.g., invalid-value, operation-failed)
    pub error_tag: String,
    /// Error severity (error, warning)
    pub error_severity: String,
    /// Error message
    pub error_message: Option<String>,
    /// Error path (configuration element that caused the error)
    pub error_path: Option<String>,
    /// Offending configuration token
    pub bad_element: Option<String>,
}

impl NetconfError {
    /// Parse a single rpc-error element
    fn parse(xml: &str) -> Self {
        NetconfError {
            error_type: extract_element(xml, "error-type").unwrap_or_default(),
            error_tag: extract_element(xml, "error-tag").unwrap_or_default(),
            error_severity: extract_element(xml, "error-severity")
                .unwrap_or_else(|| "error".to_string()),
            error_message: extract_element(xml, "error-message").map(|m| unescape_xml(&m)),
            error_path: extract_element(xml, "error-path"),
            bad_element: extract_element(xml, "bad-element"),
        }
    }

    /// Whether the device flagged this entry as a warning
    pub fn is_warning(&self) -> bool {
        self.error_severity.eq_ignore_ascii_case("warning")
    }
}

impl std::fmt::Display for NetconfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = self.error_message.as_deref().unwrap_or("Unknown error");
        if self.error_tag.is_empty() {
            write!(f, "{}", message)?;
        } else {
            write!(f, "[{}] {}", self.error_tag, message)?;
        }
        if let Some(ref element) = self.bad_element {
            write!(f, " (bad element: {})", element)?;
        }
        if let Some(ref path) = self.error_path {
            write!(f, " at {}", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Extract text content of the first `<element>` (attributes allowed)
pub fn extract_element(xml: &str, element: &str) -> Option<String> {
    let (content_start, _) = find_open_tag(xml, element, 0)?;
    let end_tag = format!("</{}>", element);
    let end = xml[content_start..].find(&end_tag)?;
    Some(xml[content_start..content_start + end].trim().to_string())
}

/// Extract text content of every `<element>`
fn extract_all(xml: &str, element: &str) -> Vec<String> {
    let end_tag = format!("</{}>", element);
    let mut values = Vec::new();
    let mut search_start = 0;

    while let Some((content_start, _)) = find_open_tag(xml, element, search_start) {
        match xml[content_start..].find(&end_tag) {
            Some(end) => {
                values.push(xml[content_start..content_start + end].trim().to_string());
                search_start = content_start + end + end_tag.len();
            }
            None => break,
        }
    }

    values
}

/// Whole `<element ...>...</element>` blocks
fn blocks<'a>(xml: &'a str, element: &str) -> Vec<&'a str> {
    let end_tag = format!("</{}>", element);
    let mut found = Vec::new();
    let mut search_start = 0;

    while let Some((content_start, tag_start)) = find_open_tag(xml, element, search_start) {
        match xml[content_start..].find(&end_tag) {
            Some(end) => {
                let block_end = content_start + end + end_tag.len();
                found.push(&xml[tag_start..block_end]);
                search_start = block_end;
            }
            None => break,
        }
    }

    found
}

/// Remove every `<element>` block
fn strip_blocks(xml: &str, element: &str) -> String {
    let mut out = xml.to_string();
    for block in blocks(xml, element) {
        out = out.replacen(block, "", 1);
    }
    out
}

/// Find `<element>` or `<element attr=...>` at or after `from`.
/// Returns (content start, tag start).
fn find_open_tag(xml: &str, element: &str, from: usize) -> Option<(usize, usize)> {
    let needle = format!("<{}", element);
    let mut pos = from;

    while let Some(rel) = xml.get(pos..)?.find(&needle) {
        let tag_start = pos + rel;
        let after = tag_start + needle.len();
        match xml[after..].chars().next() {
            Some('>') => return Some((after + 1, tag_start)),
            Some(c) if c.is_whitespace() => {
                let close = xml[after..].find('>')? + after;
                if xml[..close].ends_with('/') {
                    pos = close + 1;
                    continue;
                }
                return Some((close + 1, tag_start));
            }
            _ => pos = after,
        }
    }

    None
}

/// Value of `name="..."` inside a start tag
fn extract_attribute(tag: &str, name: &str) -> Option<String> {
    let needle = format!("{}=\"", name);
    let start = tag.find(&needle)? + needle.len();
    let end = tag[start..].find('"')?;
    Some(tag[start..start + end].to_string())
}

fn truncate(s: &str) -> &str {
    match s.char_indices().nth(120) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Escape special XML characters in text content
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Reverse [`escape_xml`] for text read back from the device
pub fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

// ============================================================================
// Tests
// ============================================================================
