//! Junos device session management.
//!
//! [`Session`] is the provider-wide handle built once from configuration;
//! [`JunosSession`] is one live NETCONF session opened for a single CRUD
//! operation and closed at its end.

pub mod session;
pub mod system;

pub use session::{JunosSession, Session};
pub use system::{check_compatibility_security, SystemInformation};

/// `show configuration ` prefix for existence checks and reads
pub const CMD_SHOW_CONFIG: &str = "show configuration ";

/// Pipe suffix for flat `set` output
pub const PIPE_DISPLAY_SET: &str = " | display set";

/// Pipe suffix for flat `set` output relative to the queried subtree
pub const PIPE_DISPLAY_SET_RELATIVE: &str = " | display set relative";

/// Opening wrapper of text configuration output
pub const XML_START_TAG_CONFIG_OUT: &str = "<configuration-output>";

/// Closing wrapper of text configuration output
pub const XML_END_TAG_CONFIG_OUT: &str = "</configuration-output>";

/// Marker at the head of each flat configuration line
pub const SET_LINE_START: &str = "set ";
