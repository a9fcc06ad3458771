//! Readiness detection on the output of a running application.
//!
//! The application prints the URI of its debug service once it is ready to
//! accept a debugger. [`ReadinessMatcher`] recognizes such a URI in a line of
//! output and [`ReadinessScanner`] turns the first recognized URI into a
//! one-shot signal.

use crate::bundler::{Error, Result};
use regex::Regex;
use tokio::sync::oneshot;
use url::Url;

/// `scheme://host[:port][/path]`, where host may be a bracketed IPv6 literal.
const URI_PATTERN: &str =
    r"[A-Za-z][A-Za-z0-9+.\-]*://(?:\[[0-9A-Fa-f:.]+\]|[^\s/:?#\[\]]+)(?::\d+)?(?:/\S*)?";

/// Recognizes a service URI in a line of output.
#[derive(Debug, Clone)]
pub struct ReadinessMatcher {
    pattern: Regex,
}

impl ReadinessMatcher {
    /// Matcher for `scheme://host[:port][/path]`.
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(URI_PATTERN)
            .map_err(|e| Error::GenericError(format!("invalid readiness pattern: {e}")))?;
        Ok(Self { pattern })
    }

    /// First URI in `line` that also parses as a URL with a host.
    ///
    /// The text is returned as printed, without normalization.
    pub fn find<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.pattern
            .find_iter(line)
            .map(|m| m.as_str())
            .find(|candidate| {
                Url::parse(candidate)
                    .map(|url| url.host().is_some())
                    .unwrap_or(false)
            })
    }
}

/// Feeds lines to a [`ReadinessMatcher`] and fires a oneshot on the first hit.
///
/// The signal fires at most once. Later matches are ignored. Dropping an
/// unfired scanner closes the channel, which the receiver sees as "the
/// output ended without a readiness URI".
#[derive(Debug)]
pub struct ReadinessScanner {
    matcher: ReadinessMatcher,
    signal: Option<oneshot::Sender<String>>,
}

impl ReadinessScanner {
    /// Scanner reporting to `signal`.
    pub fn new(matcher: ReadinessMatcher, signal: oneshot::Sender<String>) -> Self {
        Self {
            matcher,
            signal: Some(signal),
        }
    }

    /// Inspects one line. Returns `true` only for the line that fired the signal.
    pub fn feed(&mut self, line: &str) -> bool {
        if self.signal.is_none() {
            return false;
        }
        let Some(uri) = self.matcher.find(line) else {
            return false;
        };

        match self.signal.take() {
            Some(signal) => {
                // The receiver may already be gone after a timeout.
                let _ = signal.send(uri.to_string());
                true
            }
            None => false,
        }
    }

    /// Whether the signal has fired.
    pub fn has_fired(&self) -> bool {
        self.signal.is_none()
    }
}
