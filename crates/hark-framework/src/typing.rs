//! Typing-delay estimation.
//!
//! Before a reply the bot may pretend to type. The pause grows linearly with
//! the size of what is about to be sent, roughly one minute per 3000 length
//! units, and is capped so a long answer never stalls the loop for more than
//! two seconds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use hark_core::Attachment;

/// Token measured instead of the attachment list when
/// [`AttachmentDelay::Placeholder`] is configured.
pub const ATTACHMENT_PLACEHOLDER: &str = "attachment";

/// What is about to be sent.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    Text(&'a str),
    Attachments(&'a [Attachment]),
    /// Anything the estimator cannot size; always yields no delay.
    Other,
}

impl Payload<'_> {
    /// Size of the payload in length units.
    ///
    /// Text counts characters. Attachments count the characters of their
    /// debug rendering, which approximates payload size without caring
    /// about the wire encoding.
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.chars().count(),
            Self::Attachments(attachments) => format!("{attachments:?}").chars().count(),
            Self::Other => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> From<&'a str> for Payload<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a String> for Payload<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a [Attachment]> for Payload<'a> {
    fn from(attachments: &'a [Attachment]) -> Self {
        Self::Attachments(attachments)
    }
}

impl<'a> From<&'a Vec<Attachment>> for Payload<'a> {
    fn from(attachments: &'a Vec<Attachment>) -> Self {
        Self::Attachments(attachments)
    }
}

/// Which payload sizes the typing delay before an attachment reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentDelay {
    /// Measure [`ATTACHMENT_PLACEHOLDER`], ignoring the attachments.
    Placeholder,
    /// Measure the attachment list that is actually sent.
    #[default]
    Measured,
}

/// Typing simulation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingConfig {
    /// Length units "typed" per minute. Zero disables the delay.
    #[serde(default = "default_units_per_minute")]
    pub units_per_minute: u64,

    /// Upper bound for any single delay, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default)]
    pub attachment_delay: AttachmentDelay,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            units_per_minute: default_units_per_minute(),
            max_delay_ms: default_max_delay_ms(),
            attachment_delay: AttachmentDelay::default(),
        }
    }
}

fn default_units_per_minute() -> u64 {
    3000
}

fn default_max_delay_ms() -> u64 {
    2000
}

/// Maps payloads to typing delays.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypingEstimator {
    config: TypingConfig,
}

impl TypingEstimator {
    pub fn new(config: TypingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TypingConfig {
        &self.config
    }

    /// Returns the simulated typing time for `payload`.
    ///
    /// Always within `0..=max_delay_ms`, and non-decreasing in payload length.
    pub fn estimate<'a>(&self, payload: impl Into<Payload<'a>>) -> Duration {
        if self.config.units_per_minute == 0 {
            return Duration::ZERO;
        }

        let len = payload.into().len() as u128;
        let millis = 60_000 * len / u128::from(self.config.units_per_minute);
        let capped = millis.min(u128::from(self.config.max_delay_ms));

        Duration::from_millis(capped as u64)
    }

    /// Returns the payload that sizes the delay before an attachment reply.
    pub fn attachment_payload<'a>(&self, attachments: &'a [Attachment]) -> Payload<'a> {
        match self.config.attachment_delay {
            AttachmentDelay::Placeholder => Payload::Text(ATTACHMENT_PLACEHOLDER),
            AttachmentDelay::Measured => Payload::Attachments(attachments),
        }
    }
}

/// Estimates the typing delay for `payload` with the default settings.
pub fn estimate_delay<'a>(payload: impl Into<Payload<'a>>) -> Duration {
    TypingEstimator::default().estimate(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_has_no_delay() {
        assert_eq!(estimate_delay(""), Duration::ZERO);
    }

    #[test]
    fn test_linear_below_cap() {
        // 60s / 3000 = 20ms per character
        assert_eq!(estimate_delay("a"), Duration::from_millis(20));
        assert_eq!(estimate_delay("hello"), Duration::from_millis(100));
        assert_eq!(estimate_delay("é".repeat(10).as_str()), Duration::from_millis(200));
    }

    #[test]
    fn test_monotonic_and_capped() {
        let mut previous = Duration::ZERO;
        for len in 0..400 {
            let delay = estimate_delay("x".repeat(len).as_str());
            assert!(delay >= previous, "delay decreased at length {len}");
            assert!(delay <= Duration::from_millis(2000));
            previous = delay;
        }
        assert_eq!(previous, Duration::from_millis(2000));
    }

    #[test]
    fn test_other_payload_has_no_delay() {
        assert_eq!(estimate_delay(Payload::Other), Duration::ZERO);
    }

    #[test]
    fn test_large_attachment_payload_is_clamped() {
        let attachments = vec![Attachment::new().text("x".repeat(9000))];
        let payload = Payload::from(&attachments);
        assert!(payload.len() > 9000);
        assert_eq!(estimate_delay(payload), Duration::from_millis(2000));
    }

    #[test]
    fn test_attachment_length_uses_debug_rendering() {
        let attachments = vec![Attachment::new().title("t")];
        let expected = format!("{attachments:?}").len();
        assert_eq!(Payload::from(&attachments).len(), expected);
    }

    #[test]
    fn test_custom_config() {
        let estimator = TypingEstimator::new(TypingConfig {
            units_per_minute: 600,
            max_delay_ms: 150,
            ..Default::default()
        });
        assert_eq!(estimator.estimate("a"), Duration::from_millis(100));
        assert_eq!(estimator.estimate("ab"), Duration::from_millis(150));

        let disabled = TypingEstimator::new(TypingConfig {
            units_per_minute: 0,
            ..Default::default()
        });
        assert_eq!(disabled.estimate("anything"), Duration::ZERO);
    }

    #[test]
    fn test_attachment_payload_modes() {
        let attachments = vec![Attachment::new().text("x".repeat(500))];

        let placeholder = TypingEstimator::new(TypingConfig {
            attachment_delay: AttachmentDelay::Placeholder,
            ..Default::default()
        });
        assert_eq!(
            placeholder.estimate(placeholder.attachment_payload(&attachments)),
            Duration::from_millis(200)
        );

        let measured = TypingEstimator::default();
        assert_eq!(
            measured.estimate(measured.attachment_payload(&attachments)),
            Duration::from_millis(2000)
        );
    }
}
