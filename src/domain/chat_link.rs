use super::{MessageBody, PhoneNumber};

/// Base of every chat link unless configured otherwise.
pub const WA_ME_BASE_URL: &str = "https://wa.me";

/// A deep link that opens a chat with `phone`, pre-filled with the message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct ChatLink(String);

impl ChatLink {
    pub fn new(phone: &PhoneNumber, message: &MessageBody) -> Self {
        Self::with_base_url(WA_ME_BASE_URL, phone, message)
    }

    /// The message is percent-encoded per RFC 3986: everything outside
    /// `A-Z a-z 0-9 - _ . ~` is escaped, so a space becomes `%20`.
    pub fn with_base_url(base_url: &str, phone: &PhoneNumber, message: &MessageBody) -> Self {
        Self(format!(
            "{}/{}?text={}",
            base_url.trim_end_matches('/'),
            phone.as_ref(),
            urlencoding::encode(message.as_ref())
        ))
    }
}

impl AsRef<str> for ChatLink {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChatLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
