use std::collections::HashSet;

use super::{ChatLink, MessageBody, PhoneNumber};

/// Characters that separate tokens in pasted text or an uploaded file.
const SEPARATORS: [char; 4] = ['\n', ',', ';', '\t'];

/// A token that did not survive normalization, kept for display only.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RejectedToken {
    pub token: String,
    pub reason: String,
}

/// Recipients parsed out of freeform text, in first-occurrence order and
/// without duplicates.
///
/// Parsing never fails. Malformed tokens are dropped from `recipients` and
/// recorded in `rejected`; the accepted list does not depend on them.
#[derive(Debug, Clone, Default)]
pub struct RecipientList {
    recipients: Vec<PhoneNumber>,
    rejected: Vec<RejectedToken>,
    duplicates: usize,
}

impl RecipientList {
    pub fn parse(text: &str) -> Self {
        let mut list = Self::default();
        let mut seen = HashSet::new();

        let tokens = text
            .split(SEPARATORS)
            .map(str::trim)
            .filter(|token| !token.is_empty());

        for token in tokens {
            match PhoneNumber::parse(token) {
                Ok(phone) => {
                    if seen.insert(phone.clone()) {
                        list.recipients.push(phone);
                    } else {
                        list.duplicates += 1;
                    }
                }
                Err(reason) => list.rejected.push(RejectedToken {
                    token: token.to_owned(),
                    reason,
                }),
            }
        }

        list
    }

    pub fn recipients(&self) -> &[PhoneNumber] {
        &self.recipients
    }

    pub fn rejected(&self) -> &[RejectedToken] {
        &self.rejected
    }

    /// Number of accepted tokens dropped because an earlier token normalized
    /// to the same number.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    pub fn chat_links(&self, base_url: &str, message: &MessageBody) -> Vec<ChatLink> {
        self.recipients
            .iter()
            .map(|phone| ChatLink::with_base_url(base_url, phone, message))
            .collect()
    }

    /// One chat link per line, for the downloadable export file.
    pub fn export_links(&self, base_url: &str, message: &MessageBody) -> String {
        self.chat_links(base_url, message)
            .iter()
            .map(ChatLink::as_ref)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<RecipientList> for Vec<PhoneNumber> {
    fn from(list: RecipientList) -> Self {
        list.recipients
    }
}
