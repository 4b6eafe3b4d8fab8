use std::{num::NonZeroUsize, time::Duration};

use super::{MessageBody, PhoneNumber};

/// How many links are opened together before waiting. Never zero, so the
/// batching cursor always advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSize(NonZeroUsize);

impl BatchSize {
    pub fn parse(size: usize) -> Result<BatchSize, String> {
        NonZeroUsize::new(size)
            .map(Self)
            .ok_or_else(|| "The batch size must be at least 1.".to_string())
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

/// Everything needed to open one chat link per recipient.
///
/// Holds its own copy of the recipients, so later edits to the source list
/// have no effect on a dispatch in progress.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    recipients: Vec<PhoneNumber>,
    message: MessageBody,
    batch_size: BatchSize,
    delay: Duration,
}

impl DispatchRequest {
    pub fn new(
        recipients: &[PhoneNumber],
        message: MessageBody,
        batch_size: BatchSize,
        delay: Duration,
    ) -> Result<Self, String> {
        if recipients.is_empty() {
            return Err("There are no recipients to send to.".to_string());
        }
        Ok(Self {
            recipients: recipients.to_vec(),
            message,
            batch_size,
            delay,
        })
    }

    pub fn recipients(&self) -> &[PhoneNumber] {
        &self.recipients
    }

    pub fn message(&self) -> &MessageBody {
        &self.message
    }

    pub fn batch_size(&self) -> BatchSize {
        self.batch_size
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The recipients split into consecutive batches; only the last one can
    /// be shorter than the batch size.
    pub fn batches(&self) -> impl Iterator<Item = &[PhoneNumber]> {
        self.recipients.chunks(self.batch_size.get())
    }
}
