mod chat_link;
mod dispatch_request;
mod message_body;
mod phone_number;
mod recipient_list;

pub use chat_link::{ChatLink, WA_ME_BASE_URL};
pub use dispatch_request::{BatchSize, DispatchRequest};
pub use message_body::MessageBody;
pub use phone_number::PhoneNumber;
pub use recipient_list::{RecipientList, RejectedToken};
