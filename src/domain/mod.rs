mod new_subscriber;
mod search_filter;
mod subscriber;
mod subscriber_email;
mod subscriber_name;
mod validation;

pub use new_subscriber::NewSubscriber;
pub use search_filter::SearchFilter;
pub use subscriber::Subscriber;
pub use subscriber_email::SubscriberEmail;
pub use subscriber_name::SubscriberName;
pub use validation::{Field, FieldErrorCode, ValidationErrors};
