mod admin_subscribers;
mod helpers;
