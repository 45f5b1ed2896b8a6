//! Cross-cutting domain types shared between the services and the API -
//! currently just the notification event stream.

pub mod events;
