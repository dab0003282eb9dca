pub mod forwarder;
pub mod message_builder;

pub use forwarder::DnsForwarder;
pub use message_builder::MessageBuilder;
