pub mod dns;
pub mod web;

pub use dns::{tcp_listener_task, udp_listener_task};
pub use web::{route_mapping_task, web_server_task};
