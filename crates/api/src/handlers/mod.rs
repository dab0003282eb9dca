pub mod containers;
pub mod health;
pub mod hostnames;

pub use containers::list_containers;
pub use health::health_check;
