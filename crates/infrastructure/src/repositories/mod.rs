pub mod hostname_store;

pub use hostname_store::JsonHostnameStore;
