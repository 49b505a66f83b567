pub(crate) mod client;
pub(crate) mod models;
mod ops;
pub mod policy;
pub mod rpc;
pub(crate) mod session;
pub mod transport;

pub use client::ZbxClient;
pub use models::{EntityRecord, NewHost};
pub use session::Credentials;
pub use transport::{HttpOptions, HttpTransport, Transport};
