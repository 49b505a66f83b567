//! Entity operations. Each issues exactly one call through
//! [`ZbxClient::call`](super::ZbxClient::call) and applies one of the
//! [`policy`](super::policy) conventions to the result.

mod group;
mod host;
mod screen;
mod template;
