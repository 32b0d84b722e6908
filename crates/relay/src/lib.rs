//! Stateless GraphQL passthrough for the portfolio's statistics widgets.
//!
//! Browsers cannot call the LeetCode or GitHub GraphQL APIs directly, so
//! the request body is posted here and relayed upstream unchanged.

mod macros;

pub mod proxy;
pub mod settings;
pub mod upstream;

pub use proxy::{Relay, RelayError, ServeError, router, serve};
pub use settings::{AuthToken, Endpoint, RelaySettings};
pub use upstream::{ForwardError, Service, Upstream};
