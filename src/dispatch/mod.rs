//! Typed requests and the dispatcher that turns them into report text.

pub mod dispatcher;
pub mod request;

pub use dispatcher::{DispatchError, Dispatcher};
pub use request::{Request, RequestError};
