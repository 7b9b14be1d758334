//! Client side of the contact form: a typed API client and the form state
//! machine driving it.

pub mod api;
pub mod form;
mod http;
