//! Request middleware: authentication extraction and tenant resolution.

pub mod auth;
