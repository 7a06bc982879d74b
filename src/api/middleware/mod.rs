//! Request middleware.

pub mod device;
