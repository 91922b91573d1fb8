//! HTTP surface: welcome, liveness, and the odds endpoint.

pub mod routes;
