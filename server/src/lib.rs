//! HTTP surface of the MentorIA tutor.

pub mod config;
pub mod http_server;
