//! Triage - request routing and triage engine
//!
//! Decides who owns every inbound marketplace request (leads, partner
//! applications, property listing requests, contact messages and property
//! inquiries), tracks status on two overlapping vocabularies, and keeps an
//! append-only conversation thread per lead.
//!
//! - [`routing`] evaluates ordered rules and falls back by type
//! - [`store`] holds requests and leads behind one generic surface
//! - [`directory`] and [`notify`] are the injected collaborators
//! - [`api`] and [`cli`] expose it over HTTP and the command line

pub mod api;
pub mod cli;
pub mod config;
pub mod directory;
pub mod locale;
pub mod logging;
pub mod metrics;
pub mod notify;
pub mod routing;
pub mod store;
