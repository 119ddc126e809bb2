//! HTTP backend that accepts web form submissions, renders them as HTML
//! email, and relays them over SMTP to a fixed recipient. Stateless: one
//! request in, at most one outgoing message out.

pub mod config;
pub mod error;
pub mod mailer;
pub mod render;
pub mod routes;
pub mod submission;

pub use config::Config;
pub use mailer::Mailer;
pub use routes::{app, AppState};
