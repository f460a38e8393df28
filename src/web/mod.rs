//! HTTP surface for taskboard.
//!
//! ## Endpoints
//!
//! - `GET /` - Task list
//! - `GET /task/{id}/` - Task detail
//! - `GET /task/new/` - Empty create form
//! - `POST /task/new/` - Create a task
//! - `GET /task/{id}/edit/` - Pre-filled edit form
//! - `POST /task/{id}/edit/` - Update a task
//! - `GET /task/{id}/delete/` - Delete confirmation
//! - `POST /task/{id}/delete/` - Delete a task
//!
//! Successful POSTs answer 303 See Other to `/`. An unknown or
//! non-integer `{id}` answers 404.

mod routes;
pub mod tasks;
pub mod views;

pub use routes::{router, serve, AppState};
