pub mod routes;
pub mod server;

pub use server::{run, AppState};
