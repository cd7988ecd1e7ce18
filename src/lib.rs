pub mod canvas;
pub mod db;
pub mod error;
pub mod models;
pub mod notion;
pub mod routes;
pub mod state;
pub mod sync;
