pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use std::path::PathBuf;

use crate::infra::db::Db;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub reports_dir: PathBuf,
}
