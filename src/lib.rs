use std::fmt::Display;

use lazy_static::lazy_static;
use tracing::log;

use crate::config_handler::Config;

pub mod config_handler;
pub mod db;
pub mod errors;
pub mod event_service;
pub mod match_clock;
pub mod match_list_service;
pub mod match_session;
pub mod merge_service;
pub mod minute_codec;
pub mod models;
pub mod models_api;
pub mod models_external;
pub mod outbox_service;
pub mod rest_client;
pub mod snapshot_service;

lazy_static! {
    pub static ref CONFIG: Config = config_handler::get_config();
}

pub trait LogResult<T, E: Display> {
    fn ok_log(self, msg: &str) -> Option<T>;
}

impl<T, E: Display> LogResult<T, E> for Result<T, E> {
    fn ok_log(self, msg: &str) -> Option<T> {
        match self {
            Ok(o) => Some(o),
            Err(e) => {
                log::error!("{}: {}", msg, e);
                None
            }
        }
    }
}
