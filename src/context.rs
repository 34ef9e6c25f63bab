use std::sync::Arc;

use time::OffsetDateTime;

use crate::config::Settings;
use crate::utils::generate_hex_id;


const QID_LENGTH: u32 = 8;

pub struct Context {
    pub qid: String,
    pub settings: Arc<Settings>,
    pub method: String,
    pub path: String,
    started: OffsetDateTime,
}

impl Context {
    pub fn new(settings: Arc<Settings>) -> Context {
        Context {
            qid: generate_hex_id(QID_LENGTH),
            settings,
            method: String::new(),
            path: String::new(),
            started: OffsetDateTime::now_utc(),
        }
    }

    pub fn time_ms(&self) -> f64 {
        let elapsed = OffsetDateTime::now_utc() - self.started;
        elapsed.whole_microseconds() as f64 / 1000.0
    }
}
