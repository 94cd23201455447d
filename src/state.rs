use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::db::{DbPool, OrmConn};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub timezone: Tz,
}

impl AppState {
    pub fn new(orm: OrmConn, timezone: Tz) -> Self {
        let pool = orm.get_postgres_connection_pool().clone();
        Self { pool, orm, timezone }
    }

    /// Wall-clock time in the business time zone.
    pub fn business_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.timezone).naive_local()
    }
}
