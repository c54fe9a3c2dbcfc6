use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::orders;

/// Storage-level default for the `status` column. The column's value space
/// (PENDING/CONFIRMED/CANCELED) is managed outside the intake pipeline, which
/// only ever writes this default.
pub const DEFAULT_ORDER_STATUS: &str = "PENDING";

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Order {
    pub id: Uuid,
    pub user_name: String,
    pub phone_number: String,
    pub status: String,
    pub notes: Option<String>,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrder {
    pub id: Uuid,
    pub user_name: String,
    pub phone_number: String,
    pub status: String,
}
