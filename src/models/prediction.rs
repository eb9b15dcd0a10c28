use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::schema::predictions;

/// 预测记录，写入后不再修改
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = predictions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Prediction {
    pub id: Uuid,
    pub company: String,
    pub target_time: NaiveDateTime,
    pub close: BigDecimal,
    pub predicted_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub metadata: Option<Value>,
    pub exchange: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = predictions)]
pub struct NewPrediction {
    pub id: Uuid,
    pub company: String,
    pub target_time: NaiveDateTime,
    pub close: BigDecimal,
    pub predicted_at: NaiveDateTime,
    pub metadata: Option<Value>,
    pub exchange: String,
}
