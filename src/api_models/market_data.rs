use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct SubscribeRequest {
    pub symbols: Option<Vec<String>>,
}
