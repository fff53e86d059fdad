//! Float lookup service message types

use serde::{Deserialize, Serialize};

use crate::common::types::ItemInfo;

/// Response body of `GET /?url=<inspect link>`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatApiResponse {
    /// Item details; absent or `null` when the service has nothing
    #[serde(default)]
    pub iteminfo: Option<ItemInfo>,
}
