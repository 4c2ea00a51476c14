use serde::{Deserialize, Serialize};

use crate::domain::Koder;

pub fn koders_route() -> &'static str {
    "/koders"
}

pub fn delete_koder_route() -> &'static str {
    "/koders/:koder_id/delete"
}

/// Body of `GET /koders`. The `koders` key is mandatory; a body without it is
/// not a list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KodersResponse {
    pub koders: Vec<Koder>,
}

/// Body returned by create and delete. Clients are free to ignore it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KoderResponse {
    pub koder: Koder,
}
