//! Record Store Client: the three remote calls behind the controller.
//!
//! No retries, no timeouts and no caching happen here; every call goes to the
//! network.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{Koder, KoderId, NewKoder},
    protocol::KodersResponse,
};
use tracing::{debug, warn};
use url::Url;

use crate::error::{StoreOperation, TransportError};

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_records(&self) -> Result<Vec<Koder>, TransportError>;
    /// The created record is not returned; callers refetch to learn its id.
    async fn create_record(&self, koder: &NewKoder) -> Result<(), TransportError>;
    /// Does not check that the id existed.
    async fn delete_record(&self, koder_id: &KoderId) -> Result<(), TransportError>;
}

pub struct HttpRecordStore {
    http: Client,
    base_url: Url,
}

impl HttpRecordStore {
    pub fn new(api_url: &str) -> Result<Self> {
        let base_url = Url::parse(api_url.trim())?;
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: Url) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("api url '{base_url}' cannot carry a path"));
        }
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn koders_url(&self) -> Url {
        self.endpoint(&["koders"])
    }

    fn delete_url(&self, koder_id: &KoderId) -> Url {
        self.endpoint(&["koders", koder_id.as_str(), "delete"])
    }

    async fn fetch_koders(&self, url: Url) -> reqwest::Result<KodersResponse> {
        self.http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn list_records(&self) -> Result<Vec<Koder>, TransportError> {
        let op = StoreOperation::ListRecords;
        let url = self.koders_url();
        debug!(%url, "fetching koders");
        let body = self
            .fetch_koders(url)
            .await
            .map_err(|e| transport_failure(op, e))?;
        debug!(count = body.koders.len(), "fetched koders");
        Ok(body.koders)
    }

    async fn create_record(&self, koder: &NewKoder) -> Result<(), TransportError> {
        let op = StoreOperation::CreateRecord;
        let url = self.koders_url();
        debug!(%url, "creating koder");
        self.http
            .post(url)
            .json(koder)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| transport_failure(op, e))?;
        Ok(())
    }

    async fn delete_record(&self, koder_id: &KoderId) -> Result<(), TransportError> {
        let op = StoreOperation::DeleteRecord;
        let url = self.delete_url(koder_id);
        debug!(%url, %koder_id, "deleting koder");
        self.http
            .post(url)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| transport_failure(op, e))?;
        Ok(())
    }
}

fn transport_failure(operation: StoreOperation, err: reqwest::Error) -> TransportError {
    warn!(%operation, error = %err, "record store call failed");
    TransportError::new(operation, err)
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
