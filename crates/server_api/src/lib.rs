use shared::{
    domain::{Koder, KoderId, NewKoder},
    error::{ApiError, ErrorCode},
    validation::ensure_valid_new_koder,
};
use storage::Storage;
use tracing::{info, warn};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_koders(ctx: &ApiContext) -> Result<Vec<Koder>, ApiError> {
    let koders = ctx.storage.list_koders().await.map_err(internal)?;
    Ok(koders.into_iter().map(|stored| stored.koder).collect())
}

pub async fn create_koder(ctx: &ApiContext, new_koder: NewKoder) -> Result<Koder, ApiError> {
    if let Err(err) = ensure_valid_new_koder(&new_koder) {
        warn!(message = %err.message, "rejected koder payload");
        return Err(err.into());
    }

    let stored = ctx
        .storage
        .insert_koder(&new_koder)
        .await
        .map_err(internal)?;
    info!(koder_id = %stored.koder.id, "koder created");
    Ok(stored.koder)
}

pub async fn delete_koder(ctx: &ApiContext, koder_id: &KoderId) -> Result<Koder, ApiError> {
    let removed = ctx
        .storage
        .delete_koder(koder_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::new(ErrorCode::NotFound, format!("koder {koder_id} not found")))?;
    info!(%koder_id, "koder deleted");
    Ok(removed.koder)
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}
