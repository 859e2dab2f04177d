// handlers/reviews.rs - rating statistics (CRUD lives in handlers::content)

use axum::extract::{Path, State};

use crate::middleware::{parse_id, ApiResponse, ApiResult};
use crate::services::RatingStats;
use crate::state::AppState;

/// GET /api/v1/reviews/product/:productId/stats
pub async fn product_stats(State(state): State<AppState>, Path(product_id): Path<String>) -> ApiResult<RatingStats> {
    let product_id = parse_id(&product_id)?;
    let stats = state.review_stats.for_product(product_id).await?;
    Ok(ApiResponse::success(stats))
}
