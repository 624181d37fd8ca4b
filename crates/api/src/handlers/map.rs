use axum::Json;
use quietfinder_core::campus::MapConfig;

use crate::response::DataResponse;

/// GET /api/v1/map
///
/// Static campus map setup: center, bounds, zoom range, tiles and icons.
pub async fn get_map_config() -> Json<DataResponse<MapConfig>> {
    Json(DataResponse {
        data: MapConfig::campus(),
    })
}
