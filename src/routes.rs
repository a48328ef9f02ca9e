use std::sync::Arc;

use poem::http::StatusCode;
use poem::web::{Data, Json};
use poem::{get, handler, post, Endpoint, EndpointExt, Route};

use crate::controller::EdgeController;
use crate::event::{EdgeEvent, EdgeEventResult};

/// Builds the HTTP surface around a controller.
pub fn app(controller: Arc<EdgeController>) -> impl Endpoint {
    Route::new()
        .at("/v1/events", post(handle_event))
        .at("/v1/health", get(health))
        .data(controller)
}

/// Runs a single edge event and returns the request or response record
/// the runtime should continue with.
///
/// Pipeline failures are already folded into the returned record, only an
/// event that cannot be dispatched at all is rejected with a `400`.
#[handler]
async fn handle_event(
    controller: Data<&Arc<EdgeController>>,
    Json(event): Json<EdgeEvent>,
) -> poem::Result<Json<EdgeEventResult>> {
    let result = controller.handle(event).await.map_err(|e| {
        warn!("rejected malformed edge event: {}", e);
        poem::Error::from_string(e.to_string(), StatusCode::BAD_REQUEST)
    })?;

    Ok(Json(result))
}

#[handler]
fn health() -> &'static str {
    "OK"
}
