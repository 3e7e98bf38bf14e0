use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chain_types::Block;
use serde::Deserialize;
use tracing::info;

use crate::handle::NodeHandle;
use crate::node::NodeError;

/// Request body for `POST /blocks`.
#[derive(Debug, Deserialize)]
struct MineRequest {
    data: String,
}

/// Request body for `POST /peers`.
#[derive(Debug, Deserialize)]
struct AddPeerRequest {
    peer: String,
}

/// Node errors surfaced over HTTP.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] NodeError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            NodeError::BlockRejected => StatusCode::CONFLICT,
            NodeError::Shutdown => StatusCode::SERVICE_UNAVAILABLE,
            NodeError::Network(_) | NodeError::Io(_) => StatusCode::BAD_GATEWAY,
        };
        (status, self.0.to_string()).into_response()
    }
}

/// The HTTP control surface over a running node. Each route is one explicit
/// handler talking to the node through its handle.
pub fn router(handle: NodeHandle) -> Router {
    Router::new()
        .route("/blocks", get(list_blocks).post(mine_block))
        .route("/peers", get(list_peers).post(add_peer))
        .with_state(handle)
}

/// Serve the control surface until the process ends.
pub async fn serve(addr: &str, handle: NodeHandle) -> Result<(), NodeError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Serving HTTP control surface");
    axum::serve(listener, router(handle)).await?;
    Ok(())
}

/// Handler for `GET /blocks`: the full chain, genesis first.
async fn list_blocks(State(handle): State<NodeHandle>) -> Result<Json<Vec<Block>>, ApiError> {
    Ok(Json(handle.chain().await?))
}

/// Handler for `POST /blocks`: mine a block from the submitted payload.
async fn mine_block(
    State(handle): State<NodeHandle>,
    Json(request): Json<MineRequest>,
) -> Result<(StatusCode, Json<Block>), ApiError> {
    let block = handle.mine(request.data).await?;
    Ok((StatusCode::CREATED, Json(block)))
}

/// Handler for `GET /peers`: addresses of all connected peers.
async fn list_peers(State(handle): State<NodeHandle>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(handle.peers().await?))
}

/// Handler for `POST /peers`: dial and register a new peer.
async fn add_peer(
    State(handle): State<NodeHandle>,
    Json(request): Json<AddPeerRequest>,
) -> Result<StatusCode, ApiError> {
    handle.add_peer(request.peer).await?;
    Ok(StatusCode::ACCEPTED)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    use super::*;
    use crate::config::NodeConfig;
    use crate::node::Node;

    async fn running_node() -> (Router, NodeHandle) {
        let (node, handle) = Node::bind("127.0.0.1:0", NodeConfig::default())
            .await
            .expect("bind node");
        tokio::spawn(node.run());
        (router(handle.clone()), handle)
    }

    #[tokio::test]
    async fn get_blocks_returns_the_chain() {
        let (app, _handle) = running_node().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/blocks")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let chain: Vec<Block> = serde_json::from_slice(&body).unwrap();
        assert_eq!(chain, vec![Block::genesis()]);
    }

    #[tokio::test]
    async fn post_blocks_mines_a_block() {
        let (app, handle) = running_node().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/blocks")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"data":"posted over http"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let chain = handle.chain().await.expect("chain snapshot");
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].payload(), "posted over http");
    }

    #[tokio::test]
    async fn get_peers_starts_empty() {
        let (app, _handle) = running_node().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/peers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let peers: Vec<String> = serde_json::from_slice(&body).unwrap();
        assert!(peers.is_empty(), "fresh node should have no peers");
    }

    #[tokio::test]
    async fn post_peers_with_unreachable_address_is_bad_gateway() {
        let (app, _handle) = running_node().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/peers")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"peer":"127.0.0.1:1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn requests_against_a_stopped_node_are_unavailable() {
        let (node, handle) = Node::bind("127.0.0.1:0", NodeConfig::default())
            .await
            .expect("bind node");
        drop(node);
        let app = router(handle);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/blocks")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
