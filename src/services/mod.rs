/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Lobby creation, joining, and snapshot reads.
pub mod lobby_service;
/// Turn coordination and end-of-game song generation.
pub mod turn_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;
