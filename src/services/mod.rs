/// Content store operations and `content_update` broadcasts.
pub mod content_service;
/// Device tracking fed by joins and heartbeats.
pub mod device_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Server-Sent Events streaming for passive displays.
pub mod sse_service;
/// Rendering of trivia engine events into wire messages.
pub mod trivia_events;
/// Actor task owning the trivia engine and its countdown.
pub mod trivia_runtime;
/// Trivia commands shared by the WebSocket and REST surfaces.
pub mod trivia_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;
