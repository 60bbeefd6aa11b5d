pub mod auth;
pub mod http;
pub mod rendering;
pub mod services;
pub mod storage;
pub mod websocket;
