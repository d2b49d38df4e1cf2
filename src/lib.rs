pub mod app;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod external;
pub mod location;
pub mod map;
pub mod storage;
pub mod store;
pub mod viewport;
