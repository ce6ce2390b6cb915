pub mod dto;
pub mod handler;
pub mod routes;
pub mod service;

pub use service::AdminService;
