pub mod claims;
pub mod dto;
pub mod extractors;
pub mod jwt;
pub mod services;
