pub mod analyse;
pub mod analyses_route;
pub mod categories_route;
pub mod health_route;
pub mod review;
pub mod settings;
