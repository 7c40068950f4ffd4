pub mod analyse_request;
pub mod analyse_route;
