pub mod coding_request;
pub mod coding_route;
