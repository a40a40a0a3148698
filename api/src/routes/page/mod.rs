pub mod page_route;
pub mod tabs;
