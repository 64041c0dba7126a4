pub mod home;
pub mod login;
pub mod not_found;
pub mod product_preview;
pub mod products;
pub mod sheet_grid;
pub mod upload;
