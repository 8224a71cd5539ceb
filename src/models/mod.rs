pub mod catalog;
pub mod health;
pub mod message;
pub mod response;
pub mod status;
pub mod storefront;
