pub mod catalog;
pub mod health;
pub mod rbmq;
pub mod storefront;
