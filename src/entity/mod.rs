pub mod products;
pub mod user_products;
pub mod users;
