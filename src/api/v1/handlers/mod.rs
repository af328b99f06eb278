pub mod health;
pub mod products;
pub mod sales;
pub mod users;
