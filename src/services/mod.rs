// Core services
pub mod brands;
pub mod inventory;
pub mod locations;
pub mod purchase_orders;
pub mod transactions;

// Analytics and Reporting
pub mod reports;
