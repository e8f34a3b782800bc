pub mod automation;
pub mod cashregister;
pub mod cashregister_account;
pub mod currency;
pub mod exchange_rate;
pub mod money_transaction;
pub mod order;
pub mod order_item;
pub mod order_payment;
pub mod order_status;
pub mod product;
pub mod quantity;
pub mod warehouse;
