pub mod commands;
pub mod outbox;
pub mod products;
pub mod token_issuer;
