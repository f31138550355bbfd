pub mod app;
pub mod auction;
pub mod auth;
pub mod backend;
pub mod bidding;
pub mod config;
pub mod database;
pub mod error;
pub mod format;
pub mod handlers;
pub mod listing;
pub mod message_broker;
pub mod pages;
pub mod profile;
pub mod query;
pub mod session;
pub mod validation;
pub mod widgets;
