// Interface adapters: HTTP protocol, handlers, storage and door clients.

pub mod clients;
pub mod handlers;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod stores;
