pub mod ago;
pub mod command;
pub mod dispatcher;
pub mod error;
pub mod recorder;
pub mod replies;
pub mod resolver;
pub mod tracker;
