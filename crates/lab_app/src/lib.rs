//! eTOXlab front-ends: the interactive console and the `predict` driver.
pub mod cli;
pub mod platform;
