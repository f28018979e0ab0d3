//! Local service management for the WebDriver dependency.

pub mod chromedriver;
