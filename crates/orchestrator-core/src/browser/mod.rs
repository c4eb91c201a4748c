mod gateway;

pub use gateway::{BrowserGateway, HttpBrowserGateway};
