pub mod connection;
pub mod headless;

pub use connection::{connect_to_browser_and_page, pick_calendar_tab, TabInfo};
pub use headless::launch_headless_browser;
