pub mod client;
pub mod navigator;
pub mod render;

pub use client::GatewayClient;
pub use navigator::{Direction, FeedNavigator, Navigation, NavigatorState, MAX_FETCH_PAGES};
pub use render::{Renderer, TextRenderer};

pub mod prelude {
    pub use super::{Direction, FeedNavigator, GatewayClient, Navigation, Renderer, TextRenderer};
    pub use gs_core::{Article, Batch, Result};
}
