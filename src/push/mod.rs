// src/push/mod.rs
pub mod dispatch;
pub mod token;
pub mod wechat;

pub use dispatch::Dispatcher;
pub use token::{TokenHandle, TokenRefresher, TokenState};
pub use wechat::{NoticeCard, PushChannel, WeChatChannel};
