//! 产品管理

pub mod client;
pub mod dialog;
pub mod form;
pub mod model;
pub mod render;
pub mod service;
pub mod store;

pub use client::{HttpProductApi, ProductApi};
pub use dialog::{Interaction, Notification, NotificationLevel, ScriptedInteraction};
pub use form::ProductForm;
pub use model::{DeleteAck, Product, ProductData, ProductPayload};
pub use service::{Outcome, ProductService};
pub use store::MirrorStore;
