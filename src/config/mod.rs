//! Configuration module for Urverk.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    EmbeddingSettings, GeneralSettings, LivePriceSettings, RetrievalSettings, Settings,
    VectorStoreSettings,
};
