#[cfg(target_os = "macos")]
mod macos;

#[cfg(not(target_os = "macos"))]
mod unsupported;

use std::sync::Arc;

use crate::bridge::{CategorySpec, InteractionSink, NativeRequest};

/// Called once with the outcome of a submission, from any thread
pub type Completion = Box<dyn FnOnce(Result<(), String>) + Send + 'static>;

/// The OS notification service as seen by the bridge
pub trait NotificationService: Send + Sync {
    /// Route interaction callbacks into `sink`
    fn attach(&self, sink: InteractionSink);

    /// Ask for permission if the user has not decided yet; fire-and-forget
    fn request_authorization(&self);

    /// Merge `category` into the global category set, replacing one with the same identifier
    fn register_category(&self, category: &CategorySpec);

    /// Deliver immediately; `completion` carries the OS error message on failure
    fn submit(&self, request: &NativeRequest, completion: Completion);

    /// Remove delivered and pending entries for `identifier`
    fn remove(&self, identifier: &str);
}

/// How a notification is presented while the app is in the foreground
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    BannerListSound,
    /// Pre-Big Sur fallback
    AlertSound,
}

impl Presentation {
    pub fn for_os_major(major: u64) -> Self {
        if major >= 11 {
            Self::BannerListSound
        } else {
            Self::AlertSound
        }
    }
}

/// Union `category` into `existing`, replacing any entry with the same identifier
pub fn merge_categories<T>(
    existing: impl IntoIterator<Item = T>,
    category: T,
    identifier_of: impl Fn(&T) -> String,
) -> Vec<T> {
    let identifier = identifier_of(&category);
    let mut merged: Vec<T> = existing
        .into_iter()
        .filter(|c| identifier_of(c) != identifier)
        .collect();
    merged.push(category);
    merged
}

/// The native notification service for this platform
pub fn platform_service() -> Arc<dyn NotificationService> {
    #[cfg(target_os = "macos")]
    {
        Arc::new(macos::MacosService::new())
    }

    #[cfg(target_os = "linux")]
    {
        Arc::new(unsupported::UnsupportedService::new("Linux"))
    }

    #[cfg(target_os = "windows")]
    {
        Arc::new(unsupported::UnsupportedService::new("Windows"))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        Arc::new(unsupported::UnsupportedService::new("This platform's"))
    }
}
