use block2::{DynBlock, RcBlock};
use objc2::rc::Retained;
use objc2::runtime::{Bool, NSObject, NSObjectProtocol, ProtocolObject};
use objc2::{define_class, msg_send, AllocAnyThread, DefinedClass};
use objc2_foundation::{NSArray, NSError, NSProcessInfo, NSSet, NSString};
use objc2_user_notifications::{
    UNAuthorizationOptions, UNAuthorizationStatus, UNMutableNotificationContent, UNNotification,
    UNNotificationAction, UNNotificationActionOptions, UNNotificationCategory,
    UNNotificationCategoryOptions, UNNotificationDefaultActionIdentifier,
    UNNotificationDismissActionIdentifier, UNNotificationPresentationOptions,
    UNNotificationRequest, UNNotificationResponse, UNNotificationSettings, UNNotificationSound,
    UNUserNotificationCenter, UNUserNotificationCenterDelegate,
};
use std::cell::RefCell;
use std::ptr::NonNull;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use super::{Completion, NotificationService, Presentation, merge_categories};
use crate::bridge::{CategorySpec, InteractionSink, InvokedAction, NativeRequest};

fn current_center() -> Retained<UNUserNotificationCenter> {
    unsafe { UNUserNotificationCenter::currentNotificationCenter() }
}

struct DelegateIvars {
    sink: InteractionSink,
}

define_class!(
    // SAFETY: NSObject has no subclassing requirements and CenterDelegate does not implement Drop.
    #[unsafe(super(NSObject))]
    #[name = "LocalNotifierCenterDelegate"]
    #[ivars = DelegateIvars]
    struct CenterDelegate;

    unsafe impl NSObjectProtocol for CenterDelegate {}

    unsafe impl UNUserNotificationCenterDelegate for CenterDelegate {
        #[unsafe(method(userNotificationCenter:willPresentNotification:withCompletionHandler:))]
        fn will_present(
            &self,
            _center: &UNUserNotificationCenter,
            _notification: &UNNotification,
            completion_handler: &DynBlock<dyn Fn(UNNotificationPresentationOptions)>,
        ) {
            completion_handler.call((presentation_options(),));
        }

        #[unsafe(method(userNotificationCenter:didReceiveNotificationResponse:withCompletionHandler:))]
        fn did_receive(
            &self,
            _center: &UNUserNotificationCenter,
            response: &UNNotificationResponse,
            completion_handler: &DynBlock<dyn Fn()>,
        ) {
            let (identifier, action) = unsafe {
                let identifier = response.notification().request().identifier().to_string();
                (identifier, invoked_action(&response.actionIdentifier()))
            };
            debug!("Interaction {:?} on {}", action, identifier);
            self.ivars().sink.deliver(identifier, action);
            completion_handler.call(());
        }
    }
);

// SAFETY: the only ivar is an InteractionSink, which is Send + Sync.
unsafe impl Send for CenterDelegate {}
unsafe impl Sync for CenterDelegate {}

impl CenterDelegate {
    fn new(sink: InteractionSink) -> Retained<Self> {
        let this = Self::alloc().set_ivars(DelegateIvars { sink });
        unsafe { msg_send![super(this), init] }
    }
}

fn invoked_action(action_identifier: &NSString) -> InvokedAction {
    let (default_id, dismiss_id) = unsafe {
        (
            UNNotificationDefaultActionIdentifier,
            UNNotificationDismissActionIdentifier,
        )
    };
    if action_identifier.isEqualToString(default_id) {
        InvokedAction::Default
    } else if action_identifier.isEqualToString(dismiss_id) {
        InvokedAction::Dismiss
    } else {
        InvokedAction::Custom(action_identifier.to_string())
    }
}

#[allow(deprecated)]
fn presentation_options() -> UNNotificationPresentationOptions {
    let version = NSProcessInfo::processInfo().operatingSystemVersion();
    let major = u64::try_from(version.majorVersion).unwrap_or(0);
    match Presentation::for_os_major(major) {
        Presentation::BannerListSound => {
            UNNotificationPresentationOptions::Banner
                | UNNotificationPresentationOptions::List
                | UNNotificationPresentationOptions::Sound
        }
        Presentation::AlertSound => {
            UNNotificationPresentationOptions::Alert | UNNotificationPresentationOptions::Sound
        }
    }
}

fn build_content(request: &NativeRequest) -> Retained<UNMutableNotificationContent> {
    unsafe {
        let content = UNMutableNotificationContent::new();
        content.setTitle(&NSString::from_str(&request.title));
        if let Some(subtitle) = &request.subtitle {
            content.setSubtitle(&NSString::from_str(subtitle));
        }
        if let Some(body) = &request.body {
            content.setBody(&NSString::from_str(body));
        }
        if request.sound {
            content.setSound(Some(&UNNotificationSound::defaultSound()));
        } else {
            content.setSound(None);
        }
        if let Some(category) = &request.category {
            content.setCategoryIdentifier(&NSString::from_str(&category.identifier));
        }
        content
    }
}

fn build_category(spec: &CategorySpec) -> Retained<UNNotificationCategory> {
    let actions: Vec<Retained<UNNotificationAction>> = spec
        .actions
        .iter()
        .map(|action| unsafe {
            UNNotificationAction::actionWithIdentifier_title_options(
                &NSString::from_str(&action.identifier),
                &NSString::from_str(&action.title),
                UNNotificationActionOptions::Foreground,
            )
        })
        .collect();
    let actions = NSArray::from_retained_slice(&actions);
    let intents: Retained<NSArray<NSString>> = NSArray::new();

    unsafe {
        UNNotificationCategory::categoryWithIdentifier_actions_intentIdentifiers_options(
            &NSString::from_str(&spec.identifier),
            &actions,
            &intents,
            UNNotificationCategoryOptions::empty(),
        )
    }
}

/// UNUserNotificationCenter-backed service
pub struct MacosService {
    // The center only holds its delegate weakly.
    delegate: OnceLock<Retained<CenterDelegate>>,
}

impl MacosService {
    pub fn new() -> Self {
        Self {
            delegate: OnceLock::new(),
        }
    }
}

impl NotificationService for MacosService {
    fn attach(&self, sink: InteractionSink) {
        let delegate = self.delegate.get_or_init(|| CenterDelegate::new(sink));
        unsafe {
            current_center().setDelegate(Some(ProtocolObject::from_ref(&**delegate)));
        }
    }

    fn request_authorization(&self) {
        let block = RcBlock::new(|settings: NonNull<UNNotificationSettings>| {
            let status = unsafe { settings.as_ref().authorizationStatus() };
            if status != UNAuthorizationStatus::NotDetermined {
                debug!("Notification authorization already determined: {:?}", status);
                return;
            }

            let options = UNAuthorizationOptions::Alert
                | UNAuthorizationOptions::Badge
                | UNAuthorizationOptions::Sound;
            let done = RcBlock::new(|granted: Bool, error: *mut NSError| {
                match unsafe { error.as_ref() } {
                    Some(err) => warn!("Authorization error: {}", err.localizedDescription()),
                    None if granted.as_bool() => info!("Notification authorization granted"),
                    None => info!("Notification authorization denied"),
                }
            });
            unsafe {
                current_center().requestAuthorizationWithOptions_completionHandler(options, &done);
            }
        });

        unsafe {
            current_center().getNotificationSettingsWithCompletionHandler(&block);
        }
    }

    fn register_category(&self, spec: &CategorySpec) {
        let category = build_category(spec);
        let category_id = spec.identifier.clone();

        let block = RcBlock::new(move |existing: NonNull<NSSet<UNNotificationCategory>>| {
            let existing = unsafe { existing.as_ref() };
            let merged = merge_categories(existing.iter(), category.clone(), |c| {
                unsafe { c.identifier() }.to_string()
            });

            let categories = NSSet::from_retained_slice(&merged);
            unsafe {
                current_center().setNotificationCategories(&categories);
            }
            debug!("Registered category {} ({} total)", category_id, merged.len());
        });

        unsafe {
            current_center().getNotificationCategoriesWithCompletionHandler(&block);
        }
    }

    fn submit(&self, request: &NativeRequest, completion: Completion) {
        info!("Submitting notification {} to UNUserNotificationCenter", request.identifier);

        let content = build_content(request);
        let identifier = NSString::from_str(&request.identifier);
        let native = unsafe {
            UNNotificationRequest::requestWithIdentifier_content_trigger(&identifier, &content, None)
        };

        let completion = RefCell::new(Some(completion));
        let block = RcBlock::new(move |error: *mut NSError| {
            if let Some(done) = completion.borrow_mut().take() {
                let outcome = match unsafe { error.as_ref() } {
                    Some(err) => Err(err.localizedDescription().to_string()),
                    None => Ok(()),
                };
                done(outcome);
            }
        });

        unsafe {
            current_center().addNotificationRequest_withCompletionHandler(&native, Some(&block));
        }
    }

    fn remove(&self, identifier: &str) {
        let identifiers = NSArray::from_retained_slice(&[NSString::from_str(identifier)]);
        let center = current_center();
        unsafe {
            center.removeDeliveredNotificationsWithIdentifiers(&identifiers);
            center.removePendingNotificationRequestsWithIdentifiers(&identifiers);
        }
    }
}
