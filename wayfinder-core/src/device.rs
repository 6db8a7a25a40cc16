//! Client capability detection from a user agent string.
//!
//! The acquisition state machine only needs two things from this module: a
//! "prefer a fast first fix" hint for mobile clients and the remediation text
//! shown when location permission is denied.

/// Operating system family of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OsFamily {
    /// Android phones and tablets.
    Android,
    /// iPhone, iPad and iPod.
    Ios,
    /// Anything else.
    #[default]
    Other,
}

/// Browser family of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientFamily {
    /// Safari (and WebKit shells that do not claim Chrome).
    Safari,
    /// Chrome and Chromium derivatives.
    Chrome,
    /// Firefox.
    Firefox,
    /// Anything else.
    #[default]
    Other,
}

/// What the engine knows about the client it runs in.
///
/// # Examples
///
/// ```
/// use wayfinder_core::{ClientFamily, ClientProfile, OsFamily};
///
/// let profile = ClientProfile::from_user_agent(
///     "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 \
///      (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
/// );
/// assert_eq!(profile.os, OsFamily::Ios);
/// assert_eq!(profile.client, ClientFamily::Safari);
/// assert!(profile.is_mobile);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClientProfile {
    /// Detected operating system.
    pub os: OsFamily,
    /// Detected browser.
    pub client: ClientFamily,
    /// Whether the client looks like a phone or tablet.
    pub is_mobile: bool,
}

impl ClientProfile {
    /// Classify a user agent string.
    #[must_use]
    pub fn from_user_agent(user_agent: &str) -> Self {
        let lowered = user_agent.to_ascii_lowercase();
        let os = if lowered.contains("android") {
            OsFamily::Android
        } else if ["iPad", "iPhone", "iPod"]
            .iter()
            .any(|device| user_agent.contains(device))
        {
            OsFamily::Ios
        } else {
            OsFamily::Other
        };

        let client = if user_agent.contains("Safari") && !user_agent.contains("Chrome") {
            ClientFamily::Safari
        } else if user_agent.contains("Chrome") {
            ClientFamily::Chrome
        } else if user_agent.contains("Firefox") {
            ClientFamily::Firefox
        } else {
            ClientFamily::Other
        };

        let is_mobile = user_agent.contains("Mobi") || lowered.contains("android");

        Self {
            os,
            client,
            is_mobile,
        }
    }

    /// Steps the user can take to re-enable location access.
    #[must_use]
    pub const fn permission_help(&self) -> &'static str {
        match (self.os, self.client) {
            (OsFamily::Ios, ClientFamily::Safari) => {
                "On iOS, go to Settings > Safari > Privacy & Security > Location Services and ensure Safari is allowed to access your location."
            }
            (OsFamily::Ios, _) => {
                "On iOS, go to Settings > Privacy & Security > Location Services and ensure your browser is allowed to access your location."
            }
            (OsFamily::Android, _) => {
                "On Android, go to Settings > Location > App permissions > Browser (or Chrome) and ensure location access is enabled."
            }
            (OsFamily::Other, _) => {
                "Please ensure location services are enabled for your browser in your device settings."
            }
        }
    }
}
