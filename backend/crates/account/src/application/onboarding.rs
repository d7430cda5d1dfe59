//! Onboarding Content
//!
//! Static instructions shown to newly registered users, telling them how to
//! complete their profile.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Link {
    pub label: &'static str,
    pub href: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Step {
    pub title: &'static str,
    pub icon: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingView {
    pub title: &'static str,
    pub intro: &'static str,
    pub terms_of_service: Link,
    pub privacy_policy: Link,
    pub steps: [Step; 4],
}

pub const ONBOARDING: OnboardingView = OnboardingView {
    title: "Welcome to Ambulánc!",
    intro: "Thank you for joining us! Before you could use all of the functions of our system we would like to ask you to take part in a short identification process. \
            It is only required in order to protect our users and other individuals. To start the verification please follow the instructions below. \
            The data you provide is only stored and processed in compliance with our Terms of Service and Privacy Policy.",
    terms_of_service: Link {
        label: "Terms of Service",
        href: "/terms-of-service",
    },
    privacy_policy: Link {
        label: "Privacy Policy",
        href: "/privacy-policy",
    },
    steps: [
        Step {
            title: "Step One",
            icon: "book-open",
            text: "Please click on the round icon at the right hand side of the top menubar. Now a drop-down menu will appear.",
        },
        Step {
            title: "Step Two",
            icon: "camera",
            text: "In the dropdown menu please select the \"Profile\" menu-item and click on it.",
        },
        Step {
            title: "Step Three",
            icon: "photograph",
            text: "On the next page please provide all of the required data and click \"SAVE\" button. \
                   Now you will be automatically logged out and being redirected to the login page. \
                   Please login with your previously provided credentials.",
        },
        Step {
            title: "Step Four",
            icon: "lock-closed",
            text: "After login, you will see your personal dashboard. By this time you will be able to use all of the provided functions of the application.",
        },
    ],
};

/// Onboarding use case
pub struct OnboardingUseCase;

impl OnboardingUseCase {
    pub fn execute() -> &'static OnboardingView {
        &ONBOARDING
    }
}
