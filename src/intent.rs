use serde::Serialize;

use crate::domains::directory::UserRole;

/// Closed set of message purposes. Drives which context slices get
/// loaded before the provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    EventInfo,
    MeetingsBuyer,
    MeetingsSeller,
    Travel,
    SellerSearch,
    Profile,
    Help,
    Freeform,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::EventInfo => "event-info",
            Intent::MeetingsBuyer => "meetings-buyer",
            Intent::MeetingsSeller => "meetings-seller",
            Intent::Travel => "travel",
            Intent::SellerSearch => "seller-search",
            Intent::Profile => "profile",
            Intent::Help => "help",
            Intent::Freeform => "freeform",
        }
    }
}

/// Keyword families checked in priority order; the first hit wins.
/// A message mentioning both meetings and travel therefore classifies
/// as meetings. Matching is lowercase substring, so rules stay cheap
/// and total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Help,
    Meetings,
    Travel,
    SellerSearch,
    Profile,
    EventInfo,
}

const RULES: &[(Topic, &[&str])] = &[
    (
        Topic::Help,
        &["help", "what can you do", "how do i", "how does this work"],
    ),
    (
        Topic::Meetings,
        &["meeting", "appointment", "time slot", "slots", "b2b"],
    ),
    (
        Topic::Travel,
        &[
            "travel",
            "flight",
            "train",
            "hotel",
            "accommodation",
            "pickup",
            "drop-off",
            "check-in",
            "check in",
            "transport",
        ],
    ),
    (
        Topic::SellerSearch,
        &["seller", "exhibitor", "vendor", "directory", "stall"],
    ),
    (
        Topic::Profile,
        &["profile", "my account", "my details", "my registration", "my email"],
    ),
    (
        Topic::EventInfo,
        &["event", "venue", "schedule", "agenda", "dates", "when does", "where is"],
    ),
];

/// Maps a raw utterance to an intent. Total: anything unmatched is
/// `Freeform`. The caller's role resolves the shared meetings
/// vocabulary into the buyer or seller variant.
pub fn classify(text: &str, role: UserRole) -> Intent {
    let lowered = text.to_lowercase();
    for (topic, keywords) in RULES {
        if keywords.iter().any(|kw| lowered.contains(kw)) {
            return match topic {
                Topic::Help => Intent::Help,
                Topic::Meetings => match role {
                    UserRole::Buyer => Intent::MeetingsBuyer,
                    UserRole::Seller => Intent::MeetingsSeller,
                },
                Topic::Travel => Intent::Travel,
                Topic::SellerSearch => Intent::SellerSearch,
                Topic::Profile => Intent::Profile,
                Topic::EventInfo => Intent::EventInfo,
            };
        }
    }
    Intent::Freeform
}
