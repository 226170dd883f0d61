use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::domains::directory::{
    EventInfo, MeetingRecord, SellerRecord, TravelPlan, UserProfile, UserRole,
};
use crate::intent::Intent;
use crate::interfaces::directory::DirectorySource;

/// State of one context section after assembly. `Unavailable` renders
/// as "data unavailable" so the model never hallucinates over a
/// silently missing slice.
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Loaded(T),
    Skipped,
    Unavailable,
}

impl<T> Section<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Section::Loaded(_))
    }

    pub fn as_loaded(&self) -> Option<&T> {
        match self {
            Section::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

/// Transient, per-request bundle grounding one provider call. Owned by
/// a single orchestration call and dropped with the reply.
#[derive(Debug, Clone)]
pub struct ContextSnapshot {
    pub user_id: String,
    pub role: UserRole,
    pub intent: Intent,
    pub profile: Section<UserProfile>,
    pub event: Section<EventInfo>,
    pub meetings: Section<Vec<MeetingRecord>>,
    pub travel: Section<TravelPlan>,
    pub sellers: Section<Vec<SellerRecord>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slice {
    Event,
    Meetings,
    Travel,
    Sellers,
}

/// Flat (role, intent) routing table. Profile is always loaded as the
/// generic baseline and is not listed here.
fn slices_for(role: UserRole, intent: Intent) -> &'static [Slice] {
    match (role, intent) {
        (_, Intent::EventInfo) => &[Slice::Event],
        (UserRole::Buyer, Intent::MeetingsBuyer) => &[Slice::Meetings],
        (UserRole::Seller, Intent::MeetingsSeller) => &[Slice::Meetings],
        (_, Intent::Travel) => &[Slice::Travel],
        (_, Intent::SellerSearch) => &[Slice::Sellers],
        // Profile data is already the baseline; help and freeform get
        // nothing extra. Mismatched role/meeting combinations cannot
        // come out of the classifier and load nothing.
        _ => &[],
    }
}

static COMPANY_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"([A-Z][a-z]+(?:\s+[A-Z][a-z]+)+(?:\s+(?:Private|Pvt\.?|Limited|Ltd\.?|Inc\.?|Corporation|Corp\.?))?)",
    )
    .expect("company name pattern is valid")
});

/// Capitalized multi-word phrases, used as the seller-search query.
/// Falls back to the whole message when nothing matches.
fn seller_query(message: &str) -> String {
    COMPANY_NAME
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| message.trim().to_string())
}

pub struct ContextAssembler {
    directory: Arc<dyn DirectorySource>,
    seller_search_limit: usize,
}

impl ContextAssembler {
    pub fn new(directory: Arc<dyn DirectorySource>, seller_search_limit: usize) -> Self {
        Self {
            directory,
            seller_search_limit,
        }
    }

    /// Gathers the role-scoped minimal slice for the classified intent.
    /// Never fails: a failing source marks its section `Unavailable`
    /// and the turn proceeds.
    pub async fn assemble(
        &self,
        user_id: &str,
        role: UserRole,
        intent: Intent,
        message: &str,
    ) -> ContextSnapshot {
        let mut snapshot = ContextSnapshot {
            user_id: user_id.to_string(),
            role,
            intent,
            profile: Section::Skipped,
            event: Section::Skipped,
            meetings: Section::Skipped,
            travel: Section::Skipped,
            sellers: Section::Skipped,
        };

        snapshot.profile = match self.directory.profile(user_id).await {
            Ok(Some(profile)) => Section::Loaded(profile),
            Ok(None) => Section::Skipped,
            Err(err) => {
                warn!(user_id, %err, "profile source unavailable, degrading");
                Section::Unavailable
            }
        };

        for slice in slices_for(role, intent) {
            match slice {
                Slice::Event => {
                    snapshot.event = match self.directory.event_info().await {
                        Ok(info) => Section::Loaded(info),
                        Err(err) => {
                            warn!(%err, "event info source unavailable, degrading");
                            Section::Unavailable
                        }
                    };
                }
                Slice::Meetings => {
                    snapshot.meetings = match self.directory.meetings(user_id, role).await {
                        Ok(meetings) => Section::Loaded(meetings),
                        Err(err) => {
                            warn!(user_id, %err, "meeting source unavailable, degrading");
                            Section::Unavailable
                        }
                    };
                }
                Slice::Travel => {
                    snapshot.travel = match self.directory.travel_plan(user_id).await {
                        Ok(Some(plan)) => Section::Loaded(plan),
                        Ok(None) => Section::Skipped,
                        Err(err) => {
                            warn!(user_id, %err, "travel source unavailable, degrading");
                            Section::Unavailable
                        }
                    };
                }
                Slice::Sellers => {
                    let query = seller_query(message);
                    snapshot.sellers = match self
                        .directory
                        .search_sellers(&query, self.seller_search_limit)
                        .await
                    {
                        Ok(sellers) => Section::Loaded(sellers),
                        Err(err) => {
                            warn!(%err, "seller directory unavailable, degrading");
                            Section::Unavailable
                        }
                    };
                }
            }
        }

        snapshot
    }
}

impl ContextSnapshot {
    /// Renders the snapshot into the "User Context" block of the
    /// prompt. Unavailable sections are called out explicitly.
    pub fn render(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("- User Role: {}", self.role.as_str()));

        match &self.profile {
            Section::Loaded(profile) => {
                parts.push(format!("- Name: {}", profile.name));
                if let Some(organization) = &profile.organization {
                    parts.push(format!("- Organization: {organization}"));
                }
            }
            Section::Unavailable => parts.push("- Profile: data unavailable".to_string()),
            Section::Skipped => {}
        }

        match &self.event {
            Section::Loaded(event) => {
                parts.push("\n**Event Information:**".to_string());
                parts.push(format!("- Name: {}", event.name));
                parts.push(format!(
                    "- Dates: {} to {}",
                    event.start_date, event.end_date
                ));
                parts.push(format!("- Venue: {}", event.venue));
            }
            Section::Unavailable => {
                parts.push("\n**Event Information:** data unavailable".to_string())
            }
            Section::Skipped => {}
        }

        match &self.meetings {
            Section::Loaded(meetings) if meetings.is_empty() => {
                parts.push("\n**Meeting Schedule:** NO meetings scheduled".to_string());
            }
            Section::Loaded(meetings) => {
                parts.push(format!("\n**Meeting Schedule ({} total):**", meetings.len()));
                for meeting in meetings.iter().take(5) {
                    parts.push(format!(
                        "  • Meeting #{}: {} — status {}, date {}, time {}",
                        meeting.id,
                        meeting.partner_name,
                        meeting.status.as_str(),
                        meeting.date.as_deref().unwrap_or("not scheduled"),
                        meeting.time.as_deref().unwrap_or("TBD"),
                    ));
                }
            }
            Section::Unavailable => {
                parts.push("\n**Meeting Schedule:** data unavailable".to_string())
            }
            Section::Skipped => {}
        }

        match &self.travel {
            Section::Loaded(plan) => {
                parts.push("\n**Travel Plan:**".to_string());
                if let Some(outbound) = &plan.outbound {
                    parts.push(format!(
                        "- Outbound: {} from {} to {}, departing {}",
                        outbound.carrier,
                        outbound.departure_location,
                        outbound.arrival_location,
                        outbound.departure_datetime.as_deref().unwrap_or("TBD"),
                    ));
                }
                if let Some(return_leg) = &plan.return_leg {
                    parts.push(format!(
                        "- Return: {} from {} to {}, departing {}",
                        return_leg.carrier,
                        return_leg.departure_location,
                        return_leg.arrival_location,
                        return_leg.departure_datetime.as_deref().unwrap_or("TBD"),
                    ));
                }
                if let Some(accommodation) = &plan.accommodation {
                    parts.push(format!(
                        "- Accommodation: {} (check-in {}, check-out {})",
                        accommodation.property_name,
                        accommodation.check_in.as_deref().unwrap_or("TBD"),
                        accommodation.check_out.as_deref().unwrap_or("TBD"),
                    ));
                }
                if plan.outbound.is_none()
                    && plan.return_leg.is_none()
                    && plan.accommodation.is_none()
                {
                    parts.push("- No travel arrangements on file".to_string());
                }
            }
            Section::Unavailable => parts.push("\n**Travel Plan:** data unavailable".to_string()),
            Section::Skipped => {}
        }

        match &self.sellers {
            Section::Loaded(sellers) if sellers.is_empty() => {
                parts.push("\n**Seller Search:** no matching sellers".to_string());
            }
            Section::Loaded(sellers) => {
                parts.push(format!("\n**Seller Search ({} matches):**", sellers.len()));
                for seller in sellers {
                    let mut line = format!("  • {}", seller.business_name);
                    if let Some(seller_type) = &seller.seller_type {
                        line.push_str(&format!(" ({seller_type})"));
                    }
                    if let Some(description) = &seller.description {
                        line.push_str(&format!(" — {description}"));
                    }
                    parts.push(line);
                }
            }
            Section::Unavailable => {
                parts.push("\n**Seller Search:** data unavailable".to_string())
            }
            Section::Skipped => {}
        }

        parts.join("\n")
    }
}
