#![allow(dead_code)]

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use expo_concierge::domains::directory::{
    EventInfo, MeetingRecord, MeetingStatus, SellerRecord, TravelPlan, UserProfile, UserRole,
};
use expo_concierge::error::ConciergeError;
use expo_concierge::interfaces::directory::DirectorySource;
use expo_concierge::interfaces::providers::LlmProvider;

/// Scripted provider: pops one queued outcome per `complete` call and
/// records every prompt it saw.
pub struct QueueLlmProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl QueueLlmProvider {
    pub fn new(replies: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for QueueLlmProvider {
    fn name(&self) -> &str {
        "queue"
    }

    fn model(&self) -> &str {
        "queue-model"
    }

    async fn complete(
        &self,
        prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> expo_concierge::error::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(ConciergeError::Http(message)),
            None => Err(ConciergeError::Http("queue exhausted".to_string())),
        }
    }
}

/// Canned directory with per-user data. `failing` makes every
/// identity-scoped lookup error, to exercise degradation.
#[derive(Default)]
pub struct StubDirectory {
    pub event: Option<EventInfo>,
    pub profiles: HashMap<String, UserProfile>,
    pub meetings: HashMap<String, Vec<MeetingRecord>>,
    pub travel: HashMap<String, TravelPlan>,
    pub sellers: Vec<SellerRecord>,
    pub failing: bool,
}

impl StubDirectory {
    pub fn with_event() -> Self {
        Self {
            event: Some(EventInfo {
                name: "Harvest Expo".to_string(),
                venue: "North Hall".to_string(),
                start_date: "2026-01-10".to_string(),
                end_date: "2026-01-12".to_string(),
            }),
            ..Self::default()
        }
    }

    pub fn with_profile(mut self, user_id: &str, name: &str) -> Self {
        self.profiles.insert(
            user_id.to_string(),
            UserProfile {
                user_id: user_id.to_string(),
                name: name.to_string(),
                organization: None,
                email: None,
            },
        );
        self
    }

    pub fn with_meeting(mut self, user_id: &str, partner: &str) -> Self {
        let list = self.meetings.entry(user_id.to_string()).or_default();
        list.push(MeetingRecord {
            id: list.len() as i64 + 1,
            partner_name: partner.to_string(),
            status: MeetingStatus::Accepted,
            date: Some("2026-01-11".to_string()),
            time: Some("10:00".to_string()),
            notes: None,
        });
        self
    }
}

#[async_trait]
impl DirectorySource for StubDirectory {
    async fn event_info(&self) -> expo_concierge::error::Result<EventInfo> {
        if self.failing {
            return Err(ConciergeError::DataSourceUnavailable("event".to_string()));
        }
        self.event
            .clone()
            .ok_or_else(|| ConciergeError::DataSourceUnavailable("event".to_string()))
    }

    async fn profile(&self, user_id: &str) -> expo_concierge::error::Result<Option<UserProfile>> {
        if self.failing {
            return Err(ConciergeError::DataSourceUnavailable("profile".to_string()));
        }
        Ok(self.profiles.get(user_id).cloned())
    }

    async fn meetings(
        &self,
        user_id: &str,
        _role: UserRole,
    ) -> expo_concierge::error::Result<Vec<MeetingRecord>> {
        if self.failing {
            return Err(ConciergeError::DataSourceUnavailable("meetings".to_string()));
        }
        Ok(self.meetings.get(user_id).cloned().unwrap_or_default())
    }

    async fn travel_plan(&self, user_id: &str) -> expo_concierge::error::Result<Option<TravelPlan>> {
        if self.failing {
            return Err(ConciergeError::DataSourceUnavailable("travel".to_string()));
        }
        Ok(self.travel.get(user_id).cloned())
    }

    async fn search_sellers(
        &self,
        query: &str,
        limit: usize,
    ) -> expo_concierge::error::Result<Vec<SellerRecord>> {
        if self.failing {
            return Err(ConciergeError::DataSourceUnavailable("sellers".to_string()));
        }
        let lowered = query.to_lowercase();
        Ok(self
            .sellers
            .iter()
            .filter(|s| s.business_name.to_lowercase().contains(&lowered))
            .take(limit)
            .cloned()
            .collect())
    }
}
