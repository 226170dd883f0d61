use serde::{Deserialize, Serialize};

/// Caller role as resolved by the authentication layer upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Buyer,
    Seller,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Buyer => "buyer",
            UserRole::Seller => "seller",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub name: String,
    pub organization: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
    Cancelled,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Pending => "pending",
            MeetingStatus::Accepted => "accepted",
            MeetingStatus::Rejected => "rejected",
            MeetingStatus::Completed => "completed",
            MeetingStatus::Cancelled => "cancelled",
        }
    }
}

/// A meeting as seen by one participant. `partner_name` is the other
/// side's display name (buyer organization or seller business name).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub id: i64,
    pub partner_name: String,
    pub status: MeetingStatus,
    pub date: Option<String>,
    pub time: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelLeg {
    pub carrier: String,
    pub number: Option<String>,
    pub departure_location: String,
    pub departure_datetime: Option<String>,
    pub arrival_location: String,
    pub arrival_datetime: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accommodation {
    pub property_name: String,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub room_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelPlan {
    pub outbound: Option<TravelLeg>,
    pub return_leg: Option<TravelLeg>,
    pub accommodation: Option<Accommodation>,
}

/// Public directory entry for a seller. Private financials never
/// appear here; this is the whole surface the assistant may see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerRecord {
    pub id: i64,
    pub business_name: String,
    pub description: Option<String>,
    pub seller_type: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventInfo {
    pub name: String,
    pub venue: String,
    pub start_date: String,
    pub end_date: String,
}
