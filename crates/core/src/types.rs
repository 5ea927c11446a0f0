use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of marketing interaction a touchpoint represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchpointType {
    PaidSearch,
    OrganicSearch,
    SocialMedia,
    Email,
    Direct,
    Referral,
    DisplayAd,
    Affiliate,
    Offline,
    Retargeting,
}

impl TouchpointType {
    /// Human-readable display name for this touchpoint type.
    pub fn display_name(&self) -> &'static str {
        match self {
            TouchpointType::PaidSearch => "Paid Search",
            TouchpointType::OrganicSearch => "Organic Search",
            TouchpointType::SocialMedia => "Social Media",
            TouchpointType::Email => "Email",
            TouchpointType::Direct => "Direct",
            TouchpointType::Referral => "Referral",
            TouchpointType::DisplayAd => "Display Ad",
            TouchpointType::Affiliate => "Affiliate",
            TouchpointType::Offline => "Offline",
            TouchpointType::Retargeting => "Retargeting",
        }
    }

    /// Stable snake_case identifier, used as a map key in revenue breakdowns.
    pub fn as_str(&self) -> &'static str {
        match self {
            TouchpointType::PaidSearch => "paid_search",
            TouchpointType::OrganicSearch => "organic_search",
            TouchpointType::SocialMedia => "social_media",
            TouchpointType::Email => "email",
            TouchpointType::Direct => "direct",
            TouchpointType::Referral => "referral",
            TouchpointType::DisplayAd => "display_ad",
            TouchpointType::Affiliate => "affiliate",
            TouchpointType::Offline => "offline",
            TouchpointType::Retargeting => "retargeting",
        }
    }

    /// Classify a raw event's source/medium pair into a touchpoint type.
    ///
    /// Unrecognized combinations default to `Direct`.
    pub fn from_source_medium(source: &str, medium: &str) -> Self {
        let source = source.to_ascii_lowercase();
        let medium = medium.to_ascii_lowercase();

        let search_engine = matches!(source.as_str(), "google" | "bing" | "yahoo" | "duckduckgo");
        let social = matches!(
            source.as_str(),
            "facebook" | "twitter" | "instagram" | "linkedin" | "tiktok" | "pinterest"
        );

        if search_engine && matches!(medium.as_str(), "cpc" | "ppc" | "paid") {
            TouchpointType::PaidSearch
        } else if search_engine {
            TouchpointType::OrganicSearch
        } else if social {
            TouchpointType::SocialMedia
        } else if medium == "email" {
            TouchpointType::Email
        } else if medium == "referral" {
            TouchpointType::Referral
        } else if matches!(medium.as_str(), "display" | "banner" | "cpm") {
            TouchpointType::DisplayAd
        } else if medium == "affiliate" {
            TouchpointType::Affiliate
        } else if matches!(medium.as_str(), "retargeting" | "remarketing") {
            TouchpointType::Retargeting
        } else if matches!(medium.as_str(), "offline" | "print" | "tv" | "radio") {
            TouchpointType::Offline
        } else {
            TouchpointType::Direct
        }
    }
}

/// One customer interaction recorded prior to a conversion. Created by the
/// external event platform and immutable once read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Touchpoint {
    pub id: Uuid,
    pub customer_id: String,
    pub touchpoint_type: TouchpointType,
    pub channel: Option<String>,
    pub campaign_id: Option<String>,
    pub campaign_name: Option<String>,
    pub source: Option<String>,
    pub medium: Option<String>,
    pub content: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Touchpoint {
    /// The channel label for reporting: explicit channel when present,
    /// otherwise the touchpoint type identifier.
    pub fn channel_label(&self) -> String {
        self.channel
            .clone()
            .unwrap_or_else(|| self.touchpoint_type.as_str().to_string())
    }
}

/// A revenue-generating event to be attributed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionData {
    pub conversion_id: String,
    pub conversion_type: String,
    pub value: f64,
    pub conversion_date: DateTime<Utc>,
}

/// Per-touchpoint share of one conversion's revenue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TouchpointAttribution {
    pub id: Uuid,
    pub attribution_id: Uuid,
    pub touchpoint_id: Uuid,
    pub touchpoint_type: TouchpointType,
    pub channel: Option<String>,
    pub campaign_id: Option<String>,
    pub attributed_revenue: f64,
    /// Share of conversion value, 0–100.
    pub attribution_percentage: f64,
    /// Share of conversion value, 0–1.
    pub attribution_weight: f64,
    /// 1-based chronological position in the journey.
    pub position_in_journey: u32,
    pub days_before_conversion: u32,
}

impl TouchpointAttribution {
    pub fn channel_label(&self) -> String {
        self.channel
            .clone()
            .unwrap_or_else(|| self.touchpoint_type.as_str().to_string())
    }
}

/// How convoluted a journey was, by touchpoint count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyComplexity {
    Simple,
    Moderate,
    Complex,
}

impl JourneyComplexity {
    pub fn from_touchpoint_count(count: usize) -> Self {
        match count {
            0..=2 => JourneyComplexity::Simple,
            3..=5 => JourneyComplexity::Moderate,
            _ => JourneyComplexity::Complex,
        }
    }
}

/// Shape of the journey that led to one conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneySummary {
    pub touchpoint_count: usize,
    /// Days between the oldest touchpoint and the conversion.
    pub journey_length_days: u32,
    pub unique_channels: usize,
    pub unique_campaigns: usize,
    /// Channel labels in chronological order.
    pub channel_sequence: Vec<String>,
    pub avg_days_between_touchpoints: f64,
    pub complexity: JourneyComplexity,
}

/// The single touchpoint that earned the largest share of a conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryAttribution {
    pub touchpoint_id: Uuid,
    pub touchpoint_type: TouchpointType,
    pub channel: Option<String>,
    pub attributed_revenue: f64,
    pub position_in_journey: u32,
}

/// Immutable output of one attribution calculation: the parent record with
/// its per-touchpoint children embedded. One exists per
/// (customer, conversion, model) triple; results from different models for
/// the same conversion coexist for comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueAttribution {
    pub id: Uuid,
    pub customer_id: String,
    pub conversion_id: String,
    pub conversion_type: String,
    pub conversion_value: f64,
    pub conversion_date: DateTime<Utc>,
    pub model_key: String,
    pub touchpoints_analyzed: usize,
    pub attribution_window_days: u32,
    /// Attributed revenue keyed by touchpoint type identifier.
    pub revenue_breakdown: HashMap<String, f64>,
    pub primary_attribution: Option<PrimaryAttribution>,
    pub journey_summary: JourneySummary,
    pub confidence: f64,
    pub touchpoint_attributions: Vec<TouchpointAttribution>,
    pub computed_at: DateTime<Utc>,
}

impl RevenueAttribution {
    /// Idempotency key shared with the recorder's duplicate check.
    pub fn idempotency_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.customer_id, self.conversion_id, self.model_key
        )
    }
}
