//! Lead intelligence extraction
//!
//! Pulls the enriched fields the data pipeline writes onto master-lead
//! items, lead-type-aware: universal fields always, plus one bundle chosen
//! by the lead's type. Every field degrades to `None` when unpopulated; the
//! workspace front end renders absent values, it never errors on them.

use serde::Serialize;
use tracing::debug;

use crate::fields::{extract_by_label, extract_number, extract_text};
use crate::store::LeadRecord;

/// Field ids for the enriched intelligence fields on the master-lead app.
#[derive(Debug, Clone)]
pub struct IntelligenceFieldIds {
    pub lead_type: u64,
    pub lead_score: u64,
    pub lead_tier: u64,
    pub estimated_property_value: u64,
    pub equity_percentage: u64,
    pub estimated_equity: u64,
    pub year_built: u64,
    pub property_type: u64,
    pub validated_mailing_address: u64,
    pub first_publication_date: u64,
    pub law_firm_name: u64,
    pub owner_name: u64,
    pub owner_phone: u64,
    pub owner_email: u64,
    pub owner_mailing_address: u64,
    pub owner_occupied: u64,
    pub owner_name_secondary: u64,
    pub owner_phone_secondary: u64,
    pub owner_email_secondary: u64,
    // NED listing bundle
    pub auction_date: u64,
    pub balance_due: u64,
    pub opening_bid: u64,
    // Foreclosure auction bundle
    pub auction_platform: u64,
    pub auction_date_platform: u64,
    pub opening_bid_platform: u64,
    pub auction_location: u64,
    pub registration_deadline: u64,
    // Probate/estate bundle
    pub executor_name: u64,
    pub probate_case_number: u64,
    pub probate_filing_date: u64,
    pub estate_value: u64,
    pub decedent_name: u64,
    pub court_jurisdiction: u64,
    // Tax lien bundle
    pub tax_debt_amount: u64,
    pub delinquency_start_date: u64,
    pub redemption_deadline: u64,
    pub lien_type: u64,
    pub tax_delinquency_summary: u64,
    pub delinquent_years_count: u64,
    // Stacked distress signals, universal
    pub active_distress_signals: u64,
    pub distress_signal_count: u64,
    pub multi_signal_lead: u64,
}

impl Default for IntelligenceFieldIds {
    fn default() -> Self {
        IntelligenceFieldIds {
            lead_type: 274896101,
            lead_score: 274896102,
            lead_tier: 274896103,
            estimated_property_value: 274896104,
            equity_percentage: 274896105,
            estimated_equity: 274896106,
            year_built: 274896107,
            property_type: 274896108,
            validated_mailing_address: 274896122,
            first_publication_date: 274896110,
            law_firm_name: 274896111,
            owner_name: 274909271,
            owner_phone: 274909272,
            owner_email: 274909273,
            owner_mailing_address: 274909277,
            owner_occupied: 274909278,
            owner_name_secondary: 274909281,
            owner_phone_secondary: 274909282,
            owner_email_secondary: 274909283,
            auction_date: 274921001,
            balance_due: 274921002,
            opening_bid: 274921003,
            auction_platform: 274921011,
            auction_date_platform: 274921012,
            opening_bid_platform: 274921013,
            auction_location: 274921014,
            registration_deadline: 274921015,
            executor_name: 274921021,
            probate_case_number: 274921022,
            probate_filing_date: 274921023,
            estate_value: 274921024,
            decedent_name: 274921025,
            court_jurisdiction: 274921026,
            tax_debt_amount: 274921031,
            delinquency_start_date: 274921032,
            redemption_deadline: 274921033,
            lien_type: 274921034,
            tax_delinquency_summary: 274921035,
            delinquent_years_count: 274921036,
            active_distress_signals: 274921041,
            distress_signal_count: 274921042,
            multi_signal_lead: 274921043,
        }
    }
}

/// Contact summary the workspace shows in the lead header.
#[derive(Debug, Clone, Serialize)]
pub struct LeadSummary {
    pub record_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_mailing_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_contact_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_type: Option<String>,
}

impl LeadSummary {
    pub fn from_lead(lead: &LeadRecord, ids: &IntelligenceFieldIds) -> Self {
        LeadSummary {
            record_id: lead.id.to_string(),
            owner_name: extract_text(&lead.raw, ids.owner_name),
            owner_phone: extract_text(&lead.raw, ids.owner_phone),
            owner_email: extract_text(&lead.raw, ids.owner_email),
            owner_mailing_address: extract_text(&lead.raw, ids.owner_mailing_address),
            best_contact_number: extract_by_label(&lead.raw, "Best Contact Number"),
            lead_type: extract_text(&lead.raw, ids.lead_type),
        }
    }
}

/// Enriched intelligence for one lead. Universal fields plus the bundle
/// matching the lead type; everything optional.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LeadIntelligence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_property_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equity_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_equity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_built: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validated_mailing_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_publication_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub law_firm_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_occupied: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name_secondary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_phone_secondary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_email_secondary: Option<String>,
    // NED listing bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_due: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_bid: Option<f64>,
    // Foreclosure auction bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_date_platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_bid_platform: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auction_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_deadline: Option<String>,
    // Probate/estate bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probate_case_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probate_filing_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estate_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decedent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_jurisdiction: Option<String>,
    // Tax lien bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_debt_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delinquency_start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redemption_deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lien_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_delinquency_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delinquent_years_count: Option<f64>,
    // Stacked distress signals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_distress_signals: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distress_signal_count: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_signal_lead: Option<String>,
}

impl LeadIntelligence {
    pub fn from_lead(lead: &LeadRecord, ids: &IntelligenceFieldIds) -> Self {
        let item = &lead.raw;
        let lead_type = extract_text(item, ids.lead_type);

        let estimated_property_value = extract_number(item, ids.estimated_property_value);
        let equity_percentage = extract_number(item, ids.equity_percentage);
        let mut estimated_equity = extract_number(item, ids.estimated_equity);

        // Fallback when the enrichment pipeline has not written the equity
        // field: derive it from value and percentage. Kept here because
        // removing it would change output for existing records.
        if estimated_equity.is_none() {
            if let (Some(value), Some(pct)) = (estimated_property_value, equity_percentage) {
                let derived = value * (pct / 100.0);
                debug!(lead = %lead.id, derived, "estimated equity derived from value and percentage");
                estimated_equity = Some(derived);
            }
        }

        let mut intelligence = LeadIntelligence {
            lead_type: lead_type.clone(),
            lead_score: extract_number(item, ids.lead_score),
            lead_tier: extract_text(item, ids.lead_tier),
            estimated_property_value,
            equity_percentage,
            estimated_equity,
            year_built: extract_number(item, ids.year_built),
            property_type: extract_text(item, ids.property_type),
            validated_mailing_address: extract_text(item, ids.validated_mailing_address),
            first_publication_date: extract_text(item, ids.first_publication_date),
            law_firm_name: extract_text(item, ids.law_firm_name),
            owner_occupied: extract_text(item, ids.owner_occupied),
            owner_name_secondary: extract_text(item, ids.owner_name_secondary),
            owner_phone_secondary: extract_text(item, ids.owner_phone_secondary),
            owner_email_secondary: extract_text(item, ids.owner_email_secondary),
            active_distress_signals: extract_text(item, ids.active_distress_signals),
            distress_signal_count: extract_number(item, ids.distress_signal_count),
            multi_signal_lead: extract_text(item, ids.multi_signal_lead),
            ..Default::default()
        };

        match lead_type.as_deref() {
            Some("NED Listing") => {
                intelligence.auction_date = extract_text(item, ids.auction_date);
                intelligence.balance_due = extract_number(item, ids.balance_due);
                intelligence.opening_bid = extract_number(item, ids.opening_bid);
            }
            Some("Foreclosure Auction") => {
                intelligence.auction_platform = extract_text(item, ids.auction_platform);
                intelligence.auction_date_platform =
                    extract_text(item, ids.auction_date_platform);
                intelligence.opening_bid_platform =
                    extract_number(item, ids.opening_bid_platform);
                intelligence.auction_location = extract_text(item, ids.auction_location);
                intelligence.registration_deadline =
                    extract_text(item, ids.registration_deadline);
            }
            Some("Probate/Estate") => {
                intelligence.executor_name = extract_text(item, ids.executor_name);
                intelligence.probate_case_number =
                    extract_text(item, ids.probate_case_number);
                intelligence.probate_filing_date =
                    extract_text(item, ids.probate_filing_date);
                intelligence.estate_value = extract_number(item, ids.estate_value);
                intelligence.decedent_name = extract_text(item, ids.decedent_name);
                intelligence.court_jurisdiction =
                    extract_text(item, ids.court_jurisdiction);
            }
            Some("Tax Lien") => {
                intelligence.tax_debt_amount = extract_number(item, ids.tax_debt_amount);
                intelligence.delinquency_start_date =
                    extract_text(item, ids.delinquency_start_date);
                intelligence.redemption_deadline =
                    extract_text(item, ids.redemption_deadline);
                intelligence.lien_type = extract_text(item, ids.lien_type);
                intelligence.tax_delinquency_summary =
                    extract_text(item, ids.tax_delinquency_summary);
                intelligence.delinquent_years_count =
                    extract_number(item, ids.delinquent_years_count);
            }
            Some(other) => {
                debug!(lead_type = other, "no bundle for lead type");
            }
            None => {}
        }

        intelligence
    }
}
