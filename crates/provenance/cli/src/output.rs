//! Output formatting utilities

use chrono::{DateTime, Utc};
use colored::*;
use provenance_types::{
    shorten_address, Address, ClaimStatus, ClaimSummary, EventType, NormalizedLifecycleEvent,
    OwnedProduct,
};
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::error::CliResult;

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(data: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Print rows as a table, or a dimmed notice when there are none.
pub fn print_table<T: Tabled>(rows: Vec<T>, empty: &str) {
    if rows.is_empty() {
        println!("{}", empty.dimmed());
    } else {
        println!("{}", Table::new(rows));
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

pub fn format_timestamp(seconds: u64) -> String {
    i64::try_from(seconds)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|time| time.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| seconds.to_string())
}

pub fn format_address(address: Option<Address>) -> String {
    address
        .map(|address| shorten_address(&address, 4))
        .unwrap_or_else(|| "-".to_string())
}

pub fn colorize_status(status: ClaimStatus) -> String {
    match status {
        ClaimStatus::Approved => status.as_str().green().to_string(),
        ClaimStatus::Rejected => status.as_str().red().to_string(),
        ClaimStatus::Pending => status.as_str().yellow().to_string(),
    }
}

fn event_icon(event_type: EventType) -> &'static str {
    match event_type {
        EventType::Manufacture => "🏭",
        EventType::Transfer => "🔄",
        EventType::WarrantyClaim => "🛡",
        EventType::Service => "🔧",
        EventType::WarrantyActivated => "✅",
    }
}

#[derive(Tabled)]
pub struct EventRow {
    #[tabled(rename = "When")]
    pub when: String,
    #[tabled(rename = "Event")]
    pub event: String,
    #[tabled(rename = "Description")]
    pub description: String,
    #[tabled(rename = "From")]
    pub from: String,
    #[tabled(rename = "To")]
    pub to: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

impl From<&NormalizedLifecycleEvent> for EventRow {
    fn from(event: &NormalizedLifecycleEvent) -> Self {
        Self {
            when: format_timestamp(event.timestamp),
            event: format!("{} {}", event_icon(event.event_type), event.event_type),
            description: event.description.clone(),
            from: format_address(event.from),
            to: format_address(event.to),
            status: event.status.map(colorize_status).unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
pub struct ProductRow {
    #[tabled(rename = "ID")]
    pub id: u64,
    #[tabled(rename = "Serial")]
    pub serial: String,
    #[tabled(rename = "Model")]
    pub model: String,
    #[tabled(rename = "Claims")]
    pub claims: String,
}

impl From<&OwnedProduct> for ProductRow {
    fn from(product: &OwnedProduct) -> Self {
        Self {
            id: product.product_id.0,
            serial: product.details.serial_number.clone(),
            model: product.details.model.clone(),
            claims: format!(
                "{}/{}",
                product.details.claim_count, product.details.claim_limit
            ),
        }
    }
}

#[derive(Tabled)]
pub struct ClaimRow {
    #[tabled(rename = "Claim")]
    pub claim: u64,
    #[tabled(rename = "Product")]
    pub product: u64,
    #[tabled(rename = "Model")]
    pub model: String,
    #[tabled(rename = "Issue")]
    pub issue: String,
    #[tabled(rename = "Submitted")]
    pub submitted: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

impl From<&ClaimSummary> for ClaimRow {
    fn from(claim: &ClaimSummary) -> Self {
        let status = if claim.processed {
            ClaimStatus::from_approval(claim.approved)
        } else {
            ClaimStatus::Pending
        };
        Self {
            claim: claim.claim_id.0,
            product: claim.product_id.0,
            model: claim.model.clone(),
            issue: claim.issue.clone(),
            submitted: format_timestamp(claim.submitted_at),
            status: colorize_status(status),
        }
    }
}
