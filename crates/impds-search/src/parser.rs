//! Deterministic parser for the portal's two-table HTML payload.
//!
//! The portal answers a search with one results table (member rows) and one
//! supplemental table (label/value flags shared by the whole response),
//! both carrying the same styling signature. Rows are grouped by ration
//! card number in first-seen order.

use crate::error::ParseError;
use impds_core::RationCardNo;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Styling signature both result tables carry.
const TABLE_SELECTOR: &str = "table.table-striped.table-bordered.table-hover";

/// Minimum cell count for a member row to be extracted.
const MIN_MEMBER_CELLS: usize = 8;

/// FPS (Fair Price Shop) category reported by the supplemental table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FpsCategory {
    /// FPS transacts online.
    #[serde(rename = "Online FPS")]
    OnlineFps,
    /// FPS transacts offline.
    #[serde(rename = "Offline FPS")]
    OfflineFps,
    /// Label absent from the supplemental table.
    #[default]
    Unknown,
}

/// Supplemental duplicate-check flags attached to every group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalInfo {
    /// FPS category of the beneficiary's shop.
    pub fps_category: FpsCategory,
    /// Whether IMPDS transactions are allowed.
    pub impds_transaction_allowed: bool,
    /// Whether the beneficiary exists in the central repository.
    pub exists_in_central_repository: bool,
    /// Whether the identifier is flagged as a duplicate beneficiary.
    pub duplicate_aadhaar_beneficiary: bool,
}

/// A single member row of a ration card group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    /// Serial number as printed in the table; 0 when unparseable.
    pub s_no: u32,
    /// Portal member identifier.
    pub member_id: String,
    /// Member name.
    pub member_name: String,
    /// Free-form remark; `None` when the cell is empty.
    pub remark: Option<String>,
}

/// A ration card group: card-level fields plus its member rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RationCardRecord {
    /// State the card is registered in.
    pub state_name: String,
    /// District the card is registered in.
    pub district_name: String,
    /// Grouping key, unique within one response.
    pub ration_card_no: RationCardNo,
    /// Scheme the card belongs to.
    pub scheme_name: String,
    /// Member rows, in table order.
    pub members: Vec<MemberRecord>,
    /// Supplemental flags shared across the response.
    pub additional_info: AdditionalInfo,
}

/// Parse the portal's search response into grouped ration card records.
///
/// # Errors
/// - [`ParseError::NoValidData`] if fewer than two tables match the
///   styling signature.
/// - [`ParseError::NoRecords`] if the results table body has zero rows.
pub fn parse_search_results(html: &str) -> Result<Vec<RationCardRecord>, ParseError> {
    let document = Html::parse_document(html);

    let table_selector = Selector::parse(TABLE_SELECTOR).expect("valid table selector");
    let row_selector = Selector::parse("tbody tr").expect("valid row selector");
    let cell_selector = Selector::parse("td").expect("valid cell selector");

    let tables: Vec<ElementRef> = document.select(&table_selector).collect();
    if tables.len() < 2 {
        return Err(ParseError::NoValidData);
    }

    let rows: Vec<ElementRef> = tables[0].select(&row_selector).collect();
    if rows.is_empty() {
        return Err(ParseError::NoRecords);
    }

    // One supplemental table per response, shared by every group
    let additional_info = parse_additional_info(tables[1], &row_selector, &cell_selector);

    let mut order: Vec<RationCardNo> = Vec::new();
    let mut groups: HashMap<RationCardNo, RationCardRecord> = HashMap::new();

    for row in rows {
        let cells: Vec<String> = row.select(&cell_selector).map(cell_text).collect();
        if cells.len() < MIN_MEMBER_CELLS {
            continue;
        }

        let card_no = RationCardNo::new(cells[3].as_str());

        let group = groups.entry(card_no.clone()).or_insert_with(|| {
            order.push(card_no.clone());
            RationCardRecord {
                state_name: cells[1].clone(),
                district_name: cells[2].clone(),
                ration_card_no: card_no.clone(),
                scheme_name: cells[4].clone(),
                members: Vec::new(),
                additional_info,
            }
        });

        group.members.push(MemberRecord {
            s_no: cells[0].parse().unwrap_or(0),
            member_id: cells[5].clone(),
            member_name: cells[6].clone(),
            remark: if cells[7].is_empty() {
                None
            } else {
                Some(cells[7].clone())
            },
        });
    }

    Ok(order
        .into_iter()
        .filter_map(|card_no| groups.remove(&card_no))
        .collect())
}

/// Scan the supplemental table's label/value rows into flags.
///
/// Unrecognized or missing labels leave the defaults in place.
fn parse_additional_info(
    table: ElementRef,
    row_selector: &Selector,
    cell_selector: &Selector,
) -> AdditionalInfo {
    let mut info = AdditionalInfo::default();

    for row in table.select(row_selector) {
        let cells: Vec<String> = row.select(cell_selector).map(cell_text).collect();
        if cells.len() < 2 {
            continue;
        }

        let label = cells[0].as_str();
        let is_yes = cells[1].eq_ignore_ascii_case("yes");

        if label.contains("FPS category") {
            info.fps_category = if is_yes {
                FpsCategory::OnlineFps
            } else {
                FpsCategory::OfflineFps
            };
        } else if label.contains("IMPDS transaction") {
            info.impds_transaction_allowed = is_yes;
        } else if label.contains("Central Repository") {
            info.exists_in_central_repository = is_yes;
        } else if label.contains("duplicate Aadaar") {
            // "Aadaar" is the portal's own spelling
            info.duplicate_aadhaar_beneficiary = is_yes;
        }
    }

    info
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}
