// shelfscore-core/src/infrastructure/loader.rs
//
// The Schema Normalizer adapter: reads delimited input, maps arbitrary
// source headers onto the canonical transaction schema through an ordered
// alias table (first match wins), and coerces cell values. Unresolvable
// required columns are the one hard failure; unparseable cells become null.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::domain::error::DomainError;
use crate::domain::transaction::Transaction;
use crate::error::ShelfscoreError;
use crate::infrastructure::error::InfrastructureError;

/// Candidate source headers per canonical column, in priority order.
/// Matching happens after header normalization (trim, spaces/dashes to
/// underscores) and is case-insensitive.
const ALIASES: [(&str, &[&str]); 13] = [
    ("store_name", &["Store", "StoreName", "Store_Name"]),
    ("item_code", &["Item_Code", "ItemCode", "SKU", "Sku_Code"]),
    ("item_barcode", &["Item_Barcode", "Barcode", "ItemBarcode"]),
    ("description", &["Description", "Item_Description", "ItemDesc"]),
    ("category", &["Category"]),
    ("department", &["Department"]),
    ("sub_department", &["Sub_Department", "SubDepartment", "Sub_Dept"]),
    ("section", &["Section", "Segment"]),
    ("quantity", &["Quantity", "Qty", "Units"]),
    ("total_sales", &["Total_Sales", "Sales_Value", "Sales"]),
    ("rrp", &["RRP", "Price_RRP"]),
    ("supplier", &["Supplier", "Vendor", "Manufacturer"]),
    (
        "date_of_sale",
        &["Date_Of_Sale", "Sale_Date", "Transaction_Date", "Date"],
    ),
];

/// Accepted date layouts, tried in order. Timestamps are truncated to
/// their date part before matching.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d"];

fn normalize_header(raw: &str) -> String {
    raw.trim().replace([' ', '-'], "_").to_lowercase()
}

/// Resolved position of each canonical column in the source header.
struct ColumnMap {
    indices: [usize; 13],
}

fn resolve_columns(headers: &csv::StringRecord) -> Result<ColumnMap, DomainError> {
    let normalized: Vec<String> = headers.iter().map(normalize_header).collect();

    let mut indices = [0usize; 13];
    let mut missing: Vec<&str> = Vec::new();
    for (slot, (canonical, candidates)) in ALIASES.iter().enumerate() {
        let found = candidates.iter().find_map(|cand| {
            let want = normalize_header(cand);
            normalized.iter().position(|h| *h == want)
        });
        match found {
            Some(idx) => indices[slot] = idx,
            None => missing.push(canonical),
        }
    }

    if !missing.is_empty() {
        return Err(DomainError::SchemaError(missing.join(", ")));
    }
    Ok(ColumnMap { indices })
}

fn parse_string(raw: Option<&str>) -> Option<String> {
    let s = raw?.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Numeric coercion: finite number or null, never an error.
fn parse_number(raw: Option<&str>) -> Option<f64> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Date coercion: tries the accepted layouts, null if none matches.
fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }
    // "2024-03-01 00:00:00" / "2024-03-01T00:00:00" -> "2024-03-01"
    let date_part = s.split([' ', 'T']).next().unwrap_or(s);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

fn parse_row(record: &csv::StringRecord, map: &ColumnMap) -> Transaction {
    let cell = |slot: usize| record.get(map.indices[slot]);
    let mut t = Transaction {
        store_name: parse_string(cell(0)),
        item_code: parse_string(cell(1)),
        item_barcode: parse_string(cell(2)),
        description: parse_string(cell(3)),
        category: parse_string(cell(4)),
        department: parse_string(cell(5)),
        sub_department: parse_string(cell(6)),
        section: parse_string(cell(7)),
        quantity: parse_number(cell(8)),
        total_sales: parse_number(cell(9)),
        rrp: parse_number(cell(10)),
        supplier: parse_string(cell(11)),
        date_of_sale: parse_date(cell(12)),
        realised_unit_price: None,
    };
    t.derive_unit_price();
    t
}

/// Reads and normalizes a transaction table from any reader.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>, ShelfscoreError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers().map_err(InfrastructureError::Csv)?.clone();
    let map = resolve_columns(&headers)?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(InfrastructureError::Csv)?;
        rows.push(parse_row(&record, &map));
    }
    Ok(rows)
}

/// Loads the normalized transaction table from a CSV file.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_transactions<P: AsRef<Path>>(path: P) -> Result<Vec<Transaction>, ShelfscoreError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(InfrastructureError::InputNotFound(path.display().to_string()).into());
    }
    let file = std::fs::File::open(path).map_err(InfrastructureError::Io)?;
    let rows = read_transactions(file)?;
    info!(rows = rows.len(), "Loaded normalized transaction table");
    Ok(rows)
}
