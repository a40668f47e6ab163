use chrono::{NaiveDate, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::Serialize;
use crate::domain::models::reservation::{BookingSource, UploadedReservation};
use crate::error::AppError;

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y", "%Y/%m/%d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Arrival,
    Departure,
    House,
    Guest,
    Email,
    Phone,
    Source,
    Amount,
    Currency,
}

impl Field {
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Field::Id => &["id", "confirmation code", "reservation id", "booking id", "book number", "reservation number"],
            Field::Arrival => &["arrival", "start date", "check-in", "check in", "checkin", "arrival date"],
            Field::Departure => &["departure", "end date", "check-out", "check out", "checkout", "departure date"],
            Field::House => &["house_name", "house name", "listing", "apartment", "property", "property name", "unit"],
            Field::Guest => &["guest_name", "guest name", "guest", "booker name", "name"],
            Field::Email => &["guest_email", "email", "guest email"],
            Field::Phone => &["guest_phone", "phone", "contact", "guest phone"],
            Field::Source => &["source", "channel", "platform"],
            Field::Amount => &["total_amount", "amount", "earnings", "total", "payout", "price"],
            Field::Currency => &["currency", "currency code"],
        }
    }

    fn label(&self) -> &'static str {
        self.aliases()[0]
    }
}

struct Columns {
    positions: Vec<(Field, usize)>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Self {
        let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_ascii_lowercase()).collect();
        let fields = [
            Field::Id, Field::Arrival, Field::Departure, Field::House, Field::Guest,
            Field::Email, Field::Phone, Field::Source, Field::Amount, Field::Currency,
        ];

        let positions = fields.iter()
            .filter_map(|field| {
                normalized.iter()
                    .position(|h| field.aliases().contains(&h.as_str()))
                    .map(|idx| (*field, idx))
            })
            .collect();

        Self { positions }
    }

    fn has(&self, field: Field) -> bool {
        self.positions.iter().any(|(f, _)| *f == field)
    }

    fn get<'r>(&self, record: &'r StringRecord, field: Field) -> Option<&'r str> {
        self.positions.iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, idx)| record.get(*idx))
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RowError {
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct CsvImport {
    pub reservations: Vec<UploadedReservation>,
    pub errors: Vec<RowError>,
}

/// Parses a channel's reservation export into uploadable rows.
///
/// Column headers are matched case-insensitively against a set of aliases used
/// by the common channel exports. A missing source column means every row is
/// attributed to `default_source`. Rows that fail to parse are reported by
/// line number (the header is line 1) and skipped.
pub fn parse_reservations_csv(
    data: &[u8],
    default_source: BookingSource,
    uploaded_by: &str,
) -> Result<CsvImport, AppError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()
        .map_err(|e| AppError::Validation(format!("Invalid CSV header: {}", e)))?
        .clone();

    let columns = Columns::resolve(&headers);
    for required in [Field::Id, Field::Arrival, Field::Departure, Field::House] {
        if !columns.has(required) {
            return Err(AppError::Validation(format!("CSV is missing a '{}' column", required.label())));
        }
    }

    let mut import = CsvImport::default();
    let uploaded_at = Utc::now();

    for (idx, record) in reader.records().enumerate() {
        let row = idx + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                import.errors.push(RowError { row, reason: format!("Unreadable row: {}", e) });
                continue;
            }
        };

        if record.iter().all(|v| v.is_empty()) {
            continue;
        }

        match parse_row(&columns, &record, default_source) {
            Ok(parsed) => import.reservations.push(UploadedReservation {
                id: parsed.id,
                arrival: parsed.arrival,
                departure: parsed.departure,
                house_name: parsed.house_name,
                source: parsed.source.to_string(),
                guest_name: parsed.guest_name,
                guest_email: columns.get(&record, Field::Email).map(str::to_string),
                guest_phone: columns.get(&record, Field::Phone).map(str::to_string),
                total_amount: parsed.amount.map(|a| a.to_string()),
                currency: columns.get(&record, Field::Currency).map(str::to_string),
                uploaded_by: uploaded_by.to_string(),
                uploaded_at,
            }),
            Err(reason) => import.errors.push(RowError { row, reason }),
        }
    }

    Ok(import)
}

struct ParsedRow {
    id: String,
    arrival: NaiveDate,
    departure: NaiveDate,
    house_name: String,
    guest_name: String,
    source: BookingSource,
    amount: Option<Decimal>,
}

fn parse_row(columns: &Columns, record: &StringRecord, default_source: BookingSource) -> Result<ParsedRow, String> {
    let id = columns.get(record, Field::Id).ok_or("Missing reservation id")?;
    let arrival_raw = columns.get(record, Field::Arrival).ok_or("Missing arrival date")?;
    let departure_raw = columns.get(record, Field::Departure).ok_or("Missing departure date")?;
    let house = columns.get(record, Field::House).ok_or("Missing apartment")?;

    let arrival = parse_date(arrival_raw).ok_or(format!("Invalid arrival date '{}'", arrival_raw))?;
    let departure = parse_date(departure_raw).ok_or(format!("Invalid departure date '{}'", departure_raw))?;

    if departure <= arrival {
        return Err(format!("Departure {} is not after arrival {}", departure, arrival));
    }

    let amount = match columns.get(record, Field::Amount) {
        Some(raw) => Some(parse_amount(raw).ok_or(format!("Invalid amount '{}'", raw))?),
        None => None,
    };

    Ok(ParsedRow {
        id: id.to_string(),
        arrival,
        departure,
        house_name: house.to_string(),
        guest_name: columns.get(record, Field::Guest).unwrap_or("Guest").to_string(),
        source: columns.get(record, Field::Source)
            .map(BookingSource::from_channel)
            .unwrap_or(default_source),
        amount,
    })
}

/// Accepts ISO, US and German day formats; ISO date-times keep only their date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS.iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| raw.get(..10).and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()))
}

/// Strips currency symbols and resolves thousands vs. decimal separators.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();

    let normalized = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (None, Some(comma)) if cleaned.len() - comma - 1 == 2 => cleaned.replace(',', "."),
        (None, Some(_)) => cleaned.replace(',', ""),
        _ => cleaned,
    };

    normalized.parse::<Decimal>().ok()
}
