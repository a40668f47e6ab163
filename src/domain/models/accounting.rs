use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::models::reservation::BookingSource;

/// Share of the gross a booking channel keeps, in percent.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChannelCommission {
    pub source: BookingSource,
    pub percent: Decimal,
}

impl ChannelCommission {
    pub fn defaults() -> Vec<ChannelCommission> {
        vec![
            ChannelCommission { source: BookingSource::Airbnb, percent: Decimal::new(3, 0) },
            ChannelCommission { source: BookingSource::Vrbo, percent: Decimal::new(8, 0) },
            ChannelCommission { source: BookingSource::Website, percent: Decimal::ZERO },
            ChannelCommission { source: BookingSource::BookingCom, percent: Decimal::new(15, 0) },
            ChannelCommission { source: BookingSource::Expedia, percent: Decimal::new(18, 0) },
        ]
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AccountingLine {
    pub reservation_id: String,
    pub apartment: String,
    pub source: BookingSource,
    pub guest_name: String,
    pub arrival: NaiveDate,
    pub departure: NaiveDate,
    pub nights: i64,
    pub gross: Decimal,
    pub channel_commission: Decimal,
    pub cleaning_fee: Decimal,
    pub management_commission: Decimal,
    pub net_owner: Decimal,
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct AccountingTotals {
    pub bookings: usize,
    pub nights: i64,
    pub gross: Decimal,
    pub channel_commission: Decimal,
    pub cleaning_fee: Decimal,
    pub management_commission: Decimal,
    pub net_owner: Decimal,
}

impl AccountingTotals {
    pub fn add(&mut self, line: &AccountingLine) {
        self.bookings += 1;
        self.nights += line.nights;
        self.gross += line.gross;
        self.channel_commission += line.channel_commission;
        self.cleaning_fee += line.cleaning_fee;
        self.management_commission += line.management_commission;
        self.net_owner += line.net_owner;
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct ApartmentAccounting {
    pub apartment: String,
    pub lines: Vec<AccountingLine>,
    pub totals: AccountingTotals,
}

#[derive(Debug, Serialize, Clone)]
pub struct AccountingReport {
    pub year: i32,
    pub month: u32,
    pub apartments: Vec<ApartmentAccounting>,
    pub totals: AccountingTotals,
}
