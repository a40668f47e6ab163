use std::collections::BTreeMap;
use rust_decimal::Decimal;
use crate::domain::models::accounting::{
    AccountingLine, AccountingReport, AccountingTotals, ApartmentAccounting, ChannelCommission,
};
use crate::domain::models::property::PropertyCatalog;
use crate::domain::models::reservation::{BookingSource, Reservation};
use crate::domain::services::calendar_grid::month_bounds;
use crate::error::AppError;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone)]
pub struct CommissionPolicy {
    channels: Vec<ChannelCommission>,
    management_pct: Decimal,
}

impl CommissionPolicy {
    pub fn new(channels: Vec<ChannelCommission>, management_pct: u32) -> Self {
        Self { channels, management_pct: Decimal::from(management_pct) }
    }

    pub fn channel_pct(&self, source: BookingSource) -> Decimal {
        self.channels.iter()
            .find(|c| c.source == source)
            .map(|c| c.percent)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn management_pct(&self) -> Decimal {
        self.management_pct
    }
}

/// Commission breakdown of one reservation.
///
/// The management fee applies to what is left after the channel's cut and the
/// cleaning fee, and never goes negative.
pub fn account_for(reservation: &Reservation, cleaning_fee: Decimal, policy: &CommissionPolicy) -> AccountingLine {
    let gross = reservation.total_amount.unwrap_or(Decimal::ZERO).round_dp(2);
    let channel_commission = (gross * policy.channel_pct(reservation.source) / HUNDRED).round_dp(2);
    let base = (gross - channel_commission - cleaning_fee).max(Decimal::ZERO);
    let management_commission = (base * policy.management_pct() / HUNDRED).round_dp(2);
    let net_owner = gross - channel_commission - cleaning_fee - management_commission;

    AccountingLine {
        reservation_id: reservation.id.clone(),
        apartment: reservation.house_name.clone(),
        source: reservation.source,
        guest_name: reservation.guest_name.clone(),
        arrival: reservation.arrival,
        departure: reservation.departure,
        nights: reservation.nights,
        gross,
        channel_commission,
        cleaning_fee,
        management_commission,
        net_owner,
    }
}

/// Monthly report; a booking belongs to the month it arrives in.
pub fn build_report(
    reservations: &[Reservation],
    catalog: &PropertyCatalog,
    policy: &CommissionPolicy,
    year: i32,
    month: u32,
) -> Result<AccountingReport, AppError> {
    let (start, end) = month_bounds(year, month)?;

    let mut by_apartment: BTreeMap<String, Vec<AccountingLine>> = BTreeMap::new();
    for reservation in reservations.iter().filter(|r| r.is_well_formed() && r.arrival >= start && r.arrival <= end) {
        let line = account_for(reservation, catalog.cleaning_fee_for(&reservation.house_name), policy);
        by_apartment.entry(reservation.house_name.clone()).or_default().push(line);
    }

    let mut totals = AccountingTotals::default();
    let apartments = by_apartment.into_iter()
        .map(|(apartment, mut lines)| {
            lines.sort_by(|a, b| a.arrival.cmp(&b.arrival).then_with(|| a.reservation_id.cmp(&b.reservation_id)));
            let mut apartment_totals = AccountingTotals::default();
            for line in &lines {
                apartment_totals.add(line);
                totals.add(line);
            }
            ApartmentAccounting { apartment, lines, totals: apartment_totals }
        })
        .collect();

    Ok(AccountingReport { year, month, apartments, totals })
}
