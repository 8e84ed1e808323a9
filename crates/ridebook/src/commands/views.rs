//! Table rows and detail views for each resource.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tabled::Tabled;

use ridebook_core::api::Resource;
use ridebook_core::api::resources::{
    Affiliate, Affiliates, CmsPage, Commission, Commissions, Companies, Company, Pages, Partner,
    Partners, Payment, Payments, Payout, Payouts, RideRequest, RideRequests, Route, Routes, User, Users,
    Vehicle, Vehicles,
};

use crate::output::{money, or_dash, paint_status};

/// How a resource is shown on the terminal.
pub trait ResourceView: Resource<Create: DeserializeOwned, Update: DeserializeOwned> {
    type Row: Tabled;

    fn row(item: &Self::Item, color: bool) -> Self::Row;

    /// Labelled fields for `get` in table mode.
    fn detail(item: &Self::Item) -> Vec<(&'static str, String)>;
}

/// Aligned `Label: value` lines.
pub fn render_detail(fields: &[(&'static str, String)]) -> String {
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    fields
        .iter()
        .map(|(k, v)| format!("{k:>width$}: {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn date(value: Option<&DateTime<Utc>>) -> String {
    value.map_or_else(|| "-".into(), |d| d.format("%Y-%m-%d %H:%M").to_string())
}

fn opt_money(value: Option<f64>) -> String {
    value.map_or_else(|| "-".into(), money)
}

// ── Affiliates ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct AffiliateRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Rate %")]
    rate: String,
    #[tabled(rename = "Earnings")]
    earnings: String,
    #[tabled(rename = "Bookings")]
    bookings: u64,
}

impl ResourceView for Affiliates {
    type Row = AffiliateRow;

    fn row(a: &Affiliate, color: bool) -> AffiliateRow {
        AffiliateRow {
            id: a.id.clone(),
            name: a.name.clone(),
            email: a.email.clone(),
            status: paint_status(&a.status.to_string(), color),
            rate: money(a.commission_rate),
            earnings: money(a.total_earnings),
            bookings: a.total_bookings,
        }
    }

    fn detail(a: &Affiliate) -> Vec<(&'static str, String)> {
        vec![
            ("ID", a.id.clone()),
            ("Name", a.name.clone()),
            ("Email", a.email.clone()),
            ("Phone", or_dash(a.phone.as_deref())),
            ("Company", or_dash(a.company_name.as_deref())),
            ("Status", a.status.to_string()),
            ("Commission rate", money(a.commission_rate)),
            ("Total earnings", money(a.total_earnings)),
            ("Total bookings", a.total_bookings.to_string()),
            ("Created", date(a.created_at.as_ref())),
        ]
    }
}

// ── Commissions ──────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct CommissionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Affiliate")]
    affiliate: String,
    #[tabled(rename = "Booking")]
    booking: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl ResourceView for Commissions {
    type Row = CommissionRow;

    fn row(c: &Commission, color: bool) -> CommissionRow {
        CommissionRow {
            id: c.id.clone(),
            affiliate: c
                .affiliate_name
                .clone()
                .unwrap_or_else(|| c.affiliate_id.clone()),
            booking: or_dash(c.booking_id.as_deref()),
            amount: money(c.amount),
            status: paint_status(&c.status.to_string(), color),
            created: date(c.created_at.as_ref()),
        }
    }

    fn detail(c: &Commission) -> Vec<(&'static str, String)> {
        vec![
            ("ID", c.id.clone()),
            ("Affiliate ID", c.affiliate_id.clone()),
            ("Affiliate", or_dash(c.affiliate_name.as_deref())),
            ("Booking", or_dash(c.booking_id.as_deref())),
            ("Amount", money(c.amount)),
            ("Rate", opt_money(c.rate)),
            ("Status", c.status.to_string()),
            ("Created", date(c.created_at.as_ref())),
        ]
    }
}

// ── Payouts ──────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct PayoutRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Affiliate")]
    affiliate: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Processed")]
    processed: String,
}

impl ResourceView for Payouts {
    type Row = PayoutRow;

    fn row(p: &Payout, color: bool) -> PayoutRow {
        PayoutRow {
            id: p.id.clone(),
            affiliate: p
                .affiliate_name
                .clone()
                .unwrap_or_else(|| p.affiliate_id.clone()),
            amount: money(p.amount),
            method: or_dash(p.method.as_deref()),
            status: paint_status(&p.status.to_string(), color),
            processed: date(p.processed_at.as_ref()),
        }
    }

    fn detail(p: &Payout) -> Vec<(&'static str, String)> {
        vec![
            ("ID", p.id.clone()),
            ("Affiliate ID", p.affiliate_id.clone()),
            ("Affiliate", or_dash(p.affiliate_name.as_deref())),
            ("Amount", money(p.amount)),
            ("Method", or_dash(p.method.as_deref())),
            ("Reference", or_dash(p.reference.as_deref())),
            ("Status", p.status.to_string()),
            ("Created", date(p.created_at.as_ref())),
            ("Processed", date(p.processed_at.as_ref())),
        ]
    }
}

// ── Ride requests ────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct RideRequestRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "Pickup")]
    pickup: String,
    #[tabled(rename = "Dropoff")]
    dropoff: String,
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Pax")]
    passengers: u64,
    #[tabled(rename = "Status")]
    status: String,
}

impl ResourceView for RideRequests {
    type Row = RideRequestRow;

    fn row(r: &RideRequest, color: bool) -> RideRequestRow {
        RideRequestRow {
            id: r.id.clone(),
            customer: r.customer_name.clone(),
            pickup: r.pickup_location.clone(),
            dropoff: r.dropoff_location.clone(),
            when: date(r.pickup_time.as_ref()),
            passengers: r.passengers,
            status: paint_status(&r.status.to_string(), color),
        }
    }

    fn detail(r: &RideRequest) -> Vec<(&'static str, String)> {
        vec![
            ("ID", r.id.clone()),
            ("Customer", r.customer_name.clone()),
            ("Email", or_dash(r.email.as_deref())),
            ("Phone", or_dash(r.phone.as_deref())),
            ("Pickup", r.pickup_location.clone()),
            ("Dropoff", r.dropoff_location.clone()),
            ("Pickup time", date(r.pickup_time.as_ref())),
            ("Passengers", r.passengers.to_string()),
            ("Vehicle type", or_dash(r.vehicle_type.as_deref())),
            ("Estimate", opt_money(r.estimated_price)),
            ("Status", r.status.to_string()),
            ("Created", date(r.created_at.as_ref())),
        ]
    }
}

// ── Companies ────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct CompanyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Credit limit")]
    credit_limit: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "Bookings")]
    bookings: u64,
}

impl ResourceView for Companies {
    type Row = CompanyRow;

    fn row(c: &Company, color: bool) -> CompanyRow {
        CompanyRow {
            id: c.id.clone(),
            name: c.name.clone(),
            status: paint_status(&c.status.to_string(), color),
            credit_limit: money(c.credit_limit),
            balance: money(c.balance),
            bookings: c.total_bookings,
        }
    }

    fn detail(c: &Company) -> Vec<(&'static str, String)> {
        vec![
            ("ID", c.id.clone()),
            ("Name", c.name.clone()),
            ("Email", or_dash(c.email.as_deref())),
            ("Phone", or_dash(c.phone.as_deref())),
            ("Status", c.status.to_string()),
            ("Credit limit", money(c.credit_limit)),
            ("Balance", money(c.balance)),
            ("Total bookings", c.total_bookings.to_string()),
        ]
    }
}

// ── Users ────────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl ResourceView for Users {
    type Row = UserRow;

    fn row(u: &User, color: bool) -> UserRow {
        UserRow {
            id: u.id.clone(),
            name: u.display_name(),
            email: u.email.clone(),
            role: u.role.to_string(),
            status: paint_status(&u.status.to_string(), color),
        }
    }

    fn detail(u: &User) -> Vec<(&'static str, String)> {
        vec![
            ("ID", u.id.clone()),
            ("Name", u.display_name()),
            ("Email", u.email.clone()),
            ("Role", u.role.to_string()),
            ("Status", u.status.to_string()),
            ("Created", date(u.created_at.as_ref())),
        ]
    }
}

// ── Vehicles ─────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct VehicleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Seats")]
    capacity: u64,
    #[tabled(rename = "Base fare")]
    base_fare: String,
    #[tabled(rename = "Per km")]
    per_km: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl ResourceView for Vehicles {
    type Row = VehicleRow;

    fn row(v: &Vehicle, color: bool) -> VehicleRow {
        VehicleRow {
            id: v.id.clone(),
            name: v.name.clone(),
            category: or_dash(v.category.as_deref()),
            capacity: v.capacity,
            base_fare: money(v.base_fare),
            per_km: money(v.per_km_rate),
            status: paint_status(&v.status.to_string(), color),
        }
    }

    fn detail(v: &Vehicle) -> Vec<(&'static str, String)> {
        vec![
            ("ID", v.id.clone()),
            ("Name", v.name.clone()),
            ("Category", or_dash(v.category.as_deref())),
            ("License plate", or_dash(v.license_plate.as_deref())),
            ("Capacity", v.capacity.to_string()),
            ("Base fare", money(v.base_fare)),
            ("Per km", money(v.per_km_rate)),
            ("Status", v.status.to_string()),
        ]
    }
}

// ── Routes ───────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct RouteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "From")]
    origin: String,
    #[tabled(rename = "To")]
    destination: String,
    #[tabled(rename = "Km")]
    distance: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Active")]
    active: String,
}

impl ResourceView for Routes {
    type Row = RouteRow;

    fn row(r: &Route, _color: bool) -> RouteRow {
        RouteRow {
            id: r.id.clone(),
            origin: r.origin.clone(),
            destination: r.destination.clone(),
            distance: r.distance_km.map_or_else(|| "-".into(), |d| format!("{d:.1}")),
            price: money(r.base_price),
            active: if r.active { "yes" } else { "no" }.into(),
        }
    }

    fn detail(r: &Route) -> Vec<(&'static str, String)> {
        vec![
            ("ID", r.id.clone()),
            ("Origin", r.origin.clone()),
            ("Destination", r.destination.clone()),
            (
                "Distance km",
                r.distance_km.map_or_else(|| "-".into(), |d| format!("{d:.1}")),
            ),
            (
                "Duration min",
                r.duration_minutes
                    .map_or_else(|| "-".into(), |m| m.to_string()),
            ),
            ("Base price", money(r.base_price)),
            ("Active", r.active.to_string()),
        ]
    }
}

// ── Payments ─────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct PaymentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Booking")]
    booking: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl ResourceView for Payments {
    type Row = PaymentRow;

    fn row(p: &Payment, color: bool) -> PaymentRow {
        let amount = match p.currency.as_deref() {
            Some(cur) => format!("{} {cur}", money(p.amount)),
            None => money(p.amount),
        };
        PaymentRow {
            id: p.id.clone(),
            booking: or_dash(p.booking_id.as_deref()),
            amount,
            method: or_dash(p.method.as_deref()),
            status: paint_status(&p.status.to_string(), color),
            created: date(p.created_at.as_ref()),
        }
    }

    fn detail(p: &Payment) -> Vec<(&'static str, String)> {
        vec![
            ("ID", p.id.clone()),
            ("Booking", or_dash(p.booking_id.as_deref())),
            ("Amount", money(p.amount)),
            ("Currency", or_dash(p.currency.as_deref())),
            ("Method", or_dash(p.method.as_deref())),
            ("Status", p.status.to_string()),
            ("Created", date(p.created_at.as_ref())),
        ]
    }
}

// ── B2B partners ─────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct PartnerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Contact")]
    contact: String,
    #[tabled(rename = "Discount %")]
    discount: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl ResourceView for Partners {
    type Row = PartnerRow;

    fn row(p: &Partner, color: bool) -> PartnerRow {
        PartnerRow {
            id: p.id.clone(),
            company: p.company_name.clone(),
            contact: or_dash(p.contact_name.as_deref()),
            discount: opt_money(p.discount_rate),
            status: paint_status(&p.status.to_string(), color),
        }
    }

    fn detail(p: &Partner) -> Vec<(&'static str, String)> {
        vec![
            ("ID", p.id.clone()),
            ("Company", p.company_name.clone()),
            ("Contact", or_dash(p.contact_name.as_deref())),
            ("Email", or_dash(p.email.as_deref())),
            ("Phone", or_dash(p.phone.as_deref())),
            ("Discount rate", opt_money(p.discount_rate)),
            ("Status", p.status.to_string()),
        ]
    }
}

// ── CMS pages ────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct PageRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Slug")]
    slug: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl ResourceView for Pages {
    type Row = PageRow;

    fn row(p: &CmsPage, color: bool) -> PageRow {
        let state = if p.published { "published" } else { "draft" };
        PageRow {
            id: p.id.clone(),
            slug: p.slug.clone(),
            title: p.title.clone(),
            state: paint_status(state, color),
            updated: date(p.updated_at.as_ref()),
        }
    }

    fn detail(p: &CmsPage) -> Vec<(&'static str, String)> {
        vec![
            ("ID", p.id.clone()),
            ("Slug", p.slug.clone()),
            ("Title", p.title.clone()),
            ("Published", p.published.to_string()),
            ("Updated", date(p.updated_at.as_ref())),
            (
                "Content",
                p.content
                    .as_deref()
                    .map_or_else(|| "-".into(), |c| format!("{} chars", c.chars().count())),
            ),
        ]
    }
}
