//! Entity types and their endpoint declarations.

pub mod affiliates;
pub mod commissions;
pub mod companies;
pub mod dashboard;
pub mod pages;
pub mod partners;
pub mod payments;
pub mod payouts;
pub mod requests;
pub mod routes;
pub mod users;
pub mod vehicles;

pub use affiliates::{Affiliate, AffiliateStatus, Affiliates};
pub use commissions::{Commission, CommissionStatus, Commissions};
pub use companies::{Companies, Company, CompanyStatus};
pub use dashboard::dashboard_stats;
pub use pages::{CmsPage, Pages};
pub use partners::{Partner, PartnerStatus, Partners};
pub use payments::{Payment, PaymentStatus, Payments};
pub use payouts::{Payout, PayoutStatus, Payouts};
pub use requests::{RideRequest, RideRequestStatus, RideRequests};
pub use routes::{Route, Routes};
pub use users::{User, UserRole, UserStatus, Users};
pub use vehicles::{Vehicle, VehicleStatus, Vehicles};
