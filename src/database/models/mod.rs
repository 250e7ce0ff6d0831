pub mod company;
pub mod job;
pub mod user;

pub use company::{Company, CompanyDetail, CompanyFilter, CompanyUpdate, NewCompany, COMPANY_ALIASES};
pub use job::{CompanyJobFilter, Job, JobFilter, JobUpdate, NewJob, JOB_ALIASES};
pub use user::{Credentials, NewUser, User, UserDetail, UserUpdate, USER_ALIASES};

use serde::{Deserialize, Deserializer};

/// Wraps any present value in `Some`, so a field declared `Option<Option<T>>`
/// reads as `None` when absent and `Some(None)` for an explicit null.
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
