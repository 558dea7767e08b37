use serde::Deserialize;
use uuid::Uuid;

use super::calendar::MonthScope;
use crate::error::AppError;

/// Body of `POST /attendance/mark`. `date` and `status` stay raw so that
/// validation failures map to their own error codes.
#[derive(Debug, Deserialize)]
pub struct MarkRequest {
    #[serde(alias = "userId")]
    pub user: Uuid,
    pub date: String,
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

impl MonthQuery {
    pub fn scope(&self) -> Result<Option<MonthScope>, AppError> {
        self.month.as_deref().map(str::parse::<MonthScope>).transpose()
    }
}
