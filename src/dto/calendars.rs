use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Calendar;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCalendarRequest {
    pub nombre: String,
    pub notas: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CalendarList {
    #[schema(value_type = Vec<Calendar>)]
    pub items: Vec<Calendar>,
}
