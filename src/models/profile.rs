//! Profile strings kept alongside the class collection.

use serde::{Deserialize, Serialize};

/// Request body for updating the stored profile keys.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Dashboard greeting.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Greeting {
    /// Local part of the stored e-mail address
    pub display_name: Option<String>,
    /// Today's date, shown only once a user is known
    pub date_display: Option<String>,
    pub username: Option<String>,
}
