use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::Role;

/// Registration body. The raw password may arrive as `password` or, for older
/// clients, as `passwordHash`; it is hashed before it is stored either way.
#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(alias = "passwordHash", alias = "password_hash")]
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Accepted for compatibility and ignored: new accounts are always customers.
    pub role: Option<Role>,
}
