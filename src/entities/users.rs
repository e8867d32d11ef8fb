use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "none")]
    None,
    #[sea_orm(string_value = "registerant")]
    Registerant,
    #[sea_orm(string_value = "hacker")]
    Hacker,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::None
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::None => write!(f, "none"),
            UserRole::Registerant => write!(f, "registerant"),
            UserRole::Hacker => write!(f, "hacker"),
            UserRole::Admin => write!(f, "admin"),
            UserRole::SuperAdmin => write!(f, "super_admin"),
        }
    }
}

impl UserRole {
    /// Admins and super admins may manage users, events and sponsors.
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SuperAdmin)
    }
}

/// Meal-distribution style grouping of attendees.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_group")]
#[serde(rename_all = "snake_case")]
pub enum UserGroup {
    #[sea_orm(string_value = "none")]
    None,
    #[sea_orm(string_value = "red")]
    Red,
    #[sea_orm(string_value = "green")]
    Green,
    #[sea_orm(string_value = "blue")]
    Blue,
}

impl Default for UserGroup {
    fn default() -> Self {
        UserGroup::None
    }
}

impl std::fmt::Display for UserGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserGroup::None => write!(f, "none"),
            UserGroup::Red => write!(f, "red"),
            UserGroup::Green => write!(f, "green"),
            UserGroup::Blue => write!(f, "blue"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "hackstart_user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub email_verified: Option<DateTime<Utc>>,
    pub image: Option<String>,
    /// Registration form answers; must conform to the answer shape in
    /// `crate::registration::answers`.
    pub registration: Option<Json>,
    pub registration_time: DateTime<Utc>,
    pub role: UserRole,
    pub group: UserGroup,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
    #[sea_orm(has_many = "super::sessions::Entity")]
    Sessions,
    #[sea_orm(has_many = "super::check_ins::Entity")]
    CheckIns,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl Related<super::check_ins::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CheckIns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveEnum;

    #[test]
    fn role_and_group_default_to_none() {
        assert_eq!(UserRole::default(), UserRole::None);
        assert_eq!(UserGroup::default(), UserGroup::None);
        assert_eq!(UserRole::default().to_value(), "none");
        assert_eq!(UserGroup::default().to_value(), "none");
    }

    #[test]
    fn role_string_values_round_trip() {
        for role in [
            UserRole::None,
            UserRole::Registerant,
            UserRole::Hacker,
            UserRole::Admin,
            UserRole::SuperAdmin,
        ] {
            assert_eq!(UserRole::try_from_value(&role.to_value()).unwrap(), role);
            assert_eq!(role.to_string(), role.to_value());
        }
    }

    #[test]
    fn only_admin_roles_are_admin() {
        assert!(UserRole::Admin.is_admin());
        assert!(UserRole::SuperAdmin.is_admin());
        assert!(!UserRole::Hacker.is_admin());
        assert!(!UserRole::Registerant.is_admin());
        assert!(!UserRole::None.is_admin());
    }
}
