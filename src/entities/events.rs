use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "event_type")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[sea_orm(string_value = "general")]
    General,
    #[sea_orm(string_value = "meal")]
    Meal,
    #[sea_orm(string_value = "workshop")]
    Workshop,
    #[sea_orm(string_value = "ceremony")]
    Ceremony,
}

impl Default for EventType {
    fn default() -> Self {
        EventType::General
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::General => write!(f, "general"),
            EventType::Meal => write!(f, "meal"),
            EventType::Workshop => write!(f, "workshop"),
            EventType::Ceremony => write!(f, "ceremony"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "hackstart_event")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: String,
    pub link: Option<String>,
    pub image: Option<String>,
    pub hosts: Option<String>,
    pub location: Option<String>,
    pub start_date: Date,
    pub end_date: Date,
    pub event_type: EventType,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::check_ins::Entity")]
    CheckIns,
    #[sea_orm(has_many = "super::event_sponsors::Entity")]
    EventSponsors,
}

impl Related<super::check_ins::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CheckIns.def()
    }
}

impl Related<super::event_sponsors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventSponsors.def()
    }
}

impl Related<super::sponsors::Entity> for Entity {
    fn to() -> RelationDef {
        super::event_sponsors::Relation::Sponsor.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::event_sponsors::Relation::Event.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveEnum;

    #[test]
    fn event_type_defaults_to_general() {
        assert_eq!(EventType::default(), EventType::General);
        assert_eq!(EventType::default().to_value(), "general");
    }
}
