use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "sponsorship_level")]
#[serde(rename_all = "snake_case")]
pub enum SponsorshipLevel {
    #[sea_orm(string_value = "none")]
    None,
    #[sea_orm(string_value = "not_specified")]
    NotSpecified,
    #[sea_orm(string_value = "bronze")]
    Bronze,
    #[sea_orm(string_value = "silver")]
    Silver,
    #[sea_orm(string_value = "gold")]
    Gold,
    #[sea_orm(string_value = "platinum")]
    Platinum,
}

impl Default for SponsorshipLevel {
    fn default() -> Self {
        SponsorshipLevel::NotSpecified
    }
}

impl std::fmt::Display for SponsorshipLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SponsorshipLevel::None => write!(f, "none"),
            SponsorshipLevel::NotSpecified => write!(f, "not_specified"),
            SponsorshipLevel::Bronze => write!(f, "bronze"),
            SponsorshipLevel::Silver => write!(f, "silver"),
            SponsorshipLevel::Gold => write!(f, "gold"),
            SponsorshipLevel::Platinum => write!(f, "platinum"),
        }
    }
}

/// Sponsors and other organizations hosting parts of the hackathon.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "hackstart_sponsor")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub image: Option<String>,
    pub level: SponsorshipLevel,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event_sponsors::Entity")]
    EventSponsors,
}

impl Related<super::event_sponsors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventSponsors.def()
    }
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        super::event_sponsors::Relation::Event.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::event_sponsors::Relation::Sponsor.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
