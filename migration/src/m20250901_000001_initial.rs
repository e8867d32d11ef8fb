use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

// Table names carry an application prefix so several apps can share one
// database instance.

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "hackstart_user")]
    Table,
    Id,
    Name,
    Email,
    EmailVerified,
    Image,
    Registration,
    RegistrationTime,
    Role,
    Group,
}

#[derive(DeriveIden)]
enum Accounts {
    #[sea_orm(iden = "hackstart_account")]
    Table,
    UserId,
    Type,
    Provider,
    ProviderAccountId,
    RefreshToken,
    AccessToken,
    ExpiresAt,
    TokenType,
    Scope,
    IdToken,
    SessionState,
}

#[derive(DeriveIden)]
enum Sessions {
    #[sea_orm(iden = "hackstart_session")]
    Table,
    SessionToken,
    UserId,
    Expires,
}

#[derive(DeriveIden)]
enum VerificationTokens {
    #[sea_orm(iden = "hackstart_verification_token")]
    Table,
    Identifier,
    Token,
    Expires,
}

#[derive(DeriveIden)]
enum Sponsors {
    #[sea_orm(iden = "hackstart_sponsor")]
    Table,
    Id,
    Name,
    Description,
    Link,
    Image,
    Level,
}

#[derive(DeriveIden)]
enum Events {
    #[sea_orm(iden = "hackstart_event")]
    Table,
    Id,
    Name,
    Description,
    Link,
    Image,
    Hosts,
    Location,
    StartDate,
    EndDate,
    EventType,
}

#[derive(DeriveIden)]
enum EventSponsors {
    #[sea_orm(iden = "hackstart_event_sponsor")]
    Table,
    EventId,
    SponsorId,
}

#[derive(DeriveIden)]
enum CheckIns {
    #[sea_orm(iden = "hackstart_checkin")]
    Table,
    Id,
    Time,
    UserId,
    EventId,
}

fn users_table() -> TableCreateStatement {
    Table::create()
        .table(Users::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Users::Id)
                .string_len(255)
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(Users::Name).string_len(255).null())
        .col(ColumnDef::new(Users::Email).string_len(255).not_null())
        .col(
            ColumnDef::new(Users::EmailVerified)
                .timestamp_with_time_zone()
                .default(Expr::cust("NOW()"))
                .null(),
        )
        .col(ColumnDef::new(Users::Image).string_len(255).null())
        .col(ColumnDef::new(Users::Registration).json().null())
        .col(
            ColumnDef::new(Users::RegistrationTime)
                .timestamp_with_time_zone()
                .default(Expr::cust("NOW()"))
                .not_null(),
        )
        .col(
            ColumnDef::new(Users::Role)
                .custom(Alias::new("user_role"))
                .not_null()
                .default(Expr::cust("'none'")),
        )
        .col(
            ColumnDef::new(Users::Group)
                .custom(Alias::new("user_group"))
                .not_null()
                .default(Expr::cust("'none'")),
        )
        .to_owned()
}

fn accounts_table() -> TableCreateStatement {
    Table::create()
        .table(Accounts::Table)
        .if_not_exists()
        .col(ColumnDef::new(Accounts::UserId).string_len(255).not_null())
        .col(ColumnDef::new(Accounts::Type).string_len(255).not_null())
        .col(ColumnDef::new(Accounts::Provider).string_len(255).not_null())
        .col(
            ColumnDef::new(Accounts::ProviderAccountId)
                .string_len(255)
                .not_null(),
        )
        .col(ColumnDef::new(Accounts::RefreshToken).text().null())
        .col(ColumnDef::new(Accounts::AccessToken).text().null())
        .col(ColumnDef::new(Accounts::ExpiresAt).integer().null())
        .col(ColumnDef::new(Accounts::TokenType).string_len(255).null())
        .col(ColumnDef::new(Accounts::Scope).string_len(255).null())
        .col(ColumnDef::new(Accounts::IdToken).text().null())
        .col(ColumnDef::new(Accounts::SessionState).string_len(255).null())
        // A provider identity maps to exactly one account row.
        .primary_key(
            Index::create()
                .col(Accounts::Provider)
                .col(Accounts::ProviderAccountId),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_account_user")
                .from(Accounts::Table, Accounts::UserId)
                .to(Users::Table, Users::Id),
        )
        .to_owned()
}

fn sessions_table() -> TableCreateStatement {
    Table::create()
        .table(Sessions::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Sessions::SessionToken)
                .string_len(255)
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(Sessions::UserId).string_len(255).not_null())
        .col(
            ColumnDef::new(Sessions::Expires)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_session_user")
                .from(Sessions::Table, Sessions::UserId)
                .to(Users::Table, Users::Id),
        )
        .to_owned()
}

fn verification_tokens_table() -> TableCreateStatement {
    Table::create()
        .table(VerificationTokens::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(VerificationTokens::Identifier)
                .string_len(255)
                .not_null(),
        )
        .col(
            ColumnDef::new(VerificationTokens::Token)
                .string_len(255)
                .not_null(),
        )
        .col(
            ColumnDef::new(VerificationTokens::Expires)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .primary_key(
            Index::create()
                .col(VerificationTokens::Identifier)
                .col(VerificationTokens::Token),
        )
        .to_owned()
}

fn sponsors_table() -> TableCreateStatement {
    Table::create()
        .table(Sponsors::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Sponsors::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Sponsors::Name).string_len(255).null())
        .col(ColumnDef::new(Sponsors::Description).string_len(511).null())
        .col(ColumnDef::new(Sponsors::Link).string_len(255).null())
        .col(ColumnDef::new(Sponsors::Image).string_len(255).null())
        .col(
            ColumnDef::new(Sponsors::Level)
                .custom(Alias::new("sponsorship_level"))
                .not_null()
                .default(Expr::cust("'not_specified'")),
        )
        .to_owned()
}

fn events_table() -> TableCreateStatement {
    Table::create()
        .table(Events::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Events::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Events::Name).string_len(255).not_null())
        .col(ColumnDef::new(Events::Description).string_len(511).not_null())
        .col(ColumnDef::new(Events::Link).string_len(255).null())
        .col(ColumnDef::new(Events::Image).string_len(255).null())
        .col(ColumnDef::new(Events::Hosts).string_len(511).null())
        .col(ColumnDef::new(Events::Location).string_len(255).null())
        // start_date and end_date are distinct columns; they must stay
        // independently settable.
        .col(ColumnDef::new(Events::StartDate).date().not_null())
        .col(ColumnDef::new(Events::EndDate).date().not_null())
        .col(
            ColumnDef::new(Events::EventType)
                .custom(Alias::new("event_type"))
                .not_null()
                .default(Expr::cust("'general'")),
        )
        .to_owned()
}

fn event_sponsors_table() -> TableCreateStatement {
    Table::create()
        .table(EventSponsors::Table)
        .if_not_exists()
        .col(ColumnDef::new(EventSponsors::EventId).integer().not_null())
        .col(ColumnDef::new(EventSponsors::SponsorId).integer().not_null())
        .primary_key(
            Index::create()
                .col(EventSponsors::EventId)
                .col(EventSponsors::SponsorId),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_event_sponsor_event")
                .from(EventSponsors::Table, EventSponsors::EventId)
                .to(Events::Table, Events::Id),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_event_sponsor_sponsor")
                .from(EventSponsors::Table, EventSponsors::SponsorId)
                .to(Sponsors::Table, Sponsors::Id),
        )
        .to_owned()
}

fn check_ins_table() -> TableCreateStatement {
    Table::create()
        .table(CheckIns::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(CheckIns::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(CheckIns::Time)
                .timestamp_with_time_zone()
                .default(Expr::cust("NOW()"))
                .not_null(),
        )
        .col(ColumnDef::new(CheckIns::UserId).string_len(255).not_null())
        .col(ColumnDef::new(CheckIns::EventId).integer().not_null())
        .foreign_key(
            ForeignKey::create()
                .name("fk_checkin_user")
                .from(CheckIns::Table, CheckIns::UserId)
                .to(Users::Table, Users::Id),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_checkin_event")
                .from(CheckIns::Table, CheckIns::EventId)
                .to(Events::Table, Events::Id),
        )
        .to_owned()
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("sponsorship_level"))
                    .values(vec![
                        Alias::new("none"),
                        Alias::new("not_specified"),
                        Alias::new("bronze"),
                        Alias::new("silver"),
                        Alias::new("gold"),
                        Alias::new("platinum"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("event_type"))
                    .values(vec![
                        Alias::new("general"),
                        Alias::new("meal"),
                        Alias::new("workshop"),
                        Alias::new("ceremony"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("user_role"))
                    .values(vec![
                        Alias::new("none"),
                        Alias::new("registerant"),
                        Alias::new("hacker"),
                        Alias::new("admin"),
                        Alias::new("super_admin"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("user_group"))
                    .values(vec![
                        Alias::new("none"),
                        Alias::new("red"),
                        Alias::new("green"),
                        Alias::new("blue"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager.create_table(users_table()).await?;
        manager.create_table(accounts_table()).await?;
        manager.create_table(sessions_table()).await?;
        manager.create_table(verification_tokens_table()).await?;
        manager.create_table(sponsors_table()).await?;
        manager.create_table(events_table()).await?;
        manager.create_table(event_sponsors_table()).await?;
        manager.create_table(check_ins_table()).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("account_user_id_idx")
                    .table(Accounts::Table)
                    .col(Accounts::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("session_user_id_idx")
                    .table(Sessions::Table)
                    .col(Sessions::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("checkin_user_id_idx")
                    .table(CheckIns::Table)
                    .col(CheckIns::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("checkin_event_id_idx")
                    .table(CheckIns::Table)
                    .col(CheckIns::EventId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CheckIns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EventSponsors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sponsors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VerificationTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        for name in ["user_group", "user_role", "event_type", "sponsorship_level"] {
            manager
                .drop_type(Type::drop().name(Alias::new(name)).to_owned())
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::PostgresQueryBuilder;

    #[test]
    fn event_start_and_end_dates_are_distinct_columns() {
        let sql = events_table().build(PostgresQueryBuilder);
        assert_eq!(sql.matches("\"start_date\"").count(), 1);
        assert_eq!(sql.matches("\"end_date\"").count(), 1);
    }

    #[test]
    fn account_has_compound_primary_key() {
        let sql = accounts_table().build(PostgresQueryBuilder);
        assert!(sql.contains("PRIMARY KEY (\"provider\", \"provider_account_id\")"));
    }

    #[test]
    fn verification_token_has_compound_primary_key() {
        let sql = verification_tokens_table().build(PostgresQueryBuilder);
        assert!(sql.contains("PRIMARY KEY (\"identifier\", \"token\")"));
    }

    #[test]
    fn check_in_references_user_and_event() {
        let sql = check_ins_table().build(PostgresQueryBuilder);
        assert!(sql.contains("REFERENCES \"hackstart_user\" (\"id\")"));
        assert!(sql.contains("REFERENCES \"hackstart_event\" (\"id\")"));
    }

    #[test]
    fn check_in_has_no_uniqueness_on_user_event_pair() {
        // Duplicate check-ins are a policy decision for callers, not a
        // schema constraint.
        let sql = check_ins_table().build(PostgresQueryBuilder);
        assert!(!sql.contains("UNIQUE"));
    }
}
