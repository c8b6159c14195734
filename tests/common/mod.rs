#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{ActiveValue::Set, Database, DatabaseConnection, DbErr, EntityTrait};
use sea_orm_migration::prelude::*;

pub mod company_entity;
pub mod post_entity;
pub mod user_entity;

/// Show the adapter's debug logs for failing tests (`cargo test -- --nocapture`).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Four users across two companies, three of them with posts.
///
/// | id | name | email | active | role | created_at | company | posts |
/// |---|---|---|---|---|---|---|---|
/// | 1 | Alice Anderson | alice@example.com | yes | admin | 2024-01-05 10:00 | Acme | Hello World, Rust tips |
/// | 2 | Bob Brown | bob@example.com | no | editor | 2024-01-20 12:00 | Globex | Hello again |
/// | 3 | Carol Chen | carol@sample.org | yes | viewer | 2024-02-10 09:30 | Acme | |
/// | 4 | Dave Davis | dave@example.com | yes | editor | 2024-03-01 00:00 | | |
pub async fn setup_people_db() -> Result<DatabaseConnection, DbErr> {
    let db = setup_test_db().await?;

    company_entity::Entity::insert_many([company("Acme"), company("Globex")])
        .exec(&db)
        .await?;

    user_entity::Entity::insert_many([
        user("Alice Anderson", "alice@example.com", true, "admin", at(2024, 1, 5, 10, 0), Some(1)),
        user("Bob Brown", "bob@example.com", false, "editor", at(2024, 1, 20, 12, 0), Some(2)),
        user("Carol Chen", "carol@sample.org", true, "viewer", at(2024, 2, 10, 9, 30), Some(1)),
        user("Dave Davis", "dave@example.com", true, "editor", at(2024, 3, 1, 0, 0), None),
    ])
    .exec(&db)
    .await?;

    post_entity::Entity::insert_many([
        post(1, "Hello World"),
        post(1, "Rust tips"),
        post(2, "Hello again"),
    ])
    .exec(&db)
    .await?;

    Ok(db)
}

/// `count` users named `Member 01`, `Member 02`, ...
pub async fn setup_members_db(count: u32) -> Result<DatabaseConnection, DbErr> {
    let db = setup_test_db().await?;
    let members: Vec<_> = (1..=count)
        .map(|i| {
            user(
                &format!("Member {i:02}"),
                &format!("member{i}@example.com"),
                i % 2 == 0,
                "viewer",
                at(2024, 1, 1, 0, 0),
                None,
            )
        })
        .collect();
    if !members.is_empty() {
        user_entity::Entity::insert_many(members).exec(&db).await?;
    }
    Ok(db)
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn company(name: &str) -> company_entity::ActiveModel {
    company_entity::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
}

fn user(
    name: &str,
    email: &str,
    is_active: bool,
    role: &str,
    created_at: NaiveDateTime,
    company_id: Option<i32>,
) -> user_entity::ActiveModel {
    user_entity::ActiveModel {
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        is_active: Set(is_active),
        role: Set(role.to_string()),
        created_at: Set(created_at),
        company_id: Set(company_id),
        ..Default::default()
    }
}

fn post(user_id: i32, title: &str) -> post_entity::ActiveModel {
    post_entity::ActiveModel {
        user_id: Set(user_id),
        title: Set(title.to_string()),
        ..Default::default()
    }
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreatePeopleTables)]
    }
}

pub struct CreatePeopleTables;

#[async_trait::async_trait]
impl MigrationName for CreatePeopleTables {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_people_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreatePeopleTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        use company_entity::Column as CompanyColumn;
        use post_entity::Column as PostColumn;
        use user_entity::Column as UserColumn;

        manager
            .create_table(
                Table::create()
                    .table(company_entity::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CompanyColumn::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CompanyColumn::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(user_entity::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserColumn::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserColumn::Name).string().not_null())
                    .col(ColumnDef::new(UserColumn::Email).string().not_null())
                    .col(
                        ColumnDef::new(UserColumn::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(UserColumn::Role).string().not_null())
                    .col(ColumnDef::new(UserColumn::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(UserColumn::CompanyId).integer().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(post_entity::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostColumn::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostColumn::UserId).integer().not_null())
                    .col(ColumnDef::new(PostColumn::Title).string().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            post_entity::Entity.into_table_ref(),
            user_entity::Entity.into_table_ref(),
            company_entity::Entity.into_table_ref(),
        ] {
            manager.drop_table(Table::drop().table(table).to_owned()).await?;
        }
        Ok(())
    }
}
