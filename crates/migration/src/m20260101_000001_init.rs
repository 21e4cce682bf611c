//! Initial schema migration.
//!
//! - `users`: authentication
//! - `expenses`: one row per shared expense, owned by the paying user
//! - `expense_users`: full participant set of each expense (owner included)

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Table identifiers

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    Password,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    OwnerId,
    Description,
    Amount,
    CreatedAt,
}

#[derive(Iden)]
enum ExpenseUsers {
    Table,
    ExpenseId,
    UserId,
}

// Migration implementation

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. Users
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 2. Expenses
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::OwnerId).integer().not_null())
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(ColumnDef::new(Expenses::Amount).double().not_null())
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-owner_id")
                            .from(Expenses::Table, Expenses::OwnerId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-owner_id")
                    .table(Expenses::Table)
                    .col(Expenses::OwnerId)
                    .to_owned(),
            )
            .await?;

        // 3. Expense participants
        manager
            .create_table(
                Table::create()
                    .table(ExpenseUsers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ExpenseUsers::ExpenseId).integer().not_null())
                    .col(ColumnDef::new(ExpenseUsers::UserId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(ExpenseUsers::ExpenseId)
                            .col(ExpenseUsers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_users-expense_id")
                            .from(ExpenseUsers::Table, ExpenseUsers::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_users-user_id")
                            .from(ExpenseUsers::Table, ExpenseUsers::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_users-user_id")
                    .table(ExpenseUsers::Table)
                    .col(ExpenseUsers::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ExpenseUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
