use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Recoveries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Recoveries::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Recoveries::CodeHash).string().not_null())
                    .col(
                        ColumnDef::new(Recoveries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Recoveries::Table, Recoveries::Username)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Recoveries::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Recoveries {
    Table,
    Username,
    CodeHash,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Username,
}
