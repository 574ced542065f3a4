use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RecipeSteps::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RecipeSteps::RecipeId).uuid().not_null())
                    .col(ColumnDef::new(RecipeSteps::Position).integer().not_null())
                    .col(ColumnDef::new(RecipeSteps::Body).text().not_null())
                    .primary_key(
                        Index::create()
                            .col(RecipeSteps::RecipeId)
                            .col(RecipeSteps::Position),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(RecipeSteps::Table, RecipeSteps::RecipeId)
                            .to(Recipes::Table, Recipes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RecipeSteps::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RecipeSteps {
    Table,
    RecipeId,
    Position,
    Body,
}

#[derive(Iden)]
enum Recipes {
    Table,
    Id,
}
