use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn is_duplicate_column(e: &DbErr) -> bool {
    e.to_string().contains("duplicate column")
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let result = manager
            .alter_table(
                Table::alter()
                    .table(Operations::Table)
                    .add_column(ColumnDef::new(Operations::EndsAt).text().null())
                    .to_owned(),
            )
            .await;

        match result {
            Ok(()) => {}
            Err(e) if is_duplicate_column(&e) => {}
            Err(e) => return Err(e),
        }

        let result = manager
            .alter_table(
                Table::alter()
                    .table(Operations::Table)
                    .add_column(ColumnDef::new(Operations::Image).text().null())
                    .to_owned(),
            )
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(e) if is_duplicate_column(&e) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Operations::Table)
                    .drop_column(Operations::Image)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Operations::Table)
                    .drop_column(Operations::EndsAt)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Operations {
    Table,
    EndsAt,
    Image,
}
