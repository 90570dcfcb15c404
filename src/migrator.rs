use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_companies_tables::Migration),
            Box::new(m20240101_000002_create_catalog_tables::Migration),
            Box::new(m20240101_000003_create_sales_tables::Migration),
            Box::new(m20240101_000004_create_operations_tables::Migration),
            Box::new(m20240101_000005_create_content_tables::Migration),
        ]
    }
}

// Amounts use an unconstrained `decimal` (Postgres `numeric`, SQLite `real`) so stored totals
// keep full precision.

/// Columns shared by every table: creator reference and UTC timestamps.
fn audit_columns(table: &mut TableCreateStatement) -> &mut TableCreateStatement {
    table
        .col(ColumnDef::new(Alias::new("created_by")).uuid().null())
        .col(
            ColumnDef::new(Alias::new("created_at"))
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(
            ColumnDef::new(Alias::new("updated_at"))
                .timestamp_with_time_zone()
                .not_null(),
        )
}

fn index(
    name: &str,
    table: impl IntoIden + 'static,
    col: impl IntoIden + 'static,
) -> IndexCreateStatement {
    Index::create()
        .if_not_exists()
        .name(name)
        .table(table)
        .col(col)
        .to_owned()
}

// Migration implementations

mod m20240101_000001_create_companies_tables {
    use super::{audit_columns, index};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_companies_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    audit_columns(
                        Table::create()
                            .table(Companies::Table)
                            .if_not_exists()
                            .col(ColumnDef::new(Companies::Id).uuid().primary_key().not_null())
                            .col(ColumnDef::new(Companies::Name).string().not_null())
                            .col(ColumnDef::new(Companies::TaxId).string().null())
                            .col(ColumnDef::new(Companies::Email).string().null())
                            .col(ColumnDef::new(Companies::Phone).string().null())
                            .col(ColumnDef::new(Companies::Website).string().null())
                            .col(ColumnDef::new(Companies::Address).text().null())
                            .col(ColumnDef::new(Companies::City).string().null())
                            .col(ColumnDef::new(Companies::Country).string().null())
                            .col(ColumnDef::new(Companies::Industry).string().null())
                            .col(ColumnDef::new(Companies::Status).string().null())
                            .col(ColumnDef::new(Companies::Notes).text().null()),
                    )
                    .to_owned(),
                )
                .await?;

            manager
                .create_index(index("idx_companies_name", Companies::Table, Companies::Name))
                .await?;

            manager
                .create_table(
                    audit_columns(
                        Table::create()
                            .table(Contacts::Table)
                            .if_not_exists()
                            .col(ColumnDef::new(Contacts::Id).uuid().primary_key().not_null())
                            .col(ColumnDef::new(Contacts::CompanyId).uuid().not_null())
                            .col(ColumnDef::new(Contacts::FirstName).string().not_null())
                            .col(ColumnDef::new(Contacts::LastName).string().null())
                            .col(ColumnDef::new(Contacts::Email).string().null())
                            .col(ColumnDef::new(Contacts::Phone).string().null())
                            .col(ColumnDef::new(Contacts::Position).string().null())
                            .foreign_key(
                                ForeignKey::create()
                                    .name("fk_contacts_company_id")
                                    .from(Contacts::Table, Contacts::CompanyId)
                                    .to(Companies::Table, Companies::Id)
                                    .on_delete(ForeignKeyAction::Cascade),
                            ),
                    )
                    .to_owned(),
                )
                .await?;

            manager
                .create_index(index(
                    "idx_contacts_company_id",
                    Contacts::Table,
                    Contacts::CompanyId,
                ))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Contacts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Companies::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Companies {
        Table,
        Id,
        Name,
        TaxId,
        Email,
        Phone,
        Website,
        Address,
        City,
        Country,
        Industry,
        Status,
        Notes,
    }

    #[derive(DeriveIden)]
    pub enum Contacts {
        Table,
        Id,
        CompanyId,
        FirstName,
        LastName,
        Email,
        Phone,
        Position,
    }
}

mod m20240101_000002_create_catalog_tables {
    use super::{audit_columns, index};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    audit_columns(
                        Table::create()
                            .table(ProductCategories::Table)
                            .if_not_exists()
                            .col(
                                ColumnDef::new(ProductCategories::Id)
                                    .uuid()
                                    .primary_key()
                                    .not_null(),
                            )
                            .col(ColumnDef::new(ProductCategories::Name).string().not_null())
                            .col(ColumnDef::new(ProductCategories::Description).text().null())
                            .col(ColumnDef::new(ProductCategories::ParentId).uuid().null())
                            .foreign_key(
                                ForeignKey::create()
                                    .name("fk_product_categories_parent_id")
                                    .from(ProductCategories::Table, ProductCategories::ParentId)
                                    .to(ProductCategories::Table, ProductCategories::Id)
                                    .on_delete(ForeignKeyAction::SetNull),
                            ),
                    )
                    .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    audit_columns(
                        Table::create()
                            .table(Products::Table)
                            .if_not_exists()
                            .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                            .col(ColumnDef::new(Products::Name).string().not_null())
                            .col(ColumnDef::new(Products::Sku).string().null().unique_key())
                            .col(ColumnDef::new(Products::Description).text().null())
                            .col(ColumnDef::new(Products::CategoryId).uuid().null())
                            .col(ColumnDef::new(Products::Unit).string().null())
                            .col(
                                ColumnDef::new(Products::UnitPrice)
                                    .decimal()
                                    .not_null()
                                    .default(0),
                            )
                            .col(ColumnDef::new(Products::Currency).string_len(3).not_null())
                            .col(
                                ColumnDef::new(Products::IsActive)
                                    .boolean()
                                    .not_null()
                                    .default(true),
                            )
                            .foreign_key(
                                ForeignKey::create()
                                    .name("fk_products_category_id")
                                    .from(Products::Table, Products::CategoryId)
                                    .to(ProductCategories::Table, ProductCategories::Id)
                                    .on_delete(ForeignKeyAction::SetNull),
                            ),
                    )
                    .to_owned(),
                )
                .await?;

            manager
                .create_index(index(
                    "idx_products_category_id",
                    Products::Table,
                    Products::CategoryId,
                ))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ProductCategories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum ProductCategories {
        Table,
        Id,
        Name,
        Description,
        ParentId,
    }

    #[derive(DeriveIden)]
    pub enum Products {
        Table,
        Id,
        Name,
        Sku,
        Description,
        CategoryId,
        Unit,
        UnitPrice,
        Currency,
        IsActive,
    }
}

mod m20240101_000003_create_sales_tables {
    use super::m20240101_000001_create_companies_tables::{Companies, Contacts};
    use super::m20240101_000002_create_catalog_tables::Products;
    use super::{audit_columns, index};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_sales_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    audit_columns(
                        Table::create()
                            .table(Quotations::Table)
                            .if_not_exists()
                            .col(ColumnDef::new(Quotations::Id).uuid().primary_key().not_null())
                            .col(
                                ColumnDef::new(Quotations::QuotationNumber)
                                    .string()
                                    .not_null()
                                    .unique_key(),
                            )
                            .col(ColumnDef::new(Quotations::CompanyId).uuid().not_null())
                            .col(ColumnDef::new(Quotations::ContactId).uuid().null())
                            .col(ColumnDef::new(Quotations::Title).string().null())
                            .col(ColumnDef::new(Quotations::Status).string_len(20).not_null())
                            .col(ColumnDef::new(Quotations::Currency).string_len(3).not_null())
                            .col(ColumnDef::new(Quotations::ValidUntil).date().null())
                            .col(ColumnDef::new(Quotations::Notes).text().null())
                            .col(
                                ColumnDef::new(Quotations::TotalAmount)
                                    .decimal()
                                    .not_null()
                                    .default(0),
                            )
                            .foreign_key(
                                ForeignKey::create()
                                    .name("fk_quotations_company_id")
                                    .from(Quotations::Table, Quotations::CompanyId)
                                    .to(Companies::Table, Companies::Id)
                                    .on_delete(ForeignKeyAction::Restrict),
                            )
                            .foreign_key(
                                ForeignKey::create()
                                    .name("fk_quotations_contact_id")
                                    .from(Quotations::Table, Quotations::ContactId)
                                    .to(Contacts::Table, Contacts::Id)
                                    .on_delete(ForeignKeyAction::SetNull),
                            ),
                    )
                    .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    audit_columns(
                        Table::create()
                            .table(QuotationItems::Table)
                            .if_not_exists()
                            .col(
                                ColumnDef::new(QuotationItems::Id)
                                    .uuid()
                                    .primary_key()
                                    .not_null(),
                            )
                            .col(ColumnDef::new(QuotationItems::QuotationId).uuid().not_null())
                            .col(ColumnDef::new(QuotationItems::ProductId).uuid().null())
                            .col(ColumnDef::new(QuotationItems::Description).text().not_null())
                            .col(
                                ColumnDef::new(QuotationItems::Quantity)
                                    .decimal()
                                    .not_null(),
                            )
                            .col(
                                ColumnDef::new(QuotationItems::UnitPrice)
                                    .decimal()
                                    .not_null(),
                            )
                            .col(
                                ColumnDef::new(QuotationItems::Discount)
                                    .decimal_len(7, 4)
                                    .not_null()
                                    .default(0),
                            )
                            .col(ColumnDef::new(QuotationItems::Parameters).json().null())
                            .col(
                                ColumnDef::new(QuotationItems::Position)
                                    .integer()
                                    .not_null()
                                    .default(0),
                            )
                            .foreign_key(
                                ForeignKey::create()
                                    .name("fk_quotation_items_quotation_id")
                                    .from(QuotationItems::Table, QuotationItems::QuotationId)
                                    .to(Quotations::Table, Quotations::Id)
                                    .on_delete(ForeignKeyAction::Cascade),
                            )
                            .foreign_key(
                                ForeignKey::create()
                                    .name("fk_quotation_items_product_id")
                                    .from(QuotationItems::Table, QuotationItems::ProductId)
                                    .to(Products::Table, Products::Id)
                                    .on_delete(ForeignKeyAction::SetNull),
                            ),
                    )
                    .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    audit_columns(
                        Table::create()
                            .table(Orders::Table)
                            .if_not_exists()
                            .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                            .col(
                                ColumnDef::new(Orders::OrderNumber)
                                    .string()
                                    .not_null()
                                    .unique_key(),
                            )
                            .col(ColumnDef::new(Orders::CompanyId).uuid().not_null())
                            .col(ColumnDef::new(Orders::QuotationId).uuid().null())
                            .col(ColumnDef::new(Orders::Status).string_len(20).not_null())
                            .col(ColumnDef::new(Orders::Currency).string_len(3).not_null())
                            .col(ColumnDef::new(Orders::OrderDate).date().not_null())
                            .col(ColumnDef::new(Orders::Notes).text().null())
                            .col(
                                ColumnDef::new(Orders::TotalAmount)
                                    .decimal()
                                    .not_null()
                                    .default(0),
                            )
                            .foreign_key(
                                ForeignKey::create()
                                    .name("fk_orders_company_id")
                                    .from(Orders::Table, Orders::CompanyId)
                                    .to(Companies::Table, Companies::Id)
                                    .on_delete(ForeignKeyAction::Restrict),
                            )
                            .foreign_key(
                                ForeignKey::create()
                                    .name("fk_orders_quotation_id")
                                    .from(Orders::Table, Orders::QuotationId)
                                    .to(Quotations::Table, Quotations::Id)
                                    .on_delete(ForeignKeyAction::SetNull),
                            ),
                    )
                    .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    audit_columns(
                        Table::create()
                            .table(OrderItems::Table)
                            .if_not_exists()
                            .col(ColumnDef::new(OrderItems::Id).uuid().primary_key().not_null())
                            .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                            .col(ColumnDef::new(OrderItems::ProductId).uuid().null())
                            .col(ColumnDef::new(OrderItems::Description).text().not_null())
                            .col(
                                ColumnDef::new(OrderItems::Quantity)
                                    .decimal()
                                    .not_null(),
                            )
                            .col(
                                ColumnDef::new(OrderItems::UnitPrice)
                                    .decimal()
                                    .not_null(),
                            )
                            .col(
                                ColumnDef::new(OrderItems::Discount)
                                    .decimal_len(7, 4)
                                    .not_null()
                                    .default(0),
                            )
                            .foreign_key(
                                ForeignKey::create()
                                    .name("fk_order_items_order_id")
                                    .from(OrderItems::Table, OrderItems::OrderId)
                                    .to(Orders::Table, Orders::Id)
                                    .on_delete(ForeignKeyAction::Cascade),
                            )
                            .foreign_key(
                                ForeignKey::create()
                                    .name("fk_order_items_product_id")
                                    .from(OrderItems::Table, OrderItems::ProductId)
                                    .to(Products::Table, Products::Id)
                                    .on_delete(ForeignKeyAction::SetNull),
                            ),
                    )
                    .to_owned(),
                )
                .await?;

            manager
                .create_index(index(
                    "idx_quotations_company_id",
                    Quotations::Table,
                    Quotations::CompanyId,
                ))
                .await?;
            manager
                .create_index(index(
                    "idx_quotations_created_at",
                    Quotations::Table,
                    Alias::new("created_at"),
                ))
                .await?;
            manager
                .create_index(index(
                    "idx_quotation_items_quotation_id",
                    QuotationItems::Table,
                    QuotationItems::QuotationId,
                ))
                .await?;
            manager
                .create_index(index(
                    "idx_orders_company_id",
                    Orders::Table,
                    Orders::CompanyId,
                ))
                .await?;
            manager
                .create_index(index(
                    "idx_orders_created_at",
                    Orders::Table,
                    Alias::new("created_at"),
                ))
                .await?;
            manager
                .create_index(index(
                    "idx_order_items_order_id",
                    OrderItems::Table,
                    OrderItems::OrderId,
                ))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(QuotationItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Quotations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Quotations {
        Table,
        Id,
        QuotationNumber,
        CompanyId,
        ContactId,
        Title,
        Status,
        Currency,
        ValidUntil,
        Notes,
        TotalAmount,
    }

    #[derive(DeriveIden)]
    pub enum QuotationItems {
        Table,
        Id,
        QuotationId,
        ProductId,
        Description,
        Quantity,
        UnitPrice,
        Discount,
        Parameters,
        Position,
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        OrderNumber,
        CompanyId,
        QuotationId,
        Status,
        Currency,
        OrderDate,
        Notes,
        TotalAmount,
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        Description,
        Quantity,
        UnitPrice,
        Discount,
    }
}

mod m20240101_000004_create_operations_tables {
    use super::m20240101_000001_create_companies_tables::Companies;
    use super::{audit_columns, index};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_operations_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    audit_columns(
                        Table::create()
                            .table(Exhibitions::Table)
                            .if_not_exists()
                            .col(ColumnDef::new(Exhibitions::Id).uuid().primary_key().not_null())
                            .col(ColumnDef::new(Exhibitions::Name).string().not_null())
                            .col(ColumnDef::new(Exhibitions::Location).string().null())
                            .col(ColumnDef::new(Exhibitions::StartDate).date().not_null())
                            .col(ColumnDef::new(Exhibitions::EndDate).date().not_null())
                            .col(ColumnDef::new(Exhibitions::Description).text().null())
                            .col(ColumnDef::new(Exhibitions::Status).string().null()),
                    )
                    .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    audit_columns(
                        Table::create()
                            .table(ExhibitionCosts::Table)
                            .if_not_exists()
                            .col(
                                ColumnDef::new(ExhibitionCosts::Id)
                                    .uuid()
                                    .primary_key()
                                    .not_null(),
                            )
                            .col(ColumnDef::new(ExhibitionCosts::ExhibitionId).uuid().not_null())
                            .col(ColumnDef::new(ExhibitionCosts::Category).string().not_null())
                            .col(ColumnDef::new(ExhibitionCosts::Description).text().null())
                            .col(
                                ColumnDef::new(ExhibitionCosts::Amount)
                                    .decimal()
                                    .not_null(),
                            )
                            .col(
                                ColumnDef::new(ExhibitionCosts::Currency)
                                    .string_len(3)
                                    .not_null(),
                            )
                            .foreign_key(
                                ForeignKey::create()
                                    .name("fk_exhibition_costs_exhibition_id")
                                    .from(ExhibitionCosts::Table, ExhibitionCosts::ExhibitionId)
                                    .to(Exhibitions::Table, Exhibitions::Id)
                                    .on_delete(ForeignKeyAction::Cascade),
                            ),
                    )
                    .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    audit_columns(
                        Table::create()
                            .table(EmployeeRoles::Table)
                            .if_not_exists()
                            .col(
                                ColumnDef::new(EmployeeRoles::Id)
                                    .uuid()
                                    .primary_key()
                                    .not_null(),
                            )
                            .col(
                                ColumnDef::new(EmployeeRoles::Name)
                                    .string()
                                    .not_null()
                                    .unique_key(),
                            )
                            .col(ColumnDef::new(EmployeeRoles::Description).text().null())
                            .col(ColumnDef::new(EmployeeRoles::Permissions).json().not_null()),
                    )
                    .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    audit_columns(
                        Table::create()
                            .table(Employees::Table)
                            .if_not_exists()
                            .col(ColumnDef::new(Employees::Id).uuid().primary_key().not_null())
                            .col(ColumnDef::new(Employees::FirstName).string().not_null())
                            .col(ColumnDef::new(Employees::LastName).string().not_null())
                            .col(
                                ColumnDef::new(Employees::Email)
                                    .string()
                                    .not_null()
                                    .unique_key(),
                            )
                            .col(ColumnDef::new(Employees::Phone).string().null())
                            .col(ColumnDef::new(Employees::Position).string().null())
                            .col(ColumnDef::new(Employees::RoleId).uuid().null())
                            .col(
                                ColumnDef::new(Employees::IsActive)
                                    .boolean()
                                    .not_null()
                                    .default(true),
                            )
                            .foreign_key(
                                ForeignKey::create()
                                    .name("fk_employees_role_id")
                                    .from(Employees::Table, Employees::RoleId)
                                    .to(EmployeeRoles::Table, EmployeeRoles::Id)
                                    .on_delete(ForeignKeyAction::SetNull),
                            ),
                    )
                    .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    audit_columns(
                        Table::create()
                            .table(Tasks::Table)
                            .if_not_exists()
                            .col(ColumnDef::new(Tasks::Id).uuid().primary_key().not_null())
                            .col(ColumnDef::new(Tasks::Title).string().not_null())
                            .col(ColumnDef::new(Tasks::Description).text().null())
                            .col(ColumnDef::new(Tasks::Status).string_len(20).not_null())
                            .col(ColumnDef::new(Tasks::Priority).string_len(10).not_null())
                            .col(ColumnDef::new(Tasks::DueDate).date().null())
                            .col(ColumnDef::new(Tasks::AssigneeId).uuid().null())
                            .col(ColumnDef::new(Tasks::CompanyId).uuid().null())
                            .col(
                                ColumnDef::new(Tasks::CompletedAt)
                                    .timestamp_with_time_zone()
                                    .null(),
                            )
                            .foreign_key(
                                ForeignKey::create()
                                    .name("fk_tasks_assignee_id")
                                    .from(Tasks::Table, Tasks::AssigneeId)
                                    .to(Employees::Table, Employees::Id)
                                    .on_delete(ForeignKeyAction::SetNull),
                            )
                            .foreign_key(
                                ForeignKey::create()
                                    .name("fk_tasks_company_id")
                                    .from(Tasks::Table, Tasks::CompanyId)
                                    .to(Companies::Table, Companies::Id)
                                    .on_delete(ForeignKeyAction::Cascade),
                            ),
                    )
                    .to_owned(),
                )
                .await?;

            manager
                .create_index(index("idx_tasks_status", Tasks::Table, Tasks::Status))
                .await?;
            manager
                .create_index(index(
                    "idx_exhibition_costs_exhibition_id",
                    ExhibitionCosts::Table,
                    ExhibitionCosts::ExhibitionId,
                ))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [
                Alias::new("tasks"),
                Alias::new("employees"),
                Alias::new("employee_roles"),
                Alias::new("exhibition_costs"),
                Alias::new("exhibitions"),
            ] {
                manager
                    .drop_table(Table::drop().table(table).to_owned())
                    .await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum Exhibitions {
        Table,
        Id,
        Name,
        Location,
        StartDate,
        EndDate,
        Description,
        Status,
    }

    #[derive(DeriveIden)]
    enum ExhibitionCosts {
        Table,
        Id,
        ExhibitionId,
        Category,
        Description,
        Amount,
        Currency,
    }

    #[derive(DeriveIden)]
    enum EmployeeRoles {
        Table,
        Id,
        Name,
        Description,
        Permissions,
    }

    #[derive(DeriveIden)]
    enum Employees {
        Table,
        Id,
        FirstName,
        LastName,
        Email,
        Phone,
        Position,
        RoleId,
        IsActive,
    }

    #[derive(DeriveIden)]
    enum Tasks {
        Table,
        Id,
        Title,
        Description,
        Status,
        Priority,
        DueDate,
        AssigneeId,
        CompanyId,
        CompletedAt,
    }
}

mod m20240101_000005_create_content_tables {
    use super::m20240101_000001_create_companies_tables::Companies;
    use super::m20240101_000003_create_sales_tables::Quotations;
    use super::{audit_columns, index};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_content_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    audit_columns(
                        Table::create()
                            .table(Notes::Table)
                            .if_not_exists()
                            .col(ColumnDef::new(Notes::Id).uuid().primary_key().not_null())
                            .col(ColumnDef::new(Notes::CompanyId).uuid().not_null())
                            .col(ColumnDef::new(Notes::Title).string().null())
                            .col(ColumnDef::new(Notes::Content).text().not_null())
                            .foreign_key(
                                ForeignKey::create()
                                    .name("fk_notes_company_id")
                                    .from(Notes::Table, Notes::CompanyId)
                                    .to(Companies::Table, Companies::Id)
                                    .on_delete(ForeignKeyAction::Cascade),
                            ),
                    )
                    .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    audit_columns(
                        Table::create()
                            .table(Documents::Table)
                            .if_not_exists()
                            .col(ColumnDef::new(Documents::Id).uuid().primary_key().not_null())
                            .col(ColumnDef::new(Documents::CompanyId).uuid().null())
                            .col(ColumnDef::new(Documents::QuotationId).uuid().null())
                            .col(ColumnDef::new(Documents::FileName).string().not_null())
                            .col(ColumnDef::new(Documents::ContentType).string().not_null())
                            .col(ColumnDef::new(Documents::SizeBytes).big_integer().not_null())
                            .col(
                                ColumnDef::new(Documents::StorageKey)
                                    .string()
                                    .not_null()
                                    .unique_key(),
                            )
                            .col(ColumnDef::new(Documents::Checksum).string_len(64).not_null())
                            .foreign_key(
                                ForeignKey::create()
                                    .name("fk_documents_company_id")
                                    .from(Documents::Table, Documents::CompanyId)
                                    .to(Companies::Table, Companies::Id)
                                    .on_delete(ForeignKeyAction::SetNull),
                            )
                            .foreign_key(
                                ForeignKey::create()
                                    .name("fk_documents_quotation_id")
                                    .from(Documents::Table, Documents::QuotationId)
                                    .to(Quotations::Table, Quotations::Id)
                                    .on_delete(ForeignKeyAction::SetNull),
                            ),
                    )
                    .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    audit_columns(
                        Table::create()
                            .table(Dictionary::Table)
                            .if_not_exists()
                            .col(ColumnDef::new(Dictionary::Id).uuid().primary_key().not_null())
                            .col(ColumnDef::new(Dictionary::Category).string().not_null())
                            .col(ColumnDef::new(Dictionary::Key).string().not_null())
                            .col(ColumnDef::new(Dictionary::Value).string().not_null())
                            .col(
                                ColumnDef::new(Dictionary::SortOrder)
                                    .integer()
                                    .not_null()
                                    .default(0),
                            ),
                    )
                    .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_dictionary_category_key")
                        .table(Dictionary::Table)
                        .col(Dictionary::Category)
                        .col(Dictionary::Key)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    audit_columns(
                        Table::create()
                            .table(Settings::Table)
                            .if_not_exists()
                            .col(ColumnDef::new(Settings::Id).uuid().primary_key().not_null())
                            .col(ColumnDef::new(Settings::Key).string().not_null().unique_key())
                            .col(ColumnDef::new(Settings::Value).json().not_null())
                            .col(ColumnDef::new(Settings::Description).text().null()),
                    )
                    .to_owned(),
                )
                .await?;

            manager
                .create_index(index("idx_notes_company_id", Notes::Table, Notes::CompanyId))
                .await?;
            manager
                .create_index(index(
                    "idx_documents_company_id",
                    Documents::Table,
                    Documents::CompanyId,
                ))
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [
                Alias::new("settings"),
                Alias::new("dictionary"),
                Alias::new("documents"),
                Alias::new("notes"),
            ] {
                manager
                    .drop_table(Table::drop().table(table).to_owned())
                    .await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum Notes {
        Table,
        Id,
        CompanyId,
        Title,
        Content,
    }

    #[derive(DeriveIden)]
    enum Documents {
        Table,
        Id,
        CompanyId,
        QuotationId,
        FileName,
        ContentType,
        SizeBytes,
        StorageKey,
        Checksum,
    }

    #[derive(DeriveIden)]
    enum Dictionary {
        Table,
        Id,
        Category,
        Key,
        Value,
        SortOrder,
    }

    #[derive(DeriveIden)]
    enum Settings {
        Table,
        Id,
        Key,
        Value,
        Description,
    }
}
