use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CRM API",
        version = "0.1.0",
        description = r#"
# CRM API

Backend for a small-business CRM: companies and their contacts, a product catalog, quotations
with PDF export, orders, trade exhibitions with their costs, employees, tasks, notes, uploaded
documents and a dashboard.

## Identity

Authentication happens upstream. The caller's user id may be passed in the `X-Actor-Id` header
(UUID); it is recorded as the creator of new records.

## Error Handling

Failures return a JSON body with a human readable message:

```json
{
  "error": "Bad Request",
  "message": "Validation error: name: must not be blank",
  "request_id": "4c1f...",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

## Pagination

List endpoints accept:
- `page`: Page number (default: 1)
- `limit`: Items per page (default and maximum are configurable)
- `search`: Case-sensitive substring filter on the main text columns
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Companies", description = "Customer companies"),
        (name = "Contacts", description = "People at customer companies"),
        (name = "Products", description = "Product catalog and categories"),
        (name = "Quotations", description = "Quotations, line items, PDF export and conversion to orders"),
        (name = "Orders", description = "Orders and their items"),
        (name = "Exhibitions", description = "Trade exhibitions and their costs"),
        (name = "Employees", description = "Employees and roles"),
        (name = "Tasks", description = "Follow-up tasks"),
        (name = "Notes", description = "Free-form notes"),
        (name = "Documents", description = "Uploaded files"),
        (name = "Dictionary", description = "Lookup values"),
        (name = "Settings", description = "Application settings"),
        (name = "Dashboard", description = "Activity summary"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        crate::api_status,
        crate::health_check,

        crate::handlers::companies::list_companies,
        crate::handlers::companies::get_company,
        crate::handlers::companies::create_company,
        crate::handlers::companies::update_company,
        crate::handlers::companies::delete_company,
        crate::handlers::companies::list_company_contacts,
        crate::handlers::companies::list_company_notes,

        crate::handlers::contacts::list_contacts,
        crate::handlers::contacts::get_contact,
        crate::handlers::contacts::create_contact,
        crate::handlers::contacts::update_contact,
        crate::handlers::contacts::delete_contact,

        crate::handlers::product_categories::list_categories,
        crate::handlers::product_categories::get_category,
        crate::handlers::product_categories::create_category,
        crate::handlers::product_categories::update_category,
        crate::handlers::product_categories::delete_category,

        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        crate::handlers::quotations::list_quotations,
        crate::handlers::quotations::get_quotation,
        crate::handlers::quotations::create_quotation,
        crate::handlers::quotations::update_quotation,
        crate::handlers::quotations::delete_quotation,
        crate::handlers::quotations::add_quotation_item,
        crate::handlers::quotations::update_quotation_item,
        crate::handlers::quotations::delete_quotation_item,
        crate::handlers::quotations::quotation_pdf,
        crate::handlers::quotations::convert_quotation,

        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::create_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::delete_order,
        crate::handlers::orders::add_order_item,
        crate::handlers::orders::delete_order_item,

        crate::handlers::exhibitions::list_exhibitions,
        crate::handlers::exhibitions::get_exhibition,
        crate::handlers::exhibitions::create_exhibition,
        crate::handlers::exhibitions::update_exhibition,
        crate::handlers::exhibitions::delete_exhibition,
        crate::handlers::exhibitions::list_exhibition_costs,
        crate::handlers::exhibitions::add_exhibition_cost,
        crate::handlers::exhibitions::delete_exhibition_cost,

        crate::handlers::employees::list_employees,
        crate::handlers::employees::get_employee,
        crate::handlers::employees::create_employee,
        crate::handlers::employees::update_employee,
        crate::handlers::employees::delete_employee,
        crate::handlers::employees::list_roles,
        crate::handlers::employees::create_role,
        crate::handlers::employees::update_role,
        crate::handlers::employees::delete_role,

        crate::handlers::tasks::list_tasks,
        crate::handlers::tasks::get_task,
        crate::handlers::tasks::create_task,
        crate::handlers::tasks::update_task,
        crate::handlers::tasks::delete_task,

        crate::handlers::notes::list_notes,
        crate::handlers::notes::get_note,
        crate::handlers::notes::create_note,
        crate::handlers::notes::update_note,
        crate::handlers::notes::delete_note,

        crate::handlers::documents::list_documents,
        crate::handlers::documents::get_document,
        crate::handlers::documents::upload_document,
        crate::handlers::documents::download_document,
        crate::handlers::documents::delete_document,

        crate::handlers::dictionary::list_entries,
        crate::handlers::dictionary::create_entry,
        crate::handlers::dictionary::update_entry,
        crate::handlers::dictionary::delete_entry,

        crate::handlers::settings::list_settings,
        crate::handlers::settings::get_setting,
        crate::handlers::settings::upsert_setting,
        crate::handlers::settings::delete_setting,

        crate::handlers::dashboard::get_dashboard,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::ListQuery,
            crate::errors::ErrorResponse,

            crate::entities::quotation::QuotationStatus,
            crate::entities::order::OrderStatus,
            crate::entities::task::TaskStatus,
            crate::entities::task::TaskPriority,
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_crm_routes() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("CRM API"));
        assert!(json.contains("/api/v1/quotations/{id}/items/{item_id}"));
        assert!(json.contains("/api/v1/dashboard"));
    }
}
