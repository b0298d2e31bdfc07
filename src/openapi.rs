use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LabStock API",
        version = "0.3.0",
        description = r#"
# Laboratory Supplies Inventory & Sales API

Backend for laboratory-supplies inventory control: brand and location
registries, purchase-order intake with minted item codes, per-location stock
ledgers, multi-line sales with atomic stock deduction, and dashboard rollups.

## Authentication

All `/api/v1` endpoints require a Bearer token:

```
Authorization: Bearer <your-jwt-token>
```

The authenticated identity is used to stamp `added_by` audit fields on
mutated rows.

## Error Handling

Errors use a consistent response shape with appropriate HTTP status codes:

```json
{
  "error": "Unprocessable Entity",
  "message": "Insufficient stock: Item Bx0001 at location 2: available 3, requested 10",
  "timestamp": "2026-01-01T00:00:00Z"
}
```
        "#,
    ),
    paths(
        crate::handlers::inventory::create_inventory,
        crate::handlers::inventory::get_inventory,
        crate::handlers::inventory::list_inventory,
        crate::handlers::inventory::update_inventory,
        crate::handlers::inventory::delete_inventory,
        crate::handlers::inventory::stock_alerts,
        crate::handlers::inventory::highest_stock,
        crate::handlers::inventory::lowest_stock,
        crate::handlers::purchase_orders::create_purchase_order,
        crate::handlers::purchase_orders::get_purchase_order,
        crate::handlers::purchase_orders::list_purchase_orders,
        crate::handlers::purchase_orders::update_purchase_order,
        crate::handlers::purchase_orders::delete_purchase_order,
        crate::handlers::transactions::create_transaction,
        crate::handlers::transactions::get_transaction,
        crate::handlers::transactions::list_transactions,
        crate::handlers::transactions::delete_transaction,
        crate::handlers::reports::dashboard_stats,
    ),
    components(schemas(crate::errors::ErrorResponse)),
    tags(
        (name = "inventory", description = "Inventory items and per-location stock"),
        (name = "purchase-orders", description = "Incoming stock intake"),
        (name = "transactions", description = "Customer sales"),
        (name = "dashboard", description = "Read-only rollups"),
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at `/swagger-ui`, serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
