use axum::{
    extract::{Extension, Path, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    handlers::{leads::require_role, log_activity},
    models::{
        customer::{CreateCustomer, Customer, UpdateCustomer},
        user::{User, UserRole},
    },
};

const CUSTOMER_COLUMNS: &str = "id, lead_id, name, email, phone, company, pan_number, \
     kyc_status, demat_account, total_investment, relationship_manager, status, \
     created_at, updated_at";

pub async fn list_customers(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<Customer>>, AppError> {
    // Relationship managers see their book; everyone else sees the full list.
    let customers = if user.role == UserRole::Rm {
        sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE relationship_manager = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(user.id)
        .fetch_all(&pool)
        .await?
    } else {
        sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY created_at DESC"
        ))
        .fetch_all(&pool)
        .await?
    };

    Ok(Json(customers))
}

pub async fn create_customer(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(payload): Json<CreateCustomer>,
) -> Result<Json<Customer>, AppError> {
    require_role(&user, &[UserRole::Admin, UserRole::Sales, UserRole::Rm])?;
    payload.validate()?;

    let customer = sqlx::query_as::<_, Customer>(&format!(
        "INSERT INTO customers (lead_id, name, email, phone, company, pan_number, kyc_status, \
         demat_account, total_investment, relationship_manager, status) \
         VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, 0, $8, 'active') \
         RETURNING {CUSTOMER_COLUMNS}"
    ))
    .bind(payload.lead_id)
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.company)
    .bind(&payload.pan_number)
    .bind(&payload.demat_account)
    .bind(payload.relationship_manager)
    .fetch_one(&pool)
    .await?;

    log_activity(
        &pool,
        &user,
        "customer",
        customer.id,
        "create",
        json!({"customerName": customer.name}),
        &headers,
    )
    .await;

    Ok(Json(customer))
}

pub async fn update_customer(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(user): Extension<User>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(payload): Json<UpdateCustomer>,
) -> Result<Json<Customer>, AppError> {
    payload.validate()?;

    let mut customer = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))?;

    if let Some(name) = payload.name {
        customer.name = name;
    }
    if let Some(email) = payload.email {
        customer.email = email;
    }
    if let Some(phone) = payload.phone {
        customer.phone = Some(phone);
    }
    if let Some(company) = payload.company {
        customer.company = Some(company);
    }
    if let Some(pan_number) = payload.pan_number {
        customer.pan_number = Some(pan_number);
    }
    if let Some(kyc_status) = payload.kyc_status {
        customer.kyc_status = kyc_status;
    }
    if let Some(demat_account) = payload.demat_account {
        customer.demat_account = Some(demat_account);
    }
    if let Some(total_investment) = payload.total_investment {
        customer.total_investment = Some(total_investment);
    }
    if let Some(relationship_manager) = payload.relationship_manager {
        customer.relationship_manager = Some(relationship_manager);
    }
    if let Some(status) = payload.status {
        customer.status = status;
    }
    customer.updated_at = Utc::now();

    sqlx::query(
        "UPDATE customers SET name = $1, email = $2, phone = $3, company = $4, pan_number = $5, \
         kyc_status = $6, demat_account = $7, total_investment = $8, relationship_manager = $9, \
         status = $10, updated_at = $11 WHERE id = $12",
    )
    .bind(&customer.name)
    .bind(&customer.email)
    .bind(&customer.phone)
    .bind(&customer.company)
    .bind(&customer.pan_number)
    .bind(&customer.kyc_status)
    .bind(&customer.demat_account)
    .bind(customer.total_investment)
    .bind(customer.relationship_manager)
    .bind(&customer.status)
    .bind(customer.updated_at)
    .bind(customer.id)
    .execute(&pool)
    .await?;

    log_activity(
        &pool,
        &user,
        "customer",
        customer.id,
        "update",
        json!({"customerName": customer.name}),
        &headers,
    )
    .await;

    Ok(Json(customer))
}
